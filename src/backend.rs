//! The boundary with the external media-parsing collaborators.
//!
//! `metagrab` performs no container or tag parsing of its own. Everything it
//! reports comes from a [`MediaBackend`]: a stream probe, two lazily-created
//! attribute handles (content and tag), and a stateless seek-and-decode frame
//! grab. The default backend is [`FfmpegBackend`](crate::FfmpegBackend);
//! custom backends can be plugged in via
//! [`MetadataExtractor::with_backend`](crate::MetadataExtractor::with_backend),
//! which is also how the contract tests script collaborator behavior.

use std::time::Duration;

use thiserror::Error;

use crate::{
    metadata::{Artwork, StreamInfo, SyncLyrics, VideoFrame},
    source::Source,
};

/// An error reported by a media-parsing collaborator.
///
/// The façade maps these onto [`ExtractError`](crate::ExtractError):
/// `SourceNotFound` becomes `FileNotFound`, `AccessDenied` becomes
/// `PermissionDenied`, and `Parse` becomes `OperationFailed`.
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    /// The probe reported the source missing.
    #[error("source not found")]
    SourceNotFound,

    /// The OS refused access to the source.
    #[error("access denied")]
    AccessDenied,

    /// The source could not be parsed or decoded.
    #[error("{0}")]
    Parse(String),
}

/// A raw attribute value produced by a collaborator's keyed accessor.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    /// An integral value.
    Int(i64),
    /// A floating-point value.
    Double(f64),
    /// A text value.
    Text(String),
}

/// Keys served by the content-attributes handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKey {
    /// Duration in milliseconds.
    Duration,
    /// Video bit rate in bits per second.
    VideoBitrate,
    /// Video frames per second.
    VideoFps,
    /// Video width in pixels.
    VideoWidth,
    /// Video height in pixels.
    VideoHeight,
    /// Video codec name.
    VideoCodec,
    /// Audio bit rate in bits per second.
    AudioBitrate,
    /// Audio channel count.
    AudioChannels,
    /// Audio sample rate in hertz.
    AudioSampleRate,
    /// Audio bits per sample.
    AudioBitDepth,
    /// Audio codec name.
    AudioCodec,
    /// Video rotation hint in degrees clockwise.
    Rotation,
    /// GPS longitude from the container's location entry.
    Longitude,
    /// GPS latitude from the container's location entry.
    Latitude,
    /// GPS altitude from the container's location entry.
    Altitude,
}

/// Keys served by the tag-attributes handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagKey {
    /// Artist.
    Artist,
    /// Title.
    Title,
    /// Album.
    Album,
    /// Album artist.
    AlbumArtist,
    /// Genre.
    Genre,
    /// Author / composer.
    Author,
    /// Copyright notice.
    Copyright,
    /// Release date or year.
    Date,
    /// Description.
    Description,
    /// Comment.
    Comment,
    /// Track number text.
    TrackNumber,
    /// Content classification.
    Classification,
    /// Parental rating.
    Rating,
    /// Conductor.
    Conductor,
    /// Unsynchronized lyric text.
    UnsyncLyrics,
    /// Recording date.
    RecordingDate,
}

/// The content-attributes handle: stream/codec-level fields of one source.
///
/// Created at most once per source assignment and dropped when the source is
/// replaced or the context is dropped.
pub trait ContentAttributes {
    /// Audio/video track counts, recorded when the handle was created.
    fn stream_info(&self) -> StreamInfo;

    /// Read one keyed field. Absent fields are `Ok(None)`.
    fn get(&self, key: ContentKey) -> Result<Option<AttrValue>, BackendError>;

    /// The embedded video thumbnail (attached picture), if any.
    fn thumbnail(&self) -> Result<Option<Vec<u8>>, BackendError>;
}

/// The tag-attributes handle: descriptive tag fields of one source.
pub trait TagAttributes {
    /// Read one keyed field. Absent fields are `Ok(None)`.
    fn get(&self, key: TagKey) -> Result<Option<AttrValue>, BackendError>;

    /// The embedded artwork, if any.
    fn artwork(&self) -> Result<Option<Artwork>, BackendError>;

    /// Number of synchronized-lyrics `(timestamp, line)` pairs.
    fn sync_lyrics_len(&self) -> Result<usize, BackendError>;

    /// The indexed synchronized-lyrics pair, or `None` when out of range.
    fn sync_lyric(&self, index: usize) -> Result<Option<SyncLyrics>, BackendError>;
}

/// A media-parsing collaborator.
///
/// All operations are synchronous and blocking; the façade serializes calls
/// on a given context, so implementations need no interior locking.
pub trait MediaBackend {
    /// Count audio and video tracks without building attribute handles.
    fn probe(&self, source: &Source<'_>) -> Result<StreamInfo, BackendError>;

    /// Build the content-attributes handle for `source`.
    fn open_content(
        &self,
        source: &Source<'_>,
    ) -> Result<Box<dyn ContentAttributes>, BackendError>;

    /// Build the tag-attributes handle for `source`.
    fn open_tags(&self, source: &Source<'_>) -> Result<Box<dyn TagAttributes>, BackendError>;

    /// Seek to `timestamp` and decode one video frame.
    ///
    /// `accurate` requests the exact frame at the timestamp; otherwise the
    /// decode may snap to the nearest keyframe for speed. Implementations
    /// must report an empty decode as an error, never as an empty frame.
    fn decode_frame(
        &self,
        source: &Source<'_>,
        timestamp: Duration,
        accurate: bool,
    ) -> Result<VideoFrame, BackendError>;
}
