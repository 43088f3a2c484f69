//! The extraction context.
//!
//! [`MetadataExtractor`] owns one media source at a time and reads metadata
//! from it through a [`MediaBackend`]. Parsing is lazy and happens at most
//! once per source: the first read of a stream, content, or tag attribute
//! builds the corresponding backend handle, and every later read of the same
//! class is served from it. Assigning a new source drops the handles (content
//! first, then tags, then the old source) and the next read starts over.

use std::{path::Path, time::Duration};

use crate::{
    attribute::{Attribute, AttributeClass, ValueKind},
    backend::{
        AttrValue, BackendError, ContentAttributes, ContentKey, MediaBackend, TagAttributes,
        TagKey,
    },
    content::FfmpegBackend,
    error::ExtractError,
    metadata::{Artwork, StreamInfo, SyncLyrics, VideoFrame, copy_owned},
    source::Source,
};

const NO_SOURCE: ExtractError =
    ExtractError::InvalidParameter("no source set (call set_path or set_buffer first)");

/// A metadata extraction context.
///
/// The context is single-threaded by construction (`&mut self` on every
/// read); move it between threads freely, but reads on one context are
/// serialized by the borrow checker.
///
/// # Example
///
/// ```no_run
/// use metagrab::{Attribute, MetadataExtractor};
///
/// # fn main() -> Result<(), metagrab::ExtractError> {
/// let mut extractor = MetadataExtractor::new();
/// extractor.set_path("song.mp3")?;
///
/// if let Some(title) = extractor.metadata(Attribute::Title)? {
///     println!("title: {title}");
/// }
/// let duration_ms = extractor.metadata(Attribute::Duration)?;
/// # Ok(())
/// # }
/// ```
pub struct MetadataExtractor<'data> {
    backend: Box<dyn MediaBackend>,
    source: Option<Source<'data>>,
    stream_info: Option<StreamInfo>,
    content: Option<Box<dyn ContentAttributes>>,
    tags: Option<Box<dyn TagAttributes>>,
}

impl Default for MetadataExtractor<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'data> MetadataExtractor<'data> {
    /// Create a context backed by the default FFmpeg/lofty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::with_backend(Box::new(FfmpegBackend::new()))
    }

    /// Create a context with a custom [`MediaBackend`].
    #[must_use]
    pub fn with_backend(backend: Box<dyn MediaBackend>) -> Self {
        MetadataExtractor {
            backend,
            source: None,
            stream_info: None,
            content: None,
            tags: None,
        }
    }

    /// Point the context at a file on disk.
    ///
    /// Replaces any previous source and drops its cached state. The file is
    /// validated here; parsing is deferred to the first read.
    ///
    /// # Errors
    ///
    /// - [`ExtractError::InvalidParameter`] if the path is empty.
    /// - [`ExtractError::FileNotFound`] if it is not a regular file.
    /// - [`ExtractError::PermissionDenied`] if the OS refuses to stat it.
    ///
    /// On error the context keeps its previous source untouched.
    pub fn set_path<P: AsRef<Path>>(&mut self, path: P) -> Result<(), ExtractError> {
        let source = Source::from_path(path)?;
        log::info!("Source set to {source:?}");
        self.replace_source(source);
        Ok(())
    }

    /// Point the context at an in-memory media buffer.
    ///
    /// The buffer is borrowed for as long as the context uses it.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::InvalidParameter`] if the buffer is empty.
    /// On error the context keeps its previous source untouched.
    pub fn set_buffer(&mut self, buffer: &'data [u8]) -> Result<(), ExtractError> {
        let source = Source::from_buffer(buffer)?;
        log::info!("Source set to an in-memory buffer of {} bytes", buffer.len());
        self.replace_source(source);
        Ok(())
    }

    // Release order mirrors assignment teardown: content handle, tag handle,
    // then the old source.
    fn replace_source(&mut self, source: Source<'data>) {
        self.content = None;
        self.tags = None;
        self.stream_info = None;
        self.source = Some(source);
    }

    fn current_source(&self) -> Result<&Source<'data>, ExtractError> {
        self.source.as_ref().ok_or(NO_SOURCE)
    }

    /// Audio and video track counts.
    ///
    /// For path sources this runs a lightweight probe; buffer sources are
    /// answered through the content handle. Either way the counts are cached.
    ///
    /// # Errors
    ///
    /// [`ExtractError::InvalidParameter`] without a source; otherwise the
    /// mapped backend failure.
    pub fn stream_info(&mut self) -> Result<StreamInfo, ExtractError> {
        if let Some(info) = self.stream_info {
            return Ok(info);
        }

        // The content handle is authoritative when it exists.
        if let Some(content) = self.content.as_deref() {
            let info = content.stream_info();
            self.stream_info = Some(info);
            return Ok(info);
        }

        if matches!(self.current_source()?, Source::Path(_)) {
            let source = self.source.as_ref().ok_or(NO_SOURCE)?;
            let info = self
                .backend
                .probe(source)
                .map_err(|error| map_backend_error(source, error))?;
            log::debug!(
                "Probe: {} audio track(s), {} video track(s)",
                info.audio_tracks,
                info.video_tracks,
            );
            self.stream_info = Some(info);
            Ok(info)
        } else {
            self.ensure_content()?;
            self.stream_info.ok_or(NO_SOURCE)
        }
    }

    fn ensure_content(&mut self) -> Result<(), ExtractError> {
        if self.content.is_some() {
            return Ok(());
        }
        let source = self.source.as_ref().ok_or(NO_SOURCE)?;
        let content = self
            .backend
            .open_content(source)
            .map_err(|error| map_backend_error(source, error))?;
        self.stream_info = Some(content.stream_info());
        self.content = Some(content);
        Ok(())
    }

    fn ensure_tags(&mut self) -> Result<(), ExtractError> {
        if self.tags.is_some() {
            return Ok(());
        }
        let source = self.source.as_ref().ok_or(NO_SOURCE)?;
        let tags = self
            .backend
            .open_tags(source)
            .map_err(|error| map_backend_error(source, error))?;
        self.tags = Some(tags);
        Ok(())
    }

    // Immutable accessors for handles that ensure_* just created. The error
    // arms are unreachable after a successful ensure.
    fn content_handle(&self) -> Result<&dyn ContentAttributes, ExtractError> {
        self.content.as_deref().ok_or(NO_SOURCE)
    }

    fn tag_handle(&self) -> Result<&dyn TagAttributes, ExtractError> {
        self.tags.as_deref().ok_or(NO_SOURCE)
    }

    /// Read one attribute, formatted as text.
    ///
    /// `Ok(None)` means the source simply does not carry the attribute;
    /// errors are reserved for failed operations. Integers format in base
    /// ten, floating-point values with six decimals, and empty text
    /// collapses to `None`.
    ///
    /// Audio attributes of a source with no audio track (and video
    /// attributes of one with no video track) are answered without touching
    /// the parser: numeric ones as `Some("0")`, textual ones as `None`.
    ///
    /// # Errors
    ///
    /// [`ExtractError::InvalidParameter`] without a source; otherwise the
    /// mapped backend failure of whichever extraction phase the attribute
    /// needed first.
    pub fn metadata(&mut self, attribute: Attribute) -> Result<Option<String>, ExtractError> {
        log::debug!("Reading attribute {attribute}");
        match attribute.class() {
            AttributeClass::Stream => {
                let info = self.stream_info()?;
                let count = match attribute {
                    Attribute::HasVideo => info.video_tracks,
                    _ => info.audio_tracks,
                };
                Ok(Some(count.to_string()))
            }
            AttributeClass::Content => {
                let info = self.stream_info()?;
                if is_track_gated(attribute, info) {
                    return Ok(gated_default(attribute));
                }
                self.ensure_content()?;
                let source = self.current_source()?;
                let content = self.content_handle()?;
                let value = content
                    .get(content_key(attribute))
                    .map_err(|error| map_backend_error(source, error))?;
                Ok(format_value(value))
            }
            AttributeClass::Tag => {
                self.ensure_tags()?;
                let source = self.current_source()?;
                let tags = self.tag_handle()?;
                if attribute == Attribute::SyncLyricsCount {
                    let count = tags
                        .sync_lyrics_len()
                        .map_err(|error| map_backend_error(source, error))?;
                    return Ok(Some(count.to_string()));
                }
                let value = tags
                    .get(tag_key(attribute))
                    .map_err(|error| map_backend_error(source, error))?;
                Ok(format_value(value))
            }
        }
    }

    /// The artwork embedded in the source's tag.
    ///
    /// `Ok(None)` when the tag carries no picture.
    ///
    /// # Errors
    ///
    /// [`ExtractError::InvalidParameter`] without a source,
    /// [`ExtractError::OutOfMemory`] if the copy cannot be allocated;
    /// otherwise the mapped backend failure.
    pub fn artwork(&mut self) -> Result<Option<Artwork>, ExtractError> {
        self.ensure_tags()?;
        let source = self.current_source()?;
        let tags = self.tag_handle()?;
        let Some(artwork) = tags
            .artwork()
            .map_err(|error| map_backend_error(source, error))?
        else {
            return Ok(None);
        };
        Ok(Some(Artwork {
            data: copy_owned(&artwork.data)?,
            mime_type: artwork.mime_type.filter(|mime| !mime.is_empty()),
        }))
    }

    /// The video thumbnail embedded in the container (the attached picture).
    ///
    /// `Ok(None)` when the source has no video track or no attached picture.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`artwork`](Self::artwork).
    pub fn frame(&mut self) -> Result<Option<Vec<u8>>, ExtractError> {
        let info = self.stream_info()?;
        if info.video_tracks == 0 {
            log::debug!("No video track; skipping thumbnail read");
            return Ok(None);
        }
        self.ensure_content()?;
        let source = self.current_source()?;
        let content = self.content_handle()?;
        let Some(bytes) = content
            .thumbnail()
            .map_err(|error| map_backend_error(source, error))?
        else {
            return Ok(None);
        };
        Ok(Some(copy_owned(&bytes)?))
    }

    /// Decode the video frame at `timestamp`.
    ///
    /// With `accurate` set the decode lands on the exact frame; otherwise it
    /// may snap to the nearest keyframe, which is much faster on long GOPs.
    /// This runs directly against the backend each call and does not build
    /// or reuse the lazy handles.
    ///
    /// # Errors
    ///
    /// [`ExtractError::InvalidParameter`] without a source;
    /// [`ExtractError::OperationFailed`] when the source has no decodable
    /// video at the timestamp.
    pub fn frame_at(
        &mut self,
        timestamp: Duration,
        accurate: bool,
    ) -> Result<VideoFrame, ExtractError> {
        let source = self.current_source()?;
        self.backend
            .decode_frame(source, timestamp, accurate)
            .map_err(|error| map_backend_error(source, error))
    }

    /// The synchronized-lyrics pair at `index`.
    ///
    /// Reads past the end yield the empty pair rather than an error; bound
    /// the loop with [`Attribute::SyncLyricsCount`] first.
    ///
    /// # Errors
    ///
    /// [`ExtractError::InvalidParameter`] without a source; otherwise the
    /// mapped backend failure.
    pub fn sync_lyrics(&mut self, index: usize) -> Result<SyncLyrics, ExtractError> {
        self.ensure_tags()?;
        let source = self.current_source()?;
        let tags = self.tag_handle()?;
        let pair = tags
            .sync_lyric(index)
            .map_err(|error| map_backend_error(source, error))?;
        Ok(pair.unwrap_or_default())
    }
}

fn map_backend_error(source: &Source<'_>, error: BackendError) -> ExtractError {
    let path = || {
        source
            .as_path()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| std::path::PathBuf::from("<in-memory buffer>"))
    };
    match error {
        BackendError::SourceNotFound => ExtractError::FileNotFound { path: path() },
        BackendError::AccessDenied => ExtractError::PermissionDenied { path: path() },
        BackendError::Parse(message) => ExtractError::OperationFailed(message),
    }
}

/// True when a content attribute can be answered without parsing because the
/// track it describes does not exist.
fn is_track_gated(attribute: Attribute, info: StreamInfo) -> bool {
    use Attribute::*;
    match attribute {
        VideoBitrate | VideoFps | VideoWidth | VideoHeight | VideoCodec => info.video_tracks == 0,
        AudioBitrate | AudioChannels | AudioSampleRate | AudioBitDepth | AudioCodec => {
            info.audio_tracks == 0
        }
        _ => false,
    }
}

/// The answer for a track-gated attribute: zero for the numeric ones, absent
/// for the rest.
fn gated_default(attribute: Attribute) -> Option<String> {
    match attribute.kind() {
        ValueKind::Int => Some("0".to_string()),
        _ => None,
    }
}

fn format_value(value: Option<AttrValue>) -> Option<String> {
    match value? {
        AttrValue::Int(value) => Some(value.to_string()),
        AttrValue::Double(value) => Some(format!("{value:.6}")),
        AttrValue::Text(text) => {
            if text.is_empty() {
                None
            } else {
                Some(text)
            }
        }
    }
}

// The mappings below are called only after dispatching on the attribute's
// class, so the cross-class arms are unreachable; keeping them explicit makes
// the compiler flag any new attribute that is added without a key.
fn content_key(attribute: Attribute) -> ContentKey {
    match attribute {
        Attribute::Duration => ContentKey::Duration,
        Attribute::VideoBitrate => ContentKey::VideoBitrate,
        Attribute::VideoFps => ContentKey::VideoFps,
        Attribute::VideoWidth => ContentKey::VideoWidth,
        Attribute::VideoHeight => ContentKey::VideoHeight,
        Attribute::VideoCodec => ContentKey::VideoCodec,
        Attribute::AudioBitrate => ContentKey::AudioBitrate,
        Attribute::AudioChannels => ContentKey::AudioChannels,
        Attribute::AudioSampleRate => ContentKey::AudioSampleRate,
        Attribute::AudioBitDepth => ContentKey::AudioBitDepth,
        Attribute::AudioCodec => ContentKey::AudioCodec,
        Attribute::Rotation => ContentKey::Rotation,
        Attribute::Longitude => ContentKey::Longitude,
        Attribute::Latitude => ContentKey::Latitude,
        Attribute::Altitude => ContentKey::Altitude,
        Attribute::HasVideo
        | Attribute::HasAudio
        | Attribute::Artist
        | Attribute::Title
        | Attribute::Album
        | Attribute::AlbumArtist
        | Attribute::Genre
        | Attribute::Author
        | Attribute::Copyright
        | Attribute::Date
        | Attribute::Description
        | Attribute::Comment
        | Attribute::TrackNumber
        | Attribute::Classification
        | Attribute::Rating
        | Attribute::Conductor
        | Attribute::UnsyncLyrics
        | Attribute::SyncLyricsCount
        | Attribute::RecordingDate => unreachable!("{attribute} is not a content attribute"),
    }
}

fn tag_key(attribute: Attribute) -> TagKey {
    match attribute {
        Attribute::Artist => TagKey::Artist,
        Attribute::Title => TagKey::Title,
        Attribute::Album => TagKey::Album,
        Attribute::AlbumArtist => TagKey::AlbumArtist,
        Attribute::Genre => TagKey::Genre,
        Attribute::Author => TagKey::Author,
        Attribute::Copyright => TagKey::Copyright,
        Attribute::Date => TagKey::Date,
        Attribute::Description => TagKey::Description,
        Attribute::Comment => TagKey::Comment,
        Attribute::TrackNumber => TagKey::TrackNumber,
        Attribute::Classification => TagKey::Classification,
        Attribute::Rating => TagKey::Rating,
        Attribute::Conductor => TagKey::Conductor,
        Attribute::UnsyncLyrics => TagKey::UnsyncLyrics,
        Attribute::RecordingDate => TagKey::RecordingDate,
        Attribute::Duration
        | Attribute::VideoBitrate
        | Attribute::VideoFps
        | Attribute::VideoWidth
        | Attribute::VideoHeight
        | Attribute::HasVideo
        | Attribute::VideoCodec
        | Attribute::AudioBitrate
        | Attribute::AudioChannels
        | Attribute::AudioSampleRate
        | Attribute::AudioBitDepth
        | Attribute::HasAudio
        | Attribute::AudioCodec
        | Attribute::Rotation
        | Attribute::Longitude
        | Attribute::Latitude
        | Attribute::Altitude
        | Attribute::SyncLyricsCount => unreachable!("{attribute} is not a tag attribute"),
    }
}
