//! The attribute catalog.
//!
//! [`Attribute`] enumerates every metadata field the extractor can read.
//! Each attribute carries two pieces of static dispatch data: the
//! [`AttributeClass`] deciding which extraction phase (and which collaborator
//! handle) serves it, and the [`ValueKind`] fixing the shape of its result.
//! This replaces a per-attribute accessor function for each field with one
//! generic read path.

use std::fmt::{Display, Formatter, Result as FmtResult};

/// A metadata attribute identifier.
///
/// The enumeration is closed: every variant has a fixed result shape
/// ([`ValueKind`]) and a fixed extraction phase ([`AttributeClass`]).
/// [`MetadataExtractor::metadata`](crate::MetadataExtractor::metadata)
/// formats whichever shape the attribute has into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Attribute {
    /// Total duration in milliseconds.
    Duration,
    /// Video bit rate in bits per second.
    VideoBitrate,
    /// Video frames per second (rounded to a whole number).
    VideoFps,
    /// Video frame width in pixels.
    VideoWidth,
    /// Video frame height in pixels.
    VideoHeight,
    /// Number of video tracks (`"0"` means no video).
    HasVideo,
    /// Video codec name.
    VideoCodec,
    /// Audio bit rate in bits per second.
    AudioBitrate,
    /// Number of audio channels.
    AudioChannels,
    /// Audio sample rate in hertz.
    AudioSampleRate,
    /// Audio bits per sample.
    AudioBitDepth,
    /// Number of audio tracks (`"0"` means no audio).
    HasAudio,
    /// Audio codec name.
    AudioCodec,
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
    /// Track number, as written in the tag (may be `"3/12"`).
    TrackNumber,
    /// Content classification.
    Classification,
    /// Parental rating.
    Rating,
    /// GPS longitude in degrees.
    Longitude,
    /// GPS latitude in degrees.
    Latitude,
    /// GPS altitude in meters.
    Altitude,
    /// Conductor.
    Conductor,
    /// Unsynchronized lyrics (the full lyric text).
    UnsyncLyrics,
    /// Number of synchronized-lyrics `(timestamp, line)` pairs.
    SyncLyricsCount,
    /// Recording date.
    RecordingDate,
    /// Orientation / rotation hint.
    Rotation,
}

/// Which extraction phase serves an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeClass {
    /// Track-count fields, answerable from a lightweight stream probe.
    Stream,
    /// Stream/codec-level fields, served by the content-attributes handle.
    Content,
    /// Descriptive tag fields, served by the tag-attributes handle.
    Tag,
}

/// The fixed result shape of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Formatted as base-10 integer text.
    Int,
    /// Formatted as six-decimal fixed-point text.
    Double,
    /// Passed through as-is; empty text collapses to absent.
    Text,
}

impl Attribute {
    /// The extraction phase (and collaborator handle) serving this attribute.
    pub fn class(self) -> AttributeClass {
        use Attribute::*;
        match self {
            HasVideo | HasAudio => AttributeClass::Stream,
            Duration | VideoBitrate | VideoFps | VideoWidth | VideoHeight | VideoCodec
            | AudioBitrate | AudioChannels | AudioSampleRate | AudioBitDepth | AudioCodec
            | Rotation | Longitude | Latitude | Altitude => AttributeClass::Content,
            _ => AttributeClass::Tag,
        }
    }

    /// The shape of this attribute's raw value.
    pub fn kind(self) -> ValueKind {
        use Attribute::*;
        match self {
            Duration | VideoBitrate | VideoFps | VideoWidth | VideoHeight | HasVideo
            | AudioBitrate | AudioChannels | AudioSampleRate | AudioBitDepth | HasAudio
            | SyncLyricsCount | Rotation => ValueKind::Int,
            Longitude | Latitude | Altitude => ValueKind::Double,
            _ => ValueKind::Text,
        }
    }
}

impl Display for Attribute {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let name = match self {
            Attribute::Duration => "duration",
            Attribute::VideoBitrate => "video-bitrate",
            Attribute::VideoFps => "video-fps",
            Attribute::VideoWidth => "video-width",
            Attribute::VideoHeight => "video-height",
            Attribute::HasVideo => "has-video",
            Attribute::VideoCodec => "video-codec",
            Attribute::AudioBitrate => "audio-bitrate",
            Attribute::AudioChannels => "audio-channels",
            Attribute::AudioSampleRate => "audio-samplerate",
            Attribute::AudioBitDepth => "audio-bitdepth",
            Attribute::HasAudio => "has-audio",
            Attribute::AudioCodec => "audio-codec",
            Attribute::Artist => "artist",
            Attribute::Title => "title",
            Attribute::Album => "album",
            Attribute::AlbumArtist => "album-artist",
            Attribute::Genre => "genre",
            Attribute::Author => "author",
            Attribute::Copyright => "copyright",
            Attribute::Date => "date",
            Attribute::Description => "description",
            Attribute::Comment => "comment",
            Attribute::TrackNumber => "track-number",
            Attribute::Classification => "classification",
            Attribute::Rating => "rating",
            Attribute::Longitude => "longitude",
            Attribute::Latitude => "latitude",
            Attribute::Altitude => "altitude",
            Attribute::Conductor => "conductor",
            Attribute::UnsyncLyrics => "unsync-lyrics",
            Attribute::SyncLyricsCount => "sync-lyrics-count",
            Attribute::RecordingDate => "recording-date",
            Attribute::Rotation => "rotation",
        };
        f.write_str(name)
    }
}

/// All attributes, in catalog order. Handy for sweeping reads in callers and
/// tests.
pub const ALL_ATTRIBUTES: [Attribute; 34] = [
    Attribute::Duration,
    Attribute::VideoBitrate,
    Attribute::VideoFps,
    Attribute::VideoWidth,
    Attribute::VideoHeight,
    Attribute::HasVideo,
    Attribute::VideoCodec,
    Attribute::AudioBitrate,
    Attribute::AudioChannels,
    Attribute::AudioSampleRate,
    Attribute::AudioBitDepth,
    Attribute::HasAudio,
    Attribute::AudioCodec,
    Attribute::Artist,
    Attribute::Title,
    Attribute::Album,
    Attribute::AlbumArtist,
    Attribute::Genre,
    Attribute::Author,
    Attribute::Copyright,
    Attribute::Date,
    Attribute::Description,
    Attribute::Comment,
    Attribute::TrackNumber,
    Attribute::Classification,
    Attribute::Rating,
    Attribute::Longitude,
    Attribute::Latitude,
    Attribute::Altitude,
    Attribute::Conductor,
    Attribute::UnsyncLyrics,
    Attribute::SyncLyricsCount,
    Attribute::RecordingDate,
    Attribute::Rotation,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_class_covers_only_track_counts() {
        for attribute in ALL_ATTRIBUTES {
            let is_stream = matches!(attribute, Attribute::HasVideo | Attribute::HasAudio);
            assert_eq!(attribute.class() == AttributeClass::Stream, is_stream);
        }
    }

    #[test]
    fn doubles_are_exactly_the_gps_fields() {
        for attribute in ALL_ATTRIBUTES {
            let is_gps = matches!(
                attribute,
                Attribute::Longitude | Attribute::Latitude | Attribute::Altitude
            );
            assert_eq!(attribute.kind() == ValueKind::Double, is_gps);
        }
    }

    #[test]
    fn rotation_and_gps_are_content_attributes() {
        for attribute in [
            Attribute::Rotation,
            Attribute::Longitude,
            Attribute::Latitude,
            Attribute::Altitude,
        ] {
            assert_eq!(attribute.class(), AttributeClass::Content);
        }
        assert_eq!(Attribute::Rotation.kind(), ValueKind::Int);
    }

    #[test]
    fn sync_lyrics_count_is_a_tag_integer() {
        assert_eq!(Attribute::SyncLyricsCount.class(), AttributeClass::Tag);
        assert_eq!(Attribute::SyncLyricsCount.kind(), ValueKind::Int);
    }
}
