//! The tag-attributes handle, built on lofty with an id3 sidecar.
//!
//! lofty gives uniform access to descriptive tag fields across formats
//! (ID3v2, Vorbis comments, MP4 ilst, APE, ...), but its generic tag does
//! not surface SYLT synchronized-lyrics frames. Those are read with the
//! `id3` crate directly; sources without an ID3v2 tag simply report zero
//! pairs.
//!
//! Everything is read once at open; keyed reads never touch the file again.

use std::{io::Cursor, time::Duration};

use id3::frame::{Content, TimestampFormat};
use lofty::{
    error::LoftyError,
    file::TaggedFileExt,
    picture::PictureType,
    probe::Probe,
    tag::{Accessor, ItemKey, Tag},
};

use crate::{
    backend::{AttrValue, BackendError, TagAttributes, TagKey},
    metadata::{Artwork, SyncLyrics},
    source::Source,
};

impl From<LoftyError> for BackendError {
    fn from(error: LoftyError) -> Self {
        BackendError::Parse(error.to_string())
    }
}

/// Tag fields of one source, read at open time.
pub(crate) struct TagHandle {
    tag: Option<Tag>,
    sync_lyrics: Vec<SyncLyrics>,
}

impl TagHandle {
    /// Parse the tags of `source`.
    ///
    /// A source with no tag at all still yields a handle; every keyed read
    /// then reports the field absent.
    pub(crate) fn open(source: &Source<'_>) -> Result<Self, BackendError> {
        let tagged_file = match source {
            Source::Path(path) => {
                if let Err(error) = std::fs::metadata(path) {
                    return Err(match error.kind() {
                        std::io::ErrorKind::PermissionDenied => BackendError::AccessDenied,
                        _ => BackendError::SourceNotFound,
                    });
                }
                Probe::open(path)?.read()?
            }
            Source::Buffer(buffer) => Probe::new(Cursor::new(*buffer))
                .guess_file_type()
                .map_err(|error| BackendError::Parse(error.to_string()))?
                .read()?,
        };

        let tag = tagged_file
            .primary_tag()
            .or_else(|| tagged_file.first_tag())
            .cloned();

        // SYLT frames come from the id3 crate; a missing or non-ID3v2 tag is
        // not an error, just no synchronized lyrics.
        let id3_tag = match source {
            Source::Path(path) => id3::Tag::read_from_path(path).ok(),
            Source::Buffer(buffer) => id3::Tag::read_from2(Cursor::new(*buffer)).ok(),
        };
        let sync_lyrics = id3_tag
            .as_ref()
            .map(collect_sync_lyrics)
            .unwrap_or_default();

        log::debug!(
            "Tag attributes ready: tag={}, sync_lyrics_pairs={}",
            tag.as_ref()
                .map(|t| format!("{:?}", t.tag_type()))
                .unwrap_or_else(|| "none".to_string()),
            sync_lyrics.len(),
        );

        Ok(TagHandle { tag, sync_lyrics })
    }

    fn text(&self, key: &ItemKey) -> Option<String> {
        self.tag
            .as_ref()
            .and_then(|tag| tag.get_string(key))
            .map(str::to_string)
    }
}

/// Flatten every millisecond-timestamped SYLT frame into one ordered list.
fn collect_sync_lyrics(tag: &id3::Tag) -> Vec<SyncLyrics> {
    let mut pairs = Vec::new();
    for frame in tag.frames() {
        let Content::SynchronisedLyrics(lyrics) = frame.content() else {
            continue;
        };
        // MPEG-frame-counted offsets cannot be resolved without decoding;
        // only millisecond timestamps are reported.
        if lyrics.timestamp_format != TimestampFormat::Ms {
            continue;
        }
        for (timestamp_ms, line) in &lyrics.content {
            pairs.push(SyncLyrics {
                timestamp: Duration::from_millis(u64::from(*timestamp_ms)),
                text: if line.is_empty() {
                    None
                } else {
                    Some(line.clone())
                },
            });
        }
    }
    pairs.sort_by_key(|pair| pair.timestamp);
    pairs
}

impl TagAttributes for TagHandle {
    fn get(&self, key: TagKey) -> Result<Option<AttrValue>, BackendError> {
        let tag = self.tag.as_ref();
        let value = match key {
            TagKey::Artist => tag.and_then(|t| t.artist()).map(|v| v.into_owned()),
            TagKey::Title => tag.and_then(|t| t.title()).map(|v| v.into_owned()),
            TagKey::Album => tag.and_then(|t| t.album()).map(|v| v.into_owned()),
            TagKey::Genre => tag.and_then(|t| t.genre()).map(|v| v.into_owned()),
            TagKey::Comment => tag.and_then(|t| t.comment()).map(|v| v.into_owned()),
            TagKey::AlbumArtist => self.text(&ItemKey::AlbumArtist),
            TagKey::Author => self.text(&ItemKey::Composer),
            TagKey::Copyright => self.text(&ItemKey::CopyrightMessage),
            TagKey::Date => self
                .tag
                .as_ref()
                .and_then(|t| t.year())
                .map(|year| year.to_string())
                .or_else(|| self.text(&ItemKey::RecordingDate)),
            TagKey::RecordingDate => self.text(&ItemKey::RecordingDate),
            TagKey::Description => self.text(&ItemKey::Description),
            TagKey::Conductor => self.text(&ItemKey::Conductor),
            TagKey::UnsyncLyrics => self.text(&ItemKey::Lyrics),
            TagKey::Rating => self.text(&ItemKey::ParentalAdvisory),
            TagKey::TrackNumber => self.text(&ItemKey::TrackNumber).or_else(|| {
                self.tag
                    .as_ref()
                    .and_then(|t| t.track())
                    .map(|n| n.to_string())
            }),
            // No uniform tag-level representation across formats.
            TagKey::Classification => None,
        };
        Ok(value.map(AttrValue::Text))
    }

    fn artwork(&self) -> Result<Option<Artwork>, BackendError> {
        let Some(tag) = self.tag.as_ref() else {
            return Ok(None);
        };
        let picture = tag
            .pictures()
            .iter()
            .find(|picture| picture.pic_type() == PictureType::CoverFront)
            .or_else(|| tag.pictures().first());
        Ok(picture.map(|picture| Artwork {
            data: picture.data().to_vec(),
            mime_type: picture.mime_type().map(|mime| mime.as_str().to_string()),
        }))
    }

    fn sync_lyrics_len(&self) -> Result<usize, BackendError> {
        Ok(self.sync_lyrics.len())
    }

    fn sync_lyric(&self, index: usize) -> Result<Option<SyncLyrics>, BackendError> {
        Ok(self.sync_lyrics.get(index).cloned())
    }
}
