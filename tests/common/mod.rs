//! A scripted backend for contract tests.
//!
//! No media parsing happens here: the mock answers from a fixed script and
//! counts how often each backend operation runs, so tests can pin down the
//! façade's laziness, caching, and dispatch behavior without fixtures.

use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use metagrab::{
    Artwork, AttrValue, BackendError, ContentAttributes, ContentKey, MediaBackend, Source,
    StreamInfo, SyncLyrics, TagAttributes, TagKey, VideoFrame,
};

/// What the mock backend reports for every operation.
///
/// Setting a `fail_*` error makes the matching operation fail on every call,
/// so tests can watch the façade map the error and retry the open later.
#[derive(Default, Clone)]
pub struct MockScript {
    pub stream_info: StreamInfo,
    pub content: HashMap<ContentKey, AttrValue>,
    pub tags: HashMap<TagKey, AttrValue>,
    pub thumbnail: Option<Vec<u8>>,
    pub artwork: Option<Artwork>,
    pub sync_lyrics: Vec<SyncLyrics>,
    pub frame: Option<VideoFrame>,
    pub fail_probe: Option<BackendError>,
    pub fail_content: Option<BackendError>,
    pub fail_tags: Option<BackendError>,
}

/// Operation counters, shared with the test body.
#[derive(Default)]
pub struct Counters {
    pub probes: AtomicUsize,
    pub content_opens: AtomicUsize,
    pub tag_opens: AtomicUsize,
    pub frame_decodes: AtomicUsize,
}

impl Counters {
    pub fn probes(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }

    pub fn content_opens(&self) -> usize {
        self.content_opens.load(Ordering::SeqCst)
    }

    pub fn tag_opens(&self) -> usize {
        self.tag_opens.load(Ordering::SeqCst)
    }

    pub fn frame_decodes(&self) -> usize {
        self.frame_decodes.load(Ordering::SeqCst)
    }
}

pub struct MockBackend {
    script: MockScript,
    counters: Arc<Counters>,
}

impl MockBackend {
    pub fn new(script: MockScript) -> (Self, Arc<Counters>) {
        let counters = Arc::new(Counters::default());
        (
            MockBackend {
                script,
                counters: Arc::clone(&counters),
            },
            counters,
        )
    }
}

struct MockContent(MockScript);

impl ContentAttributes for MockContent {
    fn stream_info(&self) -> StreamInfo {
        self.0.stream_info
    }

    fn get(&self, key: ContentKey) -> Result<Option<AttrValue>, BackendError> {
        Ok(self.0.content.get(&key).cloned())
    }

    fn thumbnail(&self) -> Result<Option<Vec<u8>>, BackendError> {
        Ok(self.0.thumbnail.clone())
    }
}

struct MockTags(MockScript);

impl TagAttributes for MockTags {
    fn get(&self, key: TagKey) -> Result<Option<AttrValue>, BackendError> {
        Ok(self.0.tags.get(&key).cloned())
    }

    fn artwork(&self) -> Result<Option<Artwork>, BackendError> {
        Ok(self.0.artwork.clone())
    }

    fn sync_lyrics_len(&self) -> Result<usize, BackendError> {
        Ok(self.0.sync_lyrics.len())
    }

    fn sync_lyric(&self, index: usize) -> Result<Option<SyncLyrics>, BackendError> {
        Ok(self.0.sync_lyrics.get(index).cloned())
    }
}

impl MediaBackend for MockBackend {
    fn probe(&self, _source: &Source<'_>) -> Result<StreamInfo, BackendError> {
        self.counters.probes.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = &self.script.fail_probe {
            return Err(error.clone());
        }
        Ok(self.script.stream_info)
    }

    fn open_content(
        &self,
        _source: &Source<'_>,
    ) -> Result<Box<dyn ContentAttributes>, BackendError> {
        self.counters.content_opens.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = &self.script.fail_content {
            return Err(error.clone());
        }
        Ok(Box::new(MockContent(self.script.clone())))
    }

    fn open_tags(&self, _source: &Source<'_>) -> Result<Box<dyn TagAttributes>, BackendError> {
        self.counters.tag_opens.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = &self.script.fail_tags {
            return Err(error.clone());
        }
        Ok(Box::new(MockTags(self.script.clone())))
    }

    fn decode_frame(
        &self,
        _source: &Source<'_>,
        _timestamp: Duration,
        _accurate: bool,
    ) -> Result<VideoFrame, BackendError> {
        self.counters.frame_decodes.fetch_add(1, Ordering::SeqCst);
        self.script
            .frame
            .clone()
            .ok_or_else(|| BackendError::Parse("no video stream found".to_string()))
    }
}

/// A real (empty-ish) media file on disk so `set_path` validation passes.
pub fn scratch_media_file() -> tempfile::NamedTempFile {
    use std::io::Write;
    let mut file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(b"not real media, the mock never reads it")
        .expect("Failed to write temp file");
    file
}
