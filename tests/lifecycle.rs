//! Context lifecycle: source assignment, replacement, and lazy handle reuse.

mod common;

use common::{MockBackend, MockScript, scratch_media_file};
use metagrab::{Attribute, ExtractError, MetadataExtractor, StreamInfo};

#[test]
fn reads_without_a_source_are_invalid() {
    let (backend, _counters) = MockBackend::new(MockScript::default());
    let mut extractor = MetadataExtractor::with_backend(Box::new(backend));

    assert!(matches!(
        extractor.metadata(Attribute::Title),
        Err(ExtractError::InvalidParameter(_))
    ));
    assert!(matches!(
        extractor.artwork(),
        Err(ExtractError::InvalidParameter(_))
    ));
    assert!(matches!(
        extractor.frame(),
        Err(ExtractError::InvalidParameter(_))
    ));
    assert!(matches!(
        extractor.frame_at(std::time::Duration::ZERO, false),
        Err(ExtractError::InvalidParameter(_))
    ));
    assert!(matches!(
        extractor.sync_lyrics(0),
        Err(ExtractError::InvalidParameter(_))
    ));
}

#[test]
fn set_path_rejects_missing_files_and_keeps_the_old_source() {
    let script = MockScript {
        stream_info: StreamInfo {
            audio_tracks: 1,
            video_tracks: 0,
        },
        ..MockScript::default()
    };
    let (backend, counters) = MockBackend::new(script);
    let mut extractor = MetadataExtractor::with_backend(Box::new(backend));

    let file = scratch_media_file();
    extractor.set_path(file.path()).expect("set_path failed");
    assert_eq!(
        extractor.metadata(Attribute::HasAudio).expect("read failed"),
        Some("1".to_string())
    );
    assert_eq!(counters.probes(), 1);

    // A failed assignment must not disturb the current source or its cache.
    assert!(matches!(
        extractor.set_path("no/such/file.mp4"),
        Err(ExtractError::FileNotFound { .. })
    ));
    assert_eq!(
        extractor.metadata(Attribute::HasAudio).expect("read failed"),
        Some("1".to_string())
    );
    assert_eq!(counters.probes(), 1, "cached counts should be reused");
}

#[test]
fn empty_path_and_empty_buffer_are_invalid() {
    let (backend, _counters) = MockBackend::new(MockScript::default());
    let mut extractor = MetadataExtractor::with_backend(Box::new(backend));

    assert!(matches!(
        extractor.set_path(""),
        Err(ExtractError::InvalidParameter(_))
    ));
    assert!(matches!(
        extractor.set_buffer(&[]),
        Err(ExtractError::InvalidParameter(_))
    ));
}

#[test]
fn tag_handle_is_built_once_per_source() {
    let (backend, counters) = MockBackend::new(MockScript::default());
    let mut extractor = MetadataExtractor::with_backend(Box::new(backend));
    let file = scratch_media_file();
    extractor.set_path(file.path()).expect("set_path failed");

    extractor.metadata(Attribute::Artist).expect("read failed");
    extractor.metadata(Attribute::Album).expect("read failed");
    extractor.metadata(Attribute::Genre).expect("read failed");
    assert_eq!(counters.tag_opens(), 1);
}

#[test]
fn replacing_the_source_rebuilds_the_handles() {
    let (backend, counters) = MockBackend::new(MockScript::default());
    let mut extractor = MetadataExtractor::with_backend(Box::new(backend));
    let file = scratch_media_file();

    extractor.set_path(file.path()).expect("set_path failed");
    extractor.metadata(Attribute::Artist).expect("read failed");
    assert_eq!(counters.tag_opens(), 1);

    let buffer = b"second source".to_vec();
    extractor.set_buffer(&buffer).expect("set_buffer failed");
    extractor.metadata(Attribute::Artist).expect("read failed");
    assert_eq!(counters.tag_opens(), 2, "new source, new tag handle");
}

#[test]
fn buffer_sources_answer_track_counts_through_the_content_handle() {
    let script = MockScript {
        stream_info: StreamInfo {
            audio_tracks: 2,
            video_tracks: 1,
        },
        ..MockScript::default()
    };
    let (backend, counters) = MockBackend::new(script);
    let mut extractor = MetadataExtractor::with_backend(Box::new(backend));

    let buffer = b"in-memory media".to_vec();
    extractor.set_buffer(&buffer).expect("set_buffer failed");

    assert_eq!(
        extractor.metadata(Attribute::HasVideo).expect("read failed"),
        Some("1".to_string())
    );
    assert_eq!(
        extractor.metadata(Attribute::HasAudio).expect("read failed"),
        Some("2".to_string())
    );
    assert_eq!(counters.probes(), 0, "buffers are not probed separately");
    assert_eq!(counters.content_opens(), 1);
}
