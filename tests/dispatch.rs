//! Attribute dispatch: formatting, absence, and track-count gating.

mod common;

use common::{MockBackend, MockScript, scratch_media_file};
use metagrab::{
    ALL_ATTRIBUTES, Attribute, AttrValue, ContentKey, MetadataExtractor, StreamInfo, TagKey,
};

fn extractor_with(
    script: MockScript,
) -> (
    MetadataExtractor<'static>,
    std::sync::Arc<common::Counters>,
    tempfile::NamedTempFile,
) {
    let (backend, counters) = MockBackend::new(script);
    let mut extractor = MetadataExtractor::with_backend(Box::new(backend));
    let file = scratch_media_file();
    extractor.set_path(file.path()).expect("set_path failed");
    (extractor, counters, file)
}

#[test]
fn every_attribute_of_a_bare_source_reads_cleanly() {
    let script = MockScript {
        stream_info: StreamInfo {
            audio_tracks: 1,
            video_tracks: 1,
        },
        ..MockScript::default()
    };
    let (mut extractor, _counters, _file) = extractor_with(script);

    for attribute in ALL_ATTRIBUTES {
        let value = extractor.metadata(attribute).expect("read failed");
        match attribute {
            Attribute::HasAudio | Attribute::HasVideo => {
                assert_eq!(value, Some("1".to_string()), "{attribute}");
            }
            Attribute::SyncLyricsCount => {
                assert_eq!(value, Some("0".to_string()), "{attribute}");
            }
            _ => assert_eq!(value, None, "{attribute} should be absent"),
        }
    }
}

#[test]
fn integers_format_in_base_ten() {
    let mut script = MockScript {
        stream_info: StreamInfo {
            audio_tracks: 1,
            video_tracks: 0,
        },
        ..MockScript::default()
    };
    script
        .content
        .insert(ContentKey::Duration, AttrValue::Int(432_000));
    script
        .content
        .insert(ContentKey::AudioSampleRate, AttrValue::Int(44_100));
    let (mut extractor, _counters, _file) = extractor_with(script);

    assert_eq!(
        extractor.metadata(Attribute::Duration).expect("read failed"),
        Some("432000".to_string())
    );
    assert_eq!(
        extractor
            .metadata(Attribute::AudioSampleRate)
            .expect("read failed"),
        Some("44100".to_string())
    );
}

#[test]
fn doubles_format_with_six_decimals() {
    let mut script = MockScript {
        stream_info: StreamInfo {
            audio_tracks: 1,
            video_tracks: 0,
        },
        ..MockScript::default()
    };
    script
        .content
        .insert(ContentKey::Latitude, AttrValue::Double(52.5));
    script
        .content
        .insert(ContentKey::Longitude, AttrValue::Double(-13.405));
    let (mut extractor, _counters, _file) = extractor_with(script);

    assert_eq!(
        extractor.metadata(Attribute::Latitude).expect("read failed"),
        Some("52.500000".to_string())
    );
    assert_eq!(
        extractor
            .metadata(Attribute::Longitude)
            .expect("read failed"),
        Some("-13.405000".to_string())
    );
}

#[test]
fn empty_text_collapses_to_absent() {
    let mut script = MockScript {
        stream_info: StreamInfo {
            audio_tracks: 1,
            video_tracks: 0,
        },
        ..MockScript::default()
    };
    script
        .tags
        .insert(TagKey::Artist, AttrValue::Text(String::new()));
    script
        .tags
        .insert(TagKey::Title, AttrValue::Text("Song".to_string()));
    let (mut extractor, _counters, _file) = extractor_with(script);

    assert_eq!(
        extractor.metadata(Attribute::Artist).expect("read failed"),
        None
    );
    assert_eq!(
        extractor.metadata(Attribute::Title).expect("read failed"),
        Some("Song".to_string())
    );
}

#[test]
fn rotation_and_location_are_served_by_the_content_handle() {
    let mut script = MockScript {
        stream_info: StreamInfo {
            audio_tracks: 0,
            video_tracks: 1,
        },
        ..MockScript::default()
    };
    script
        .content
        .insert(ContentKey::Rotation, AttrValue::Int(90));
    script
        .content
        .insert(ContentKey::Altitude, AttrValue::Double(35.25));
    let (mut extractor, counters, _file) = extractor_with(script);

    assert_eq!(
        extractor.metadata(Attribute::Rotation).expect("read failed"),
        Some("90".to_string())
    );
    assert_eq!(
        extractor.metadata(Attribute::Altitude).expect("read failed"),
        Some("35.250000".to_string())
    );
    assert_eq!(counters.tag_opens(), 0, "no tag parse is involved");
    assert_eq!(counters.content_opens(), 1);
}

#[test]
fn video_attributes_gate_on_the_video_track_count() {
    // The script carries video fields, but with zero video tracks they must
    // never be consulted.
    let mut script = MockScript {
        stream_info: StreamInfo {
            audio_tracks: 1,
            video_tracks: 0,
        },
        ..MockScript::default()
    };
    script
        .content
        .insert(ContentKey::VideoWidth, AttrValue::Int(1920));
    script
        .content
        .insert(ContentKey::VideoCodec, AttrValue::Text("h264".to_string()));
    let (mut extractor, counters, _file) = extractor_with(script);

    assert_eq!(
        extractor
            .metadata(Attribute::VideoWidth)
            .expect("read failed"),
        Some("0".to_string())
    );
    assert_eq!(
        extractor
            .metadata(Attribute::VideoBitrate)
            .expect("read failed"),
        Some("0".to_string())
    );
    assert_eq!(
        extractor
            .metadata(Attribute::VideoCodec)
            .expect("read failed"),
        None
    );
    assert_eq!(
        counters.content_opens(),
        0,
        "gated reads must not open the content handle"
    );
}

#[test]
fn audio_attributes_gate_on_the_audio_track_count() {
    let script = MockScript {
        stream_info: StreamInfo {
            audio_tracks: 0,
            video_tracks: 1,
        },
        ..MockScript::default()
    };
    let (mut extractor, counters, _file) = extractor_with(script);

    assert_eq!(
        extractor
            .metadata(Attribute::AudioChannels)
            .expect("read failed"),
        Some("0".to_string())
    );
    assert_eq!(
        extractor
            .metadata(Attribute::AudioCodec)
            .expect("read failed"),
        None
    );
    assert_eq!(counters.content_opens(), 0);
}

#[test]
fn duration_is_not_track_gated() {
    let mut script = MockScript::default();
    script
        .content
        .insert(ContentKey::Duration, AttrValue::Int(1_000));
    let (mut extractor, counters, _file) = extractor_with(script);

    assert_eq!(
        extractor.metadata(Attribute::Duration).expect("read failed"),
        Some("1000".to_string())
    );
    assert_eq!(counters.content_opens(), 1);
}
