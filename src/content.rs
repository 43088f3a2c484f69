//! The default media-parsing backend.
//!
//! [`FfmpegBackend`] implements [`MediaBackend`] on top of FFmpeg (via
//! `ffmpeg-next`) for everything stream- and codec-level: the track probe,
//! the content-attributes handle, the embedded attached-picture thumbnail,
//! and the seek-and-decode frame grab. Tag attributes are delegated to the
//! lofty/id3 handle in [`crate::tags`], since FFmpeg exposes neither SYLT
//! synchronized lyrics nor uniform tag-frame access across formats.
//!
//! FFmpeg has no safe in-memory demuxer entry point, so buffer sources are
//! spilled to a temporary file that lives as long as the demuxer needs it.

use std::{io::Write, time::Duration};

use ffmpeg_next::{
    Error as FfmpegError,
    codec::context::Context as CodecContext,
    format::{Pixel, context::Input, stream::Disposition},
    frame::Video as RawVideoFrame,
    media::Type,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};
use tempfile::NamedTempFile;

use crate::{
    backend::{AttrValue, BackendError, ContentAttributes, ContentKey, MediaBackend, TagAttributes},
    conversion,
    metadata::{StreamInfo, VideoFrame},
    source::Source,
    tags::TagHandle,
};

impl From<FfmpegError> for BackendError {
    fn from(error: FfmpegError) -> Self {
        BackendError::Parse(error.to_string())
    }
}

/// The default [`MediaBackend`]: FFmpeg for content attributes and frame
/// decoding, lofty/id3 for tag attributes.
#[derive(Debug, Default, Clone, Copy)]
pub struct FfmpegBackend;

impl FfmpegBackend {
    /// Create the default backend.
    pub fn new() -> Self {
        FfmpegBackend
    }
}

/// Open the FFmpeg demuxer for `source`.
///
/// Returns the spilled temporary file alongside the input so it outlives the
/// demuxer when the source is a buffer.
fn open_input(source: &Source<'_>) -> Result<(Input, Option<NamedTempFile>), BackendError> {
    ffmpeg_next::init().map_err(|error| {
        BackendError::Parse(format!("FFmpeg initialisation failed: {error}"))
    })?;

    match source {
        Source::Path(path) => {
            if let Err(error) = std::fs::metadata(path) {
                return Err(match error.kind() {
                    std::io::ErrorKind::PermissionDenied => BackendError::AccessDenied,
                    _ => BackendError::SourceNotFound,
                });
            }
            let input = ffmpeg_next::format::input(path)?;
            Ok((input, None))
        }
        Source::Buffer(buffer) => {
            let spilled = spill_buffer(buffer)?;
            let input = ffmpeg_next::format::input(&spilled.path())?;
            Ok((input, Some(spilled)))
        }
    }
}

/// Write an in-memory buffer to a temporary file FFmpeg can open.
fn spill_buffer(buffer: &[u8]) -> Result<NamedTempFile, BackendError> {
    let mut spilled = NamedTempFile::new()
        .map_err(|error| BackendError::Parse(format!("failed to create spill file: {error}")))?;
    spilled
        .write_all(buffer)
        .map_err(|error| BackendError::Parse(format!("failed to spill buffer: {error}")))?;
    Ok(spilled)
}

/// True for real video streams, excluding attached-picture (cover art)
/// streams, which FFmpeg also reports as video.
fn is_video_stream(stream: &ffmpeg_next::format::stream::Stream<'_>) -> bool {
    stream.parameters().medium() == Type::Video
        && !stream.disposition().contains(Disposition::ATTACHED_PIC)
}

/// Count audio and video tracks in an opened input.
fn count_tracks(input: &Input) -> StreamInfo {
    let mut info = StreamInfo::default();
    for stream in input.streams() {
        if is_video_stream(&stream) {
            info.video_tracks += 1;
        } else if stream.parameters().medium() == Type::Audio {
            info.audio_tracks += 1;
        }
    }
    info
}

/// Cached best-video-stream fields.
#[derive(Debug, Clone)]
struct VideoStreamAttrs {
    bitrate: i64,
    fps: i64,
    width: i64,
    height: i64,
    codec: String,
    rotation: Option<i64>,
}

/// Parsed container-level GPS location.
#[derive(Debug, Clone, Copy, PartialEq)]
struct GpsCoordinates {
    latitude: f64,
    longitude: f64,
    altitude: Option<f64>,
}

/// Cached best-audio-stream fields.
#[derive(Debug, Clone)]
struct AudioStreamAttrs {
    bitrate: i64,
    channels: i64,
    sample_rate: i64,
    bit_depth: i64,
    codec: String,
}

/// The FFmpeg-backed content-attributes handle.
///
/// All fields are read once when the handle is created; the demuxer is
/// closed before the handle is returned, so keyed reads never touch the
/// file again.
pub struct FfmpegContent {
    stream_info: StreamInfo,
    duration_ms: i64,
    video: Option<VideoStreamAttrs>,
    audio: Option<AudioStreamAttrs>,
    thumbnail: Option<Vec<u8>>,
    location: Option<GpsCoordinates>,
}

impl FfmpegContent {
    fn open(source: &Source<'_>) -> Result<Self, BackendError> {
        let (input, _spill_guard) = open_input(source)?;

        let stream_info = count_tracks(&input);

        let duration_microseconds = input.duration();
        let duration_ms = if duration_microseconds > 0 {
            duration_microseconds / 1_000
        } else {
            0
        };

        // Best video stream, skipping attached pictures.
        let mut video = None;
        for stream in input.streams() {
            if !is_video_stream(&stream) {
                continue;
            }

            let decoder_context = CodecContext::from_parameters(stream.parameters())?;
            let video_decoder = decoder_context.decoder().video()?;

            let frame_rate = stream.avg_frame_rate();
            let frames_per_second = if frame_rate.denominator() != 0 {
                frame_rate.numerator() as f64 / frame_rate.denominator() as f64
            } else {
                let rate = stream.rate();
                if rate.denominator() != 0 {
                    rate.numerator() as f64 / rate.denominator() as f64
                } else {
                    0.0
                }
            };

            let codec = video_decoder
                .codec()
                .map(|codec| codec.name().to_string())
                .unwrap_or_else(|| "unknown".to_string());

            video = Some(VideoStreamAttrs {
                bitrate: video_decoder.bit_rate() as i64,
                fps: frames_per_second.round() as i64,
                width: i64::from(video_decoder.width()),
                height: i64::from(video_decoder.height()),
                codec,
                rotation: stream_rotation(&stream),
            });
            break;
        }

        // Best audio stream.
        let mut audio = None;
        if let Some(stream) = input.streams().best(Type::Audio) {
            let codec_parameters = stream.parameters();
            let bit_depth = {
                let raw_parameters = unsafe { *codec_parameters.as_ptr() };
                if raw_parameters.bits_per_raw_sample > 0 {
                    i64::from(raw_parameters.bits_per_raw_sample)
                } else {
                    i64::from(raw_parameters.bits_per_coded_sample)
                }
            };

            let decoder_context = CodecContext::from_parameters(codec_parameters)?;
            let audio_decoder = decoder_context.decoder().audio()?;

            let codec = audio_decoder
                .codec()
                .map(|codec| codec.name().to_string())
                .unwrap_or_else(|| "unknown".to_string());

            audio = Some(AudioStreamAttrs {
                bitrate: audio_decoder.bit_rate() as i64,
                channels: i64::from(audio_decoder.channels()),
                sample_rate: i64::from(audio_decoder.rate()),
                bit_depth,
                codec,
            });
        }

        let thumbnail = read_attached_picture(&input);
        let location = container_location(&input);

        log::debug!(
            "Content attributes ready: duration={}ms, audio_tracks={}, video_tracks={}, thumbnail={}",
            duration_ms,
            stream_info.audio_tracks,
            stream_info.video_tracks,
            thumbnail.as_ref().map(Vec::len).unwrap_or(0),
        );

        Ok(FfmpegContent {
            stream_info,
            duration_ms,
            video,
            audio,
            thumbnail,
            location,
        })
    }
}

/// The stream's rotation hint in degrees clockwise.
///
/// Modern containers carry a display matrix in the codec parameters' side
/// data; older ones a `rotate` metadata tag. ffmpeg-next wraps neither, so
/// the matrix is read through the sys crate.
fn stream_rotation(stream: &ffmpeg_next::format::stream::Stream<'_>) -> Option<i64> {
    let from_matrix = unsafe {
        let parameters = *stream.parameters().as_ptr();
        let side_data = ffmpeg_sys_next::av_packet_side_data_get(
            parameters.coded_side_data,
            parameters.nb_coded_side_data,
            ffmpeg_sys_next::AVPacketSideDataType::AV_PKT_DATA_DISPLAYMATRIX,
        );
        if side_data.is_null() || (*side_data).size < 36 {
            None
        } else {
            // av_display_rotation_get reports counter-clockwise degrees;
            // the attribute is clockwise.
            let theta =
                ffmpeg_sys_next::av_display_rotation_get((*side_data).data as *const i32);
            theta
                .is_finite()
                .then(|| ((-theta).round() as i64).rem_euclid(360))
        }
    };
    from_matrix.or_else(|| {
        stream
            .metadata()
            .get("rotate")
            .and_then(|value| value.parse::<i64>().ok())
            .map(|degrees| degrees.rem_euclid(360))
    })
}

/// The container-level GPS location, when the muxer recorded one.
fn container_location(input: &Input) -> Option<GpsCoordinates> {
    let metadata = input.metadata();
    let raw = metadata
        .get("location")
        .or_else(|| metadata.get("com.apple.quicktime.location.ISO6709"))?;
    parse_iso6709(raw)
}

/// Parse an ISO 6709 point string (`+DD.DDDD+DDD.DDDD[+AAA.A]/`).
fn parse_iso6709(value: &str) -> Option<GpsCoordinates> {
    let point = value
        .trim_end_matches('/')
        .split_once("CRS")
        .map_or(value.trim_end_matches('/'), |(point, _)| point);
    if !point.starts_with(['+', '-']) {
        return None;
    }

    let mut fields: Vec<&str> = Vec::new();
    let mut start = 0;
    for (index, character) in point.char_indices().skip(1) {
        if character == '+' || character == '-' {
            fields.push(&point[start..index]);
            start = index;
        }
    }
    fields.push(&point[start..]);

    if fields.len() < 2 {
        return None;
    }
    Some(GpsCoordinates {
        latitude: fields[0].parse().ok()?,
        longitude: fields[1].parse().ok()?,
        altitude: fields.get(2).and_then(|field| field.parse().ok()),
    })
}

/// Read the attached-picture packet of the first stream that carries one.
fn read_attached_picture(input: &Input) -> Option<Vec<u8>> {
    for stream in input.streams() {
        if !stream.disposition().contains(Disposition::ATTACHED_PIC) {
            continue;
        }

        // The attached picture lives in the stream's own packet, not in the
        // demuxed packet sequence; ffmpeg-next does not wrap it.
        let picture = unsafe {
            let raw_stream: *const ffmpeg_sys_next::AVStream = stream.as_ptr();
            let packet = (*raw_stream).attached_pic;
            if packet.data.is_null() || packet.size <= 0 {
                None
            } else {
                Some(std::slice::from_raw_parts(packet.data, packet.size as usize).to_vec())
            }
        };

        if picture.is_some() {
            return picture;
        }
    }
    None
}

impl ContentAttributes for FfmpegContent {
    fn stream_info(&self) -> StreamInfo {
        self.stream_info
    }

    fn get(&self, key: ContentKey) -> Result<Option<AttrValue>, BackendError> {
        let value = match key {
            ContentKey::Duration => Some(AttrValue::Int(self.duration_ms)),
            ContentKey::VideoBitrate => self.video.as_ref().map(|v| AttrValue::Int(v.bitrate)),
            ContentKey::VideoFps => self.video.as_ref().map(|v| AttrValue::Int(v.fps)),
            ContentKey::VideoWidth => self.video.as_ref().map(|v| AttrValue::Int(v.width)),
            ContentKey::VideoHeight => self.video.as_ref().map(|v| AttrValue::Int(v.height)),
            ContentKey::VideoCodec => self
                .video
                .as_ref()
                .map(|v| AttrValue::Text(v.codec.clone())),
            ContentKey::AudioBitrate => self.audio.as_ref().map(|a| AttrValue::Int(a.bitrate)),
            ContentKey::AudioChannels => self.audio.as_ref().map(|a| AttrValue::Int(a.channels)),
            ContentKey::AudioSampleRate => {
                self.audio.as_ref().map(|a| AttrValue::Int(a.sample_rate))
            }
            ContentKey::AudioBitDepth => self.audio.as_ref().map(|a| AttrValue::Int(a.bit_depth)),
            ContentKey::AudioCodec => self
                .audio
                .as_ref()
                .map(|a| AttrValue::Text(a.codec.clone())),
            ContentKey::Rotation => self
                .video
                .as_ref()
                .and_then(|v| v.rotation)
                .map(AttrValue::Int),
            ContentKey::Longitude => self.location.map(|l| AttrValue::Double(l.longitude)),
            ContentKey::Latitude => self.location.map(|l| AttrValue::Double(l.latitude)),
            ContentKey::Altitude => self
                .location
                .and_then(|l| l.altitude)
                .map(AttrValue::Double),
        };
        Ok(value)
    }

    fn thumbnail(&self) -> Result<Option<Vec<u8>>, BackendError> {
        Ok(self.thumbnail.clone())
    }
}

impl MediaBackend for FfmpegBackend {
    fn probe(&self, source: &Source<'_>) -> Result<StreamInfo, BackendError> {
        let (input, _spill_guard) = open_input(source)?;
        Ok(count_tracks(&input))
    }

    fn open_content(
        &self,
        source: &Source<'_>,
    ) -> Result<Box<dyn ContentAttributes>, BackendError> {
        Ok(Box::new(FfmpegContent::open(source)?))
    }

    fn open_tags(&self, source: &Source<'_>) -> Result<Box<dyn TagAttributes>, BackendError> {
        Ok(Box::new(TagHandle::open(source)?))
    }

    fn decode_frame(
        &self,
        source: &Source<'_>,
        timestamp: Duration,
        accurate: bool,
    ) -> Result<VideoFrame, BackendError> {
        log::debug!("Decoding frame at {timestamp:?} (accurate={accurate})");

        let (mut input, _spill_guard) = open_input(source)?;

        let (video_stream_index, time_base, codec_parameters) = {
            let stream = input
                .streams()
                .best(Type::Video)
                .filter(is_video_stream)
                .ok_or_else(|| BackendError::Parse("no video stream found".to_string()))?;
            (stream.index(), stream.time_base(), stream.parameters())
        };

        let decoder_context = CodecContext::from_parameters(codec_parameters)?;
        let mut decoder = decoder_context.decoder().video()?;

        let target_width = decoder.width();
        let target_height = decoder.height();
        if target_width == 0 || target_height == 0 {
            return Err(BackendError::Parse(
                "video stream reports zero dimensions".to_string(),
            ));
        }

        let mut scaler = ScalingContext::get(
            decoder.format(),
            decoder.width(),
            decoder.height(),
            Pixel::RGB24,
            target_width,
            target_height,
            ScalingFlags::BILINEAR,
        )?;

        // Seek to the nearest keyframe at or before the target.
        let seek_timestamp = conversion::duration_to_seek_timestamp(timestamp);
        input.seek(seek_timestamp, ..seek_timestamp)?;

        let target_pts = conversion::duration_to_stream_timestamp(timestamp, time_base);

        let mut decoded_frame = RawVideoFrame::empty();
        let mut nearest: Option<VideoFrame> = None;

        let emit = |decoded: &RawVideoFrame,
                        scaler: &mut ScalingContext|
         -> Result<VideoFrame, BackendError> {
            let mut rgb = RawVideoFrame::empty();
            scaler.run(decoded, &mut rgb)?;
            let data = conversion::frame_to_buffer(&rgb, target_width, target_height, 3);
            if data.is_empty() {
                return Err(BackendError::Parse("decoded frame was empty".to_string()));
            }
            Ok(VideoFrame {
                data,
                width: target_width,
                height: target_height,
            })
        };

        for (stream, packet) in input.packets() {
            if stream.index() != video_stream_index {
                continue;
            }

            decoder.send_packet(&packet)?;

            while decoder.receive_frame(&mut decoded_frame).is_ok() {
                if !accurate {
                    // Nearest-keyframe mode: the first decoded frame after
                    // the seek is the answer.
                    return emit(&decoded_frame, &mut scaler);
                }

                let pts = decoded_frame.pts().unwrap_or(0);
                if pts >= target_pts {
                    return emit(&decoded_frame, &mut scaler);
                }
                nearest = Some(emit(&decoded_frame, &mut scaler)?);
            }
        }

        // Flush the decoder.
        decoder.send_eof()?;
        while decoder.receive_frame(&mut decoded_frame).is_ok() {
            if !accurate {
                return emit(&decoded_frame, &mut scaler);
            }

            let pts = decoded_frame.pts().unwrap_or(0);
            if pts >= target_pts {
                return emit(&decoded_frame, &mut scaler);
            }
            nearest = Some(emit(&decoded_frame, &mut scaler)?);
        }

        // Timestamp past the last frame: hand back the closest one decoded.
        nearest.ok_or_else(|| {
            BackendError::Parse(format!("no frame decodable at {timestamp:?}"))
        })
    }
}
