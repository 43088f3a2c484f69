//! # metagrab
//!
//! A lazy media metadata extractor built on FFmpeg and lofty.
//!
//! `metagrab` reads descriptive and technical metadata from audio and video
//! files (or in-memory buffers): tag fields like artist, album, and lyrics;
//! stream fields like duration, codec names, and frame geometry; embedded
//! artwork and thumbnails; and individual decoded video frames at arbitrary
//! timestamps.
//!
//! ## Quick start
//!
//! ```no_run
//! use metagrab::{Attribute, MetadataExtractor};
//!
//! fn main() -> Result<(), metagrab::ExtractError> {
//!     let mut extractor = MetadataExtractor::new();
//!     extractor.set_path("video.mp4")?;
//!
//!     // Every attribute reads as formatted text; absent fields are None.
//!     let duration_ms = extractor.metadata(Attribute::Duration)?;
//!     let codec = extractor.metadata(Attribute::VideoCodec)?;
//!     println!("duration: {duration_ms:?} ms, codec: {codec:?}");
//!
//!     // Binary payloads have dedicated accessors.
//!     if let Some(artwork) = extractor.artwork()? {
//!         std::fs::write("cover.jpg", &artwork.data).ok();
//!     }
//!     Ok(())
//! }
//! ```
//!
//! Grabbing a frame from a video:
//!
//! ```no_run
//! use std::time::Duration;
//! use metagrab::MetadataExtractor;
//!
//! # fn main() -> Result<(), metagrab::ExtractError> {
//! let mut extractor = MetadataExtractor::new();
//! extractor.set_path("video.mp4")?;
//!
//! let frame = extractor.frame_at(Duration::from_secs(30), true)?;
//! frame.to_image()?.save("frame.png").ok();
//! # Ok(())
//! # }
//! ```
//!
//! ## Design
//!
//! - **Lazy, cached parsing.** Setting a source parses nothing. The first
//!   attribute read builds the handle for its class (stream counts, content
//!   attributes, or tag attributes); later reads of the same class reuse it.
//! - **Absent is not an error.** A source without an `Artist` tag answers
//!   `Ok(None)`; errors mean an operation actually failed.
//! - **Pluggable parsing.** All parsing goes through the [`MediaBackend`]
//!   trait. [`FfmpegBackend`] is the default; tests substitute scripted
//!   backends.
//!
//! ## Requirements
//!
//! The default backend links against the system FFmpeg libraries (via
//! `ffmpeg-next`). FFmpeg 6.x or newer is recommended.

pub mod attribute;
pub mod backend;
mod content;
mod conversion;
pub mod error;
mod extractor;
mod ffmpeg;
pub mod metadata;
pub mod source;
mod tags;

pub use attribute::{ALL_ATTRIBUTES, Attribute, AttributeClass, ValueKind};
pub use backend::{
    AttrValue, BackendError, ContentAttributes, ContentKey, MediaBackend, TagAttributes, TagKey,
};
pub use content::FfmpegBackend;
pub use error::ExtractError;
pub use extractor::MetadataExtractor;
pub use ffmpeg::{FfmpegLogLevel, get_ffmpeg_log_level, set_ffmpeg_log_level};
pub use metadata::{Artwork, StreamInfo, SyncLyrics, VideoFrame};
pub use source::Source;
