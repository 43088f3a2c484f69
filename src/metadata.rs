//! Caller-owned result types.
//!
//! Everything the extractor hands out is freshly allocated and exclusively
//! owned by the caller; nothing borrows from the extraction context.

use std::time::Duration;

use image::{DynamicImage, RgbImage};

use crate::error::ExtractError;

/// Audio/video track counts for a media source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[must_use]
pub struct StreamInfo {
    /// Number of audio tracks.
    pub audio_tracks: u32,
    /// Number of video tracks.
    pub video_tracks: u32,
}

/// Embedded artwork extracted from a tag.
#[derive(Debug, Clone)]
#[must_use]
pub struct Artwork {
    /// Encoded image bytes (JPEG, PNG, ...), exactly as stored in the tag.
    pub data: Vec<u8>,
    /// MIME type of `data`, when the tag records one.
    pub mime_type: Option<String>,
}

/// One synchronized-lyrics entry.
///
/// Out-of-range reads yield the empty entry (`timestamp` zero, no text)
/// rather than an error; callers are expected to bound their loop with the
/// pair count first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[must_use]
pub struct SyncLyrics {
    /// Offset of the line from the start of the track.
    pub timestamp: Duration,
    /// The lyric line. Empty text collapses to `None`.
    pub text: Option<String>,
}

/// A decoded video frame as tightly-packed RGB24 pixels.
#[derive(Debug, Clone)]
#[must_use]
pub struct VideoFrame {
    /// Raw pixel data, `width * height * 3` bytes.
    pub data: Vec<u8>,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
}

impl VideoFrame {
    /// Convert the raw pixels into an [`image::DynamicImage`].
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::OperationFailed`] if the buffer length does
    /// not match the stated dimensions.
    pub fn to_image(&self) -> Result<DynamicImage, ExtractError> {
        RgbImage::from_raw(self.width, self.height, self.data.clone())
            .map(DynamicImage::ImageRgb8)
            .ok_or_else(|| {
                ExtractError::OperationFailed(format!(
                    "frame buffer of {} bytes does not match {}x{} RGB24",
                    self.data.len(),
                    self.width,
                    self.height,
                ))
            })
    }
}

/// Copy `bytes` into a fresh caller-owned buffer, failing with
/// [`ExtractError::OutOfMemory`] instead of aborting when the reservation
/// cannot be satisfied.
pub(crate) fn copy_owned(bytes: &[u8]) -> Result<Vec<u8>, ExtractError> {
    let mut owned = Vec::new();
    owned
        .try_reserve_exact(bytes.len())
        .map_err(|error| ExtractError::from_reserve(error, bytes.len()))?;
    owned.extend_from_slice(bytes);
    Ok(owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copy_owned_is_an_independent_buffer() {
        let original = vec![1u8, 2, 3, 4];
        let copied = copy_owned(&original).expect("copy failed");
        assert_eq!(copied, original);
        drop(original);
        assert_eq!(copied, [1, 2, 3, 4]);
    }

    #[test]
    fn frame_with_mismatched_dimensions_does_not_convert() {
        let frame = VideoFrame {
            data: vec![0u8; 10],
            width: 4,
            height: 4,
        };
        assert!(frame.to_image().is_err());
    }

    #[test]
    fn frame_converts_to_rgb_image() {
        let frame = VideoFrame {
            data: vec![128u8; 2 * 2 * 3],
            width: 2,
            height: 2,
        };
        let image = frame.to_image().expect("conversion failed");
        assert_eq!(image.width(), 2);
        assert_eq!(image.height(), 2);
    }
}
