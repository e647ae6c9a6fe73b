//! Resampling of working buffers to new dimensions.
//!
//! Used by the downscale loop to shrink the working buffer and by the decoder
//! to bound the working resolution. Always returns a new buffer.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pixels::PixelBuffer;

/// Errors that can occur while resampling.
#[derive(Debug, Error)]
pub enum ResampleError {
    /// Requested width or height is zero
    #[error("Invalid target dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// Source pixel data length doesn't match its dimensions
    #[error("Invalid pixel data: expected {expected} bytes, got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },
}

/// Filter type for resampling operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterType {
    /// Nearest neighbor interpolation (fastest, lowest quality).
    Nearest,
    /// Bilinear interpolation (fast, acceptable quality).
    #[default]
    Bilinear,
    /// Lanczos3 interpolation (slower, highest quality).
    Lanczos3,
}

impl FilterType {
    /// Convert to the image crate's FilterType.
    pub fn to_image_filter(self) -> image::imageops::FilterType {
        match self {
            FilterType::Nearest => image::imageops::FilterType::Nearest,
            FilterType::Bilinear => image::imageops::FilterType::Triangle,
            FilterType::Lanczos3 => image::imageops::FilterType::Lanczos3,
        }
    }
}

/// Resample `source` to exactly `width` x `height`.
///
/// # Errors
///
/// Returns `ResampleError::InvalidDimensions` for a zero target dimension and
/// `ResampleError::InvalidPixelData` if the source buffer is inconsistent.
pub fn resample(
    source: &PixelBuffer,
    width: u32,
    height: u32,
    filter: FilterType,
) -> Result<PixelBuffer, ResampleError> {
    if width == 0 || height == 0 {
        return Err(ResampleError::InvalidDimensions { width, height });
    }

    let view = source
        .as_rgb_view()
        .ok_or_else(|| ResampleError::InvalidPixelData {
            expected: PixelBuffer::expected_len(source.width, source.height),
            actual: source.pixels.len(),
        })?;

    if source.dimensions() == (width, height) {
        return Ok(source.clone());
    }

    let resized = image::imageops::resize(&view, width, height, filter.to_image_filter());
    Ok(PixelBuffer::from_rgb_image(resized))
}
