//! Iterative downscaling of the working buffer.

use super::state::Dimensions;
use crate::codec::ImageCodec;
use crate::pixels::PixelBuffer;
use crate::resample::ResampleError;

/// Result of asking for the next smaller size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleStep {
    /// Shrink to these dimensions.
    Resize(Dimensions),
    /// One side would drop below the floor; downscaling is over.
    TooSmall,
}

/// Shrinks both sides by a fixed factor, never below a floor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DimensionScaler {
    factor: f64,
    floor: u32,
}

impl DimensionScaler {
    pub fn new(factor: f64, floor: u32) -> Self {
        Self { factor, floor }
    }

    /// `round(side * factor)` for both sides, or `TooSmall` when either
    /// result is below the floor or rounding leaves both sides unchanged.
    pub fn next(&self, current: Dimensions) -> ScaleStep {
        let width = (current.width as f64 * self.factor).round() as u32;
        let height = (current.height as f64 * self.factor).round() as u32;

        if width < self.floor || height < self.floor {
            ScaleStep::TooSmall
        } else if width >= current.width && height >= current.height {
            ScaleStep::TooSmall
        } else {
            ScaleStep::Resize(Dimensions::new(width, height))
        }
    }

    /// Resample `current` to `to` through the codec. The caller owns both
    /// buffers and drops the old one once this returns.
    pub fn apply<C: ImageCodec>(
        &self,
        codec: &C,
        current: &PixelBuffer,
        to: Dimensions,
    ) -> Result<PixelBuffer, ResampleError> {
        debug_assert!(to.width >= self.floor && to.height >= self.floor);
        log::debug!(
            "Downscaling {}x{} to {}x{}",
            current.width,
            current.height,
            to.width,
            to.height
        );
        codec.resample(current, to.width, to.height)
    }
}
