//! The codec capability the compressor depends on.
//!
//! The compressor never touches a concrete decoder or encoder; it is generic
//! over [`ImageCodec`]. Hosts whose platform codecs are callback driven adapt
//! them to these blocking calls at their own boundary.

use crate::decode::{decode_source, source_dimensions, DecodeError};
use crate::encode::{encode_jpeg, EncodeError};
use crate::pixels::PixelBuffer;
use crate::resample::{resample, FilterType, ResampleError};

/// Decode, encode, and resample capability.
///
/// Implementations must be deterministic, and `encode` is expected to produce
/// output whose size does not decrease as quality increases for a fixed buffer.
pub trait ImageCodec {
    /// Decode source bytes into an RGB buffer no larger than the working bound.
    fn decode(&self, bytes: &[u8], max_working_dimension: u32) -> Result<PixelBuffer, DecodeError>;

    /// Encode a buffer at `quality` (0-100).
    fn encode(&self, pixels: &PixelBuffer, quality: u8) -> Result<Vec<u8>, EncodeError>;

    /// Produce a new buffer resampled to `width` x `height`.
    fn resample(
        &self,
        pixels: &PixelBuffer,
        width: u32,
        height: u32,
    ) -> Result<PixelBuffer, ResampleError>;

    /// Whether `bytes` are already in this codec's output format.
    fn is_output_format(&self, _bytes: &[u8]) -> bool {
        false
    }

    /// Upright size of the encoded source, ignoring the working bound.
    ///
    /// The default decodes with sampling disabled; codecs that can read a
    /// header should override it.
    fn source_dimensions(&self, bytes: &[u8]) -> Result<(u32, u32), DecodeError> {
        self.decode(bytes, 0).map(|pixels| pixels.dimensions())
    }
}

/// Default codec: `image`-crate decode of JPEG/PNG, baseline JPEG output.
#[derive(Debug, Clone, Copy, Default)]
pub struct JpegCodec {
    filter: FilterType,
}

impl JpegCodec {
    pub fn new(filter: FilterType) -> Self {
        Self { filter }
    }

    pub fn filter(&self) -> FilterType {
        self.filter
    }
}

impl ImageCodec for JpegCodec {
    fn decode(&self, bytes: &[u8], max_working_dimension: u32) -> Result<PixelBuffer, DecodeError> {
        decode_source(bytes, max_working_dimension, self.filter)
    }

    fn encode(&self, pixels: &PixelBuffer, quality: u8) -> Result<Vec<u8>, EncodeError> {
        encode_jpeg(&pixels.pixels, pixels.width, pixels.height, quality)
    }

    fn resample(
        &self,
        pixels: &PixelBuffer,
        width: u32,
        height: u32,
    ) -> Result<PixelBuffer, ResampleError> {
        resample(pixels, width, height, self.filter)
    }

    fn is_output_format(&self, bytes: &[u8]) -> bool {
        matches!(image::guess_format(bytes), Ok(image::ImageFormat::Jpeg))
    }

    fn source_dimensions(&self, bytes: &[u8]) -> Result<(u32, u32), DecodeError> {
        source_dimensions(bytes)
    }
}
