//! kbsize Core - target-size image compression
//!
//! This crate compresses a photo toward a byte budget: it searches encoder
//! quality, then shrinks dimensions when quality alone cannot reach the
//! budget, and reports the candidate closest to the target.

pub mod codec;
pub mod compress;
pub mod decode;
pub mod encode;
pub mod persist;
pub mod pixels;
pub mod resample;

pub use codec::{ImageCodec, JpegCodec};
pub use compress::{
    CompressError, CompressionRequest, CompressionResult, Compressor, Outcome, SourceImage,
};
pub use persist::{DirectoryStore, ImageStore, PersistError};
pub use pixels::PixelBuffer;
pub use resample::FilterType;

/// Compress encoded image bytes with the default JPEG codec.
///
/// # Errors
///
/// See [`Compressor::compress_bytes`].
pub fn compress_to_target(
    bytes: &[u8],
    request: &CompressionRequest,
) -> Result<CompressionResult, CompressError> {
    Compressor::<JpegCodec>::default().compress_bytes(bytes, request)
}
