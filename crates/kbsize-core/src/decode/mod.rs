//! Source decoding for the compressor.
//!
//! This module turns encoded source bytes (JPEG or PNG) into the initial
//! working [`PixelBuffer`](crate::pixels::PixelBuffer):
//! - Header dimensions are checked before any pixel allocation
//! - EXIF orientation is applied, since compressed output carries no EXIF
//! - The working resolution is bounded with a power-of-two sample size
//! - Passthrough reads the upright source size from the header alone
//!
//! # Examples
//!
//! ```ignore
//! use kbsize_core::decode::decode_source;
//! use kbsize_core::resample::FilterType;
//!
//! let bytes = std::fs::read("photo.jpg").unwrap();
//! let image = decode_source(&bytes, 2048, FilterType::Bilinear).unwrap();
//! println!("Working buffer {}x{}", image.width, image.height);
//! ```

mod source;
mod types;

pub use source::{calculate_sample_size, decode_source, source_dimensions, MAX_SOURCE_PIXELS};
pub use types::{DecodeError, Orientation};
