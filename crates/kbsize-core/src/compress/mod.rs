//! Target-size compression.
//!
//! Given a decoded image and a byte budget, find an encoding whose size is as
//! close as possible to the budget, preferably at or under it:
//!
//! 1. [`search_quality`] binary-searches the encoder quality at the current
//!    dimensions.
//! 2. If even the closest candidate is over the target, [`DimensionScaler`]
//!    shrinks the working buffer and the search runs again.
//! 3. The loop ends when the target is met, the downscale budget is spent, or
//!    the next step would cross the minimum dimension floor. The winner is
//!    the candidate closest to the target across every level.
//!
//! The loop itself is the pure transition function in [`state`]; the
//! [`Compressor`] performs encodes and resamples through an
//! [`ImageCodec`](crate::codec::ImageCodec).
//!
//! # Examples
//!
//! ```ignore
//! use kbsize_core::compress::{CompressionRequest, Compressor};
//!
//! let bytes = std::fs::read("photo.jpg").unwrap();
//! let result = Compressor::default()
//!     .compress_bytes(&bytes, &CompressionRequest::from_target_kb(100))
//!     .unwrap();
//! println!("{} KB, {}% smaller", result.compressed_size_kb(), result.reduction_percent());
//! ```

mod orchestrator;
mod quality;
mod request;
mod scale;
pub mod state;
mod target;
mod types;

pub use orchestrator::{Compressor, SourceImage};
pub use quality::{max_encode_calls, search_quality};
pub use request::{
    CompressionRequest, DEFAULT_DOWNSCALE_FACTOR, DEFAULT_MAX_DOWNSCALE_ATTEMPTS,
    DEFAULT_MAX_QUALITY, DEFAULT_MAX_WORKING_DIMENSION, DEFAULT_MIN_DIMENSION_FLOOR,
    DEFAULT_MIN_QUALITY,
};
pub use scale::{DimensionScaler, ScaleStep};
pub use target::{
    format_target_label, kb_to_bytes, parse_target_kb, BYTES_PER_KB, DEFAULT_TARGET_KB,
    PRESET_TARGETS_KB,
};
pub use types::{reduction_percent, CompressError, CompressionResult, EncodedCandidate, Outcome};
