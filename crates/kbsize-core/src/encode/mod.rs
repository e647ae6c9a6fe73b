//! Lossy encoding of working buffers.
//!
//! The compressor probes this encoder once per quality step, so it must be
//! deterministic for a given buffer and quality.
//!
//! # Examples
//!
//! ```ignore
//! use kbsize_core::encode::encode_jpeg;
//!
//! let pixels = vec![128u8; 100 * 100 * 3]; // Gray image
//! let jpeg_bytes = encode_jpeg(&pixels, 100, 100, 90).unwrap();
//! println!("Encoded {} bytes", jpeg_bytes.len());
//! ```

mod jpeg;

pub use jpeg::{encode_jpeg, EncodeError, MAX_QUALITY, MIN_QUALITY};
