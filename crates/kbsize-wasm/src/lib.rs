//! kbsize WASM - WebAssembly bindings for the kbsize compressor
//!
//! This crate exposes kbsize-core's target-size compression to
//! JavaScript/TypeScript applications.
//!
//! # Module Structure
//!
//! - `compress` - Compression entry points, presets, and file naming
//! - `types` - WASM-compatible wrapper for compression results
//! - `logger` - Routes core log records to the browser console
//!
//! # Usage
//!
//! ```typescript
//! import init, { compress_to_target_size } from '@kbsize/wasm';
//!
//! // Initialize WASM module (must call first)
//! await init();
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const result = compress_to_target_size(bytes, 200);
//! console.log(`Encoded ${result.width}x${result.height} at ${result.compressedSizeKb} KB`);
//! ```
//!
//! Compression is synchronous; run it in a Web Worker to keep the page responsive.

use wasm_bindgen::prelude::*;

mod compress;
mod logger;
mod types;

pub use compress::{
    compress_to_target_size, compress_with_options, format_target_label, suggested_file_name,
    target_presets_kb,
};
pub use types::JsCompressionResult;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    logger::install(log::LevelFilter::Info);
}

/// Set the console log level: 0 = off, 1 = error, 2 = warn, 3 = info,
/// 4 = debug, 5 = trace.
#[wasm_bindgen]
pub fn set_log_level(level: u8) {
    logger::install(logger::level_from_u8(level));
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
