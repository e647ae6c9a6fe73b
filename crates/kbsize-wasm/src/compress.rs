//! Target-size compression WASM bindings.
//!
//! # Functions
//!
//! - [`compress_to_target_size`] - Compress to a KB target with default options
//! - [`compress_with_options`] - Compress with a full options object
//! - [`target_presets_kb`] / [`format_target_label`] - Picker presets and labels
//! - [`suggested_file_name`] - Output name for saving
//!
//! # Example
//!
//! ```typescript
//! import { compress_to_target_size, suggested_file_name } from '@kbsize/wasm';
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const result = compress_to_target_size(bytes, 100);
//! console.log(`${result.compressedSizeKb} KB, ${result.reductionPercent}% smaller`);
//! const blob = new Blob([result.bytes()], { type: 'image/jpeg' });
//! ```

use kbsize_core::codec::JpegCodec;
use kbsize_core::compress::{
    self, CompressError, CompressionRequest, CompressionResult, Compressor,
};
use wasm_bindgen::prelude::*;

use crate::types::{filter_from_u8, JsCompressionResult};

/// Compress an image toward `target_kb` kilobytes with default options.
///
/// # Arguments
///
/// * `bytes` - Source image bytes (JPEG or PNG)
/// * `target_kb` - Target size in KB (1 KB = 1024 bytes)
///
/// # Errors
///
/// Returns an error if the target is zero or the source cannot be decoded.
/// An unreachable target is not an error: check `isBestEffort` on the result.
#[wasm_bindgen]
pub fn compress_to_target_size(bytes: &[u8], target_kb: u32) -> Result<JsCompressionResult, JsValue> {
    run(bytes, &CompressionRequest::from_target_kb(target_kb), 1)
        .map(JsCompressionResult::from)
        .map_err(to_js_error)
}

/// Compress an image with explicit options.
///
/// # Arguments
///
/// * `bytes` - Source image bytes (JPEG or PNG)
/// * `options` - `{ targetSizeBytes, minQuality?, maxQuality?, maxDownscaleAttempts?,
///   downscaleFactor?, minDimensionFloor?, maxWorkingDimension?, passthroughWhenFits? }`
/// * `filter` - Resampling filter: 0 = Nearest, 1 = Bilinear, 2 = Lanczos3
///
/// # Errors
///
/// Returns an error if the options cannot be read or are invalid, or if the
/// source cannot be decoded.
#[wasm_bindgen]
pub fn compress_with_options(
    bytes: &[u8],
    options: JsValue,
    filter: u8,
) -> Result<JsCompressionResult, JsValue> {
    let request: CompressionRequest = serde_wasm_bindgen::from_value(options)
        .map_err(|e| JsValue::from_str(&format!("Invalid compression options: {}", e)))?;

    run(bytes, &request, filter)
        .map(JsCompressionResult::from)
        .map_err(to_js_error)
}

/// Preset targets for the size picker, in KB.
#[wasm_bindgen]
pub fn target_presets_kb() -> Vec<u32> {
    compress::PRESET_TARGETS_KB.to_vec()
}

/// Display label for a KB target, e.g. `"100KB"` or `"1MB"`.
#[wasm_bindgen]
pub fn format_target_label(kb: u32) -> String {
    compress::format_target_label(kb)
}

/// `compressed_<millis>.jpg` using the browser clock.
#[wasm_bindgen]
pub fn suggested_file_name() -> String {
    kbsize_core::persist::suggested_file_name_at(js_sys::Date::now() as u64)
}

fn run(
    bytes: &[u8],
    request: &CompressionRequest,
    filter: u8,
) -> Result<CompressionResult, CompressError> {
    Compressor::new(JpegCodec::new(filter_from_u8(filter))).compress_bytes(bytes, request)
}

fn to_js_error(err: CompressError) -> JsValue {
    JsValue::from_str(&err.to_string())
}


/// WASM-specific tests that require JsValue.
///
/// These tests use functions that return `Result<T, JsValue>` and can only
/// run on wasm32 targets. Use `wasm-pack test` to run these.
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use kbsize_core::encode::encode_jpeg;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn gray_jpeg() -> Vec<u8> {
        encode_jpeg(&vec![128u8; 64 * 64 * 3], 64, 64, 90).unwrap()
    }

    #[wasm_bindgen_test]
    fn test_compress_to_target_size_basic() {
        let result = compress_to_target_size(&gray_jpeg(), 50).unwrap();
        assert_eq!(&result.bytes()[0..2], &[0xFF, 0xD8]);
        assert!(!result.is_best_effort());
    }

    #[wasm_bindgen_test]
    fn test_compress_to_target_size_zero_target() {
        assert!(compress_to_target_size(&gray_jpeg(), 0).is_err());
    }

    #[wasm_bindgen_test]
    fn test_compress_with_options_object() {
        let options = serde_wasm_bindgen::to_value(
            &CompressionRequest::new(20_000).with_passthrough(false),
        )
        .unwrap();
        let result = compress_with_options(&gray_jpeg(), options, 2).unwrap();
        assert_eq!(result.outcome(), "targetMet");
    }

    #[wasm_bindgen_test]
    fn test_compress_with_options_invalid_object() {
        let options = serde_wasm_bindgen::to_value(&"not an object").unwrap();
        assert!(compress_with_options(&gray_jpeg(), options, 1).is_err());
    }

    #[wasm_bindgen_test]
    fn test_suggested_file_name() {
        let name = suggested_file_name();
        assert!(name.starts_with("compressed_"));
        assert!(name.ends_with(".jpg"));
    }
}
