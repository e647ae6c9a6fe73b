//! WASM-compatible wrapper types for compression results.

use kbsize_core::compress::CompressionResult;
use kbsize_core::resample::FilterType;
use wasm_bindgen::prelude::*;

/// The outcome of a compression run, for JavaScript.
///
/// The compressed bytes live in WASM memory until `bytes()` copies them out.
#[wasm_bindgen]
pub struct JsCompressionResult {
    inner: CompressionResult,
}

#[wasm_bindgen]
impl JsCompressionResult {
    /// Width of the encoded image in pixels
    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.inner.width()
    }

    /// Height of the encoded image in pixels
    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.inner.height()
    }

    /// Encoder quality of the winner, or undefined for a passthrough.
    #[wasm_bindgen(getter)]
    pub fn quality(&self) -> Option<u8> {
        self.inner.quality()
    }

    #[wasm_bindgen(getter, js_name = originalSizeBytes)]
    pub fn original_size_bytes(&self) -> u64 {
        self.inner.original_size_bytes()
    }

    #[wasm_bindgen(getter, js_name = compressedSizeBytes)]
    pub fn compressed_size_bytes(&self) -> u64 {
        self.inner.compressed_size_bytes()
    }

    #[wasm_bindgen(getter, js_name = originalSizeKb)]
    pub fn original_size_kb(&self) -> u64 {
        self.inner.original_size_kb()
    }

    #[wasm_bindgen(getter, js_name = compressedSizeKb)]
    pub fn compressed_size_kb(&self) -> u64 {
        self.inner.compressed_size_kb()
    }

    /// Size reduction against the original, 0-100.
    #[wasm_bindgen(getter, js_name = reductionPercent)]
    pub fn reduction_percent(&self) -> u8 {
        self.inner.reduction_percent()
    }

    #[wasm_bindgen(getter, js_name = downscaleSteps)]
    pub fn downscale_steps(&self) -> u32 {
        self.inner.downscale_steps()
    }

    /// One of `targetMet`, `attemptsExhausted`, `tooSmall`, `passthrough`.
    #[wasm_bindgen(getter)]
    pub fn outcome(&self) -> String {
        self.inner.outcome().as_str().to_string()
    }

    /// Whether the run gave up before reaching the target.
    #[wasm_bindgen(getter, js_name = isBestEffort)]
    pub fn is_best_effort(&self) -> bool {
        self.inner.outcome().is_best_effort()
    }

    /// Returns the encoded JPEG as a Uint8Array.
    ///
    /// Note: This copies the bytes out of WASM memory.
    pub fn bytes(&self) -> Vec<u8> {
        self.inner.bytes().to_vec()
    }

    /// Explicitly free WASM memory.
    ///
    /// This is optional - wasm-bindgen's finalizer will handle cleanup automatically.
    pub fn free(self) {}
}

impl From<CompressionResult> for JsCompressionResult {
    fn from(inner: CompressionResult) -> Self {
        Self { inner }
    }
}

/// Convert a u8 filter type value to the core FilterType enum.
///
/// Values:
/// - 0 = Nearest (fastest, lowest quality)
/// - 1 = Bilinear (good balance of speed and quality)
/// - 2 = Lanczos3 (best quality, slowest)
///
/// Any other value defaults to Bilinear.
pub(crate) fn filter_from_u8(value: u8) -> FilterType {
    match value {
        0 => FilterType::Nearest,
        2 => FilterType::Lanczos3,
        _ => FilterType::Bilinear,
    }
}
