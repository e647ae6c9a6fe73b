//! RGB pixel buffers shared by the decoder, resampler, and encoder.

/// An RGB8 pixel buffer in row-major order.
///
/// Buffers are never resized in place: every resample produces a new
/// `PixelBuffer`, so a buffer handed to the compressor stays valid and
/// unchanged for the whole run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// RGB pixel data (3 bytes per pixel). Length is `width * height * 3`.
    pub pixels: Vec<u8>,
}

impl PixelBuffer {
    /// Create a buffer from dimensions and pixel data.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(
            pixels.len(),
            Self::expected_len(width, height),
            "Pixel buffer size mismatch"
        );
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Create a buffer filled with a single color.
    pub fn filled(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        let pixels = rgb
            .iter()
            .copied()
            .cycle()
            .take(Self::expected_len(width, height))
            .collect();
        Self::new(width, height, pixels)
    }

    /// Create a buffer from an `image::RgbImage`, taking its storage.
    pub fn from_rgb_image(img: image::RgbImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            pixels: img.into_raw(),
        }
    }

    /// Borrow the pixels as an `image` crate view without copying.
    pub fn as_rgb_view(&self) -> Option<image::ImageBuffer<image::Rgb<u8>, &[u8]>> {
        if !self.is_consistent() {
            return None;
        }
        image::ImageBuffer::from_raw(self.width, self.height, self.pixels.as_slice())
    }

    /// `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Whether the pixel data length matches the dimensions.
    pub fn is_consistent(&self) -> bool {
        self.pixels.len() == Self::expected_len(self.width, self.height)
    }

    pub(crate) fn expected_len(width: u32, height: u32) -> usize {
        (width as usize) * (height as usize) * 3
    }
}
