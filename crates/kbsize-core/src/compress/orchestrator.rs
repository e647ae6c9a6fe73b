//! Drives the run: performs the effects the state machine asks for.

use std::borrow::Cow;

use super::quality::search_quality;
use super::scale::DimensionScaler;
use super::state::{Dimensions, Effect, Event, RunState, Step};
use super::{CompressError, CompressionRequest, CompressionResult, Outcome};
use crate::codec::{ImageCodec, JpegCodec};
use crate::pixels::PixelBuffer;

/// A decoded source image and the size of the bytes it came from.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub pixels: PixelBuffer,
    /// Size of the original encoded file. Reported only, never searched on.
    pub original_size_bytes: u64,
}

impl SourceImage {
    pub fn new(pixels: PixelBuffer, original_size_bytes: u64) -> Self {
        Self {
            pixels,
            original_size_bytes,
        }
    }
}

/// Runs target-size compression with an injected codec.
///
/// A run is synchronous and CPU bound; hosts call it from a worker thread.
/// The compressor holds no per-run state, so one instance can serve several
/// runs concurrently when the codec is `Sync`.
#[derive(Debug, Clone, Default)]
pub struct Compressor<C = JpegCodec> {
    codec: C,
}

impl<C: ImageCodec> Compressor<C> {
    pub fn new(codec: C) -> Self {
        Self { codec }
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Decode `bytes` and compress them toward the request's target.
    ///
    /// If passthrough is enabled and the source is already in the output
    /// format at or under the target, the bytes come back unchanged.
    ///
    /// # Errors
    ///
    /// `InvalidRequest` before any work, otherwise the first collaborator
    /// failure. An unreachable target still returns `Ok`.
    pub fn compress_bytes(
        &self,
        bytes: &[u8],
        request: &CompressionRequest,
    ) -> Result<CompressionResult, CompressError> {
        request.validate()?;

        let pixels = self.codec.decode(bytes, request.max_working_dimension)?;
        let original_size = bytes.len() as u64;

        if request.passthrough_when_fits
            && original_size <= request.target_size_bytes
            && self.codec.is_output_format(bytes)
        {
            log::debug!(
                "Source already fits: {} bytes, target {} bytes",
                original_size,
                request.target_size_bytes
            );
            drop(pixels);
            let (width, height) = self.codec.source_dimensions(bytes)?;
            return Ok(CompressionResult::new(
                bytes.to_vec(),
                width,
                height,
                None,
                original_size,
                0,
                0,
                Outcome::Passthrough,
            ));
        }

        self.run(SourceImage::new(pixels, original_size), request)
    }

    /// Compress an already decoded source.
    ///
    /// The source is consumed and dropped when the run ends. Intermediate
    /// buffers are dropped as soon as the next one replaces them.
    pub fn compress(
        &self,
        source: SourceImage,
        request: &CompressionRequest,
    ) -> Result<CompressionResult, CompressError> {
        request.validate()?;
        self.run(source, request)
    }

    /// The search-and-downscale loop for a request that already validated.
    fn run(
        &self,
        source: SourceImage,
        request: &CompressionRequest,
    ) -> Result<CompressionResult, CompressError> {
        let original_size = source.original_size_bytes;
        log::debug!(
            "Original size: {} bytes, target: {} bytes, {}x{}",
            original_size,
            request.target_size_bytes,
            source.pixels.width,
            source.pixels.height
        );

        let scaler = DimensionScaler::new(request.downscale_factor, request.min_dimension_floor);
        let mut encode_calls = 0u32;
        let mut working: Cow<'_, PixelBuffer> = Cow::Borrowed(&source.pixels);
        let (mut state, mut effect) = RunState::start(dims_of(&working));

        let finished = loop {
            let event = match effect {
                Effect::Search(_) => {
                    let candidate = search_quality(
                        request.target_size_bytes,
                        request.min_quality,
                        request.max_quality,
                        |quality| {
                            encode_calls += 1;
                            self.codec.encode(&working, quality)
                        },
                    )?;
                    Event::Searched(candidate)
                }
                Effect::Resample(to) => {
                    working = Cow::Owned(scaler.apply(&self.codec, &working, to)?);
                    Event::Resampled(dims_of(&working))
                }
            };

            match state.step(event, request) {
                Step::Continue(next, next_effect) => {
                    state = next;
                    effect = next_effect;
                }
                Step::Finished(finished) => break finished,
            }
        };
        drop(working);

        let winner = finished.winner;
        let result = CompressionResult::new(
            winner.candidate.bytes,
            winner.dims.width,
            winner.dims.height,
            Some(winner.candidate.quality),
            original_size,
            finished.downscale_steps,
            encode_calls,
            finished.outcome,
        );

        log::info!(
            "Compression complete: {} bytes at quality {} ({}x{}, {}% reduction, {})",
            result.compressed_size_bytes(),
            winner.candidate.quality,
            result.width(),
            result.height(),
            result.reduction_percent(),
            result.outcome().as_str()
        );

        Ok(result)
    }
}

fn dims_of(buffer: &PixelBuffer) -> Dimensions {
    Dimensions::new(buffer.width, buffer.height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compress::quality::max_encode_calls;
    use crate::decode::DecodeError;
    use crate::encode::EncodeError;
    use crate::resample::ResampleError;
    use std::cell::{Cell, RefCell};

    type SizeModel = Box<dyn Fn(u32, u32, u8) -> usize>;

    /// Codec whose encoded size is a function of dimensions and quality.
    /// Buffers carry no pixel data.
    struct SyntheticCodec {
        size: SizeModel,
        encode_calls: Cell<u32>,
        encoded_dims: RefCell<Vec<(u32, u32)>>,
        fail_resample: bool,
    }

    impl SyntheticCodec {
        fn new(size: impl Fn(u32, u32, u8) -> usize + 'static) -> Self {
            Self {
                size: Box::new(size),
                encode_calls: Cell::new(0),
                encoded_dims: RefCell::new(Vec::new()),
                fail_resample: false,
            }
        }

        /// Size grows with pixel count and quality.
        fn monotone() -> Self {
            Self::new(|w, h, q| 200 + (w as usize * h as usize) * (q as usize + 5) / 40)
        }
    }

    fn blank(width: u32, height: u32) -> PixelBuffer {
        PixelBuffer {
            width,
            height,
            pixels: Vec::new(),
        }
    }

    impl ImageCodec for SyntheticCodec {
        fn decode(&self, _bytes: &[u8], _max: u32) -> Result<PixelBuffer, DecodeError> {
            Err(DecodeError::InvalidFormat)
        }

        fn encode(&self, pixels: &PixelBuffer, quality: u8) -> Result<Vec<u8>, EncodeError> {
            self.encode_calls.set(self.encode_calls.get() + 1);
            self.encoded_dims
                .borrow_mut()
                .push((pixels.width, pixels.height));
            Ok(vec![0u8; (self.size)(pixels.width, pixels.height, quality)])
        }

        fn resample(
            &self,
            _pixels: &PixelBuffer,
            width: u32,
            height: u32,
        ) -> Result<PixelBuffer, ResampleError> {
            if self.fail_resample {
                return Err(ResampleError::InvalidDimensions { width, height });
            }
            Ok(blank(width, height))
        }
    }

    fn source(width: u32, height: u32, original: u64) -> SourceImage {
        SourceImage::new(blank(width, height), original)
    }

    #[test]
    fn test_zero_target_fails_without_encoding() {
        let compressor = Compressor::new(SyntheticCodec::monotone());
        let result = compressor.compress(source(100, 100, 5000), &CompressionRequest::new(0));

        assert!(matches!(result, Err(CompressError::InvalidRequest(_))));
        assert_eq!(compressor.codec().encode_calls.get(), 0);
    }

    #[test]
    fn test_large_photo_downscales_until_budget() {
        // 4000x3000, 4500 KB original, 100 KB target
        let compressor = Compressor::new(SyntheticCodec::monotone());
        let request = CompressionRequest::from_target_kb(100);

        let result = compressor
            .compress(source(4000, 3000, 4500 * 1024), &request)
            .unwrap();

        assert!(result.downscale_steps() >= 1);
        assert_eq!(result.downscale_steps(), 10);
        assert_eq!(result.outcome(), Outcome::AttemptsExhausted);
        // Closest achievable: minimum quality at the smallest dimensions
        assert_eq!(result.quality(), Some(20));
        assert_eq!((result.width(), result.height()), (1395, 1047));
        assert!(result.reduction_percent() <= 100);
    }

    #[test]
    fn test_small_image_stops_at_budget_before_floor() {
        let compressor = Compressor::new(SyntheticCodec::new(|w, h, q| {
            2000 + (w * h) as usize * q as usize / 10
        }));
        let request = CompressionRequest::from_target_kb(1);

        let result = compressor.compress(source(200, 200, 0), &request).unwrap();

        assert_eq!(result.outcome(), Outcome::AttemptsExhausted);
        assert_eq!(result.downscale_steps(), 10);
        assert_eq!((result.width(), result.height()), (69, 69));
        assert_eq!(result.reduction_percent(), 0);
        assert!(compressor
            .codec()
            .encoded_dims
            .borrow()
            .iter()
            .all(|&(w, h)| w >= 50 && h >= 50));
    }

    #[test]
    fn test_small_image_stops_at_floor_with_larger_budget() {
        let compressor = Compressor::new(SyntheticCodec::new(|w, h, q| {
            2000 + (w * h) as usize * q as usize / 10
        }));
        let request = CompressionRequest::from_target_kb(1).with_max_downscale_attempts(20);

        let result = compressor.compress(source(200, 200, 0), &request).unwrap();

        assert_eq!(result.outcome(), Outcome::TooSmall);
        assert_eq!(result.downscale_steps(), 13);
        assert_eq!((result.width(), result.height()), (50, 50));
    }

    #[test]
    fn test_target_met_after_one_downscale() {
        // At 100x100 even quality 20 is 1250 bytes; at 90x90 it is ~1012
        let compressor = Compressor::new(SyntheticCodec::new(|w, h, q| {
            (w * h) as usize * (q as usize + 30) / 400
        }));
        let request = CompressionRequest::new(1100);

        let result = compressor.compress(source(100, 100, 20_000), &request).unwrap();

        assert_eq!(result.outcome(), Outcome::TargetMet);
        assert_eq!(result.downscale_steps(), 1);
        assert_eq!((result.width(), result.height()), (90, 90));
        assert!(result.compressed_size_bytes() <= 1100);
    }

    #[test]
    fn test_no_downscale_when_quality_suffices() {
        let compressor = Compressor::new(SyntheticCodec::monotone());
        let request = CompressionRequest::new(200 + 10_000 * 65 / 40);

        let result = compressor.compress(source(100, 100, 50_000), &request).unwrap();

        assert_eq!(result.outcome(), Outcome::TargetMet);
        assert_eq!(result.downscale_steps(), 0);
        assert_eq!(result.quality(), Some(60));
        assert_eq!(result.encode_calls(), 1);
    }

    #[test]
    fn test_winner_is_best_across_all_levels() {
        // Downscaling makes things worse: 100x100 gets within 100 bytes,
        // every smaller size lands 500 bytes over
        let compressor = Compressor::new(SyntheticCodec::new(|w, _h, _q| {
            if w == 100 {
                1100
            } else {
                1500
            }
        }));
        let request = CompressionRequest::new(1000).with_max_downscale_attempts(3);

        let result = compressor.compress(source(100, 100, 0), &request).unwrap();

        assert_eq!(result.outcome(), Outcome::AttemptsExhausted);
        assert_eq!(result.compressed_size_bytes(), 1100);
        assert_eq!((result.width(), result.height()), (100, 100));
        assert_eq!(result.downscale_steps(), 3);
    }

    #[test]
    fn test_no_attempt_spent_when_rounding_cannot_shrink() {
        let compressor = Compressor::new(SyntheticCodec::monotone());
        let request = CompressionRequest::new(100)
            .with_downscale_factor(0.99)
            .with_min_dimension_floor(1)
            .with_max_downscale_attempts(5);

        let result = compressor.compress(source(40, 40, 0), &request).unwrap();

        assert_eq!(result.outcome(), Outcome::TooSmall);
        assert_eq!(result.downscale_steps(), 0);
        assert_eq!((result.width(), result.height()), (40, 40));
        assert!(compressor
            .codec()
            .encoded_dims
            .borrow()
            .iter()
            .all(|&dims| dims == (40, 40)));
        assert!(compressor.codec().encode_calls.get() <= max_encode_calls(20, 100));
    }

    #[test]
    fn test_resample_failure_aborts_run() {
        let mut codec = SyntheticCodec::monotone();
        codec.fail_resample = true;
        let compressor = Compressor::new(codec);

        let result = compressor.compress(source(500, 500, 0), &CompressionRequest::new(100));
        assert!(matches!(result, Err(CompressError::Resample(_))));
    }

    #[test]
    fn test_encode_failure_aborts_run() {
        struct Broken;
        impl ImageCodec for Broken {
            fn decode(&self, _: &[u8], _: u32) -> Result<PixelBuffer, DecodeError> {
                Err(DecodeError::InvalidFormat)
            }
            fn encode(&self, _: &PixelBuffer, _: u8) -> Result<Vec<u8>, EncodeError> {
                Err(EncodeError::EncodingFailed("encoder offline".to_string()))
            }
            fn resample(&self, p: &PixelBuffer, _: u32, _: u32) -> Result<PixelBuffer, ResampleError> {
                Ok(p.clone())
            }
        }

        let result = Compressor::new(Broken).compress(source(10, 10, 0), &CompressionRequest::new(1));
        assert!(matches!(result, Err(CompressError::Encode(_))));
    }

    #[test]
    fn test_decode_failure_surfaces() {
        let compressor = Compressor::new(SyntheticCodec::monotone());
        let result = compressor.compress_bytes(&[1, 2, 3], &CompressionRequest::new(100));
        assert!(matches!(result, Err(CompressError::Decode(_))));
    }

    // Real codec

    fn noisy_jpeg_source(width: u32, height: u32) -> PixelBuffer {
        let pixels = (0..(width * height * 3) as usize)
            .map(|i| ((i * 37 + (i / 97) * 11) % 256) as u8)
            .collect();
        PixelBuffer::new(width, height, pixels)
    }

    #[test]
    fn test_jpeg_generous_target_keeps_dimensions() {
        let compressor = Compressor::<JpegCodec>::default();
        let buf = noisy_jpeg_source(128, 96);
        let request = CompressionRequest::new(10 * 1024 * 1024);

        let result = compressor.compress(SourceImage::new(buf, 0), &request).unwrap();

        assert_eq!(result.outcome(), Outcome::TargetMet);
        assert_eq!(result.downscale_steps(), 0);
        assert_eq!((result.width(), result.height()), (128, 96));
        assert_eq!(&result.bytes()[0..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_jpeg_tiny_target_is_best_effort() {
        let compressor = Compressor::<JpegCodec>::default();
        let buf = noisy_jpeg_source(160, 120);
        let request = CompressionRequest::new(300);

        let result = compressor.compress(SourceImage::new(buf, 50_000), &request).unwrap();

        assert!(result.outcome().is_best_effort());
        assert!(result.downscale_steps() >= 1);
        assert!(result.width() < 160 && result.width() >= 50);
        assert!(result.height() >= 50);
        assert!(result.reduction_percent() <= 100);
    }

    #[test]
    fn test_passthrough_returns_input_unchanged() {
        let compressor = Compressor::<JpegCodec>::default();
        let first = compressor
            .compress(
                SourceImage::new(noisy_jpeg_source(96, 96), 0),
                &CompressionRequest::new(4000),
            )
            .unwrap();
        let jpeg = first.into_bytes();

        let again = compressor
            .compress_bytes(&jpeg, &CompressionRequest::new(jpeg.len() as u64))
            .unwrap();

        assert_eq!(again.outcome(), Outcome::Passthrough);
        assert_eq!(again.bytes(), jpeg.as_slice());
        assert_eq!(again.encode_calls(), 0);
        assert_eq!(again.reduction_percent(), 0);
        assert_eq!(again.quality(), None);
    }

    #[test]
    fn test_passthrough_reports_source_dimensions() {
        let compressor = Compressor::<JpegCodec>::default();
        let jpeg = compressor
            .codec()
            .encode(&PixelBuffer::filled(400, 300, [120, 130, 140]), 85)
            .unwrap();
        let request =
            CompressionRequest::new(jpeg.len() as u64 * 2).with_max_working_dimension(100);

        let result = compressor.compress_bytes(&jpeg, &request).unwrap();

        assert_eq!(result.outcome(), Outcome::Passthrough);
        assert_eq!((result.width(), result.height()), (400, 300));
        assert_eq!(result.bytes(), jpeg.as_slice());
    }

    #[test]
    fn test_passthrough_disabled_reencodes() {
        let compressor = Compressor::<JpegCodec>::default();
        let jpeg = compressor
            .codec()
            .encode(&noisy_jpeg_source(64, 64), 90)
            .unwrap();
        let request = CompressionRequest::new(jpeg.len() as u64).with_passthrough(false);

        let result = compressor.compress_bytes(&jpeg, &request).unwrap();

        assert_ne!(result.outcome(), Outcome::Passthrough);
        assert!(result.encode_calls() >= 1);
        assert_eq!(result.original_size_bytes(), jpeg.len() as u64);
    }

    #[test]
    fn test_concurrent_runs_share_compressor() {
        let compressor = Compressor::<JpegCodec>::default();
        let request = CompressionRequest::new(2_000);

        let (a, b) = std::thread::scope(|s| {
            let a = s.spawn(|| {
                compressor.compress(SourceImage::new(noisy_jpeg_source(120, 80), 0), &request)
            });
            let b = s.spawn(|| {
                compressor.compress(SourceImage::new(noisy_jpeg_source(80, 120), 0), &request)
            });
            (a.join().unwrap(), b.join().unwrap())
        });

        assert!(a.is_ok());
        assert!(b.is_ok());
    }

    #[test]
    fn test_encode_calls_within_bound() {
        let compressor = Compressor::new(SyntheticCodec::monotone());
        let request = CompressionRequest::new(500);

        let result = compressor.compress(source(400, 300, 0), &request).unwrap();

        let per_level = max_encode_calls(request.min_quality, request.max_quality);
        assert!(result.encode_calls() <= (result.downscale_steps() + 1) * per_level);
        assert_eq!(result.encode_calls(), compressor.codec().encode_calls.get());
    }
}
