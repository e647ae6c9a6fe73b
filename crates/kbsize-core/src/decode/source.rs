//! Decoding of encoded source bytes into a bounded working buffer.

use std::io::Cursor;

use exif::{In, Reader, Tag};
use image::{DynamicImage, ImageError, ImageReader};

use super::{DecodeError, Orientation};
use crate::pixels::PixelBuffer;
use crate::resample::{resample, FilterType};

/// Largest source image (in pixels, before sampling) the decoder will allocate.
pub const MAX_SOURCE_PIXELS: u64 = 120_000_000;

/// Decode source bytes into an upright RGB buffer whose sides fit the
/// working bound.
///
/// The image is decoded at full resolution and then sampled down, so peak
/// memory is bounded by [`MAX_SOURCE_PIXELS`], not by
/// `max_working_dimension`. Only the returned buffer respects the working
/// bound.
///
/// # Arguments
///
/// * `bytes` - Encoded image bytes (JPEG or PNG)
/// * `max_working_dimension` - Bound used to pick the sample size for both axes
/// * `filter` - Filter used when the sample size is greater than one
///
/// # Errors
///
/// Returns `DecodeError::InvalidFormat` if the format is not recognized or not
/// supported, `DecodeError::TooLarge` if the header exceeds
/// [`MAX_SOURCE_PIXELS`], and `DecodeError::CorruptedFile` for damaged data.
pub fn decode_source(
    bytes: &[u8],
    max_working_dimension: u32,
    filter: FilterType,
) -> Result<PixelBuffer, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::InvalidFormat);
    }

    let (header_width, header_height) = read_dimensions(bytes)?;
    if header_width as u64 * header_height as u64 > MAX_SOURCE_PIXELS {
        return Err(DecodeError::TooLarge {
            width: header_width,
            height: header_height,
        });
    }

    let img = reader_for(bytes)?.decode().map_err(map_image_error)?;
    let upright = apply_orientation(img, extract_orientation(bytes)).into_rgb8();
    let full = PixelBuffer::from_rgb_image(upright);

    let sample = calculate_sample_size(
        full.width,
        full.height,
        max_working_dimension,
        max_working_dimension,
    );
    if sample == 1 {
        return Ok(full);
    }

    let (width, height) = (full.width / sample, full.height / sample);
    log::debug!(
        "Sampling source {}x{} by {} to {}x{}",
        full.width,
        full.height,
        sample,
        width,
        height
    );
    resample(&full, width, height, filter).map_err(|e| DecodeError::CorruptedFile(e.to_string()))
}

/// Power-of-two sample size that keeps both sides at or above the requested
/// bounds after halving.
///
/// Starting from 1, the size doubles while both halved sides divided by the
/// current size still reach their bound. A zero bound disables sampling.
pub fn calculate_sample_size(width: u32, height: u32, max_width: u32, max_height: u32) -> u32 {
    let mut sample = 1u32;
    if max_width == 0 || max_height == 0 {
        return sample;
    }

    if height > max_height || width > max_width {
        let half_height = height / 2;
        let half_width = width / 2;

        while half_height / sample >= max_height && half_width / sample >= max_width {
            sample *= 2;
        }
    }

    sample
}

/// Upright `(width, height)` of the encoded source, read from the header
/// without decoding pixels. EXIF rotations swap the header's sides.
///
/// # Errors
///
/// `DecodeError::InvalidFormat` for unrecognized bytes, otherwise
/// `DecodeError::CorruptedFile` when the header cannot be read.
pub fn source_dimensions(bytes: &[u8]) -> Result<(u32, u32), DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::InvalidFormat);
    }

    let (width, height) = read_dimensions(bytes)?;
    if extract_orientation(bytes).swaps_dimensions() {
        Ok((height, width))
    } else {
        Ok((width, height))
    }
}

fn reader_for(bytes: &[u8]) -> Result<ImageReader<Cursor<&[u8]>>, DecodeError> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))
}

fn read_dimensions(bytes: &[u8]) -> Result<(u32, u32), DecodeError> {
    let reader = reader_for(bytes)?;
    if reader.format().is_none() {
        return Err(DecodeError::InvalidFormat);
    }
    reader.into_dimensions().map_err(map_image_error)
}

fn map_image_error(err: ImageError) -> DecodeError {
    match err {
        ImageError::Unsupported(_) => DecodeError::InvalidFormat,
        other => DecodeError::CorruptedFile(other.to_string()),
    }
}

/// Returns `Orientation::Normal` when no EXIF data is present.
fn extract_orientation(bytes: &[u8]) -> Orientation {
    let mut cursor = Cursor::new(bytes);

    match Reader::new().read_from_container(&mut cursor) {
        Ok(exif) => exif
            .get_field(Tag::Orientation, In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
            .map(Orientation::from)
            .unwrap_or_default(),
        Err(_) => Orientation::Normal,
    }
}

fn apply_orientation(img: DynamicImage, orientation: Orientation) -> DynamicImage {
    match orientation {
        Orientation::Normal => img,
        Orientation::FlipHorizontal => img.fliph(),
        Orientation::Rotate180 => img.rotate180(),
        Orientation::FlipVertical => img.flipv(),
        Orientation::Transpose => img.rotate90().fliph(),
        Orientation::Rotate90CW => img.rotate90(),
        Orientation::Transverse => img.rotate270().fliph(),
        Orientation::Rotate270CW => img.rotate270(),
    }
}
