//! Binary search over the encoder's quality parameter.
//!
//! The search assumes encoded size never decreases as quality rises. That
//! holds for real JPEG encoders in practice but is not checked; when it is
//! violated the search can step past a closer candidate.

use super::EncodedCandidate;
use crate::encode::EncodeError;

/// Upper bound on encode calls for one search over `min..=max`:
/// `ceil(log2(max - min + 1)) + 1`.
pub fn max_encode_calls(min_quality: u8, max_quality: u8) -> u32 {
    let span = (max_quality as u32).saturating_sub(min_quality as u32) + 1;
    span.next_power_of_two().trailing_zeros() + 1
}

/// Find the quality whose encoded size is closest to `target`.
///
/// Each probe encodes at the midpoint of the remaining range. A candidate
/// replaces the running best only when strictly closer, so ties keep the one
/// found first. An exact hit returns immediately.
///
/// # Errors
///
/// Returns the first error produced by `encode`; failed calls are not retried.
pub fn search_quality<F>(
    target: u64,
    min_quality: u8,
    max_quality: u8,
    mut encode: F,
) -> Result<EncodedCandidate, EncodeError>
where
    F: FnMut(u8) -> Result<Vec<u8>, EncodeError>,
{
    let mut low = min_quality as i32;
    let mut high = max_quality as i32;
    let mut best: Option<EncodedCandidate> = None;
    let mut best_distance = u64::MAX;

    while low <= high {
        let mid = (low + high) / 2;
        let candidate = EncodedCandidate::new(mid as u8, encode(mid as u8)?);
        let size = candidate.size();
        let distance = candidate.distance_to(target);
        log::trace!("Quality {} -> {} bytes (target {})", mid, size, target);

        if size == target {
            return Ok(candidate);
        }
        if distance < best_distance {
            best_distance = distance;
            best = Some(candidate);
        }

        if size > target {
            high = mid - 1;
        } else {
            low = mid + 1;
        }
    }

    match best {
        Some(candidate) => Ok(candidate),
        None => Ok(EncodedCandidate::new(min_quality, encode(min_quality)?)),
    }
}
