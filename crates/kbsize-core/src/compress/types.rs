//! Candidates, results, and errors of a compression run.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::target::BYTES_PER_KB;
use crate::decode::DecodeError;
use crate::encode::EncodeError;
use crate::resample::ResampleError;

/// Errors that abort a compression run.
///
/// An unreachable target is not an error: the run completes with the closest
/// candidate it found.
#[derive(Debug, Error)]
pub enum CompressError {
    /// The request failed validation; nothing was decoded or encoded.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Decode failed: {0}")]
    Decode(#[from] DecodeError),

    #[error("Encode failed: {0}")]
    Encode(#[from] EncodeError),

    #[error("Resample failed: {0}")]
    Resample(#[from] ResampleError),
}

/// Output of one encode call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedCandidate {
    pub quality: u8,
    pub bytes: Vec<u8>,
}

impl EncodedCandidate {
    pub fn new(quality: u8, bytes: Vec<u8>) -> Self {
        Self { quality, bytes }
    }

    /// Encoded size in bytes.
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Absolute distance between the encoded size and `target`.
    pub fn distance_to(&self, target: u64) -> u64 {
        self.size().abs_diff(target)
    }
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Outcome {
    /// The last quality search produced a candidate at or under the target.
    TargetMet,
    /// The downscale budget ran out before the target was met.
    AttemptsExhausted,
    /// The next downscale step would cross the minimum dimension floor.
    TooSmall,
    /// The source already fit the target and was returned unchanged.
    Passthrough,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::TargetMet => "targetMet",
            Outcome::AttemptsExhausted => "attemptsExhausted",
            Outcome::TooSmall => "tooSmall",
            Outcome::Passthrough => "passthrough",
        }
    }

    /// Whether the run gave up before reaching the target.
    pub fn is_best_effort(self) -> bool {
        matches!(self, Outcome::AttemptsExhausted | Outcome::TooSmall)
    }
}

/// Final result of a compression run.
#[derive(Debug, Clone)]
pub struct CompressionResult {
    bytes: Vec<u8>,
    width: u32,
    height: u32,
    quality: Option<u8>,
    original_size_bytes: u64,
    reduction_percent: u8,
    downscale_steps: u32,
    encode_calls: u32,
    outcome: Outcome,
}

impl CompressionResult {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        bytes: Vec<u8>,
        width: u32,
        height: u32,
        quality: Option<u8>,
        original_size_bytes: u64,
        downscale_steps: u32,
        encode_calls: u32,
        outcome: Outcome,
    ) -> Self {
        let reduction_percent = reduction_percent(original_size_bytes, bytes.len() as u64);
        Self {
            bytes,
            width,
            height,
            quality,
            original_size_bytes,
            reduction_percent,
            downscale_steps,
            encode_calls,
            outcome,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Quality of the winning encode; `None` for a passthrough.
    pub fn quality(&self) -> Option<u8> {
        self.quality
    }

    pub fn original_size_bytes(&self) -> u64 {
        self.original_size_bytes
    }

    pub fn compressed_size_bytes(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn original_size_kb(&self) -> u64 {
        self.original_size_bytes / BYTES_PER_KB
    }

    pub fn compressed_size_kb(&self) -> u64 {
        self.compressed_size_bytes() / BYTES_PER_KB
    }

    /// Size reduction in percent, within 0..=100.
    pub fn reduction_percent(&self) -> u8 {
        self.reduction_percent
    }

    /// Number of downscale transitions the run performed.
    pub fn downscale_steps(&self) -> u32 {
        self.downscale_steps
    }

    pub fn encode_calls(&self) -> u32 {
        self.encode_calls
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }
}

/// `((original - compressed) * 100) / original`, clamped to 0..=100.
///
/// Returns 0 when `original` is 0.
pub fn reduction_percent(original: u64, compressed: u64) -> u8 {
    if original == 0 {
        return 0;
    }
    let saved = (original as i128 - compressed as i128) * 100 / original as i128;
    saved.clamp(0, 100) as u8
}
