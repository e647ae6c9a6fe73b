//! Compression request: the target plus the knobs of the search.

use serde::{Deserialize, Serialize};

use super::target::kb_to_bytes;
use super::CompressError;
use crate::encode::MAX_QUALITY;

pub const DEFAULT_MIN_QUALITY: u8 = 20;
pub const DEFAULT_MAX_QUALITY: u8 = 100;
pub const DEFAULT_MAX_DOWNSCALE_ATTEMPTS: u32 = 10;
pub const DEFAULT_DOWNSCALE_FACTOR: f64 = 0.9;
pub const DEFAULT_MIN_DIMENSION_FLOOR: u32 = 50;
/// Longest side the decoder aims for before the search starts.
pub const DEFAULT_MAX_WORKING_DIMENSION: u32 = 2048;

/// Parameters of one compression run.
///
/// Deserializes from a camelCase object in which only `targetSizeBytes` is
/// required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompressionRequest {
    /// Desired encoded size in bytes. Must be greater than zero.
    pub target_size_bytes: u64,
    /// Lowest quality the search may probe.
    #[serde(default = "default_min_quality")]
    pub min_quality: u8,
    /// Highest quality the search may probe (at most 100).
    #[serde(default = "default_max_quality")]
    pub max_quality: u8,
    /// Upper bound on downscale transitions.
    #[serde(default = "default_max_downscale_attempts")]
    pub max_downscale_attempts: u32,
    /// Per-step shrink ratio, strictly between 0 and 1.
    #[serde(default = "default_downscale_factor")]
    pub downscale_factor: f64,
    /// Downscaling stops before either side would drop below this.
    #[serde(default = "default_min_dimension_floor")]
    pub min_dimension_floor: u32,
    /// Bound used by the decoder to pick a sample size.
    #[serde(default = "default_max_working_dimension")]
    pub max_working_dimension: u32,
    /// Return the source unchanged when it is already JPEG and fits.
    #[serde(default = "default_passthrough")]
    pub passthrough_when_fits: bool,
}

fn default_min_quality() -> u8 {
    DEFAULT_MIN_QUALITY
}

fn default_max_quality() -> u8 {
    DEFAULT_MAX_QUALITY
}

fn default_max_downscale_attempts() -> u32 {
    DEFAULT_MAX_DOWNSCALE_ATTEMPTS
}

fn default_downscale_factor() -> f64 {
    DEFAULT_DOWNSCALE_FACTOR
}

fn default_min_dimension_floor() -> u32 {
    DEFAULT_MIN_DIMENSION_FLOOR
}

fn default_max_working_dimension() -> u32 {
    DEFAULT_MAX_WORKING_DIMENSION
}

fn default_passthrough() -> bool {
    true
}

impl CompressionRequest {
    /// Request with the default search parameters.
    pub fn new(target_size_bytes: u64) -> Self {
        Self {
            target_size_bytes,
            min_quality: DEFAULT_MIN_QUALITY,
            max_quality: DEFAULT_MAX_QUALITY,
            max_downscale_attempts: DEFAULT_MAX_DOWNSCALE_ATTEMPTS,
            downscale_factor: DEFAULT_DOWNSCALE_FACTOR,
            min_dimension_floor: DEFAULT_MIN_DIMENSION_FLOOR,
            max_working_dimension: DEFAULT_MAX_WORKING_DIMENSION,
            passthrough_when_fits: true,
        }
    }

    /// Request for a target given in KB (1 KB = 1024 bytes).
    pub fn from_target_kb(kb: u32) -> Self {
        Self::new(kb_to_bytes(kb))
    }

    pub fn with_quality_range(mut self, min_quality: u8, max_quality: u8) -> Self {
        self.min_quality = min_quality;
        self.max_quality = max_quality;
        self
    }

    pub fn with_max_downscale_attempts(mut self, attempts: u32) -> Self {
        self.max_downscale_attempts = attempts;
        self
    }

    pub fn with_downscale_factor(mut self, factor: f64) -> Self {
        self.downscale_factor = factor;
        self
    }

    pub fn with_min_dimension_floor(mut self, floor: u32) -> Self {
        self.min_dimension_floor = floor;
        self
    }

    pub fn with_max_working_dimension(mut self, max: u32) -> Self {
        self.max_working_dimension = max;
        self
    }

    pub fn with_passthrough(mut self, enabled: bool) -> Self {
        self.passthrough_when_fits = enabled;
        self
    }

    /// Check every parameter.
    ///
    /// # Errors
    ///
    /// Returns `CompressError::InvalidRequest` naming the first bad field.
    pub fn validate(&self) -> Result<(), CompressError> {
        if self.target_size_bytes == 0 {
            return Err(invalid("target size must be greater than zero"));
        }
        if self.max_quality > MAX_QUALITY {
            return Err(invalid(format!(
                "max quality {} exceeds {}",
                self.max_quality, MAX_QUALITY
            )));
        }
        if self.min_quality > self.max_quality {
            return Err(invalid(format!(
                "min quality {} is above max quality {}",
                self.min_quality, self.max_quality
            )));
        }
        if !(self.downscale_factor > 0.0 && self.downscale_factor < 1.0) {
            return Err(invalid(format!(
                "downscale factor must be in (0, 1), got {}",
                self.downscale_factor
            )));
        }
        if self.min_dimension_floor == 0 {
            return Err(invalid("minimum dimension floor must be at least 1"));
        }
        if self.max_working_dimension == 0 {
            return Err(invalid("max working dimension must be at least 1"));
        }
        Ok(())
    }
}

fn invalid(msg: impl Into<String>) -> CompressError {
    CompressError::InvalidRequest(msg.into())
}
