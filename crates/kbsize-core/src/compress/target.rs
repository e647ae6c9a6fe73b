//! Target-size presets and parsing of user-entered sizes.
//!
//! Sizes are entered in KB, where 1 KB is 1024 bytes.

use super::CompressError;

pub const BYTES_PER_KB: u64 = 1024;

/// Preset targets offered by the picker, in KB.
pub const PRESET_TARGETS_KB: [u32; 5] = [50, 100, 200, 500, 1000];

/// Default preset selected before the user picks one.
pub const DEFAULT_TARGET_KB: u32 = 100;

pub fn kb_to_bytes(kb: u32) -> u64 {
    kb as u64 * BYTES_PER_KB
}

/// Label for a target in KB: `"200KB"`, or whole megabytes from 1000 KB up
/// (`"1MB"`).
pub fn format_target_label(kb: u32) -> String {
    if kb >= 1000 {
        format!("{}MB", kb / 1000)
    } else {
        format!("{}KB", kb)
    }
}

/// Parse a custom target typed by the user, in KB.
///
/// # Errors
///
/// Returns `CompressError::InvalidRequest` for empty, non-numeric, negative,
/// or zero input.
pub fn parse_target_kb(input: &str) -> Result<u32, CompressError> {
    let trimmed = input.trim();
    let kb: i64 = trimmed
        .parse()
        .map_err(|_| CompressError::InvalidRequest(format!("not a size in KB: {:?}", trimmed)))?;

    if kb <= 0 {
        return Err(CompressError::InvalidRequest(format!(
            "target size must be positive, got {}",
            kb
        )));
    }

    u32::try_from(kb)
        .map_err(|_| CompressError::InvalidRequest(format!("target size too large: {}", kb)))
}
