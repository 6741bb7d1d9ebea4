//! Memory budget for amplitude storage
//!
//! A benchmark sweep walks up to vectors of 2^24 doubles (128 MiB). The budget
//! lets a caller cap how much a single vector may claim, so an oversized
//! request fails with [`GroverError::AllocationError`] before the allocator is
//! ever asked. Tests use a tiny budget to exercise the allocation failure path
//! without touching real memory limits.

use crate::error::{GroverError, Result};

/// Bytes per amplitude (`f64`)
pub const AMPLITUDE_BYTES: usize = std::mem::size_of::<f64>();

/// Ceiling on the bytes one amplitude vector may occupy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryBudget {
    /// Maximum bytes per vector (`None` = unlimited)
    pub max_bytes: Option<usize>,
}

impl MemoryBudget {
    /// Budget that never refuses (the allocator still may)
    #[must_use]
    pub fn unlimited() -> Self {
        Self { max_bytes: None }
    }

    /// Budget capped at `max_bytes`
    #[must_use]
    pub fn with_max_bytes(max_bytes: usize) -> Self {
        Self {
            max_bytes: Some(max_bytes),
        }
    }

    /// Check whether a vector of `len` amplitudes fits
    ///
    /// Returns the byte count the vector needs.
    ///
    /// # Errors
    ///
    /// Returns `AllocationError` if the byte count overflows `usize` or
    /// exceeds the budget.
    pub fn check(&self, len: usize) -> Result<usize> {
        let bytes = required_bytes(len)?;
        match self.max_bytes {
            Some(max) if bytes > max => Err(GroverError::AllocationError {
                requested_bytes: Some(bytes),
                reason: format!("{bytes} bytes requested, budget is {max} bytes"),
            }),
            _ => Ok(bytes),
        }
    }

    /// Whether this budget imposes any limit
    #[must_use]
    pub fn is_limited(&self) -> bool {
        self.max_bytes.is_some()
    }
}

/// Bytes needed for `len` amplitudes
///
/// # Errors
///
/// Returns `AllocationError` if `len * 8` does not fit in `usize`, or exceeds
/// `isize::MAX` (the largest allocation Rust permits).
pub fn required_bytes(len: usize) -> Result<usize> {
    len.checked_mul(AMPLITUDE_BYTES)
        .filter(|&bytes| bytes <= isize::MAX as usize)
        .ok_or_else(|| GroverError::AllocationError {
            requested_bytes: None,
            reason: format!("{len} amplitudes exceed the addressable allocation size"),
        })
}

/// Human-readable byte count (for log lines)
#[must_use]
pub fn format_bytes(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = KB * 1024;
    const GB: usize = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GiB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MiB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KiB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}
