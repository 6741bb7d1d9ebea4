//! Error types for grover-bench
//!
//! Every fallible operation in the crate returns [`Result`], and every failure
//! aborts the current run. Nothing is retried.

use thiserror::Error;

/// Marker written to stderr when amplitude storage cannot be obtained
pub const ALLOCATION_MARKER: &str = "ERROR:MEM";

/// Error type for all grover-bench operations
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GroverError {
    /// Vector size is non-positive, or not a power of two where one is required
    #[error("Invalid size {size}: {reason}")]
    InvalidSize {
        /// Size as supplied by the caller
        size: i64,
        /// Why the size was rejected
        reason: String,
    },

    /// Amplitude storage could not be obtained
    #[error("ERROR:MEM allocation failed: {reason}")]
    AllocationError {
        /// Bytes requested, if the byte count itself did not overflow
        requested_bytes: Option<usize>,
        /// Allocator or budget message
        reason: String,
    },

    /// Worker count for a parallel run is non-positive
    #[error("Invalid thread count {threads}: must be at least 1")]
    InvalidThreadCount {
        /// Thread count as supplied by the caller
        threads: i64,
    },

    /// Target index outside `[0, len)`
    #[error("Target index {index} out of range for vector of length {len}")]
    IndexOutOfRange {
        /// Offending index
        index: usize,
        /// Vector length
        len: usize,
    },

    /// Worker pool could not be built
    #[error("Thread pool error: {reason}")]
    ThreadPool {
        /// Message from the pool builder
        reason: String,
    },

    /// Filesystem error while writing results
    #[error("IO error: {message}")]
    IoError {
        /// Error message
        message: String,
    },

    /// Command-line argument is not an integer
    #[error("Invalid argument {name}: '{value}' is not an integer")]
    InvalidArgument {
        /// Argument name as shown in usage (`N`, `T`)
        name: String,
        /// Text as supplied by the caller
        value: String,
    },

    /// Configuration value could not be parsed
    #[error("Invalid configuration {key}={value}")]
    InvalidConfiguration {
        /// Configuration key (usually an environment variable name)
        key: String,
        /// Rejected value
        value: String,
    },
}

impl GroverError {
    /// True for storage failures, which get their own exit code and marker
    #[must_use]
    pub fn is_allocation(&self) -> bool {
        matches!(self, Self::AllocationError { .. })
    }
}

/// Result type alias for grover-bench operations
pub type Result<T> = std::result::Result<T, GroverError>;
