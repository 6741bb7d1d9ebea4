//! # grover-bench
//!
//! Serial vs data-parallel benchmark of the amplitude-amplification core of
//! Grover's search.
//!
//! The register is a dense vector of real `f64` amplitudes. Each iteration
//! applies the phase oracle (negate the marked amplitude) and the diffuser
//! (reflect every amplitude about the mean). The diffuser comes in a serial
//! form and a rayon-backed form whose reduction and rewrite phases are
//! separated by a hard barrier; both produce the same register to within
//! floating-point summation error, and identical bits on one worker.
//!
//! ## Example
//!
//! ```rust
//! use grover_bench::{kernel, KernelConfig, RunMode};
//!
//! // N = 4096, target 1365, floor(pi/4 * 64) = 50 iterations
//! let config = KernelConfig::new(4096);
//! assert_eq!(config.iterations, 50);
//!
//! let serial = kernel::run(&config).unwrap();
//! let parallel = kernel::run(&config.clone().with_mode(RunMode::Parallel).with_threads(4)).unwrap();
//! assert!(serial >= 0.0 && parallel >= 0.0);
//! ```
//!
//! ## Layout
//!
//! - [`state`]: the amplitude register
//! - [`memory`]: per-vector memory budget
//! - [`oracle`]: sign-flip marking
//! - [`diffuser`]: serial and parallel inversion about the mean
//! - [`kernel`]: iteration count, target policy, the timed loop
//! - [`bench`]: size sweeps and single-shot runs
//! - [`report`]: CSV output
//! - [`cli`]: process entry points

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)] // usize -> f64 for N and timings
#![allow(clippy::cast_possible_truncation)] // floor(pi/4 * sqrt(N)) -> usize
#![allow(clippy::cast_sign_loss)] // iteration count is never negative
#![allow(clippy::must_use_candidate)] // Not all methods need #[must_use]
#![allow(clippy::doc_markdown)] // Allow technical terms without backticks
#![allow(clippy::float_cmp)] // Bit-exact comparisons in tests

/// Harness: size sweeps, trial results, and single-shot runs
pub mod bench;
/// CLI command implementations (extracted for testability)
pub mod cli;
pub mod diffuser;
pub mod error;
pub mod kernel;
pub mod memory;
pub mod oracle;
pub mod report;
pub mod state;

// Re-exports for convenience
pub use bench::{BenchmarkHarness, SweepConfig, TrialResult};
pub use error::{GroverError, Result};
pub use kernel::{KernelConfig, RunMode, TargetPolicy};
pub use state::StateVector;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
