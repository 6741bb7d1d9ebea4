//! Iteration controller
//!
//! One parameterized kernel serves every entry point: allocate a uniform
//! register, validate the target and worker count once, then time
//! `iterations` rounds of oracle followed by diffuser. The mode flag picks
//! the serial or parallel diffuser; nothing else differs between modes.

use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::diffuser::Diffuser;
use crate::error::{GroverError, Result};
use crate::memory::{format_bytes, MemoryBudget};
use crate::oracle::Oracle;
use crate::state::StateVector;

/// Execution mode of the diffuser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// Single-threaded diffuser
    Serial,
    /// Pool-backed data-parallel diffuser
    Parallel,
}

impl RunMode {
    /// Lowercase name used in reports
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Serial => "serial",
            Self::Parallel => "parallel",
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RunMode {
    type Err = GroverError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "serial" => Ok(Self::Serial),
            "parallel" => Ok(Self::Parallel),
            other => Err(GroverError::InvalidConfiguration {
                key: "mode".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// Grover iteration count `floor(pi/4 * sqrt(N))`
///
/// # Examples
///
/// ```
/// use grover_bench::kernel::iteration_count;
///
/// assert_eq!(iteration_count(4096), 50);
/// assert_eq!(iteration_count(65536), 201);
/// ```
#[must_use]
pub fn iteration_count(size: usize) -> usize {
    (std::f64::consts::FRAC_PI_4 * (size as f64).sqrt()).floor() as usize
}

/// Maximum practical worker count for this machine
#[must_use]
pub fn max_threads() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

/// Validate a caller-supplied vector size
///
/// # Errors
///
/// Returns `InvalidSize` if `size <= 0` or does not fit in `usize`.
pub fn validate_size(size: i64) -> Result<usize> {
    if size <= 0 {
        return Err(GroverError::InvalidSize {
            size,
            reason: "vector size must be positive".to_string(),
        });
    }
    usize::try_from(size).map_err(|_| GroverError::InvalidSize {
        size,
        reason: "vector size exceeds the address space".to_string(),
    })
}

/// Validate a size that must be a positive power of two
///
/// # Errors
///
/// Returns `InvalidSize` if `size` is non-positive or not a power of two.
pub fn validate_power_of_two(size: i64) -> Result<usize> {
    let n = validate_size(size)?;
    if !n.is_power_of_two() {
        return Err(GroverError::InvalidSize {
            size,
            reason: "N must be power of two".to_string(),
        });
    }
    Ok(n)
}

/// Validate a caller-supplied worker count
///
/// # Errors
///
/// Returns `InvalidThreadCount` if `threads <= 0`.
pub fn validate_threads(threads: i64) -> Result<usize> {
    if threads <= 0 {
        return Err(GroverError::InvalidThreadCount { threads });
    }
    usize::try_from(threads).map_err(|_| GroverError::InvalidThreadCount { threads })
}

// ============================================================================
// Target selection
// ============================================================================

/// How the marked index is chosen for a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TargetPolicy {
    /// Always this index (validated against N by the kernel)
    Fixed(usize),
    /// `N / 3`, stable across trials of the same size
    #[default]
    OneThird,
    /// Uniform in `[0, N)`; reproducible when seeded
    Random {
        /// Seed for `StdRng`; `None` draws from the thread RNG
        seed: Option<u64>,
    },
}

impl TargetPolicy {
    /// Pick the target for a vector of `size` amplitudes
    #[must_use]
    pub fn resolve(&self, size: usize) -> usize {
        match *self {
            Self::Fixed(index) => index,
            Self::OneThird => size / 3,
            Self::Random { .. } if size == 0 => 0,
            Self::Random { seed: Some(seed) } => StdRng::seed_from_u64(seed).gen_range(0..size),
            Self::Random { seed: None } => rand::thread_rng().gen_range(0..size),
        }
    }
}

// ============================================================================
// Kernel
// ============================================================================

/// Parameters of one timed kernel run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KernelConfig {
    /// Number of amplitudes N
    pub size: usize,
    /// Marked index
    pub target: usize,
    /// Oracle+diffuser rounds
    pub iterations: usize,
    /// Diffuser mode
    pub mode: RunMode,
    /// Worker count for parallel mode (ignored in serial mode)
    pub threads: usize,
}

impl KernelConfig {
    /// Serial run over `size` amplitudes, target `size / 3`, standard
    /// iteration count
    #[must_use]
    pub fn new(size: usize) -> Self {
        Self {
            size,
            target: size / 3,
            iterations: iteration_count(size),
            mode: RunMode::Serial,
            threads: 1,
        }
    }

    /// Set the marked index
    #[must_use]
    pub fn with_target(mut self, target: usize) -> Self {
        self.target = target;
        self
    }

    /// Override the iteration count
    #[must_use]
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Set the diffuser mode
    #[must_use]
    pub fn with_mode(mut self, mode: RunMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the worker count
    #[must_use]
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Worker count reported for this run (1 in serial mode)
    #[must_use]
    pub fn effective_threads(&self) -> usize {
        match self.mode {
            RunMode::Serial => 1,
            RunMode::Parallel => self.threads,
        }
    }
}

/// Time one kernel run, returning elapsed wall-clock seconds
///
/// # Errors
///
/// See [`run_with_budget`].
pub fn run(config: &KernelConfig) -> Result<f64> {
    run_with_budget(config, &MemoryBudget::unlimited())
}

/// Time one kernel run with a cap on vector memory
///
/// # Errors
///
/// - `InvalidSize` if `config.size == 0` (before any allocation)
/// - `AllocationError` if the vector exceeds `budget` or cannot be allocated
/// - `IndexOutOfRange` if `config.target >= config.size`
/// - `InvalidThreadCount` if parallel mode is requested with zero threads
pub fn run_with_budget(config: &KernelConfig, budget: &MemoryBudget) -> Result<f64> {
    let (mut state, oracle, diffuser) = prepare(config, budget)?;

    let start = Instant::now();
    iterate(&mut state, &oracle, &diffuser, config.iterations);
    let elapsed = start.elapsed().as_secs_f64();

    trace!(
        mode = %config.mode,
        size = config.size,
        elapsed,
        "kernel run complete"
    );
    Ok(elapsed)
}

/// Run the kernel untimed and return the final register
///
/// Same setup and loop as [`run`]; used to check that the marked amplitude is
/// actually amplified.
///
/// # Errors
///
/// Same as [`run_with_budget`].
pub fn simulate(config: &KernelConfig) -> Result<StateVector> {
    let (mut state, oracle, diffuser) = prepare(config, &MemoryBudget::unlimited())?;
    iterate(&mut state, &oracle, &diffuser, config.iterations);
    Ok(state)
}

fn prepare(
    config: &KernelConfig,
    budget: &MemoryBudget,
) -> Result<(StateVector, Oracle, Diffuser)> {
    if config.size == 0 {
        return Err(GroverError::InvalidSize {
            size: 0,
            reason: "vector size must be positive".to_string(),
        });
    }

    let mut state = StateVector::with_budget(config.size, budget)?;
    state.initialize_uniform();

    let oracle = Oracle::new(config.target, config.size)?;
    let diffuser = Diffuser::for_mode(config.mode, config.threads, config.size)?;

    debug!(
        mode = %config.mode,
        size = config.size,
        bytes = %format_bytes(state.size_bytes()),
        target = config.target,
        iterations = config.iterations,
        threads = diffuser.threads(),
        "kernel prepared"
    );
    Ok((state, oracle, diffuser))
}

#[inline]
fn iterate(state: &mut StateVector, oracle: &Oracle, diffuser: &Diffuser, iterations: usize) {
    for _ in 0..iterations {
        oracle.mark(state);
        diffuser.apply(state);
    }
}
