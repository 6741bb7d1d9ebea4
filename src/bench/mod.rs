//! Benchmark harness: serial vs parallel sweeps of the Grover kernel
//!
//! The harness walks a list of vector sizes in ascending order. For each size
//! it runs `trials` serial timings, then `trials` parallel timings for every
//! configured worker count, strictly one after another so that no trial
//! contends with another for cores or memory bandwidth. Every trial gets a
//! freshly allocated register.
//!
//! Any failure aborts the whole sweep. Larger sizes only add memory pressure,
//! so there is no fallback to a smaller configuration.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{GroverError, Result};
use crate::kernel::{self, iteration_count, max_threads, KernelConfig, RunMode, TargetPolicy};
use crate::memory::MemoryBudget;

/// Default sweep sizes: 2^12 through 2^24 in steps of 4x
pub const DEFAULT_SIZES: [usize; 7] = [
    1 << 12,
    1 << 14,
    1 << 16,
    1 << 18,
    1 << 20,
    1 << 22,
    1 << 24,
];

/// Default timed trials per configuration
pub const DEFAULT_TRIALS: usize = 3;

/// Environment variable: trials per configuration
pub const ENV_TRIALS: &str = "GROVER_TRIALS";
/// Environment variable: comma-separated parallel worker counts, or `max`
pub const ENV_THREADS: &str = "GROVER_THREADS";
/// Environment variable: comma-separated sweep sizes
pub const ENV_SIZES: &str = "GROVER_SIZES";
/// Environment variable: per-vector memory ceiling in bytes
pub const ENV_MEMORY_LIMIT: &str = "GROVER_MEMORY_LIMIT";

// ============================================================================
// Trial results
// ============================================================================

/// One timed execution of the kernel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialResult {
    /// Diffuser mode
    pub mode: RunMode,
    /// Vector size N
    pub size: usize,
    /// Oracle+diffuser rounds
    pub iterations: usize,
    /// Worker count (1 for serial)
    pub threads: usize,
    /// Wall-clock seconds for the iteration loop
    pub elapsed_seconds: f64,
}

/// Receiver for results as a sweep progresses
///
/// Lets the caller stream rows to disk as they are produced instead of
/// waiting for the whole sweep.
pub trait ResultSink {
    /// Called after every trial
    ///
    /// # Errors
    ///
    /// An error aborts the sweep.
    fn on_trial(&mut self, result: &TrialResult) -> Result<()>;

    /// Called after every trial of `size` has completed
    ///
    /// # Errors
    ///
    /// An error aborts the sweep.
    fn on_size_complete(&mut self, _size: usize) -> Result<()> {
        Ok(())
    }
}

impl ResultSink for Vec<TrialResult> {
    fn on_trial(&mut self, result: &TrialResult) -> Result<()> {
        self.push(result.clone());
        Ok(())
    }
}

/// Sink that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ResultSink for NullSink {
    fn on_trial(&mut self, _result: &TrialResult) -> Result<()> {
        Ok(())
    }
}

// ============================================================================
// Sweep configuration
// ============================================================================

/// Sizes, repetitions and worker counts for a sweep
#[derive(Debug, Clone, PartialEq)]
pub struct SweepConfig {
    /// Vector sizes, processed in the order given
    pub sizes: Vec<usize>,
    /// Timed trials per (size, mode, threads) configuration
    pub trials: usize,
    /// Worker counts for the parallel trials of each size
    pub parallel_threads: Vec<usize>,
    /// Target selection; resolved once per size
    pub target: TargetPolicy,
    /// Per-vector memory ceiling
    pub budget: MemoryBudget,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            sizes: DEFAULT_SIZES.to_vec(),
            trials: DEFAULT_TRIALS,
            parallel_threads: vec![max_threads()],
            target: TargetPolicy::OneThird,
            budget: MemoryBudget::unlimited(),
        }
    }
}

impl SweepConfig {
    /// Default sweep
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the size list
    #[must_use]
    pub fn with_sizes(mut self, sizes: Vec<usize>) -> Self {
        self.sizes = sizes;
        self
    }

    /// Set trials per configuration
    #[must_use]
    pub fn with_trials(mut self, trials: usize) -> Self {
        self.trials = trials;
        self
    }

    /// Replace the parallel worker counts
    #[must_use]
    pub fn with_parallel_threads(mut self, threads: Vec<usize>) -> Self {
        self.parallel_threads = threads;
        self
    }

    /// Set the target policy
    #[must_use]
    pub fn with_target(mut self, target: TargetPolicy) -> Self {
        self.target = target;
        self
    }

    /// Set the memory budget
    #[must_use]
    pub fn with_budget(mut self, budget: MemoryBudget) -> Self {
        self.budget = budget;
        self
    }

    /// Default sweep with `GROVER_*` environment overrides applied
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if a variable is set but unparsable.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Default sweep with overrides read through `lookup`
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if a value is present but unparsable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_TRIALS) {
            config.trials = parse_positive(ENV_TRIALS, &value)?;
        }
        if let Some(value) = lookup(ENV_THREADS) {
            config.parallel_threads = if value.trim().eq_ignore_ascii_case("max") {
                vec![max_threads()]
            } else {
                parse_list(ENV_THREADS, &value)?
            };
        }
        if let Some(value) = lookup(ENV_SIZES) {
            config.sizes = parse_list(ENV_SIZES, &value)?;
        }
        if let Some(value) = lookup(ENV_MEMORY_LIMIT) {
            let bytes = value
                .trim()
                .parse::<usize>()
                .map_err(|_| invalid(ENV_MEMORY_LIMIT, &value))?;
            config.budget = MemoryBudget::with_max_bytes(bytes);
        }

        Ok(config)
    }

    /// Check the configuration before any trial runs
    ///
    /// # Errors
    ///
    /// - `InvalidSize` for a zero size
    /// - `InvalidThreadCount` for a zero worker count
    /// - `InvalidConfiguration` for zero trials, empty lists, or sizes that
    ///   are not strictly ascending
    pub fn validate(&self) -> Result<()> {
        if self.sizes.is_empty() {
            return Err(invalid("sizes", ""));
        }
        if self.trials == 0 {
            return Err(invalid("trials", "0"));
        }
        if self.parallel_threads.is_empty() {
            return Err(invalid("parallel_threads", ""));
        }
        if self.sizes.contains(&0) {
            return Err(GroverError::InvalidSize {
                size: 0,
                reason: "sweep sizes must be positive".to_string(),
            });
        }
        if self.parallel_threads.contains(&0) {
            return Err(GroverError::InvalidThreadCount { threads: 0 });
        }
        // Memory pressure must only grow, so an allocation failure ends the sweep
        if self.sizes.windows(2).any(|pair| pair[0] >= pair[1]) {
            let listed: Vec<String> = self.sizes.iter().map(ToString::to_string).collect();
            return Err(invalid("sizes", &listed.join(",")));
        }
        Ok(())
    }

    /// Trials the sweep will run in total
    #[must_use]
    pub fn total_trials(&self) -> usize {
        self.sizes.len() * self.trials * (1 + self.parallel_threads.len())
    }
}

fn invalid(key: &str, value: &str) -> GroverError {
    GroverError::InvalidConfiguration {
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn parse_positive(key: &str, value: &str) -> Result<usize> {
    match value.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(invalid(key, value)),
    }
}

fn parse_list(key: &str, value: &str) -> Result<Vec<usize>> {
    value
        .split(',')
        .map(|item| parse_positive(key, item).map_err(|_| invalid(key, value)))
        .collect()
}

// ============================================================================
// Harness
// ============================================================================

/// Runs a [`SweepConfig`] one trial at a time
#[derive(Debug, Clone)]
pub struct BenchmarkHarness {
    config: SweepConfig,
}

impl BenchmarkHarness {
    /// Create a harness for `config`
    #[must_use]
    pub fn new(config: SweepConfig) -> Self {
        Self { config }
    }

    /// Sweep configuration
    #[must_use]
    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    /// Run the whole sweep, reporting each trial to `sink`
    ///
    /// Returns every result in execution order.
    ///
    /// # Errors
    ///
    /// Returns the first configuration, kernel, or sink error; the sweep
    /// stops there.
    pub fn run<S: ResultSink>(&self, sink: &mut S) -> Result<Vec<TrialResult>> {
        self.config.validate()?;

        let mut results = Vec::with_capacity(self.config.total_trials());
        for &size in &self.config.sizes {
            let iterations = iteration_count(size);
            let target = self.config.target.resolve(size);
            let base = KernelConfig::new(size)
                .with_target(target)
                .with_iterations(iterations);

            for _ in 0..self.config.trials {
                let result = run_trial(&base, &self.config.budget)?;
                sink.on_trial(&result)?;
                results.push(result);
            }

            for &threads in &self.config.parallel_threads {
                let parallel = base.clone().with_mode(RunMode::Parallel).with_threads(threads);
                for _ in 0..self.config.trials {
                    let result = run_trial(&parallel, &self.config.budget)?;
                    sink.on_trial(&result)?;
                    results.push(result);
                }
            }

            sink.on_size_complete(size)?;
            info!(size, iterations, target, "sweep size complete");
        }

        Ok(results)
    }
}

/// Time one kernel run and package it as a [`TrialResult`]
///
/// # Errors
///
/// Returns the kernel's error unchanged.
pub fn run_trial(config: &KernelConfig, budget: &MemoryBudget) -> Result<TrialResult> {
    let elapsed_seconds = kernel::run_with_budget(config, budget)?;
    let result = TrialResult {
        mode: config.mode,
        size: config.size,
        iterations: config.iterations,
        threads: config.effective_threads(),
        elapsed_seconds,
    };
    debug!(
        mode = %result.mode,
        size = result.size,
        threads = result.threads,
        elapsed_seconds,
        "trial complete"
    );
    Ok(result)
}

/// One ad hoc timed run outside a sweep
///
/// The target comes from `policy`; the iteration count from the size.
///
/// # Errors
///
/// Returns the kernel's error unchanged.
pub fn run_single(
    mode: RunMode,
    size: usize,
    threads: usize,
    policy: TargetPolicy,
) -> Result<TrialResult> {
    let config = KernelConfig::new(size)
        .with_target(policy.resolve(size))
        .with_mode(mode)
        .with_threads(threads);
    run_trial(&config, &MemoryBudget::unlimited())
}

#[cfg(test)]
#[path = "tests.rs"]
mod bench_tests;
