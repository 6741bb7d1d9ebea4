//! Diffusion operator (inversion about the mean)
//!
//! Two implementations of the same reflection `v[i] = 2*mean - v[i]`:
//!
//! - [`apply_serial`]: one left-to-right accumulation, then one rewrite pass.
//! - [`ParallelDiffuser`] / [`apply_parallel`]: a fan-in reduction over
//!   contiguous chunks followed by a fan-out rewrite of the same chunks, run
//!   on a rayon pool sized by the caller.
//!
//! The reduction completes (and the mean is fixed) before any worker starts
//! rewriting. Partial sums are combined in chunk order, so a given
//! `(N, threads)` pair always rounds the same way, and a single worker
//! reproduces the serial result bit for bit.

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::error::{GroverError, Result};
use crate::kernel::RunMode;
use crate::state::StateVector;

/// Reflect every amplitude about the vector mean, on the calling thread
pub fn apply_serial(vector: &mut StateVector) {
    let amplitudes = vector.as_mut_slice();
    let mean = sum(amplitudes) / amplitudes.len() as f64;
    reflect(amplitudes, mean);
}

/// Reflect every amplitude about the vector mean using `threads` workers
///
/// Builds a pool for this one call. Runs that apply the diffuser repeatedly
/// should hold a [`ParallelDiffuser`] instead.
///
/// # Errors
///
/// Returns `InvalidThreadCount` if `threads == 0` and `ThreadPool` if the
/// workers cannot be spawned.
pub fn apply_parallel(vector: &mut StateVector, threads: usize) -> Result<()> {
    let diffuser = ParallelDiffuser::for_len(threads, vector.len())?;
    diffuser.apply(vector);
    Ok(())
}

/// Chunk length used to split `len` amplitudes across `threads` workers
///
/// When `threads > len` the partition count is clamped to `len`, so no chunk
/// is ever empty.
#[must_use]
pub fn partition_len(len: usize, threads: usize) -> usize {
    let parts = threads.clamp(1, len.max(1));
    len.div_ceil(parts).max(1)
}

#[inline]
fn sum(amplitudes: &[f64]) -> f64 {
    amplitudes.iter().fold(0.0, |acc, &a| acc + a)
}

#[inline]
fn reflect(amplitudes: &mut [f64], mean: f64) {
    let twice_mean = 2.0 * mean;
    for a in amplitudes {
        *a = twice_mean - *a;
    }
}

/// Data-parallel diffuser owning a fixed-size worker pool
///
/// The pool lives as long as the diffuser, typically one kernel run. Workers
/// keep no state between calls.
#[derive(Debug)]
pub struct ParallelDiffuser {
    pool: ThreadPool,
    threads: usize,
    workers: usize,
}

impl ParallelDiffuser {
    /// Spin up a pool of `threads` workers
    ///
    /// # Errors
    ///
    /// Returns `InvalidThreadCount` if `threads == 0` and `ThreadPool` if the
    /// workers cannot be spawned.
    pub fn new(threads: usize) -> Result<Self> {
        Self::build(threads, threads)
    }

    /// Pool for vectors of `len` amplitudes
    ///
    /// Only `min(threads, len)` partitions ever exist, so no more workers than
    /// that are spawned. [`threads`](Self::threads) still reports the
    /// requested count.
    ///
    /// # Errors
    ///
    /// Same as [`ParallelDiffuser::new`].
    pub fn for_len(threads: usize, len: usize) -> Result<Self> {
        Self::build(threads, threads.min(len.max(1)))
    }

    fn build(threads: usize, workers: usize) -> Result<Self> {
        if threads == 0 {
            return Err(GroverError::InvalidThreadCount { threads: 0 });
        }
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("grover-diffuser-{i}"))
            .build()
            .map_err(|e| GroverError::ThreadPool {
                reason: e.to_string(),
            })?;
        Ok(Self {
            pool,
            threads,
            workers,
        })
    }

    /// Requested worker count (sets the partitioning)
    #[must_use]
    pub fn threads(&self) -> usize {
        self.threads
    }

    /// OS threads actually backing the pool
    #[must_use]
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Reflect every amplitude about the vector mean
    pub fn apply(&self, vector: &mut StateVector) {
        let amplitudes = vector.as_mut_slice();
        let len = amplitudes.len();
        let chunk = partition_len(len, self.threads);

        self.pool.install(|| {
            // Reduction: partial sums come back in chunk order
            let partials: Vec<f64> = amplitudes.par_chunks(chunk).map(sum).collect();
            let mean = sum(&partials) / len as f64;

            // Broadcast: every chunk sees the same finalized mean
            amplitudes
                .par_chunks_mut(chunk)
                .for_each(|part| reflect(part, mean));
        });
    }
}

/// Diffuser selected by run mode
#[derive(Debug)]
pub enum Diffuser {
    /// Single-threaded reflection
    Serial,
    /// Pool-backed reflection
    Parallel(ParallelDiffuser),
}

impl Diffuser {
    /// Build the diffuser for `mode` over vectors of `len` amplitudes
    ///
    /// `threads` is ignored in serial mode.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`ParallelDiffuser::new`] in parallel mode.
    pub fn for_mode(mode: RunMode, threads: usize, len: usize) -> Result<Self> {
        match mode {
            RunMode::Serial => Ok(Self::Serial),
            RunMode::Parallel => {
                ParallelDiffuser::for_len(threads, len).map(Self::Parallel)
            },
        }
    }

    /// Worker count (1 for serial)
    #[must_use]
    pub fn threads(&self) -> usize {
        match self {
            Self::Serial => 1,
            Self::Parallel(p) => p.threads(),
        }
    }

    /// Reflect every amplitude about the vector mean
    #[inline]
    pub fn apply(&self, vector: &mut StateVector) {
        match self {
            Self::Serial => apply_serial(vector),
            Self::Parallel(p) => p.apply(vector),
        }
    }
}
