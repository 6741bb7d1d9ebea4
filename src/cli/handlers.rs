//! Argument definitions and command handlers
//!
//! Handlers write user-facing output to a caller-supplied writer so tests can
//! capture it.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use clap::{Parser, Subcommand};

use crate::bench::{self, BenchmarkHarness, ResultSink, SweepConfig, TrialResult};
use crate::error::{GroverError, Result};
use crate::kernel::{
    self, max_threads, validate_power_of_two, validate_size, validate_threads, KernelConfig,
    RunMode, TargetPolicy,
};
use crate::report::{format_row, CsvReport};

/// Size used by `kernel` when none is given
pub const DEFAULT_KERNEL_SIZE: usize = 1 << 16;

/// Grover amplitude-amplification benchmark
///
/// With no subcommand, runs the default sweep and writes data/results.csv.
#[derive(Parser, Debug)]
#[command(name = "grover-bench")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Run mode (omit for the default sweep)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Single-shot run modes
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Time one serial run of size N (power of two)
    ///
    /// Prints one CSV row: serial,N,iterations,1,seconds
    Serial {
        /// Vector size (positive power of two)
        #[arg(value_name = "N", allow_hyphen_values = true)]
        size: String,
    },
    /// Time one parallel run of size N with T workers
    ///
    /// Prints one CSV row: parallel,N,iterations,T,seconds
    Parallel {
        /// Vector size (positive power of two)
        #[arg(value_name = "N", allow_hyphen_values = true)]
        size: String,

        /// Worker count
        #[arg(value_name = "T", allow_hyphen_values = true)]
        threads: String,
    },
    /// Time the parallel kernel alone and print elapsed seconds
    ///
    /// Any positive N is accepted; the target is N/3.
    Kernel {
        /// Vector size (default 65536)
        #[arg(value_name = "N", allow_hyphen_values = true)]
        size: Option<String>,

        /// Worker count (default: all available cores)
        #[arg(value_name = "T", allow_hyphen_values = true)]
        threads: Option<String>,
    },
}

/// Parse a size argument
///
/// # Errors
///
/// Returns `InvalidArgument` if `arg` is not an integer.
pub fn parse_size_arg(arg: &str) -> Result<i64> {
    parse_integer("N", arg)
}

/// Parse a worker-count argument
///
/// # Errors
///
/// Returns `InvalidArgument` if `arg` is not an integer.
pub fn parse_threads_arg(arg: &str) -> Result<i64> {
    parse_integer("T", arg)
}

fn parse_integer(name: &str, arg: &str) -> Result<i64> {
    arg.trim()
        .parse::<i64>()
        .map_err(|_| GroverError::InvalidArgument {
            name: name.to_string(),
            value: arg.to_string(),
        })
}

fn write_line<W: Write>(out: &mut W, line: &str) -> Result<()> {
    writeln!(out, "{line}").map_err(|e| GroverError::IoError {
        message: format!("Failed to write output: {e}"),
    })
}

// ============================================================================
// Default sweep
// ============================================================================

/// Streams rows into the results file and announces each finished size
struct SweepProgress<'a, W: Write> {
    report: CsvReport<BufWriter<File>>,
    out: &'a mut W,
}

impl<W: Write> ResultSink for SweepProgress<'_, W> {
    fn on_trial(&mut self, result: &TrialResult) -> Result<()> {
        self.report.append(result)
    }

    fn on_size_complete(&mut self, size: usize) -> Result<()> {
        self.report.flush()?;
        write_line(&mut *self.out, &format!("Completed N={size}"))
    }
}

/// Run a sweep, writing rows to `path` as they complete
///
/// # Errors
///
/// Returns the first configuration, kernel, or I/O error.
pub fn handle_sweep<W: Write>(
    config: SweepConfig,
    path: &Path,
    out: &mut W,
) -> Result<Vec<TrialResult>> {
    // Validate before touching the filesystem
    config.validate()?;

    let report = CsvReport::create(path)?;
    let mut progress = SweepProgress {
        report,
        out: &mut *out,
    };
    let results = BenchmarkHarness::new(config).run(&mut progress)?;
    progress.report.flush()?;

    write_line(out, &format!("Results written to {}", path.display()))?;
    Ok(results)
}

// ============================================================================
// Single-shot modes
// ============================================================================

/// `serial N`: one serial trial, target chosen by `policy`
///
/// # Errors
///
/// Returns `InvalidArgument` if N is not an integer, `InvalidSize` unless N
/// is a positive power of two, or the kernel's error.
pub fn handle_serial<W: Write>(
    size: &str,
    policy: TargetPolicy,
    out: &mut W,
) -> Result<TrialResult> {
    let n = validate_power_of_two(parse_size_arg(size)?)?;
    let result = bench::run_single(RunMode::Serial, n, 1, policy)?;
    write_line(out, &format_row(&result))?;
    Ok(result)
}

/// `parallel N T`: one parallel trial, target chosen by `policy`
///
/// # Errors
///
/// Returns `InvalidArgument` if N or T is not an integer, `InvalidSize`
/// unless N is a positive power of two, `InvalidThreadCount` unless T is
/// positive, or the kernel's error.
pub fn handle_parallel<W: Write>(
    size: &str,
    threads: &str,
    policy: TargetPolicy,
    out: &mut W,
) -> Result<TrialResult> {
    let n = validate_power_of_two(parse_size_arg(size)?)?;
    let t = validate_threads(parse_threads_arg(threads)?)?;
    let result = bench::run_single(RunMode::Parallel, n, t, policy)?;
    write_line(out, &format_row(&result))?;
    Ok(result)
}

/// `kernel [N] [T]`: time the parallel kernel and print only the seconds
///
/// # Errors
///
/// Returns `InvalidArgument` for a non-integer N or T, `InvalidSize` for a
/// non-positive N, `InvalidThreadCount` for a non-positive T, or the
/// kernel's error.
pub fn handle_kernel<W: Write>(
    size: Option<&str>,
    threads: Option<&str>,
    out: &mut W,
) -> Result<f64> {
    let n = match size {
        Some(arg) => validate_size(parse_size_arg(arg)?)?,
        None => DEFAULT_KERNEL_SIZE,
    };
    let t = match threads {
        Some(arg) => validate_threads(parse_threads_arg(arg)?)?,
        None => max_threads(),
    };

    let config = KernelConfig::new(n)
        .with_target(TargetPolicy::OneThird.resolve(n))
        .with_mode(RunMode::Parallel)
        .with_threads(t);
    let elapsed = kernel::run(&config)?;
    write_line(out, &format!("{elapsed:.9}"))?;
    Ok(elapsed)
}
