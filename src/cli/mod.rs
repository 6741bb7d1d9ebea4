//! CLI command implementations
//!
//! This module contains the business logic behind the `grover-bench` binary,
//! extracted from main.rs for testability. `main` only parses arguments,
//! installs logging, and exits with the code [`entrypoint`] returns.
//!
//! Exit codes:
//!
//! | code | meaning |
//! |------|---------|
//! | 0 | success |
//! | 1 | invalid argument in `serial`/`parallel`, bad configuration, or I/O failure |
//! | 2 | invalid/non-positive argument to `kernel` |
//! | 3 | allocation failure (`ERROR:MEM` on stderr) |

use std::io::Write;

use crate::bench::SweepConfig;
use crate::error::{GroverError, Result};
use crate::kernel::TargetPolicy;
use crate::report::results_path;

pub mod handlers;
pub use handlers::{
    handle_kernel, handle_parallel, handle_serial, handle_sweep, parse_size_arg,
    parse_threads_arg, Cli, Commands, DEFAULT_KERNEL_SIZE,
};

/// Successful run
pub const EXIT_OK: i32 = 0;
/// Invalid argument to a single-shot mode, bad configuration, or I/O failure
pub const EXIT_INVALID_ARGUMENT: i32 = 1;
/// Invalid argument to the standalone kernel mode
pub const EXIT_INVALID_KERNEL_ARGUMENT: i32 = 2;
/// Amplitude storage could not be obtained
pub const EXIT_ALLOCATION: i32 = 3;

/// Which entry point produced an error (the same error maps to different
/// exit codes per entry point)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryPoint {
    /// No arguments: default sweep
    Sweep,
    /// `serial N`
    Serial,
    /// `parallel N T`
    Parallel,
    /// `kernel [N] [T]`
    Kernel,
}

impl EntryPoint {
    /// Entry point selected by parsed arguments
    #[must_use]
    pub fn of(command: Option<&Commands>) -> Self {
        match command {
            None => Self::Sweep,
            Some(Commands::Serial { .. }) => Self::Serial,
            Some(Commands::Parallel { .. }) => Self::Parallel,
            Some(Commands::Kernel { .. }) => Self::Kernel,
        }
    }
}

/// Process exit code for `err` raised by `entry`
#[must_use]
pub fn exit_code(err: &GroverError, entry: EntryPoint) -> i32 {
    match (err, entry) {
        (GroverError::AllocationError { .. }, _) => EXIT_ALLOCATION,
        (
            GroverError::InvalidSize { .. }
            | GroverError::InvalidThreadCount { .. }
            | GroverError::InvalidArgument { .. },
            EntryPoint::Kernel,
        ) => EXIT_INVALID_KERNEL_ARGUMENT,
        _ => EXIT_INVALID_ARGUMENT,
    }
}

/// Target policy for the single-shot `serial` and `parallel` modes
///
/// Ad hoc runs draw a fresh random target each invocation; sweeps and
/// `kernel` use `N / 3`.
pub const SINGLE_SHOT_TARGET: TargetPolicy = TargetPolicy::Random { seed: None };

/// Run one parsed command, writing output to `out`
///
/// # Errors
///
/// Returns whatever the selected handler returns.
pub fn dispatch<W: Write>(command: Option<Commands>, out: &mut W) -> Result<()> {
    match command {
        None => {
            let config = SweepConfig::from_env()?;
            handle_sweep(config, &results_path(), out).map(|_| ())
        },
        Some(Commands::Serial { size }) => {
            handle_serial(&size, SINGLE_SHOT_TARGET, out).map(|_| ())
        },
        Some(Commands::Parallel { size, threads }) => {
            handle_parallel(&size, &threads, SINGLE_SHOT_TARGET, out).map(|_| ())
        },
        Some(Commands::Kernel { size, threads }) => {
            handle_kernel(size.as_deref(), threads.as_deref(), out).map(|_| ())
        },
    }
}

/// Main CLI entrypoint: dispatch, report any error on stderr, return the
/// process exit code
pub fn entrypoint(cli: Cli) -> i32 {
    let stdout = std::io::stdout();
    let stderr = std::io::stderr();
    run_command(cli.command, &mut stdout.lock(), &mut stderr.lock())
}

/// Dispatch `command` with explicit output streams and return the exit code
///
/// Errors are reported on `err_out`: allocation failures as the bare
/// `ERROR:MEM ...` line, everything else prefixed with `Error: `.
pub fn run_command<W: Write, E: Write>(
    command: Option<Commands>,
    out: &mut W,
    err_out: &mut E,
) -> i32 {
    let entry = EntryPoint::of(command.as_ref());

    match dispatch(command, out) {
        Ok(()) => EXIT_OK,
        Err(err) => {
            let _ = out.flush();
            // Display already leads with the ERROR:MEM marker
            let line = if err.is_allocation() {
                err.to_string()
            } else {
                format!("Error: {err}")
            };
            let _ = writeln!(err_out, "{line}");
            tracing::debug!(?entry, error = %err, "command failed");
            exit_code(&err, entry)
        },
    }
}

#[cfg(test)]
#[path = "tests.rs"]
mod cli_tests;
