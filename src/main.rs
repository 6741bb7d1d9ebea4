//! grover-bench CLI - serial vs parallel Grover kernel timings
//!
//! # Commands
//!
//! - (none) - Run the default sweep and write `data/results.csv`
//! - `serial N` - Time one serial run of size N
//! - `parallel N T` - Time one parallel run of size N with T workers
//! - `kernel [N] [T]` - Time the parallel kernel alone, print seconds
//!
//! Logging goes to stderr and is controlled by `RUST_LOG` (default `warn`).

use clap::Parser;
use grover_bench::cli::{self, Cli};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    std::process::exit(cli::entrypoint(cli));
}
