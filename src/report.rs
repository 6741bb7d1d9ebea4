//! Flat CSV output for trial results
//!
//! One header line, then one row per trial:
//!
//! ```text
//! mode,N,iterations,threads,time_seconds
//! serial,4096,50,1,0.000123456
//! parallel,4096,50,8,0.000098765
//! ```

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::bench::{ResultSink, TrialResult};
use crate::error::{GroverError, Result};

/// Column header of every results file
pub const CSV_HEADER: &str = "mode,N,iterations,threads,time_seconds";

/// Where the default sweep writes its results (relative to the working dir)
pub const DEFAULT_RESULTS_PATH: &str = "data/results.csv";

/// Environment variable overriding [`DEFAULT_RESULTS_PATH`]
pub const ENV_OUTPUT: &str = "GROVER_OUTPUT";

/// Results path for the default sweep, honoring `GROVER_OUTPUT`
#[must_use]
pub fn results_path() -> PathBuf {
    std::env::var_os(ENV_OUTPUT)
        .filter(|v| !v.is_empty())
        .map_or_else(|| PathBuf::from(DEFAULT_RESULTS_PATH), PathBuf::from)
}

/// Format one trial as a CSV row (no trailing newline)
///
/// # Examples
///
/// ```
/// use grover_bench::bench::TrialResult;
/// use grover_bench::kernel::RunMode;
/// use grover_bench::report::format_row;
///
/// let row = format_row(&TrialResult {
///     mode: RunMode::Serial,
///     size: 4096,
///     iterations: 50,
///     threads: 1,
///     elapsed_seconds: 0.25,
/// });
/// assert_eq!(row, "serial,4096,50,1,0.250000000");
/// ```
#[must_use]
pub fn format_row(result: &TrialResult) -> String {
    format!(
        "{},{},{},{},{:.9}",
        result.mode, result.size, result.iterations, result.threads, result.elapsed_seconds
    )
}

fn io_error(context: &str, path: Option<&Path>, e: &std::io::Error) -> GroverError {
    let message = match path {
        Some(p) => format!("{context} {}: {e}", p.display()),
        None => format!("{context}: {e}"),
    };
    GroverError::IoError { message }
}

/// CSV writer that emits the header up front and one row per trial
#[derive(Debug)]
pub struct CsvReport<W: Write> {
    writer: W,
    path: Option<PathBuf>,
    rows: usize,
}

impl CsvReport<BufWriter<File>> {
    /// Create (or truncate) the file at `path` and write the header
    ///
    /// Missing parent directories are created.
    ///
    /// # Errors
    ///
    /// Returns `IoError` if the directory or file cannot be created.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| io_error("Failed to create", Some(dir), &e))?;
        }
        let file = File::create(path).map_err(|e| io_error("Failed to create", Some(path), &e))?;
        debug!(path = %path.display(), "results file created");

        let mut report = Self::new(BufWriter::new(file))?;
        report.path = Some(path.to_path_buf());
        Ok(report)
    }
}

impl<W: Write> CsvReport<W> {
    /// Wrap `writer` and write the header
    ///
    /// # Errors
    ///
    /// Returns `IoError` if the header cannot be written.
    pub fn new(mut writer: W) -> Result<Self> {
        writeln!(writer, "{CSV_HEADER}").map_err(|e| io_error("Failed to write header", None, &e))?;
        Ok(Self {
            writer,
            path: None,
            rows: 0,
        })
    }

    /// Append one row
    ///
    /// # Errors
    ///
    /// Returns `IoError` if the row cannot be written.
    pub fn append(&mut self, result: &TrialResult) -> Result<()> {
        writeln!(self.writer, "{}", format_row(result))
            .map_err(|e| io_error("Failed to write row", self.path.as_deref(), &e))?;
        self.rows += 1;
        Ok(())
    }

    /// Flush buffered rows
    ///
    /// # Errors
    ///
    /// Returns `IoError` if the flush fails.
    pub fn flush(&mut self) -> Result<()> {
        self.writer
            .flush()
            .map_err(|e| io_error("Failed to flush", self.path.as_deref(), &e))
    }

    /// Rows written so far (header excluded)
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// File path, if this report writes to a file
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Flush and return the underlying writer
    ///
    /// # Errors
    ///
    /// Returns `IoError` if the final flush fails.
    pub fn into_inner(mut self) -> Result<W> {
        self.flush()?;
        Ok(self.writer)
    }
}

impl<W: Write> ResultSink for CsvReport<W> {
    fn on_trial(&mut self, result: &TrialResult) -> Result<()> {
        self.append(result)
    }

    fn on_size_complete(&mut self, _size: usize) -> Result<()> {
        self.flush()
    }
}
