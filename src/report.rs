//! Error-reporting sink.
//!
//! Resolution, dictionary and download operations never raise transport or
//! structural failures; they describe them to a [`Reporter`]. Reporting is
//! fire-and-forget: a reporter that cannot record a message drops it.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::{error, info, warn};

/// Receives failure descriptions from the core.
pub trait Reporter: Send + Sync {
    /// Records one failure message. Must not block on slow I/O or panic.
    fn report(&self, message: &str);
}

/// Reporter that emits `warn` events through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&self, message: &str) {
        warn!(message = %message, "reported failure");
    }
}

/// Reporter that appends to a dated log file and echoes to `tracing`.
///
/// Lines look like `[2024-05-01 13:45:02] ERROR: message` and go to
/// `{dir}/error_log_{YYYY-MM-DD}.log`.
#[derive(Debug, Clone)]
pub struct LogFileReporter {
    dir: PathBuf,
}

impl LogFileReporter {
    /// Creates a reporter writing under `dir` (created on first report).
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the dated log files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of today's log file.
    #[must_use]
    pub fn current_log_path(&self) -> PathBuf {
        let date = Local::now().format("%Y-%m-%d");
        self.dir.join(format!("error_log_{date}.log"))
    }

    fn append(&self, message: &str) -> std::io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.current_log_path())?;
        writeln!(file, "[{timestamp}] ERROR: {message}")
    }
}

impl Reporter for LogFileReporter {
    fn report(&self, message: &str) {
        if let Err(err) = self.append(message) {
            warn!(dir = %self.dir.display(), error = %err, "could not write error log");
        }
        error!(message = %message, "reported failure");
    }
}

/// Routes a failure either to the reporter or to the plain log.
///
/// Mirrors the `report_errors` switch found on every operation's options.
pub(crate) fn emit(reporter: &dyn Reporter, report_errors: bool, message: &str) {
    if report_errors {
        reporter.report(message);
    } else {
        info!(message = %message, "failure not reported");
    }
}
