//! Opt-in diagnostic logging.
//!
//! Enabled via `--debug` or the `MEMWATCH_DEBUG` environment variable. The
//! filter defaults to `memwatch=debug` and can be replaced with `MEMWATCH_LOG`
//! (env-filter syntax). While the live view owns the terminal, output goes to
//! a file so it can't tear the frame.

use crate::error::{MemwatchError, Result};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Environment variable that turns logging on.
pub const DEBUG_ENV: &str = "MEMWATCH_DEBUG";
/// Environment variable holding a custom filter.
pub const FILTER_ENV: &str = "MEMWATCH_LOG";

const DEFAULT_FILTER: &str = "memwatch=debug";

/// Where log lines are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    /// Standard error; only safe outside the live view.
    Stderr,
    /// Append to a file.
    File(PathBuf),
}

/// Returns true if logging was requested by flag or environment.
pub fn is_requested(flag: bool) -> bool {
    flag || std::env::var_os(DEBUG_ENV).is_some_and(|v| !v.is_empty() && v != "0")
}

/// Default log file: `<cache_dir>/memwatch/memwatch.log`.
pub fn default_log_path() -> Option<PathBuf> {
    dirs::cache_dir().map(|p| p.join("memwatch").join("memwatch.log"))
}

fn filter() -> EnvFilter {
    EnvFilter::try_from_env(FILTER_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

fn open_log_file(path: &Path) -> Result<std::fs::File> {
    let invalid = |e: std::io::Error| MemwatchError::ConfigInvalid {
        key: "log_file".to_string(),
        message: format!("cannot open {}: {e}", path.display()),
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(invalid)?;
    }
    OpenOptions::new().create(true).append(true).open(path).map_err(invalid)
}

/// Installs the global subscriber.
///
/// Calling it again after a subscriber is installed is a no-op.
pub fn init(target: &LogTarget) -> Result<()> {
    let builder = tracing_subscriber::fmt().with_env_filter(filter()).with_target(true);

    let installed = match target {
        LogTarget::Stderr => builder.with_writer(std::io::stderr).try_init(),
        LogTarget::File(path) => {
            let file = open_log_file(path)?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).try_init()
        }
    };

    if installed.is_ok() {
        tracing::debug!(?target, "logging initialized");
    }
    Ok(())
}
