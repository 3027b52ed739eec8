//! Configuration for memwatch.
//!
//! Supports YAML configuration with precedence: CLI > file > defaults. The
//! file only carries the persistent knobs; [`Options`] is the resolved,
//! validated view the engine consumes.

use crate::error::{MemwatchError, Result};
use crate::types::{SortMode, MAX_PROCESSES};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Lowest accepted tick interval.
pub const MIN_TICK_MS: u64 = 10;
/// Highest accepted tick interval.
pub const MAX_TICK_MS: u64 = 10_000;

/// On-disk configuration file contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Configuration version.
    #[serde(default = "default_version")]
    pub version: u32,

    /// Tick interval in milliseconds.
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,

    /// Rows available for the process list.
    #[serde(default = "default_rows")]
    pub rows: usize,

    /// Start with leak detection shown.
    #[serde(default)]
    pub leaks: bool,

    /// Use colors.
    #[serde(default = "default_color")]
    pub color: bool,

    /// Initial sort mode.
    #[serde(default)]
    pub sort: SortMode,

    /// Maximum processes captured per snapshot.
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

fn default_version() -> u32 {
    1
}
fn default_tick_ms() -> u64 {
    200
}
fn default_rows() -> usize {
    20
}
fn default_color() -> bool {
    true
}
fn default_capacity() -> usize {
    MAX_PROCESSES
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            tick_ms: default_tick_ms(),
            rows: default_rows(),
            leaks: false,
            color: default_color(),
            sort: SortMode::default(),
            capacity: default_capacity(),
        }
    }
}

impl Config {
    /// Default config file location: `<config_dir>/memwatch/config.yaml`.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("memwatch").join("config.yaml"))
    }

    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .map_err(|_| MemwatchError::ConfigNotFound(path.display().to_string()))?;

        Self::parse(&content)
    }

    /// Parses configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error with line number if parsing fails.
    pub fn parse(yaml: &str) -> Result<Self> {
        serde_yaml_ng::from_str(yaml).map_err(|e| {
            let line = e.location().map_or(0, |l| l.line());
            MemwatchError::ConfigParse { line, message: e.to_string() }
        })
    }

    /// Loads the file at `path` if given, else the default location if it
    /// exists, else defaults.
    ///
    /// An explicitly requested file must exist.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => match Self::default_path() {
                Some(p) if p.exists() => Self::load(p),
                _ => Ok(Self::default()),
            },
        }
    }
}

/// Command-line overrides; `None` keeps the file/default value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    /// Tick interval in milliseconds.
    pub tick_ms: Option<u64>,
    /// Visible process rows.
    pub rows: Option<usize>,
    /// Force leak detection on.
    pub leaks: bool,
    /// Force colors off.
    pub no_color: bool,
    /// Initial sort mode.
    pub sort: Option<SortMode>,
}

/// Resolved runtime options consumed by the render loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Fixed sleep between ticks.
    pub tick_interval: Duration,
    /// Rows available for the process list.
    pub visible_rows: usize,
    /// Seeds the leak display toggle.
    pub leak_detection_enabled: bool,
    /// Whether to style output.
    pub color_enabled: bool,
    /// Starting sort mode.
    pub initial_sort: SortMode,
    /// Maximum processes captured per snapshot.
    pub process_capacity: usize,
}

impl Default for Options {
    fn default() -> Self {
        let config = Config::default();
        Self {
            tick_interval: Duration::from_millis(config.tick_ms),
            visible_rows: config.rows,
            leak_detection_enabled: config.leaks,
            color_enabled: config.color,
            initial_sort: config.sort,
            process_capacity: config.capacity,
        }
    }
}

impl Options {
    /// Merges file configuration with CLI overrides and validates the result.
    pub fn from_config(config: &Config, overrides: &Overrides) -> Result<Self> {
        let tick_ms = overrides.tick_ms.unwrap_or(config.tick_ms);
        if !(MIN_TICK_MS..=MAX_TICK_MS).contains(&tick_ms) {
            return Err(MemwatchError::ConfigInvalid {
                key: "tick_ms".to_string(),
                message: format!("must be between {MIN_TICK_MS} and {MAX_TICK_MS}, got {tick_ms}"),
            });
        }

        let rows = overrides.rows.unwrap_or(config.rows);
        if rows == 0 {
            return Err(MemwatchError::ConfigInvalid {
                key: "rows".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        if config.capacity == 0 {
            return Err(MemwatchError::ConfigInvalid {
                key: "capacity".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        Ok(Self {
            tick_interval: Duration::from_millis(tick_ms),
            visible_rows: rows,
            leak_detection_enabled: overrides.leaks || config.leaks,
            color_enabled: config.color && !overrides.no_color,
            initial_sort: overrides.sort.unwrap_or(config.sort),
            process_capacity: config.capacity.min(MAX_PROCESSES),
        })
    }
}
