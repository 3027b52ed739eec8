//! Linux snapshot source backed by `/proc`.
//!
//! Host figures come from `/proc/meminfo`, pressure from the PSI file
//! `/proc/pressure/memory`, and per-process resident size from
//! `/proc/<pid>/status`. The proc root is configurable so tests can point it
//! at a fixture tree.

use super::SnapshotSource;
use crate::error::{MemwatchError, Result};
use crate::types::{PressureLevel, ProcessSample, SystemStats};
use std::path::{Path, PathBuf};

const SOURCE_ID: &str = "linux";

/// Parses `/proc/meminfo` contents. Values are reported in kB.
///
/// `used` is total minus `MemAvailable`. `wired` maps to `Unevictable` and
/// `compressed` to `Zswap` when the kernel reports it.
pub fn parse_meminfo(content: &str) -> SystemStats {
    let mut stats = SystemStats::default();
    let mut available: Option<u64> = None;
    let mut swap_free: u64 = 0;

    for line in content.lines() {
        let mut parts = line.split_whitespace();
        let (Some(key), Some(value)) = (parts.next(), parts.next()) else {
            continue;
        };
        let Ok(kb) = value.parse::<u64>() else {
            continue;
        };
        let bytes = kb.saturating_mul(1024);

        match key {
            "MemTotal:" => stats.total = bytes,
            "MemFree:" => stats.free = bytes,
            "MemAvailable:" => available = Some(bytes),
            "Cached:" => stats.cached = bytes,
            "Active:" => stats.active = bytes,
            "Inactive:" => stats.inactive = bytes,
            "Unevictable:" => stats.wired = bytes,
            "Zswap:" => stats.compressed = bytes,
            "SwapTotal:" => stats.swap_total = bytes,
            "SwapFree:" => swap_free = bytes,
            _ => {}
        }
    }

    // Kernels before 3.14 lack MemAvailable.
    let available = available.unwrap_or(stats.free + stats.cached);
    stats.used = stats.total.saturating_sub(available);
    stats.swap_used = stats.swap_total.saturating_sub(swap_free);
    stats
}

/// Maps the `some avg10` stall percentage of `/proc/pressure/memory` to a level.
///
/// <5% normal, <15% warn, <40% urgent, otherwise critical.
pub fn parse_psi(content: &str) -> PressureLevel {
    let avg10 = content
        .lines()
        .find(|l| l.starts_with("some"))
        .and_then(|l| l.split_whitespace().find_map(|f| f.strip_prefix("avg10=")))
        .and_then(|v| v.parse::<f64>().ok())
        .unwrap_or(0.0);

    if avg10 < 5.0 {
        PressureLevel::Normal
    } else if avg10 < 15.0 {
        PressureLevel::Warn
    } else if avg10 < 40.0 {
        PressureLevel::Urgent
    } else {
        PressureLevel::Critical
    }
}

/// Extracts `(name, resident_bytes)` from `/proc/<pid>/status`.
///
/// Kernel threads have no `VmRSS` line and yield `None`.
pub fn parse_status(content: &str) -> Option<(String, u64)> {
    let mut name = None;
    let mut rss = None;

    for line in content.lines() {
        if let Some(rest) = line.strip_prefix("Name:") {
            name = Some(rest.trim().to_string());
        } else if let Some(rest) = line.strip_prefix("VmRSS:") {
            rss = rest.split_whitespace().next().and_then(|v| v.parse::<u64>().ok());
        }
        if name.is_some() && rss.is_some() {
            break;
        }
    }

    Some((name?, rss?.saturating_mul(1024)))
}

/// Snapshot source reading a `/proc` tree.
#[derive(Debug, Clone)]
pub struct ProcSource {
    root: PathBuf,
}

impl ProcSource {
    /// Reads the live `/proc`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_root("/proc")
    }

    /// Reads a `/proc`-shaped tree rooted at `root`.
    #[must_use]
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The proc root in use.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn read(&self, rel: &str) -> std::io::Result<String> {
        std::fs::read_to_string(self.root.join(rel))
    }
}

impl Default for ProcSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotSource for ProcSource {
    fn id(&self) -> &'static str {
        SOURCE_ID
    }

    fn read_system_stats(&mut self) -> Result<SystemStats> {
        let meminfo = self.read("meminfo").map_err(|e| {
            MemwatchError::provider(SOURCE_ID, format!("failed to read meminfo: {e}"))
        })?;
        let mut stats = parse_meminfo(&meminfo);
        if stats.total == 0 {
            return Err(MemwatchError::provider(SOURCE_ID, "meminfo has no MemTotal"));
        }

        // PSI needs CONFIG_PSI; absence means no signal.
        stats.pressure =
            self.read("pressure/memory").map(|c| parse_psi(&c)).unwrap_or(PressureLevel::Normal);
        Ok(stats)
    }

    fn read_process_list(&mut self, capacity: usize) -> Result<Vec<ProcessSample>> {
        let entries = std::fs::read_dir(&self.root).map_err(|e| {
            MemwatchError::provider(SOURCE_ID, format!("failed to list {}: {e}", self.root.display()))
        })?;

        let mut samples = Vec::new();
        for entry in entries.flatten() {
            if samples.len() >= capacity {
                break;
            }
            let file_name = entry.file_name();
            let Some(pid) = file_name.to_str().and_then(|s| s.parse::<u32>().ok()) else {
                continue;
            };
            // Processes exit or deny access between listing and reading.
            let Ok(status) = std::fs::read_to_string(entry.path().join("status")) else {
                continue;
            };
            if let Some((name, rss)) = parse_status(&status) {
                samples.push(ProcessSample::new(pid, rss, name));
            }
        }
        Ok(samples)
    }
}
