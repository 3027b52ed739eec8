//! Core data model: process samples, snapshots, host statistics and sort order.
//!
//! - [`ProcessSample`]: one process's resident size at one tick
//! - [`Snapshot`]: a timestamped, bounded list of samples
//! - [`SystemStats`]: host-wide memory figures and pressure level
//! - [`SortMode`]: the three process orderings and their cycle

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Maximum number of process samples kept per snapshot.
pub const MAX_PROCESSES: usize = 2000;

/// Maximum length, in characters, of a process display name.
pub const MAX_NAME_LEN: usize = 64;

/// Resident memory of a single process at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessSample {
    /// Process ID.
    pub pid: u32,
    /// Bytes currently mapped into physical RAM.
    pub resident_bytes: u64,
    /// Short process name, at most [`MAX_NAME_LEN`] characters.
    pub name: String,
}

impl ProcessSample {
    /// Creates a sample, truncating the name to [`MAX_NAME_LEN`] characters.
    pub fn new(pid: u32, resident_bytes: u64, name: impl Into<String>) -> Self {
        let mut name = name.into();
        if let Some((idx, _)) = name.char_indices().nth(MAX_NAME_LEN) {
            name.truncate(idx);
        }
        Self { pid, resident_bytes, name }
    }
}

/// One tick's full process view.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    /// Monotonic capture time in seconds.
    pub timestamp: f64,
    /// Captured samples, never more than [`MAX_PROCESSES`].
    pub samples: Vec<ProcessSample>,
}

impl Snapshot {
    /// Creates a snapshot, dropping samples beyond [`MAX_PROCESSES`].
    pub fn new(timestamp: f64, mut samples: Vec<ProcessSample>) -> Self {
        samples.truncate(MAX_PROCESSES);
        Self { timestamp, samples }
    }

    /// Number of samples held.
    pub fn count(&self) -> usize {
        self.samples.len()
    }
}

/// Ordinal system-wide memory scarcity indicator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PressureLevel {
    /// No pressure.
    #[default]
    Normal,
    /// Reclaim is active.
    Warn,
    /// Reclaim is struggling.
    Urgent,
    /// The system is close to running out of memory.
    Critical,
}

impl PressureLevel {
    /// Maps an ordinal 0..=3 to a level; larger values saturate at `Critical`.
    pub fn from_ordinal(level: u8) -> Self {
        match level {
            0 => Self::Normal,
            1 => Self::Warn,
            2 => Self::Urgent,
            _ => Self::Critical,
        }
    }

    /// Returns the ordinal 0..=3.
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    /// Upper-case label used in the header line.
    pub fn label(self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Warn => "WARN",
            Self::Urgent => "URGENT",
            Self::Critical => "CRITICAL",
        }
    }
}

/// Host-wide memory figures, all in bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemStats {
    /// Installed physical memory.
    pub total: u64,
    /// Memory in use (total minus reclaimable).
    pub used: u64,
    /// Completely unused memory.
    pub free: u64,
    /// File cache / purgeable memory.
    pub cached: u64,
    /// Recently used pages.
    pub active: u64,
    /// Pages that can't be paged out.
    pub wired: u64,
    /// Pages not recently used.
    pub inactive: u64,
    /// Speculatively mapped pages.
    pub speculative: u64,
    /// Memory held by the compressor.
    pub compressed: u64,
    /// Swap currently in use.
    pub swap_used: u64,
    /// Configured swap.
    pub swap_total: u64,
    /// Current pressure level.
    pub pressure: PressureLevel,
}

impl SystemStats {
    /// Used memory as a percentage of total, 0 when total is unknown.
    pub fn used_percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.used as f64 / self.total as f64 * 100.0
        }
    }
}

/// Process list ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    /// Largest resident size first.
    #[default]
    Memory,
    /// Ascending process ID.
    Pid,
    /// Ascending process name.
    Name,
}

impl SortMode {
    /// Cycle to the next mode: memory → pid → name → memory.
    pub fn next(self) -> Self {
        match self {
            Self::Memory => Self::Pid,
            Self::Pid => Self::Name,
            Self::Name => Self::Memory,
        }
    }

    /// Short label shown in the footer.
    pub fn label(self) -> &'static str {
        match self {
            Self::Memory => "MEM",
            Self::Pid => "PID",
            Self::Name => "NAME",
        }
    }

    /// Total order over samples for this mode; ties fall back to PID.
    pub fn compare(self, a: &ProcessSample, b: &ProcessSample) -> Ordering {
        match self {
            Self::Memory => b.resident_bytes.cmp(&a.resident_bytes).then(a.pid.cmp(&b.pid)),
            Self::Pid => a.pid.cmp(&b.pid),
            Self::Name => a.name.cmp(&b.name).then(a.pid.cmp(&b.pid)),
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Memory => "memory",
            Self::Pid => "pid",
            Self::Name => "name",
        })
    }
}

impl std::str::FromStr for SortMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" | "mem" => Ok(Self::Memory),
            "pid" => Ok(Self::Pid),
            "name" => Ok(Self::Name),
            other => Err(format!("unknown sort mode '{other}' (expected memory, pid or name)")),
        }
    }
}

/// Sorts samples in place according to `mode`.
pub fn sort_samples(samples: &mut [ProcessSample], mode: SortMode) {
    samples.sort_by(|a, b| mode.compare(a, b));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(pid: u32, mib: u64, name: &str) -> ProcessSample {
        ProcessSample::new(pid, mib * 1024 * 1024, name)
    }

    #[test]
    fn test_name_is_bounded() {
        let long = "x".repeat(200);
        let s = ProcessSample::new(1, 0, long);
        assert_eq!(s.name.chars().count(), MAX_NAME_LEN);
    }

    #[test]
    fn test_name_truncation_respects_char_boundaries() {
        let long = "é".repeat(100);
        let s = ProcessSample::new(1, 0, long);
        assert_eq!(s.name.chars().count(), MAX_NAME_LEN);
    }

    #[test]
    fn test_snapshot_is_capped() {
        let samples = (0..(MAX_PROCESSES as u32 + 10)).map(|p| sample(p, 1, "p")).collect();
        let snap = Snapshot::new(0.0, samples);
        assert_eq!(snap.count(), MAX_PROCESSES);
    }

    #[test]
    fn test_sort_mode_cycle_returns_to_start() {
        for mode in [SortMode::Memory, SortMode::Pid, SortMode::Name] {
            assert_eq!(mode.next().next().next(), mode);
        }
        assert_eq!(SortMode::Memory.next(), SortMode::Pid);
        assert_eq!(SortMode::Pid.next(), SortMode::Name);
        assert_eq!(SortMode::Name.next(), SortMode::Memory);
    }

    #[test]
    fn test_sort_by_memory_desc_ties_by_pid() {
        let mut v = vec![sample(3, 10, "c"), sample(1, 50, "a"), sample(2, 10, "b")];
        sort_samples(&mut v, SortMode::Memory);
        let pids: Vec<u32> = v.iter().map(|s| s.pid).collect();
        assert_eq!(pids, vec![1, 2, 3]);
    }

    #[test]
    fn test_sort_by_name_ties_by_pid() {
        let mut v = vec![sample(9, 1, "zsh"), sample(5, 1, "bash"), sample(2, 1, "bash")];
        sort_samples(&mut v, SortMode::Name);
        let pids: Vec<u32> = v.iter().map(|s| s.pid).collect();
        assert_eq!(pids, vec![2, 5, 9]);
    }

    #[test]
    fn test_sort_mode_from_str() {
        assert_eq!("memory".parse::<SortMode>(), Ok(SortMode::Memory));
        assert_eq!("PID".parse::<SortMode>(), Ok(SortMode::Pid));
        assert_eq!("name".parse::<SortMode>(), Ok(SortMode::Name));
        assert!("cpu".parse::<SortMode>().is_err());
        for mode in [SortMode::Memory, SortMode::Pid, SortMode::Name] {
            assert_eq!(mode.to_string().parse::<SortMode>(), Ok(mode));
        }
    }

    #[test]
    fn test_pressure_level_ordinals() {
        for n in 0..4u8 {
            assert_eq!(PressureLevel::from_ordinal(n).ordinal(), n);
        }
        assert_eq!(PressureLevel::from_ordinal(9), PressureLevel::Critical);
        assert_eq!(PressureLevel::Urgent.label(), "URGENT");
    }

    #[test]
    fn test_used_percent() {
        let stats = SystemStats { total: 200, used: 50, ..SystemStats::default() };
        assert!((stats.used_percent() - 25.0).abs() < f64::EPSILON);
        assert_eq!(SystemStats::default().used_percent(), 0.0);
    }
}
