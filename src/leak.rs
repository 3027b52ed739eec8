//! Growth-based leak heuristic over the snapshot history.
//!
//! Compares the oldest and newest retained snapshots and flags every process
//! that survived the whole window and grew by more than [`GROWTH_BYTES_THRESHOLD`]
//! or by more than [`GROWTH_PERCENT_THRESHOLD`] percent of its original size.
//! Output order follows the oldest snapshot's sample order and is capped at
//! [`MAX_LEAKS`] records.

use crate::history::HistoryRingBuffer;
use crate::types::{ProcessSample, Snapshot};
use std::collections::HashMap;

/// Absolute growth above which a process is flagged (50 MiB).
pub const GROWTH_BYTES_THRESHOLD: u64 = 50 * 1024 * 1024;

/// Relative growth, in percent, above which a process is flagged.
pub const GROWTH_PERCENT_THRESHOLD: f64 = 20.0;

/// Maximum number of records produced by one detection pass.
pub const MAX_LEAKS: usize = 50;

/// A process whose resident size grew past a threshold across the history window.
#[derive(Debug, Clone, PartialEq)]
pub struct LeakRecord {
    /// Process ID.
    pub pid: u32,
    /// Display name from the newest snapshot, or `pid-<id>`.
    pub name: String,
    /// Resident bytes in the oldest snapshot.
    pub old_bytes: u64,
    /// Resident bytes in the newest snapshot.
    pub new_bytes: u64,
    /// `new_bytes - old_bytes`.
    pub growth_bytes: u64,
    /// Seconds between the two snapshots.
    pub elapsed_secs: f64,
}

impl LeakRecord {
    /// Growth relative to the original size, 0 when the original size was 0.
    pub fn growth_percent(&self) -> f64 {
        growth_percent(self.old_bytes, self.growth_bytes)
    }
}

fn growth_percent(old_bytes: u64, growth: u64) -> f64 {
    if old_bytes == 0 {
        0.0
    } else {
        growth as f64 / old_bytes as f64 * 100.0
    }
}

/// Returns true when growth from `old_bytes` to `new_bytes` trips either threshold.
pub fn is_leak(old_bytes: u64, new_bytes: u64) -> bool {
    let growth = new_bytes.saturating_sub(old_bytes);
    growth > GROWTH_BYTES_THRESHOLD || growth_percent(old_bytes, growth) > GROWTH_PERCENT_THRESHOLD
}

/// Runs the heuristic over the oldest and newest snapshots in `history`.
///
/// Returns an empty list with fewer than two snapshots or when the clock did
/// not advance between them.
pub fn detect(history: &HistoryRingBuffer) -> Vec<LeakRecord> {
    match (history.oldest(), history.newest()) {
        (Some(oldest), Some(newest)) => compare(oldest, newest),
        _ => Vec::new(),
    }
}

/// Applies the heuristic to an explicit pair of snapshots.
pub fn compare(oldest: &Snapshot, newest: &Snapshot) -> Vec<LeakRecord> {
    let elapsed = newest.timestamp - oldest.timestamp;
    if elapsed <= 0.0 || elapsed.is_nan() {
        return Vec::new();
    }

    let current: HashMap<u32, &ProcessSample> =
        newest.samples.iter().map(|s| (s.pid, s)).collect();

    let mut leaks = Vec::new();
    for old in &oldest.samples {
        // Exited processes are not leaks.
        let Some(new) = current.get(&old.pid) else {
            continue;
        };
        if !is_leak(old.resident_bytes, new.resident_bytes) {
            continue;
        }
        if leaks.len() == MAX_LEAKS {
            break;
        }
        let name =
            if new.name.is_empty() { format!("pid-{}", old.pid) } else { new.name.clone() };
        leaks.push(LeakRecord {
            pid: old.pid,
            name,
            old_bytes: old.resident_bytes,
            new_bytes: new.resident_bytes,
            growth_bytes: new.resident_bytes - old.resident_bytes,
            elapsed_secs: elapsed,
        });
    }
    leaks
}

/// Owns the snapshot history and runs detection passes over it.
#[derive(Debug, Clone, Default)]
pub struct LeakDetector {
    history: HistoryRingBuffer,
}

impl LeakDetector {
    /// Creates a detector with empty history.
    #[must_use]
    pub fn new() -> Self {
        Self { history: HistoryRingBuffer::new() }
    }

    /// Appends a snapshot to the history.
    pub fn record(&mut self, snapshot: Snapshot) {
        self.history.push(snapshot);
    }

    /// Runs one detection pass.
    pub fn detect(&self) -> Vec<LeakRecord> {
        detect(&self.history)
    }

    /// The retained history.
    pub fn history(&self) -> &HistoryRingBuffer {
        &self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIB: u64 = 1024 * 1024;

    fn snap(t: f64, samples: &[(u32, u64, &str)]) -> Snapshot {
        Snapshot::new(
            t,
            samples.iter().map(|&(pid, mib, name)| ProcessSample::new(pid, mib * MIB, name)).collect(),
        )
    }

    fn detector_with(oldest: Snapshot, newest: Snapshot) -> LeakDetector {
        let mut d = LeakDetector::new();
        d.record(oldest);
        d.record(newest);
        d
    }

    #[test]
    fn test_absolute_growth_is_leak() {
        let d = detector_with(snap(0.0, &[(1, 100, "a")]), snap(5.0, &[(1, 200, "a")]));
        let leaks = d.detect();
        assert_eq!(leaks.len(), 1);
        assert_eq!(leaks[0].pid, 1);
        assert_eq!(leaks[0].growth_bytes, 100 * MIB);
        assert_eq!(leaks[0].elapsed_secs, 5.0);
    }

    #[test]
    fn test_relative_growth_is_leak() {
        let d = detector_with(snap(0.0, &[(2, 100, "b")]), snap(1.0, &[(2, 130, "b")]));
        let leaks = d.detect();
        assert_eq!(leaks.len(), 1, "30% growth exceeds the 20% threshold");
        assert_eq!(leaks[0].growth_bytes, 30 * MIB);
        assert!((leaks[0].growth_percent() - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_small_growth_is_not_leak() {
        let d = detector_with(snap(0.0, &[(3, 100, "c")]), snap(1.0, &[(3, 110, "c")]));
        assert!(d.detect().is_empty());
    }

    #[test]
    fn test_exited_process_is_not_leak() {
        let d = detector_with(snap(0.0, &[(4, 100, "d")]), snap(1.0, &[(5, 900, "e")]));
        assert!(d.detect().iter().all(|l| l.pid != 4));
        assert!(d.detect().is_empty(), "pid 5 did not exist in the oldest snapshot");
    }

    #[test]
    fn test_shrinking_process_is_not_leak() {
        let d = detector_with(snap(0.0, &[(6, 500, "f")]), snap(1.0, &[(6, 10, "f")]));
        assert!(d.detect().is_empty());
    }

    #[test]
    fn test_thresholds_are_strict() {
        assert!(!is_leak(250 * MIB, 300 * MIB), "exactly 50 MiB and exactly 20% is not a leak");
        assert!(is_leak(250 * MIB, 300 * MIB + 1));
    }

    #[test]
    fn test_zero_old_size_uses_absolute_threshold_only() {
        assert!(!is_leak(0, 10 * MIB));
        assert!(is_leak(0, 51 * MIB));
    }

    #[test]
    fn test_insufficient_history_returns_empty() {
        let mut d = LeakDetector::new();
        assert!(d.detect().is_empty());
        d.record(snap(0.0, &[(1, 1, "a")]));
        assert!(d.detect().is_empty());
    }

    #[test]
    fn test_non_positive_elapsed_returns_empty() {
        let same = detector_with(snap(3.0, &[(1, 100, "a")]), snap(3.0, &[(1, 900, "a")]));
        assert!(same.detect().is_empty());
        let backwards = detector_with(snap(5.0, &[(1, 100, "a")]), snap(1.0, &[(1, 900, "a")]));
        assert!(backwards.detect().is_empty());
    }

    #[test]
    fn test_empty_name_uses_placeholder() {
        let d = detector_with(snap(0.0, &[(42, 100, "old")]), snap(1.0, &[(42, 400, "")]));
        assert_eq!(d.detect()[0].name, "pid-42");
    }

    #[test]
    fn test_name_comes_from_newest() {
        let d = detector_with(snap(0.0, &[(7, 100, "before")]), snap(1.0, &[(7, 400, "after")]));
        assert_eq!(d.detect()[0].name, "after");
    }

    #[test]
    fn test_output_is_capped_in_oldest_order() {
        let old: Vec<(u32, u64, &str)> = (0..80).map(|p| (p, 10, "x")).collect();
        let new: Vec<(u32, u64, &str)> = (0..80).rev().map(|p| (p, 100, "x")).collect();
        let d = detector_with(snap(0.0, &old), snap(1.0, &new));
        let leaks = d.detect();
        assert_eq!(leaks.len(), MAX_LEAKS);
        let pids: Vec<u32> = leaks.iter().map(|l| l.pid).collect();
        let expected: Vec<u32> = (0..MAX_LEAKS as u32).collect();
        assert_eq!(pids, expected);
    }

    #[test]
    fn test_compares_oldest_and_newest_after_wrap() {
        let mut d = LeakDetector::new();
        for t in 0..15u32 {
            // Grows 10 MiB per tick: 10 ticks of window = 90 MiB over the retained span.
            d.record(snap(f64::from(t), &[(1, 1000 + u64::from(t) * 10, "grow")]));
        }
        let leaks = d.detect();
        assert_eq!(leaks.len(), 1);
        assert_eq!(leaks[0].old_bytes, 1050 * MIB);
        assert_eq!(leaks[0].new_bytes, 1140 * MIB);
        assert_eq!(leaks[0].elapsed_secs, 9.0);
    }
}
