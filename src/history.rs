//! Fixed-capacity snapshot history.
//!
//! A circular store of whole [`Snapshot`]s used by the leak detector to
//! compare the oldest and newest retained views. Key properties:
//!
//! - **Bounded capacity**: exactly [`MAX_HISTORY`] slots, allocated once
//! - **Overwrite-oldest**: once full, each push replaces the logically oldest slot
//! - **O(1) endpoints**: oldest/newest indices follow from `filled` and `cursor`
//!
//! # Example
//!
//! ```rust,ignore
//! use memwatch::history::HistoryRingBuffer;
//! use memwatch::types::Snapshot;
//!
//! let mut history = HistoryRingBuffer::new();
//! for t in 0..15 {
//!     history.push(Snapshot::new(t as f64, Vec::new()));
//! }
//! assert_eq!(history.len(), 10);
//! assert_eq!(history.oldest().unwrap().timestamp, 5.0);
//! ```

use crate::types::Snapshot;

/// Number of snapshot slots retained.
pub const MAX_HISTORY: usize = 10;

/// Circular buffer of the most recent [`MAX_HISTORY`] snapshots.
#[derive(Debug, Clone)]
pub struct HistoryRingBuffer {
    /// Slot storage; slots beyond `filled` hold empty placeholders.
    slots: [Snapshot; MAX_HISTORY],
    /// Index the next push writes to.
    cursor: usize,
    /// Number of slots holding real snapshots.
    filled: usize,
}

impl HistoryRingBuffer {
    /// Creates an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self { slots: std::array::from_fn(|_| Snapshot::default()), cursor: 0, filled: 0 }
    }

    /// Stores a snapshot, overwriting the oldest one when full.
    pub fn push(&mut self, snapshot: Snapshot) {
        self.slots[self.cursor] = snapshot;
        self.cursor = (self.cursor + 1) % MAX_HISTORY;
        if self.filled < MAX_HISTORY {
            self.filled += 1;
        }
    }

    /// Number of snapshots currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.filled
    }

    /// Returns true if nothing has been pushed yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filled == 0
    }

    /// Returns true once every slot holds a snapshot.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.filled == MAX_HISTORY
    }

    /// Slot capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        MAX_HISTORY
    }

    /// Slot index of the next write.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Slot index of the oldest snapshot, `None` with fewer than two snapshots.
    #[must_use]
    pub fn oldest_index(&self) -> Option<usize> {
        if self.filled < 2 {
            None
        } else if self.is_full() {
            Some(self.cursor)
        } else {
            Some(0)
        }
    }

    /// Slot index of the newest snapshot, `None` with fewer than two snapshots.
    #[must_use]
    pub fn newest_index(&self) -> Option<usize> {
        if self.filled < 2 {
            None
        } else if self.is_full() {
            Some((self.cursor + MAX_HISTORY - 1) % MAX_HISTORY)
        } else {
            Some(self.filled - 1)
        }
    }

    /// Oldest retained snapshot; `None` means insufficient history.
    #[must_use]
    pub fn oldest(&self) -> Option<&Snapshot> {
        self.oldest_index().map(|i| &self.slots[i])
    }

    /// Newest retained snapshot; `None` means insufficient history.
    #[must_use]
    pub fn newest(&self) -> Option<&Snapshot> {
        self.newest_index().map(|i| &self.slots[i])
    }

    /// Iterates held snapshots from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &Snapshot> {
        let start = if self.is_full() { self.cursor } else { 0 };
        (0..self.filled).map(move |i| &self.slots[(start + i) % MAX_HISTORY])
    }
}

impl Default for HistoryRingBuffer {
    fn default() -> Self {
        Self::new()
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(500))]

        /// Length is always min(pushes, MAX_HISTORY).
        #[test]
        fn prop_len_is_bounded(pushes in 0usize..200) {
            let mut h = HistoryRingBuffer::new();
            for t in 0..pushes {
                h.push(Snapshot::new(t as f64, Vec::new()));
            }
            prop_assert_eq!(h.len(), pushes.min(MAX_HISTORY));
        }

        /// After more than MAX_HISTORY pushes the endpoints follow the cursor formula.
        #[test]
        fn prop_wrap_indices(extra in 1usize..300) {
            let mut h = HistoryRingBuffer::new();
            let total = MAX_HISTORY + extra;
            for t in 0..total {
                h.push(Snapshot::new(t as f64, Vec::new()));
            }
            let cursor = total % MAX_HISTORY;
            prop_assert_eq!(h.len(), MAX_HISTORY);
            prop_assert_eq!(h.cursor(), cursor);
            prop_assert_eq!(h.oldest_index(), Some(cursor));
            prop_assert_eq!(h.newest_index(), Some((cursor + MAX_HISTORY - 1) % MAX_HISTORY));
            prop_assert_eq!(h.oldest().map(|s| s.timestamp), Some((total - MAX_HISTORY) as f64));
            prop_assert_eq!(h.newest().map(|s| s.timestamp), Some((total - 1) as f64));
        }
    }
}
