//! Interaction state machine for the live view.
//!
//! Holds the cursor, scroll window, sort mode and display toggles. The render
//! loop calls [`InteractionState::reconcile`] once per tick with the current
//! process count (processes come and go between ticks) and
//! [`InteractionState::apply`] with at most one key per tick.

use crate::config::Options;
use crate::input::Key;
use crate::types::SortMode;

/// Display mode; help replaces the listing but the loop keeps ticking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Process listing (default).
    Listing,
    /// Key legend.
    Help,
}

/// What the loop should do after a key is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Keep ticking.
    Continue,
    /// Leave the loop.
    Quit,
}

/// Cursor, scroll and toggle state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionState {
    /// Index of the highlighted row in the sorted process list.
    pub selected: usize,
    /// Index of the first visible row.
    pub scroll_offset: usize,
    /// Current ordering.
    pub sort_mode: SortMode,
    /// Whether the leak section is shown.
    pub show_leaks: bool,
    /// Whether the help screen is shown.
    pub show_help: bool,
    /// Rows available for the process list.
    pub visible_rows: usize,
    /// Process count seen by the last reconcile.
    process_count: usize,
}

impl InteractionState {
    /// Creates the initial state: listing mode, cursor at the top.
    #[must_use]
    pub fn new(visible_rows: usize, sort_mode: SortMode, show_leaks: bool) -> Self {
        Self {
            selected: 0,
            scroll_offset: 0,
            sort_mode,
            show_leaks,
            show_help: false,
            visible_rows: visible_rows.max(1),
            process_count: 0,
        }
    }

    /// Creates the initial state from runtime options.
    #[must_use]
    pub fn from_options(options: &Options) -> Self {
        Self::new(options.visible_rows, options.initial_sort, options.leak_detection_enabled)
    }

    /// Current display mode.
    pub fn mode(&self) -> Mode {
        if self.show_help {
            Mode::Help
        } else {
            Mode::Listing
        }
    }

    /// Process count seen by the last reconcile.
    pub fn process_count(&self) -> usize {
        self.process_count
    }

    /// Changes the number of rows the list may occupy and re-clamps.
    pub fn set_visible_rows(&mut self, rows: usize) {
        self.visible_rows = rows.max(1);
        self.clamp();
    }

    /// Re-clamps cursor and scroll window against a fresh process count.
    pub fn reconcile(&mut self, process_count: usize) {
        self.process_count = process_count;
        self.clamp();
    }

    fn clamp(&mut self) {
        if self.process_count == 0 {
            self.selected = 0;
            self.scroll_offset = 0;
            return;
        }
        self.selected = self.selected.min(self.process_count - 1);

        // Shift the window just enough to keep the cursor visible.
        if self.selected < self.scroll_offset {
            self.scroll_offset = self.selected;
        } else if self.selected >= self.scroll_offset.saturating_add(self.visible_rows) {
            self.scroll_offset = self.selected + 1 - self.visible_rows;
        }

        // Don't leave blank rows at the bottom when the list shrank.
        let max_offset = self.process_count.saturating_sub(self.visible_rows);
        self.scroll_offset = self.scroll_offset.min(max_offset);
    }

    /// Applies one key and reports whether the loop should continue.
    pub fn apply(&mut self, key: Key) -> Flow {
        match key {
            Key::Up => {
                self.selected = self.selected.saturating_sub(1);
                self.clamp();
            }
            Key::Down => {
                if self.selected + 1 < self.process_count {
                    self.selected += 1;
                }
                self.clamp();
            }
            Key::Sort => self.sort_mode = self.sort_mode.next(),
            Key::ToggleLeaks => self.show_leaks = !self.show_leaks,
            Key::Help => self.show_help = !self.show_help,
            Key::Refresh => {}
            Key::Quit => return Flow::Quit,
        }
        Flow::Continue
    }

    /// Range of row indices currently visible.
    pub fn visible_range(&self) -> std::ops::Range<usize> {
        let end = self.scroll_offset.saturating_add(self.visible_rows).min(self.process_count);
        self.scroll_offset.min(end)..end
    }
}

impl Default for InteractionState {
    fn default() -> Self {
        Self::new(20, SortMode::Memory, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(rows: usize, count: usize) -> InteractionState {
        let mut s = InteractionState::new(rows, SortMode::Memory, false);
        s.reconcile(count);
        s
    }

    #[test]
    fn test_initial_state() {
        let s = InteractionState::default();
        assert_eq!(s.mode(), Mode::Listing);
        assert_eq!(s.sort_mode, SortMode::Memory);
        assert!(!s.show_leaks);
        assert!(!s.show_help);
        assert_eq!(s.selected, 0);
        assert_eq!(s.scroll_offset, 0);
    }

    #[test]
    fn test_from_options_seeds_leak_display() {
        let options = Options { leak_detection_enabled: true, initial_sort: SortMode::Name, ..Options::default() };
        let s = InteractionState::from_options(&options);
        assert!(s.show_leaks);
        assert_eq!(s.sort_mode, SortMode::Name);
    }

    #[test]
    fn test_up_at_top_stays() {
        let mut s = state(5, 10);
        s.apply(Key::Up);
        assert_eq!(s.selected, 0);
    }

    #[test]
    fn test_down_at_bottom_stays() {
        let mut s = state(5, 3);
        for _ in 0..10 {
            s.apply(Key::Down);
        }
        assert_eq!(s.selected, 2);
    }

    #[test]
    fn test_scroll_follows_cursor_minimally() {
        let mut s = state(3, 10);
        for _ in 0..4 {
            s.apply(Key::Down);
        }
        assert_eq!(s.selected, 4);
        assert_eq!(s.scroll_offset, 2, "window shifts by the minimum amount");

        s.apply(Key::Up);
        s.apply(Key::Up);
        assert_eq!(s.selected, 2);
        assert_eq!(s.scroll_offset, 2, "cursor still inside the window");

        s.apply(Key::Up);
        assert_eq!(s.selected, 1);
        assert_eq!(s.scroll_offset, 1);
    }

    #[test]
    fn test_reconcile_clamps_when_processes_disappear() {
        let mut s = state(3, 10);
        for _ in 0..9 {
            s.apply(Key::Down);
        }
        assert_eq!(s.selected, 9);
        s.reconcile(4);
        assert_eq!(s.selected, 3);
        assert!(s.scroll_offset <= s.selected);
        assert!(s.selected < s.scroll_offset + s.visible_rows);
    }

    #[test]
    fn test_reconcile_empty_list() {
        let mut s = state(3, 10);
        s.apply(Key::Down);
        s.reconcile(0);
        assert_eq!(s.selected, 0);
        assert_eq!(s.scroll_offset, 0);
        assert!(s.visible_range().is_empty());
        s.apply(Key::Down);
        assert_eq!(s.selected, 0);
    }

    #[test]
    fn test_sort_cycles_three_modes() {
        let mut s = state(3, 3);
        s.apply(Key::Sort);
        assert_eq!(s.sort_mode, SortMode::Pid);
        s.apply(Key::Sort);
        assert_eq!(s.sort_mode, SortMode::Name);
        s.apply(Key::Sort);
        assert_eq!(s.sort_mode, SortMode::Memory);
    }

    #[test]
    fn test_toggles() {
        let mut s = state(3, 3);
        s.apply(Key::ToggleLeaks);
        assert!(s.show_leaks);
        s.apply(Key::Help);
        assert_eq!(s.mode(), Mode::Help);
        s.apply(Key::Help);
        assert_eq!(s.mode(), Mode::Listing);
        s.apply(Key::ToggleLeaks);
        assert!(!s.show_leaks);
    }

    #[test]
    fn test_refresh_changes_nothing() {
        let mut s = state(3, 8);
        s.apply(Key::Down);
        let before = s.clone();
        assert_eq!(s.apply(Key::Refresh), Flow::Continue);
        assert_eq!(s, before);
    }

    #[test]
    fn test_quit() {
        let mut s = state(3, 3);
        assert_eq!(s.apply(Key::Quit), Flow::Quit);
    }

    #[test]
    fn test_navigation_works_in_help_mode() {
        let mut s = state(3, 5);
        s.apply(Key::Help);
        s.apply(Key::Down);
        assert_eq!(s.selected, 1);
    }

    #[test]
    fn test_shrinking_window_keeps_cursor_visible() {
        let mut s = state(10, 20);
        for _ in 0..8 {
            s.apply(Key::Down);
        }
        s.set_visible_rows(4);
        assert_eq!(s.selected, 8);
        assert_eq!(s.scroll_offset, 5);
    }

    #[test]
    fn test_huge_row_count_does_not_overflow() {
        let mut s = state(usize::MAX, 50);
        for _ in 0..60 {
            s.apply(Key::Down);
        }
        s.set_visible_rows(3);
        assert_eq!(s.selected, 49);
        assert_eq!(s.scroll_offset, 47);

        s.set_visible_rows(usize::MAX);
        assert_eq!(s.selected, 49);
        assert_eq!(s.scroll_offset, 0);
        assert_eq!(s.visible_range(), 0..50);
    }

    #[test]
    fn test_visible_range() {
        let mut s = state(5, 12);
        for _ in 0..7 {
            s.apply(Key::Down);
        }
        assert_eq!(s.visible_range(), 3..8);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn arb_key() -> impl Strategy<Value = Key> {
        prop_oneof![
            4 => Just(Key::Down),
            4 => Just(Key::Up),
            1 => Just(Key::Sort),
            1 => Just(Key::ToggleLeaks),
            1 => Just(Key::Help),
            1 => Just(Key::Refresh),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(500))]

        /// Cursor stays in bounds and inside the scroll window for any key sequence.
        #[test]
        fn prop_cursor_and_window_invariants(
            rows in 1usize..30,
            count in 1usize..200,
            keys in prop::collection::vec(arb_key(), 0..300),
        ) {
            let mut s = InteractionState::new(rows, SortMode::Memory, false);
            s.reconcile(count);
            for key in keys {
                s.apply(key);
                prop_assert!(s.selected < count);
                prop_assert!(s.scroll_offset <= s.selected);
                prop_assert!(s.selected < s.scroll_offset + s.visible_rows);
            }
        }

        /// Invariants survive the process count changing between ticks.
        #[test]
        fn prop_reconcile_invariants(
            rows in 1usize..30,
            ticks in prop::collection::vec((0usize..100, prop::collection::vec(arb_key(), 0..5)), 1..50),
        ) {
            let mut s = InteractionState::new(rows, SortMode::Memory, false);
            for (count, keys) in ticks {
                s.reconcile(count);
                for key in keys {
                    s.apply(key);
                }
                if count == 0 {
                    prop_assert_eq!(s.selected, 0);
                    prop_assert_eq!(s.scroll_offset, 0);
                } else {
                    prop_assert!(s.selected < count);
                    prop_assert!(s.scroll_offset <= s.selected);
                    prop_assert!(s.selected < s.scroll_offset + s.visible_rows);
                }
            }
        }

        /// Three sort presses return to the starting mode.
        #[test]
        fn prop_sort_cycle(presses in 0usize..30) {
            let mut s = InteractionState::default();
            for _ in 0..presses * 3 {
                s.apply(Key::Sort);
            }
            prop_assert_eq!(s.sort_mode, SortMode::Memory);
        }
    }
}
