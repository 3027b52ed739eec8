//! Keyboard input decoding.
//!
//! crossterm decodes the raw byte stream (including `ESC [ A..D` arrow
//! sequences) into key events; this module reduces them to the small
//! [`Key`] vocabulary the interaction state machine understands.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// A recognized key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Move the selection up.
    Up,
    /// Move the selection down.
    Down,
    /// Cycle the sort mode.
    Sort,
    /// Show or hide the leak section.
    ToggleLeaks,
    /// Show or hide the help screen.
    Help,
    /// Refresh now (no state change).
    Refresh,
    /// Leave the monitor.
    Quit,
}

impl Key {
    /// Maps a crossterm key event to a [`Key`]; unrecognized keys yield `None`.
    ///
    /// Letters are case-insensitive. Left/right arrows are decoded by the
    /// terminal but carry no meaning here.
    #[must_use]
    pub fn from_event(event: KeyEvent) -> Option<Self> {
        if event.kind == KeyEventKind::Release {
            return None;
        }

        // Raw mode delivers Ctrl+C as a key press instead of SIGINT.
        if event.modifiers.contains(KeyModifiers::CONTROL) {
            return match event.code {
                KeyCode::Char('c' | 'C') => Some(Self::Quit),
                _ => None,
            };
        }

        match event.code {
            KeyCode::Up => Some(Self::Up),
            KeyCode::Down => Some(Self::Down),
            KeyCode::Esc => Some(Self::Quit),
            KeyCode::Char(c) => Self::from_char(c),
            _ => None,
        }
    }

    /// Maps a single ASCII character, ignoring case.
    #[must_use]
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'k' => Some(Self::Up),
            'j' => Some(Self::Down),
            's' => Some(Self::Sort),
            'l' => Some(Self::ToggleLeaks),
            'h' | '?' => Some(Self::Help),
            'r' => Some(Self::Refresh),
            'q' => Some(Self::Quit),
            _ => None,
        }
    }
}
