//! Color selection for the live view.
//!
//! btop-style palette: cyan → green → yellow → orange → red as values rise.
//! Every function returns a plain [`Style`] when color is disabled.

use crate::types::PressureLevel;
use ratatui::style::{Color, Modifier, Style};

/// Color for a 0-100 usage percentage.
pub fn percent_color(percent: f64) -> Color {
    let p = percent.clamp(0.0, 100.0);

    if p >= 90.0 {
        Color::Rgb(255, 64, 64)
    } else if p >= 75.0 {
        let t = (p - 75.0) / 15.0;
        Color::Rgb(255, (180.0 - t * 116.0) as u8, 64)
    } else if p >= 50.0 {
        let t = (p - 50.0) / 25.0;
        Color::Rgb(255, (220.0 - t * 40.0) as u8, 64)
    } else if p >= 25.0 {
        let t = (p - 25.0) / 25.0;
        Color::Rgb((100.0 + t * 155.0) as u8, 220, (100.0 - t * 36.0) as u8)
    } else {
        let t = p / 25.0;
        Color::Rgb((64.0 + t * 36.0) as u8, (180.0 + t * 40.0) as u8, (220.0 - t * 120.0) as u8)
    }
}

/// Color for a pressure level.
pub fn pressure_color(level: PressureLevel) -> Color {
    match level {
        PressureLevel::Normal => Color::Rgb(100, 220, 100),
        PressureLevel::Warn => Color::Rgb(255, 220, 64),
        PressureLevel::Urgent => Color::Rgb(255, 150, 64),
        PressureLevel::Critical => Color::Rgb(255, 64, 64),
    }
}

/// Accent colors.
pub mod accents {
    use ratatui::style::Color;

    /// Header title.
    pub const TITLE: Color = Color::Rgb(100, 200, 255);
    /// Leak section.
    pub const LEAK: Color = Color::Rgb(255, 100, 100);
    /// Column headers and footer.
    pub const DIM: Color = Color::Rgb(140, 140, 140);
    /// Selected row background.
    pub const SELECTED_BG: Color = Color::Rgb(60, 60, 90);
    /// Error line.
    pub const ERROR: Color = Color::Rgb(255, 80, 80);
}

/// Style builder that honors the color toggle.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    enabled: bool,
}

impl Palette {
    /// Creates a palette; `enabled = false` yields unstyled text.
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Foreground-only style.
    pub fn fg(self, color: Color) -> Style {
        if self.enabled {
            Style::default().fg(color)
        } else {
            Style::default()
        }
    }

    /// Bold foreground style.
    pub fn bold(self, color: Color) -> Style {
        if self.enabled {
            Style::default().fg(color).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        }
    }

    /// Highlight for the selected row. Reverse video keeps it visible without color.
    pub fn selected(self) -> Style {
        if self.enabled {
            Style::default().bg(accents::SELECTED_BG).add_modifier(Modifier::BOLD)
        } else {
            Style::default().add_modifier(Modifier::REVERSED)
        }
    }
}
