//! Byte, percent and column formatting for the live view and reports.
//!
//! Column widths here are part of the screen layout; scripts that scrape the
//! output depend on them.

/// Width of byte-size columns.
pub const SIZE_WIDTH: usize = 10;
/// Width of the PID column.
pub const PID_WIDTH: usize = 7;
/// Width of the name column in the process list.
pub const NAME_WIDTH: usize = 32;
/// Width of the name column in the leak section.
pub const LEAK_NAME_WIDTH: usize = 24;

/// Format bytes using IEC units (powers of 1024).
///
/// # Examples
/// ```
/// use memwatch::format::format_bytes;
/// assert_eq!(format_bytes(0), "0B");
/// assert_eq!(format_bytes(1024), "1.00KiB");
/// assert_eq!(format_bytes(1536), "1.50KiB");
/// assert_eq!(format_bytes(50 * 1024 * 1024), "50.00MiB");
/// ```
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KiB", "MiB", "GiB", "TiB", "PiB", "EiB"];
    const THRESHOLD: f64 = 1024.0;

    if bytes == 0 {
        return "0B".to_string();
    }

    let mut value = bytes as f64;
    let mut unit_idx = 0;

    while value >= THRESHOLD && unit_idx < UNITS.len() - 1 {
        value /= THRESHOLD;
        unit_idx += 1;
    }

    if unit_idx == 0 {
        format!("{bytes}B")
    } else {
        format!("{:.2}{}", value, UNITS[unit_idx])
    }
}

/// Format a percentage value with one decimal.
///
/// # Examples
/// ```
/// use memwatch::format::format_percent;
/// assert_eq!(format_percent(45.25), "45.2%");
/// assert_eq!(format_percent(100.0), "100.0%");
/// ```
#[must_use]
pub fn format_percent(value: f64) -> String {
    format!("{value:.1}%")
}

/// Pads or truncates `text` to exactly `width` characters, left aligned.
///
/// # Examples
/// ```
/// use memwatch::format::fit_left;
/// assert_eq!(fit_left("bash", 6), "bash  ");
/// assert_eq!(fit_left("postgres", 5), "postg");
/// ```
#[must_use]
pub fn fit_left(text: &str, width: usize) -> String {
    let truncated: String = text.chars().take(width).collect();
    format!("{truncated:<width$}")
}
