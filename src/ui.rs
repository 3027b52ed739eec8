//! Frame layout and drawing.
//!
//! The live view is a fixed textual layout, top to bottom:
//!
//! - three header lines (usage, pressure, breakdown)
//! - the leak section when leaks are shown
//! - the process list header and rows
//! - an error line after a failed read
//! - the key legend
//!
//! Drawing reads a [`View`] and never touches engine state. Line builders are
//! public so single-shot reports print exactly what the live view shows.

use crate::format::{fit_left, format_bytes, format_percent, LEAK_NAME_WIDTH, NAME_WIDTH, PID_WIDTH, SIZE_WIDTH};
use crate::history::MAX_HISTORY;
use crate::leak::{LeakRecord, GROWTH_BYTES_THRESHOLD, GROWTH_PERCENT_THRESHOLD};
use crate::state::{InteractionState, Mode};
use crate::theme::{accents, percent_color, pressure_color, Palette};
use crate::types::{ProcessSample, SystemStats};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

/// Lines taken by the header.
pub const HEADER_LINES: usize = 3;
/// Most leak rows drawn; the rest are summarized on one line.
pub const MAX_LEAK_ROWS: usize = 8;

/// Everything a frame needs, borrowed from the engine.
#[derive(Debug, Clone, Copy)]
pub struct View<'a> {
    /// Cursor, scroll and toggles.
    pub state: &'a InteractionState,
    /// Host figures from the last good read.
    pub stats: &'a SystemStats,
    /// Sorted process list from the last good read.
    pub processes: &'a [ProcessSample],
    /// Leaks from the last detection pass.
    pub leaks: &'a [LeakRecord],
    /// Snapshots retained so far.
    pub history_len: usize,
    /// Message from the last failed read, if the last read failed.
    pub error: Option<&'a str>,
    /// Styling.
    pub palette: Palette,
}

/// Header lines: usage and pressure, free/cached/swap, page breakdown.
pub fn header_lines(stats: &SystemStats, palette: Palette) -> Vec<Line<'static>> {
    let pct = stats.used_percent();
    vec![
        Line::from(vec![
            Span::styled("memwatch", palette.bold(accents::TITLE)),
            Span::raw(format!(
                "  Memory: {} / {} (",
                format_bytes(stats.used),
                format_bytes(stats.total)
            )),
            Span::styled(format_percent(pct), palette.bold(percent_color(pct))),
            Span::raw(")  Pressure: "),
            Span::styled(stats.pressure.label(), palette.bold(pressure_color(stats.pressure))),
        ]),
        Line::from(format!(
            "Free: {}  Cached: {}  Swap: {} / {}",
            format_bytes(stats.free),
            format_bytes(stats.cached),
            format_bytes(stats.swap_used),
            format_bytes(stats.swap_total)
        )),
        Line::from(format!(
            "Active: {}  Inactive: {}  Wired: {}  Compressed: {}",
            format_bytes(stats.active),
            format_bytes(stats.inactive),
            format_bytes(stats.wired),
            format_bytes(stats.compressed)
        )),
    ]
}

/// Column header of the process list.
pub fn list_header(palette: Palette) -> Line<'static> {
    Line::styled(
        format!(
            "  {:>3} {:>PID_WIDTH$}  {:<NAME_WIDTH$}  {:>SIZE_WIDTH$}",
            "#", "PID", "NAME", "RESIDENT"
        ),
        palette.fg(accents::DIM),
    )
}

/// One process row; `rank` is 1-based.
pub fn process_line(rank: usize, sample: &ProcessSample, selected: bool, palette: Palette) -> Line<'static> {
    let marker = if selected { '>' } else { ' ' };
    let text = format!(
        "{marker} {rank:>3} {:>PID_WIDTH$}  {}  {:>SIZE_WIDTH$}",
        sample.pid,
        fit_left(&sample.name, NAME_WIDTH),
        format_bytes(sample.resident_bytes)
    );
    if selected {
        Line::styled(text, palette.selected())
    } else {
        Line::raw(text)
    }
}

/// One leak row.
pub fn leak_line(leak: &LeakRecord, palette: Palette) -> Line<'static> {
    Line::styled(
        format!(
            "{:>PID_WIDTH$}  {}  {:>SIZE_WIDTH$} -> {:>SIZE_WIDTH$}  +{:>SIZE_WIDTH$}  {:.1}s",
            leak.pid,
            fit_left(&leak.name, LEAK_NAME_WIDTH),
            format_bytes(leak.old_bytes),
            format_bytes(leak.new_bytes),
            format_bytes(leak.growth_bytes),
            leak.elapsed_secs
        ),
        palette.fg(accents::LEAK),
    )
}

/// Byte threshold of the leak heuristic in whole MiB.
const GROWTH_MIB: u64 = GROWTH_BYTES_THRESHOLD / (1024 * 1024);

/// Leak section: title plus rows or a status line.
pub fn leak_section(leaks: &[LeakRecord], history_len: usize, palette: Palette) -> Vec<Line<'static>> {
    let mut lines = vec![Line::styled(
        format!("LEAKS (growth > {GROWTH_MIB} MiB or > {GROWTH_PERCENT_THRESHOLD:.0}%)"),
        palette.bold(accents::LEAK),
    )];

    if history_len < 2 {
        lines.push(Line::styled(
            format!("  collecting history ({history_len}/{MAX_HISTORY})"),
            palette.fg(accents::DIM),
        ));
    } else if leaks.is_empty() {
        lines.push(Line::styled("  no leaks detected", palette.fg(accents::DIM)));
    } else {
        lines.extend(leaks.iter().take(MAX_LEAK_ROWS).map(|l| leak_line(l, palette)));
        if leaks.len() > MAX_LEAK_ROWS {
            lines.push(Line::styled(
                format!("  +{} more", leaks.len() - MAX_LEAK_ROWS),
                palette.fg(accents::LEAK),
            ));
        }
    }
    lines
}

/// Key legend shown on the last line.
pub fn footer(state: &InteractionState, palette: Palette) -> Line<'static> {
    Line::styled(
        format!(
            "↑/↓ select  s sort:{}  l leaks  h help  r refresh  q quit",
            state.sort_mode.label()
        ),
        palette.fg(accents::DIM),
    )
}

fn help_lines(palette: Palette) -> Vec<Line<'static>> {
    let heading = palette.bold(accents::TITLE);
    vec![
        Line::from(""),
        Line::styled("  Keys", heading),
        Line::from("    ↑/k  ↓/j          Move selection"),
        Line::from("    s                 Cycle sort: memory, pid, name"),
        Line::from("    l                 Show or hide leaks"),
        Line::from("    h, ?              Toggle this help"),
        Line::from("    r                 Refresh"),
        Line::from("    q, Esc, Ctrl+C    Quit"),
        Line::from(""),
        Line::styled("  Leaks", heading),
        Line::from(format!(
            "    A process is flagged when it grew by more than {GROWTH_MIB} MiB or {GROWTH_PERCENT_THRESHOLD:.0}%"
        )),
        Line::from(format!("    between the oldest and newest of the last {MAX_HISTORY} snapshots.")),
    ]
}

/// Lines used by everything except the process rows.
pub fn chrome_lines(view: &View<'_>) -> usize {
    let leak_lines = if view.state.show_leaks {
        leak_section(view.leaks, view.history_len, view.palette).len()
    } else {
        0
    };
    HEADER_LINES + leak_lines + 1 + usize::from(view.error.is_some()) + 1
}

/// Process rows that fit in `height` terminal lines, at least one.
pub fn rows_for_height(view: &View<'_>, height: u16) -> usize {
    usize::from(height).saturating_sub(chrome_lines(view)).max(1)
}

/// Header plus either the help legend or the leak section and process rows.
pub fn body_lines(view: &View<'_>) -> Vec<Line<'static>> {
    let palette = view.palette;
    let mut lines = header_lines(view.stats, palette);

    match view.state.mode() {
        Mode::Help => lines.extend(help_lines(palette)),
        Mode::Listing => {
            if view.state.show_leaks {
                lines.extend(leak_section(view.leaks, view.history_len, palette));
            }
            lines.push(list_header(palette));
            if view.processes.is_empty() {
                lines.push(Line::styled("  no processes", palette.fg(accents::DIM)));
            }
            for idx in view.state.visible_range() {
                if let Some(sample) = view.processes.get(idx) {
                    lines.push(process_line(idx + 1, sample, idx == view.state.selected, palette));
                }
            }
        }
    }
    lines
}

/// The optional error line followed by the footer.
pub fn status_lines(view: &View<'_>) -> Vec<Line<'static>> {
    let mut lines = Vec::with_capacity(2);
    if let Some(message) = view.error {
        lines.push(Line::styled(format!("error: {message}"), view.palette.fg(accents::ERROR)));
    }
    lines.push(footer(view.state, view.palette));
    lines
}

/// Every line of the frame, top to bottom.
pub fn frame_lines(view: &View<'_>) -> Vec<Line<'static>> {
    let mut lines = body_lines(view);
    lines.extend(status_lines(view));
    lines
}

/// Draws one frame.
///
/// Status lines are pinned to the bottom rows; the body flows from the top.
pub fn draw(f: &mut Frame, view: &View<'_>) {
    let area = f.area();
    let status = status_lines(view);
    let status_height = (status.len() as u16).min(area.height);

    let mut body = area;
    body.height = area.height - status_height;
    let mut bottom = area;
    bottom.y = area.y + body.height;
    bottom.height = status_height;

    f.render_widget(Paragraph::new(body_lines(view)).style(Style::default()), body);
    f.render_widget(Paragraph::new(status), bottom);
}
