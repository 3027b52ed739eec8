//! Single-shot reports.
//!
//! `--once` reads one snapshot and prints it as text, JSON or CSV instead of
//! starting the live view. A failed read is fatal here.

use crate::error::{MemwatchError, Result};
use crate::source::SnapshotSource;
use crate::theme::Palette;
use crate::types::{sort_samples, ProcessSample, SortMode, SystemStats};
use crate::ui;
use serde::Serialize;
use std::fmt::Write as _;
use std::str::FromStr;

/// Output format of a single-shot report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
    /// The live header followed by process rows.
    #[default]
    Text,
    /// Pretty-printed JSON object.
    Json,
    /// `pid,name,resident_bytes` rows.
    Csv,
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            other => Err(format!("unknown format '{other}' (expected text, json or csv)")),
        }
    }
}

/// One host snapshot ready to print.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    /// Host figures.
    pub system: SystemStats,
    /// Processes in the requested order.
    pub processes: Vec<ProcessSample>,
}

impl Report {
    /// Reads one snapshot from `source` and sorts it.
    ///
    /// # Errors
    ///
    /// Propagates the source's [`MemwatchError::Provider`].
    pub fn collect<S: SnapshotSource + ?Sized>(
        source: &mut S,
        sort: SortMode,
        capacity: usize,
    ) -> Result<Self> {
        let system = source.read_system_stats()?;
        let mut processes = source.read_process_list(capacity)?;
        processes.truncate(capacity);
        sort_samples(&mut processes, sort);
        tracing::debug!(source = source.id(), processes = processes.len(), "report collected");
        Ok(Self { system, processes })
    }

    /// Keeps only the first `n` processes.
    #[must_use]
    pub fn top(mut self, n: Option<usize>) -> Self {
        if let Some(n) = n {
            self.processes.truncate(n);
        }
        self
    }

    /// Renders the report.
    ///
    /// # Errors
    ///
    /// Returns [`MemwatchError::Report`] if JSON serialization fails.
    pub fn render(&self, format: ReportFormat) -> Result<String> {
        match format {
            ReportFormat::Text => Ok(self.to_text()),
            ReportFormat::Json => {
                serde_json::to_string_pretty(self).map_err(|e| MemwatchError::Report(e.to_string()))
            }
            ReportFormat::Csv => Ok(self.to_csv()),
        }
    }

    fn to_text(&self) -> String {
        let palette = Palette::new(false);
        let mut lines: Vec<String> =
            ui::header_lines(&self.system, palette).iter().map(ToString::to_string).collect();
        lines.push(ui::list_header(palette).to_string());
        lines.extend(
            self.processes
                .iter()
                .enumerate()
                .map(|(i, p)| ui::process_line(i + 1, p, false, palette).to_string()),
        );

        let mut out = String::new();
        for line in lines {
            out.push_str(line.trim_end());
            out.push('\n');
        }
        out
    }

    fn to_csv(&self) -> String {
        let mut out = String::from("pid,name,resident_bytes\n");
        for p in &self.processes {
            let _ = writeln!(out, "{},{},{}", p.pid, csv_field(&p.name), p.resident_bytes);
        }
        out
    }
}

/// Quotes a CSV field when it contains a delimiter, quote or line break.
fn csv_field(value: &str) -> std::borrow::Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\"")).into()
    } else {
        value.into()
    }
}
