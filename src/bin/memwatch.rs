//! memwatch - live terminal memory monitor with leak detection.
//!
//! Run: `memwatch` for the live view, `memwatch --once --format json` for a
//! single snapshot.

use anyhow::{Context, Result};
use clap::Parser;
use memwatch::app::{self, CancellationToken};
use memwatch::config::{Config, Options, Overrides};
use memwatch::logging::{self, LogTarget};
use memwatch::report::{Report, ReportFormat};
use memwatch::source;
use memwatch::types::SortMode;
use std::path::PathBuf;

/// memwatch: live memory monitor with per-process growth detection
#[derive(Parser, Debug)]
#[command(name = "memwatch")]
#[command(version)]
#[command(about = "Live terminal memory monitor with leak detection", long_about = None)]
struct Cli {
    /// Tick interval in milliseconds
    #[arg(short, long)]
    interval: Option<u64>,

    /// Maximum process rows shown
    #[arg(short, long)]
    rows: Option<usize>,

    /// Start with the leak section shown
    #[arg(short, long)]
    leaks: bool,

    /// Disable colors
    #[arg(long)]
    no_color: bool,

    /// Initial sort: memory, pid or name
    #[arg(short, long)]
    sort: Option<SortMode>,

    /// Config file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print one snapshot and exit
    #[arg(long)]
    once: bool,

    /// Output format for --once: text, json or csv
    #[arg(short, long, default_value = "text", requires = "once")]
    format: ReportFormat,

    /// Only print the first N processes with --once
    #[arg(short, long, requires = "once")]
    top: Option<usize>,

    /// Enable diagnostic logging (also MEMWATCH_DEBUG=1)
    #[arg(long)]
    debug: bool,

    /// Log file used while the live view is active
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            tick_ms: self.interval,
            rows: self.rows,
            leaks: self.leaks,
            no_color: self.no_color,
            sort: self.sort,
        }
    }

    fn log_target(&self) -> Option<LogTarget> {
        if !logging::is_requested(self.debug) {
            return None;
        }
        if self.once {
            return Some(LogTarget::Stderr);
        }
        self.log_file.clone().or_else(logging::default_log_path).map(LogTarget::File)
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    if let Some(target) = cli.log_target() {
        logging::init(&target)?;
    }

    let config = Config::resolve(cli.config.as_deref())?;
    let options = Options::from_config(&config, &cli.overrides())?;
    tracing::debug!(?options, "options resolved");

    let mut source = source::native()?;

    if cli.once {
        let report = Report::collect(&mut source, options.initial_sort, options.process_capacity)?
            .top(cli.top);
        print!("{}", report.render(cli.format)?);
        return Ok(());
    }

    let cancel = CancellationToken::new();
    #[cfg(unix)]
    app::watch_signals(cancel.clone()).context("failed to install signal handlers")?;

    app::run_live(source, options, &cancel).context("live view failed")
}
