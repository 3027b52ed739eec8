//! Live monitor: tick engine, render loop and terminal lifecycle.
//!
//! One tick reads a snapshot, sorts it, records it in the leak history,
//! runs detection when leaks are shown and re-clamps the cursor. The loop
//! then draws, applies at most one key and sleeps for the tick interval.
//! Keys beyond the first that are pending at poll time are discarded.
//! Everything runs on the calling thread; signals only flip a
//! [`CancellationToken`] that is checked at the top of each iteration.

use crate::config::Options;
use crate::error::Result;
use crate::input::Key;
use crate::leak::{LeakDetector, LeakRecord};
use crate::source::SnapshotSource;
use crate::state::{Flow, InteractionState};
use crate::theme::Palette;
use crate::types::{sort_samples, ProcessSample, Snapshot, SystemStats};
use crate::ui::{self, View};

use crossterm::cursor::{Hide, Show};
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::Terminal;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Once};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Shared stop flag for the render loop.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// Creates an unset token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests the loop to stop after the current tick.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// The tick engine: snapshot source, leak history and interaction state.
pub struct Monitor<S> {
    source: S,
    options: Options,
    detector: LeakDetector,
    state: InteractionState,
    stats: SystemStats,
    processes: Vec<ProcessSample>,
    leaks: Vec<LeakRecord>,
    last_error: Option<String>,
    started: Instant,
}

impl<S: SnapshotSource> Monitor<S> {
    /// Creates an engine with empty history.
    pub fn new(source: S, options: Options) -> Self {
        Self {
            state: InteractionState::from_options(&options),
            source,
            options,
            detector: LeakDetector::new(),
            stats: SystemStats::default(),
            processes: Vec::new(),
            leaks: Vec::new(),
            last_error: None,
            started: Instant::now(),
        }
    }

    /// Runs one tick stamped with the time since the engine started.
    pub fn tick(&mut self) {
        let now = self.started.elapsed().as_secs_f64();
        self.tick_at(now);
    }

    /// Runs one tick with an explicit monotonic timestamp in seconds.
    ///
    /// A failed read keeps the previous snapshot on screen and records the
    /// message for the error line; the history is not advanced.
    pub fn tick_at(&mut self, timestamp: f64) {
        match self.read() {
            Ok((stats, samples)) => {
                let snapshot = Snapshot::new(timestamp, samples);
                self.stats = stats;
                self.processes.clone_from(&snapshot.samples);
                self.detector.record(snapshot);
                self.last_error = None;
            }
            Err(e) => {
                warn!(source = self.source.id(), error = %e, "snapshot read failed");
                self.last_error = Some(e.to_string());
                // Retained rows still follow a sort key pressed since.
                sort_samples(&mut self.processes, self.state.sort_mode);
            }
        }

        self.leaks = if self.state.show_leaks { self.detector.detect() } else { Vec::new() };
        self.state.reconcile(self.processes.len());
    }

    fn read(&mut self) -> Result<(SystemStats, Vec<ProcessSample>)> {
        let stats = self.source.read_system_stats()?;
        let mut samples = self.source.read_process_list(self.options.process_capacity)?;
        samples.truncate(self.options.process_capacity);
        sort_samples(&mut samples, self.state.sort_mode);
        Ok((stats, samples))
    }

    /// Applies one key.
    pub fn handle_key(&mut self, key: Key) -> Flow {
        let flow = self.state.apply(key);
        debug!(?key, ?flow, sort = %self.state.sort_mode, "key applied");
        flow
    }

    /// Shrinks the visible rows to what fits in `height` terminal lines,
    /// never exceeding the configured row count.
    pub fn fit_to_height(&mut self, height: u16) {
        let rows = ui::rows_for_height(&self.view(), height).min(self.options.visible_rows);
        self.state.set_visible_rows(rows);
    }

    /// Borrowed view for drawing.
    pub fn view(&self) -> View<'_> {
        View {
            state: &self.state,
            stats: &self.stats,
            processes: &self.processes,
            leaks: &self.leaks,
            history_len: self.detector.history().len(),
            error: self.last_error.as_deref(),
            palette: Palette::new(self.options.color_enabled),
        }
    }

    /// Interaction state.
    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    /// Sorted process list from the last good read.
    pub fn processes(&self) -> &[ProcessSample] {
        &self.processes
    }

    /// Leaks from the last tick; empty while leaks are hidden.
    pub fn leaks(&self) -> &[LeakRecord] {
        &self.leaks
    }

    /// Host figures from the last good read.
    pub fn stats(&self) -> &SystemStats {
        &self.stats
    }

    /// Message of the last failed read, cleared by the next good one.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Leak detector and its history.
    pub fn detector(&self) -> &LeakDetector {
        &self.detector
    }

    /// Runtime options.
    pub fn options(&self) -> &Options {
        &self.options
    }
}

/// Non-blocking source of key presses.
pub trait KeySource {
    /// Returns at most one key per call, or `None` without waiting.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal can't be read.
    fn poll_key(&mut self) -> Result<Option<Key>>;
}

/// Raw terminal events, readable without blocking.
pub trait EventQueue {
    /// Whether an event is ready.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal can't be polled.
    fn has_event(&mut self) -> io::Result<bool>;

    /// Takes the next event; only called after [`EventQueue::has_event`].
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal can't be read.
    fn next_event(&mut self) -> io::Result<Event>;
}

/// The process-wide crossterm event queue.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalEvents;

impl EventQueue for TerminalEvents {
    fn has_event(&mut self) -> io::Result<bool> {
        event::poll(Duration::ZERO)
    }

    fn next_event(&mut self) -> io::Result<Event> {
        event::read()
    }
}

/// Keys decoded from an [`EventQueue`].
///
/// Each poll takes the first key that decodes and discards everything else
/// pending, so keys arriving faster than the tick are dropped rather than
/// replayed on later ticks.
#[derive(Debug, Default)]
pub struct CrosstermKeys<Q = TerminalEvents> {
    queue: Q,
}

impl CrosstermKeys {
    /// Keys from the terminal.
    #[must_use]
    pub fn new() -> Self {
        Self::with_queue(TerminalEvents)
    }
}

impl<Q: EventQueue> CrosstermKeys<Q> {
    /// Keys from an arbitrary event queue.
    pub fn with_queue(queue: Q) -> Self {
        Self { queue }
    }
}

impl<Q: EventQueue> KeySource for CrosstermKeys<Q> {
    fn poll_key(&mut self) -> Result<Option<Key>> {
        let mut key = None;
        let mut dropped = 0usize;
        // Resize and mouse events are consumed; the next tick re-measures.
        while self.queue.has_event()? {
            let event = self.queue.next_event()?;
            match (key, event) {
                (None, Event::Key(press)) => key = Key::from_event(press),
                (Some(_), _) => dropped += 1,
                (None, _) => {}
            }
        }
        if dropped > 0 {
            debug!(dropped, "discarded events pending behind a key");
        }
        Ok(key)
    }
}

/// Drives ticks until quit, cancellation or a terminal error.
///
/// A cancellation raised mid-tick is honored after that tick's frame is drawn.
///
/// # Errors
///
/// Returns [`crate::error::MemwatchError::Terminal`] if drawing or key reads
/// fail. Snapshot read failures never end the loop.
pub fn run_loop<S, B, K>(
    terminal: &mut Terminal<B>,
    monitor: &mut Monitor<S>,
    keys: &mut K,
    cancel: &CancellationToken,
) -> Result<()>
where
    S: SnapshotSource,
    B: Backend,
    K: KeySource,
{
    let interval = monitor.options().tick_interval;
    info!(interval_ms = interval.as_millis() as u64, "render loop started");

    let mut ticks: u64 = 0;
    loop {
        if cancel.is_cancelled() {
            info!(ticks, "render loop cancelled");
            break;
        }

        monitor.tick();
        ticks += 1;
        let height = terminal.size()?.height;
        monitor.fit_to_height(height);
        terminal.draw(|f| ui::draw(f, &monitor.view()))?;

        if let Some(key) = keys.poll_key()? {
            if monitor.handle_key(key) == Flow::Quit {
                info!(ticks, "quit requested");
                break;
            }
        }

        thread::sleep(interval);
    }
    Ok(())
}

/// Raw mode plus alternate screen, restored on drop.
#[derive(Debug)]
pub struct TerminalGuard {
    active: bool,
}

impl TerminalGuard {
    /// Enters raw mode and the alternate screen and hides the cursor.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::MemwatchError::Terminal`]; any partial setup is undone.
    pub fn acquire() -> Result<Self> {
        enable_raw_mode()?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen, Hide) {
            restore_terminal();
            return Err(e.into());
        }
        debug!("terminal acquired");
        Ok(Self { active: true })
    }

    /// Restores the terminal and reports failures.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::MemwatchError::Terminal`] if raw mode can't be left.
    pub fn release(mut self) -> Result<()> {
        self.active = false;
        let screen = execute!(io::stdout(), Show, LeaveAlternateScreen);
        disable_raw_mode()?;
        screen?;
        debug!("terminal restored");
        Ok(())
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if self.active {
            restore_terminal();
        }
    }
}

/// Best-effort terminal restore for error and panic paths.
pub fn restore_terminal() {
    let _ = execute!(io::stdout(), Show, LeaveAlternateScreen);
    let _ = disable_raw_mode();
}

/// Installs a panic hook that restores the terminal before reporting.
///
/// Release builds abort on panic, so unwinding never reaches the guard.
pub fn install_panic_hook() {
    static INSTALL: Once = Once::new();
    INSTALL.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            restore_terminal();
            previous(info);
        }));
    });
}

/// Routes SIGINT, SIGTERM and SIGHUP to `token`.
///
/// Blocks the signals on the calling thread, so call it before spawning
/// other threads; a watcher thread waits for them and sets the token.
///
/// # Errors
///
/// Returns an error if the signal mask can't be changed or the watcher
/// thread can't be spawned.
#[cfg(unix)]
pub fn watch_signals(token: CancellationToken) -> Result<()> {
    use nix::sys::signal::{SigSet, Signal};

    let mut set = SigSet::empty();
    set.add(Signal::SIGINT);
    set.add(Signal::SIGTERM);
    set.add(Signal::SIGHUP);
    set.thread_block().map_err(io::Error::from)?;

    thread::Builder::new().name("memwatch-signals".into()).spawn(move || match set.wait() {
        Ok(signal) => {
            info!(?signal, "signal received, stopping");
            token.cancel();
        }
        Err(e) => warn!(error = %e, "signal wait failed"),
    })?;
    Ok(())
}

/// Runs the live view on the real terminal until quit or cancellation.
///
/// # Errors
///
/// Returns [`crate::error::MemwatchError::Terminal`] if the terminal can't
/// be acquired, drawn to or restored.
pub fn run_live<S: SnapshotSource>(
    source: S,
    options: Options,
    cancel: &CancellationToken,
) -> Result<()> {
    install_panic_hook();
    let guard = TerminalGuard::acquire()?;

    let result = Terminal::new(CrosstermBackend::new(io::stdout()))
        .map_err(Into::into)
        .and_then(|mut terminal| {
            let mut monitor = Monitor::new(source, options);
            run_loop(&mut terminal, &mut monitor, &mut CrosstermKeys::new(), cancel)
        });

    let restored = guard.release();
    result.and(restored)
}
