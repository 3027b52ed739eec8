//! Snapshot sources.
//!
//! A [`SnapshotSource`] yields host memory figures and the per-process
//! resident list on demand. The engine only sees the trait; platform
//! providers live in submodules and [`native`] picks the one for the host.

pub mod linux;
pub mod macos;
pub mod subprocess;

use crate::error::{MemwatchError, Result};
use crate::types::{ProcessSample, SystemStats};

pub use linux::ProcSource;
pub use macos::MacSource;

/// Source of memory statistics.
///
/// Reads may be slow; the caller waits. Processes that can't be inspected are
/// omitted from the list rather than reported.
pub trait SnapshotSource {
    /// Short identifier used in errors and logs.
    fn id(&self) -> &'static str;

    /// Reads host-wide memory figures.
    ///
    /// # Errors
    ///
    /// Returns [`MemwatchError::Provider`] if the underlying OS call fails.
    fn read_system_stats(&mut self) -> Result<SystemStats>;

    /// Reads at most `capacity` process samples, in no particular order.
    ///
    /// # Errors
    ///
    /// Returns [`MemwatchError::Provider`] if the process table can't be read.
    fn read_process_list(&mut self, capacity: usize) -> Result<Vec<ProcessSample>>;
}

impl<S: SnapshotSource + ?Sized> SnapshotSource for Box<S> {
    fn id(&self) -> &'static str {
        (**self).id()
    }

    fn read_system_stats(&mut self) -> Result<SystemStats> {
        (**self).read_system_stats()
    }

    fn read_process_list(&mut self, capacity: usize) -> Result<Vec<ProcessSample>> {
        (**self).read_process_list(capacity)
    }
}

/// Returns the provider for the current platform.
///
/// # Errors
///
/// Fails with [`MemwatchError::Provider`] on platforms without a provider.
pub fn native() -> Result<Box<dyn SnapshotSource>> {
    if cfg!(target_os = "linux") {
        Ok(Box::new(ProcSource::new()))
    } else if cfg!(target_os = "macos") {
        Ok(Box::new(MacSource::new()))
    } else {
        Err(MemwatchError::provider("native", "unsupported platform"))
    }
}
