//! # memwatch
//!
//! Live terminal memory monitor with per-process growth detection.
//!
//! memwatch samples host memory figures and per-process resident sizes on a
//! fixed tick, keeps the last [`history::MAX_HISTORY`] snapshots in a ring
//! buffer and flags processes that grew by more than 50 MiB or 20% between
//! the oldest and newest of them.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use memwatch::app::{run_live, CancellationToken};
//! use memwatch::config::Options;
//! use memwatch::source;
//!
//! let source = source::native()?;
//! run_live(source, Options::default(), &CancellationToken::new())?;
//! # Ok::<(), memwatch::error::MemwatchError>(())
//! ```
//!
//! ## Layout
//!
//! - [`source`]: where snapshots come from (`/proc`, macOS tools)
//! - [`history`] and [`leak`]: the snapshot ring and the growth heuristic
//! - [`state`] and [`input`]: cursor, scroll window, toggles and key mapping
//! - [`ui`] and [`app`]: frame drawing, the tick engine and terminal lifecycle
//! - [`report`]: single-shot text, JSON and CSV output

#![warn(missing_docs)]
// Allow unwrap() in tests only - banned in production code
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]

pub mod app;
pub mod config;
pub mod error;
pub mod format;
pub mod history;
pub mod input;
pub mod leak;
pub mod logging;
pub mod report;
pub mod source;
pub mod state;
pub mod theme;
pub mod types;
pub mod ui;

pub use error::{MemwatchError, Result};
