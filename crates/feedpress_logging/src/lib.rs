#![deny(missing_docs)]
//! Shared logging utilities for the feedpress workspace.
//!
//! This crate provides the `press_*` logging macros used across the codebase,
//! a per-entry log context and a minimal test initializer for the global
//! logger.
//!
//! The pipeline processes one feed entry at a time on a single thread, so the
//! entry context lives in thread-local storage and is attached to every
//! message logged while an [`EntryScope`] is alive.

use std::cell::Cell;
use std::marker::PhantomData;

thread_local! {
    /// Ordinal of the feed entry currently being processed on this thread (0 = none).
    static CURRENT_ENTRY: Cell<u64> = const { Cell::new(0) };
}

/// Guard returned by [`enter_entry`]; restores the previous context on drop.
///
/// The guard is `!Send`: it must be dropped on the thread that created it, so
/// a future holding it across an `.await` cannot move between worker threads.
#[must_use = "the entry context is cleared as soon as the scope is dropped"]
pub struct EntryScope {
    previous: u64,
    _thread_bound: PhantomData<*const ()>,
}

impl Drop for EntryScope {
    fn drop(&mut self) {
        CURRENT_ENTRY.with(|v| v.set(self.previous));
    }
}

/// Marks every message logged on this thread as belonging to entry `ordinal`
/// until the returned scope is dropped.
pub fn enter_entry(ordinal: u64) -> EntryScope {
    let previous = CURRENT_ENTRY.with(|v| v.replace(ordinal));
    EntryScope {
        previous,
        _thread_bound: PhantomData,
    }
}

/// Returns the ordinal of the entry in scope, or 0 outside any entry.
pub fn current_entry() -> u64 {
    CURRENT_ENTRY.with(|v| v.get())
}

/// Renders the prefix attached to messages logged inside an entry scope.
#[doc(hidden)]
pub fn entry_prefix() -> String {
    match current_entry() {
        0 => String::new(),
        n => format!("[entry {n}] "),
    }
}

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! press_trace {
    ($($arg:tt)*) => {{
        log::trace!("{}{}", $crate::entry_prefix(), format_args!($($arg)*));
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! press_debug {
    ($($arg:tt)*) => {{
        log::debug!("{}{}", $crate::entry_prefix(), format_args!($($arg)*));
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! press_info {
    ($($arg:tt)*) => {{
        log::info!("{}{}", $crate::entry_prefix(), format_args!($($arg)*));
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! press_warn {
    ($($arg:tt)*) => {{
        log::warn!("{}{}", $crate::entry_prefix(), format_args!($($arg)*));
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! press_error {
    ($($arg:tt)*) => {{
        log::error!("{}{}", $crate::entry_prefix(), format_args!($($arg)*));
    }};
}

/// Initializes a simple terminal logger for use in tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
