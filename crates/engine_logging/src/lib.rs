#![deny(missing_docs)]
//! Shared logging utilities for the html_merge workspace.
//!
//! This crate provides the `engine_*` logging macros used across the codebase
//! and a minimal test initializer for the global logger. Messages logged while
//! a conversion request is being processed are prefixed with its request id.

use std::cell::Cell;

thread_local! {
    /// Thread-local storage for the id of the conversion request being processed.
    static CURRENT_REQUEST: Cell<u64> = const { Cell::new(0) };
}

/// Marks the current thread as working on conversion request `id`.
/// Pass 0 once the request is finished.
pub fn set_current_request(id: u64) {
    CURRENT_REQUEST.with(|v| v.set(id));
}

/// Retrieves the conversion request id for the current thread.
/// Returns 0 when no request is being processed.
pub fn current_request() -> u64 {
    CURRENT_REQUEST.with(|v| v.get())
}

#[doc(hidden)]
#[macro_export]
macro_rules! __engine_log {
    ($level:ident, $($arg:tt)*) => {{
        match $crate::current_request() {
            0 => log::$level!($($arg)*),
            id => log::$level!("[req {}] {}", id, format_args!($($arg)*)),
        }
    }};
}

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! engine_trace {
    ($($arg:tt)*) => {
        $crate::__engine_log!(trace, $($arg)*)
    };
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! engine_info {
    ($($arg:tt)*) => {
        $crate::__engine_log!(info, $($arg)*)
    };
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! engine_debug {
    ($($arg:tt)*) => {
        $crate::__engine_log!(debug, $($arg)*)
    };
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! engine_warn {
    ($($arg:tt)*) => {
        $crate::__engine_log!(warn, $($arg)*)
    };
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! engine_error {
    ($($arg:tt)*) => {
        $crate::__engine_log!(error, $($arg)*)
    };
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};

    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    let config = ConfigBuilder::new()
        .set_target_level(log::LevelFilter::Error)
        .build();

    // Another test may have installed the logger already.
    let _ = TermLogger::init(level, config, TerminalMode::Mixed, ColorChoice::Never);
}
