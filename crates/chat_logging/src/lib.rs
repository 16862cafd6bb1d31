#![deny(missing_docs)]
//! Shared logging utilities for the chat harvester workspace.
//!
//! This crate provides the `chat_*` logging macros used across the codebase
//! and a minimal test initializer for the global logger. Lines logged while a
//! job context is set on the current thread are prefixed with `[job N]`.

use std::cell::Cell;

#[doc(hidden)]
pub use log;

thread_local! {
    /// Index of the collection job the current thread is working on, if any.
    static JOB_CONTEXT: Cell<Option<usize>> = const { Cell::new(None) };
}

/// Marks the current thread as working on the job with the given index.
/// The collection worker calls this when it picks up a job.
pub fn set_job_context(job_index: usize) {
    JOB_CONTEXT.with(|v| v.set(Some(job_index)));
}

/// Clears the job context of the current thread.
pub fn clear_job_context() {
    JOB_CONTEXT.with(|v| v.set(None));
}

/// Returns the job index set on the current thread, if any.
pub fn job_context() -> Option<usize> {
    JOB_CONTEXT.with(|v| v.get())
}

/// Prefix prepended by the logging macros; empty outside of a job.
#[doc(hidden)]
pub fn context_prefix() -> String {
    match job_context() {
        Some(index) => format!("[job {index}] "),
        None => String::new(),
    }
}

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! chat_trace {
    ($($arg:tt)*) => {{
        $crate::log::trace!("{}{}", $crate::context_prefix(), format_args!($($arg)*));
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! chat_info {
    ($($arg:tt)*) => {{
        $crate::log::info!("{}{}", $crate::context_prefix(), format_args!($($arg)*));
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! chat_debug {
    ($($arg:tt)*) => {{
        $crate::log::debug!("{}{}", $crate::context_prefix(), format_args!($($arg)*));
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! chat_warn {
    ($($arg:tt)*) => {{
        $crate::log::warn!("{}{}", $crate::context_prefix(), format_args!($($arg)*));
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! chat_error {
    ($($arg:tt)*) => {{
        $crate::log::error!("{}{}", $crate::context_prefix(), format_args!($($arg)*));
    }};
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    // Debug builds get debug level, release builds info.
    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Another test may already have installed a logger.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
