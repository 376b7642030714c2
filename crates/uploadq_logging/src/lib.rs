#![deny(missing_docs)]
//! Shared logging macros for the upload queue workspace.
//!
//! Every crate logs through the `uploadq_*` macros so that all engine output
//! lands under a single `uploadq` target, which the binary can filter on.

/// Log target used by every `uploadq_*` macro.
pub const LOG_TARGET: &str = "uploadq";

/// Logs a trace-level message under the `uploadq` target.
#[macro_export]
macro_rules! uploadq_trace {
    ($($arg:tt)*) => {{
        log::trace!(target: $crate::LOG_TARGET, $($arg)*);
    }};
}

/// Logs a debug-level message under the `uploadq` target.
#[macro_export]
macro_rules! uploadq_debug {
    ($($arg:tt)*) => {{
        log::debug!(target: $crate::LOG_TARGET, $($arg)*);
    }};
}

/// Logs an info-level message under the `uploadq` target.
#[macro_export]
macro_rules! uploadq_info {
    ($($arg:tt)*) => {{
        log::info!(target: $crate::LOG_TARGET, $($arg)*);
    }};
}

/// Logs a warn-level message under the `uploadq` target.
#[macro_export]
macro_rules! uploadq_warn {
    ($($arg:tt)*) => {{
        log::warn!(target: $crate::LOG_TARGET, $($arg)*);
    }};
}

/// Logs an error-level message under the `uploadq` target.
#[macro_export]
macro_rules! uploadq_error {
    ($($arg:tt)*) => {{
        log::error!(target: $crate::LOG_TARGET, $($arg)*);
    }};
}

/// Initializes a terminal logger for tests.
///
/// Safe to call from every test: a second initialization is ignored.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, ConfigBuilder, TermLogger, TerminalMode};

    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    let config = ConfigBuilder::new()
        .add_filter_allow_str(LOG_TARGET)
        .build();

    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        config,
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
