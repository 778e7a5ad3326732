//! Status logging for the command-line filters.
//!
//! Status lines go to stderr so stdout stays clean for table or FASTA
//! output. A global [`Logger`] carries the quiet switch set once from the
//! CLI flags.

use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicBool, Ordering};

/// Log level for stderr display.
#[derive(Debug, Clone, Copy)]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Global logger.
pub static LOGGER: Lazy<Logger> = Lazy::new(Logger::new);

/// Writes leveled status lines to stderr.
pub struct Logger {
    quiet: AtomicBool,
}

impl Logger {
    pub fn new() -> Self {
        Self {
            quiet: AtomicBool::new(false),
        }
    }

    /// Suppress everything below `Error`.
    pub fn set_quiet(&self, quiet: bool) {
        self.quiet.store(quiet, Ordering::Relaxed);
    }

    pub fn log(&self, level: LogLevel, message: &str) {
        if self.quiet.load(Ordering::Relaxed) && !matches!(level, LogLevel::Error) {
            return;
        }
        let prefix = match level {
            LogLevel::Info => "  ",
            LogLevel::Success => "  ✓",
            LogLevel::Warning => "  ⚠️",
            LogLevel::Error => "  ❌",
        };
        eprintln!("{} {}", prefix, message);
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenient logging functions
pub fn log_info(msg: impl Into<String>) {
    LOGGER.log(LogLevel::Info, &msg.into());
}

pub fn log_success(msg: impl Into<String>) {
    LOGGER.log(LogLevel::Success, &msg.into());
}

pub fn log_warning(msg: impl Into<String>) {
    LOGGER.log(LogLevel::Warning, &msg.into());
}

pub fn log_error(msg: impl Into<String>) {
    LOGGER.log(LogLevel::Error, &msg.into());
}
