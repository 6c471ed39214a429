//! Log records and the listeners that receive them.

use std::fmt;
use std::sync::{Mutex, PoisonError};

/// Severity of a [`LogRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
    /// Shown regardless of any level filter.
    Always,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Always => "always",
        })
    }
}

/// One broadcast message with its call site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub level: LogLevel,
    pub file: String,
    pub method: String,
    pub line: u32,
    pub message: String,
}

/// Receives every record broadcast by a [`LogManager`](crate::LogManager).
///
/// Listeners are invoked outside the manager's lock, possibly from several
/// threads at once.
pub trait LogListener: Send + Sync {
    fn log_message(&self, record: &LogRecord);
}

/// Forwards records into `tracing` at the matching level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingListener;

impl LogListener for TracingListener {
    fn log_message(&self, record: &LogRecord) {
        let LogRecord {
            level,
            file,
            method,
            line,
            message,
        } = record;
        match level {
            LogLevel::Debug => tracing::debug!(%file, %method, line, "{message}"),
            LogLevel::Info | LogLevel::Always => {
                tracing::info!(%file, %method, line, "{message}")
            }
            LogLevel::Warning => tracing::warn!(%file, %method, line, "{message}"),
            LogLevel::Error => tracing::error!(%file, %method, line, "{message}"),
        }
    }
}

/// Buffers records in memory.
#[derive(Debug, Default)]
pub struct MemoryListener {
    records: Mutex<Vec<LogRecord>>,
}

impl MemoryListener {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies out everything received so far.
    #[must_use]
    pub fn records(&self) -> Vec<LogRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of records at or above `level`.
    #[must_use]
    pub fn count_at_least(&self, level: LogLevel) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|record| record.level >= level)
            .count()
    }

    pub fn clear(&self) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl LogListener for MemoryListener {
    fn log_message(&self, record: &LogRecord) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record.clone());
    }
}
