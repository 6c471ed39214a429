//! # engine_log
//!
//! Broadcasts log records to a dynamic set of listeners.
//!
//! Engine code logs through `tracing` directly; this crate exists for
//! consumers that want to observe log traffic at runtime (an editor console,
//! a script debugger) by registering a [`LogListener`] with a [`LogManager`].
//! [`TracingListener`] closes the loop by forwarding broadcast records into
//! `tracing`.

pub mod listener;
pub mod manager;

pub use listener::{LogLevel, LogListener, LogRecord, MemoryListener, TracingListener};
pub use manager::LogManager;

/// Broadcasts a formatted message through a [`LogManager`], capturing the
/// call site.
///
/// ```rust
/// use engine_log::{LogLevel, LogManager, log_message};
///
/// let manager = LogManager::new();
/// log_message!(manager, LogLevel::Info, "spawned {} entities", 3);
/// ```
#[macro_export]
macro_rules! log_message {
    ($manager:expr, $level:expr, $($arg:tt)+) => {
        $manager.log_message(&$crate::LogRecord {
            level: $level,
            file: file!().to_owned(),
            method: module_path!().to_owned(),
            line: line!(),
            message: format!($($arg)+),
        })
    };
}
