//! The listener registry.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::listener::{LogListener, LogRecord};

/// A thread-safe list of [`LogListener`]s.
///
/// Dispatch copies the listener list under the lock and invokes the copies
/// after releasing it. A listener may therefore add or remove listeners
/// (itself included) from inside its callback; such changes take effect from
/// the next broadcast on.
#[derive(Default)]
pub struct LogManager {
    listeners: Mutex<Vec<Arc<dyn LogListener>>>,
}

impl LogManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Arc<dyn LogListener>>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sends `record` to every listener registered at the time of the call.
    pub fn log_message(&self, record: &LogRecord) {
        let snapshot = self.lock().clone();
        for listener in &snapshot {
            listener.log_message(record);
        }
    }

    pub fn add_listener(&self, listener: Arc<dyn LogListener>) {
        self.lock().push(listener);
    }

    /// Removes the first registration of `listener` (by pointer identity).
    ///
    /// Returns `true` if it was registered.
    pub fn remove_listener(&self, listener: &Arc<dyn LogListener>) -> bool {
        let mut listeners = self.lock();
        match listeners.iter().position(|l| Arc::ptr_eq(l, listener)) {
            Some(index) => {
                listeners.remove(index);
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.lock().len()
    }

    /// The listener at `index`, in registration order.
    #[must_use]
    pub fn listener(&self, index: usize) -> Option<Arc<dyn LogListener>> {
        self.lock().get(index).cloned()
    }
}

impl std::fmt::Debug for LogManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogManager")
            .field("listeners", &self.listener_count())
            .finish()
    }
}
