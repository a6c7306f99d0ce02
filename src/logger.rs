//! Loggers of the process-wide hierarchy.
//!
//! A [`Logger`] owns an optional threshold and a list of handlers. Level
//! inheritance and handler propagation are resolved by the
//! [`manager`](crate::manager), which knows the registered ancestors.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use log::{Level, LevelFilter};
// parking_lot avoids poisoning and matches crate-wide locking strategy
use parking_lot::RwLock;

use crate::handler::LogHandler;
use crate::level::{TestLogLevel, filter_to_u8, u8_to_filter};
use crate::log_record::{LogEvent, RecordMetadata, SharedError};
use crate::manager;

const UNSET_LEVEL: u8 = u8::MAX;

/// A named node of the logger hierarchy.
pub struct Logger {
    name: String,
    parent: Option<String>,
    level: AtomicU8,
    handlers: RwLock<Vec<Arc<dyn LogHandler>>>,
}

impl Logger {
    pub(crate) fn new(name: &str, level: Option<LevelFilter>) -> Self {
        let parent = if name.is_empty() {
            None
        } else {
            Some(
                name.rsplit_once("::")
                    .map_or_else(String::new, |(parent, _)| parent.to_owned()),
            )
        };
        Self {
            name: name.to_owned(),
            parent,
            level: AtomicU8::new(level.map_or(UNSET_LEVEL, filter_to_u8)),
            handlers: RwLock::new(Vec::new()),
        }
    }

    /// Name of the logger, `""` for the root.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the parent logger, `None` for the root.
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Set the logger's own threshold.
    pub fn set_level(&self, level: LevelFilter) {
        self.level.store(filter_to_u8(level), Ordering::Relaxed);
    }

    /// Inherit the threshold from the nearest ancestor again.
    ///
    /// The root always keeps its threshold, so this is a no-op there.
    pub fn clear_level(&self) {
        if !self.is_root() {
            self.level.store(UNSET_LEVEL, Ordering::Relaxed);
        }
    }

    /// The logger's own threshold, `None` when inherited.
    pub fn level(&self) -> Option<LevelFilter> {
        match self.level.load(Ordering::Relaxed) {
            UNSET_LEVEL => None,
            value => Some(u8_to_filter(value)),
        }
    }

    /// Threshold in force for this logger after inheritance.
    pub fn effective_level(&self) -> LevelFilter {
        self.level()
            .unwrap_or_else(|| manager::effective_level(&self.name))
    }

    /// Return `true` if records at `level` pass this logger's threshold.
    pub fn is_enabled_for(&self, level: Level) -> bool {
        level <= self.effective_level()
    }

    /// Log `message` at `level`. Returns `true` if the record was dispatched.
    pub fn log(&self, level: impl Into<TestLogLevel>, message: &str) -> bool {
        self.log_event(LogEvent::new(&self.name, level.into(), message))
    }

    /// Log `message` at `level` with `error` attached.
    pub fn log_with_error(
        &self,
        level: impl Into<TestLogLevel>,
        message: &str,
        error: SharedError,
    ) -> bool {
        self.log_event(LogEvent::new(&self.name, level.into(), message).with_error(error))
    }

    /// Log `message` at `level` with an explicit source location.
    pub fn log_with_metadata(
        &self,
        level: impl Into<TestLogLevel>,
        message: &str,
        metadata: RecordMetadata,
    ) -> bool {
        self.log_event(LogEvent::new(&self.name, level.into(), message).with_metadata(metadata))
    }

    /// Dispatch a prepared event if its level passes this logger's threshold.
    ///
    /// The event goes to this logger's handlers and then to those of each
    /// registered ancestor up to the root.
    pub fn log_event(&self, event: LogEvent) -> bool {
        if !self.is_enabled_for(event.level().native()) {
            return false;
        }
        manager::dispatch(self, &event);
        true
    }

    pub fn add_handler(&self, handler: Arc<dyn LogHandler>) {
        self.handlers.write().push(handler);
    }

    /// Detach `handler`, compared by identity. Returns `true` if it was
    /// attached.
    pub fn remove_handler(&self, handler: &Arc<dyn LogHandler>) -> bool {
        let mut handlers = self.handlers.write();
        let before = handlers.len();
        handlers.retain(|h| !Arc::ptr_eq(h, handler));
        handlers.len() != before
    }

    /// Keep only handlers for which `keep` returns `true`. Returns the number
    /// of handlers removed.
    pub fn retain_handlers(&self, mut keep: impl FnMut(&dyn LogHandler) -> bool) -> usize {
        let mut handlers = self.handlers.write();
        let before = handlers.len();
        handlers.retain(|h| keep(h.as_ref()));
        before - handlers.len()
    }

    /// Snapshot of the attached handlers.
    pub fn handlers(&self) -> Vec<Arc<dyn LogHandler>> {
        self.handlers.read().clone()
    }

    /// Flush every attached handler. Returns `false` if any flush failed.
    pub fn flush_handlers(&self) -> bool {
        self.handlers()
            .iter()
            .fold(true, |ok, handler| handler.flush() && ok)
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("parent", &self.parent)
            .field("level", &self.level())
            .field("handlers", &self.handlers.read().len())
            .finish()
    }
}
