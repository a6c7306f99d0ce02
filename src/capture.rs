//! In-memory store for captured events.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::handler::{HandlerError, LogHandler};
use crate::level::{LoggerTarget, TestLogLevel};
use crate::log_record::LogEvent;
use crate::query::{self, ErrorMatch};

/// Handler that stores every record it receives for later inspection.
///
/// Cloning yields another handle onto the same records, which is how the
/// installer hands out the store attached to the root logger.
#[derive(Clone, Default)]
pub struct CaptureStore {
    records: Arc<Mutex<Vec<LogEvent>>>,
}

impl CaptureStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `record`. `None` is ignored.
    pub fn publish(&self, record: impl Into<Option<LogEvent>>) {
        if let Some(record) = record.into() {
            self.records.lock().push(record);
        }
    }

    /// Drop every captured record.
    pub fn clear(&self) {
        self.records.lock().clear();
    }

    /// Return a copy of all records received so far.
    pub fn snapshot(&self) -> Vec<LogEvent> {
        self.records.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    /// Return `true` if `other` is a handle onto the same records.
    pub fn same_store(&self, other: &CaptureStore) -> bool {
        Arc::ptr_eq(&self.records, &other.records)
    }

    /// All records as a diagnostic dump, see [`query::records_as_string`].
    pub fn records_as_string(&self) -> String {
        query::records_as_string(&self.snapshot())
    }

    pub fn resolve_by_level(&self, level: TestLogLevel) -> Vec<LogEvent> {
        query::by_level(&self.snapshot(), level)
    }

    pub fn resolve_messages(&self, level: TestLogLevel, message: &str) -> Vec<LogEvent> {
        query::by_level_and_message(&self.snapshot(), level, message)
    }

    pub fn resolve_messages_with_error(
        &self,
        level: TestLogLevel,
        message: &str,
        error: &ErrorMatch,
    ) -> Vec<LogEvent> {
        query::by_level_message_and_error(&self.snapshot(), level, message, error)
    }

    /// Records at `level` whose message contains `part`.
    pub fn resolve_containing(&self, level: TestLogLevel, part: &str) -> Vec<LogEvent> {
        query::by_level_and_message_containing(&self.snapshot(), level, part)
    }

    pub fn resolve_containing_with_error(
        &self,
        level: TestLogLevel,
        part: &str,
        error: &ErrorMatch,
    ) -> Vec<LogEvent> {
        query::by_level_containing_and_error(&self.snapshot(), level, part, error)
    }

    /// Records from `logger`, compared ignoring ASCII case.
    ///
    /// # Panics
    ///
    /// Panics if `logger` is empty.
    #[track_caller]
    pub fn resolve_for_logger(&self, logger: &str) -> Vec<LogEvent> {
        query::by_logger_name(&self.snapshot(), logger)
    }

    /// # Panics
    ///
    /// Panics if `logger` is empty.
    #[track_caller]
    pub fn resolve_for_logger_at(&self, level: TestLogLevel, logger: &str) -> Vec<LogEvent> {
        query::by_logger_name_and_level(&self.snapshot(), logger, level)
    }

    /// Records from the logger of `T`'s module.
    pub fn resolve_for_logger_of<T: ?Sized>(&self) -> Vec<LogEvent> {
        self.resolve_for_logger(LoggerTarget::of::<T>().name())
    }

    pub fn resolve_for_logger_of_at<T: ?Sized>(&self, level: TestLogLevel) -> Vec<LogEvent> {
        self.resolve_for_logger_at(level, LoggerTarget::of::<T>().name())
    }
}

impl LogHandler for CaptureStore {
    fn handle(&self, record: &LogEvent) -> Result<(), HandlerError> {
        self.publish(record.clone());
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl fmt::Display for CaptureStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CaptureStore with {} entries", self.len())
    }
}

impl fmt::Debug for CaptureStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureStore")
            .field("entries", &self.len())
            .finish()
    }
}
