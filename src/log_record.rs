//! Captured log events.
//!
//! A [`LogEvent`] is created whenever the logger hierarchy dispatches a
//! record. Events are immutable: the capture store only ever clones them.

use std::error::Error;
use std::fmt;
use std::sync::Arc;
use std::thread::{self, ThreadId};
use std::time::SystemTime;

use crate::level::TestLogLevel;

/// Error attached to an event. Shared so identity can be compared later.
pub type SharedError = Arc<dyn Error + Send + Sync + 'static>;

/// Where and when a record was produced.
#[derive(Clone, Debug)]
pub struct RecordMetadata {
    /// Rust module path where the log call originated.
    pub module_path: String,
    /// Source file name for the log call.
    pub filename: String,
    /// Line number in the source file.
    pub line_number: u32,
    /// Time the record was created.
    pub timestamp: SystemTime,
    /// ID of the thread that created the record.
    pub thread_id: ThreadId,
    /// Name of the thread that created the record (if any).
    pub thread_name: Option<String>,
}

impl RecordMetadata {
    fn capture_runtime() -> (SystemTime, ThreadId, Option<String>) {
        let current = thread::current();
        (
            SystemTime::now(),
            current.id(),
            current.name().map(ToString::to_string),
        )
    }
}

impl Default for RecordMetadata {
    fn default() -> Self {
        let (timestamp, thread_id, thread_name) = Self::capture_runtime();
        Self {
            module_path: String::new(),
            filename: String::new(),
            line_number: 0,
            timestamp,
            thread_id,
            thread_name,
        }
    }
}

/// A single captured log record.
#[derive(Clone, Debug)]
pub struct LogEvent {
    logger: String,
    level: TestLogLevel,
    message: Option<String>,
    error: Option<SharedError>,
    metadata: RecordMetadata,
}

impl LogEvent {
    /// Create an event for logger `logger` at `level` carrying `message`.
    pub fn new(logger: &str, level: TestLogLevel, message: &str) -> Self {
        Self::with_optional_message(logger, level, Some(message))
    }

    /// Create an event whose message may be absent.
    pub fn with_optional_message(logger: &str, level: TestLogLevel, message: Option<&str>) -> Self {
        Self {
            logger: logger.to_owned(),
            level,
            message: message.map(str::to_owned),
            error: None,
            metadata: RecordMetadata::default(),
        }
    }

    /// Attach `error` to the event.
    pub fn with_error(mut self, error: SharedError) -> Self {
        self.error = Some(error);
        self
    }

    /// Replace the source location, keeping the runtime context captured at
    /// creation.
    pub fn with_metadata(mut self, metadata: RecordMetadata) -> Self {
        self.metadata = RecordMetadata {
            timestamp: self.metadata.timestamp,
            thread_id: self.metadata.thread_id,
            thread_name: self.metadata.thread_name.take(),
            ..metadata
        };
        self
    }

    /// Name of the logger that produced the event.
    pub fn logger(&self) -> &str {
        &self.logger
    }

    pub fn level(&self) -> TestLogLevel {
        self.level
    }

    /// The message, if one was logged.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// The attached error, if any.
    pub fn error(&self) -> Option<&SharedError> {
        self.error.as_ref()
    }

    pub fn metadata(&self) -> &RecordMetadata {
        &self.metadata
    }
}

impl fmt::Display for LogEvent {
    /// Renders as `LEVEL: logger-message`, the line format of the
    /// diagnostic dump.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}-{}",
            self.level,
            self.logger,
            self.message.as_deref().unwrap_or("<no message>")
        )
    }
}
