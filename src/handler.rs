//! Handler trait shared by the console sink and the capture store.

use std::any::Any;
use std::io;

use thiserror::Error;

use crate::log_record::LogEvent;

/// Errors a handler may report while processing a record.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Writing to the underlying sink failed.
    #[error("handler I/O failed: {0}")]
    Io(#[from] io::Error),
    /// The handler cannot accept records any more.
    #[error("handler is closed")]
    Closed,
}

/// Trait implemented by all log handlers.
///
/// Handlers are attached to loggers and invoked synchronously on the thread
/// that logged, so implementations must be `Send + Sync`.
pub trait LogHandler: Send + Sync {
    /// Dispatch a log record for handling.
    fn handle(&self, record: &LogEvent) -> Result<(), HandlerError>;

    /// Flush buffered output. Returns `false` if flushing failed.
    fn flush(&self) -> bool {
        true
    }

    /// Access the concrete handler, used to find installed handlers by type.
    fn as_any(&self) -> &dyn Any;
}
