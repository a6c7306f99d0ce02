//! Builders for captured events.

use crate::level::TestLogLevel;
use crate::log_record::LogEvent;

/// Logger name used by [`event`].
pub const TEST_LOGGER: &str = "test::logger";

/// An event from [`TEST_LOGGER`] at `level`, with or without a message.
pub fn event(level: TestLogLevel, message: Option<&str>) -> LogEvent {
    LogEvent::with_optional_message(TEST_LOGGER, level, message)
}
