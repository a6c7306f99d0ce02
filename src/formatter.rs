//! Formatting of events for human-readable sinks.

use std::{fmt, sync::Arc};

use crate::log_record::LogEvent;

/// Trait for formatting log records into strings.
///
/// Implementors must be thread-safe (`Send + Sync`) so formatters can be
/// shared between loggers on different threads.
pub trait LogFormatter: Send + Sync {
    /// Format a log record into a string representation.
    fn format(&self, record: &LogEvent) -> String;
}

impl<F> LogFormatter for F
where
    F: Fn(&LogEvent) -> String + Send + Sync,
{
    fn format(&self, record: &LogEvent) -> String {
        self(record)
    }
}

/// Shared formatter trait object used across handlers.
#[derive(Clone)]
pub struct SharedFormatter {
    inner: Arc<dyn LogFormatter>,
}

impl SharedFormatter {
    /// Create a shared formatter from an owned formatter implementation.
    pub fn new<F>(formatter: F) -> Self
    where
        F: LogFormatter + 'static,
    {
        Self {
            inner: Arc::new(formatter),
        }
    }

    /// Format a log record using the wrapped formatter instance.
    pub fn format(&self, record: &LogEvent) -> String {
        self.inner.format(record)
    }
}

impl Default for SharedFormatter {
    fn default() -> Self {
        Self::new(DefaultFormatter)
    }
}

impl fmt::Debug for SharedFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedFormatter(<dyn LogFormatter>)")
    }
}

/// Formats as `logger [LEVEL] message`, appending the error chain on
/// indented `caused by:` lines.
#[derive(Copy, Clone, Debug, Default)]
pub struct DefaultFormatter;

impl LogFormatter for DefaultFormatter {
    fn format(&self, record: &LogEvent) -> String {
        let mut output = format!(
            "{} [{}] {}",
            record.logger(),
            record.level(),
            record.message().unwrap_or_default()
        );
        if let Some(error) = record.error() {
            let first: &(dyn std::error::Error + 'static) = &**error;
            let mut cause = Some(first);
            while let Some(current) = cause {
                output.push_str("\n  caused by: ");
                output.push_str(&current.to_string());
                cause = current.source();
            }
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::TestLogLevel;
    use crate::test_utils::errors::{LayeredError, RootCause};
    use rstest::rstest;

    #[rstest]
    #[case("core", TestLogLevel::Info, "hello", "core [INFO] hello")]
    #[case("sys", TestLogLevel::Error, "fail", "sys [ERROR] fail")]
    #[case("", TestLogLevel::Info, "", " [INFO] ")]
    #[case("i18n", TestLogLevel::Warn, "こんにちは世界", "i18n [WARN] こんにちは世界")]
    fn default_formatter_layout(
        #[case] logger: &str,
        #[case] level: TestLogLevel,
        #[case] message: &str,
        #[case] expected: &str,
    ) {
        let record = LogEvent::new(logger, level, message);
        assert_eq!(DefaultFormatter.format(&record), expected);
    }

    #[test]
    fn default_formatter_appends_error_chain() {
        let error = Arc::new(LayeredError::new("outer", RootCause));
        let record = LogEvent::new("core", TestLogLevel::Error, "failed").with_error(error);
        assert_eq!(
            DefaultFormatter.format(&record),
            "core [ERROR] failed\n  caused by: outer\n  caused by: root cause"
        );
    }

    #[test]
    fn closures_are_formatters() {
        let shared = SharedFormatter::new(|record: &LogEvent| record.level().to_string());
        let record = LogEvent::new("core", TestLogLevel::Debug, "ignored");
        assert_eq!(shared.format(&record), "DEBUG");
    }
}
