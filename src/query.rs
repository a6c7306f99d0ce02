//! Filters over captured events.
//!
//! Every function here is pure: it takes a slice of events (usually a
//! [`CaptureStore::snapshot`](crate::CaptureStore::snapshot)) and returns the
//! matching events in insertion order.

use std::error::Error;
use std::fmt;
use std::sync::Arc;

use crate::level::TestLogLevel;
use crate::log_record::{LogEvent, SharedError};

pub(crate) const LOGGER_MUST_NOT_BE_EMPTY: &str = "Logger must not be empty";

type DynError = dyn Error + Send + Sync + 'static;

/// Criterion an event's attached error has to satisfy.
#[derive(Clone)]
pub enum ErrorMatch {
    /// The very same error instance, compared by `Arc` identity.
    Instance(SharedError),
    /// Any error whose concrete type is exactly the named type.
    Type {
        name: &'static str,
        matches: fn(&DynError) -> bool,
    },
}

impl ErrorMatch {
    /// Match errors whose concrete type is `E`.
    ///
    /// Wrapping errors do not match even if `E` is in their source chain.
    pub fn of_type<E: Error + 'static>() -> Self {
        Self::Type {
            name: std::any::type_name::<E>(),
            matches: |error| error.is::<E>(),
        }
    }

    /// Match exactly `error`.
    pub fn instance(error: &SharedError) -> Self {
        Self::Instance(Arc::clone(error))
    }

    /// Return `true` if `error` satisfies this criterion.
    pub fn matches(&self, error: &SharedError) -> bool {
        match self {
            Self::Instance(expected) => Arc::ptr_eq(expected, error),
            Self::Type { matches, .. } => matches(error.as_ref()),
        }
    }

    fn matches_event(&self, event: &LogEvent) -> bool {
        event.error().is_some_and(|error| self.matches(error))
    }
}

impl From<SharedError> for ErrorMatch {
    fn from(error: SharedError) -> Self {
        Self::Instance(error)
    }
}

impl From<&SharedError> for ErrorMatch {
    fn from(error: &SharedError) -> Self {
        Self::instance(error)
    }
}

impl fmt::Display for ErrorMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Instance(error) => write!(f, "{error}"),
            Self::Type { name, .. } => write!(f, "type {name}"),
        }
    }
}

impl fmt::Debug for ErrorMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Instance(error) => f.debug_tuple("Instance").field(error).finish(),
            Self::Type { name, .. } => f.debug_struct("Type").field("name", name).finish(),
        }
    }
}

fn select(records: &[LogEvent], predicate: impl Fn(&LogEvent) -> bool) -> Vec<LogEvent> {
    records.iter().filter(|r| predicate(r)).cloned().collect()
}

fn message_is(record: &LogEvent, message: &str) -> bool {
    record.message() == Some(message)
}

fn message_contains(record: &LogEvent, part: &str) -> bool {
    record.message().is_some_and(|m| m.contains(part))
}

/// Events logged at exactly `level`.
pub fn by_level(records: &[LogEvent], level: TestLogLevel) -> Vec<LogEvent> {
    select(records, |r| r.level() == level)
}

/// Events at `level` whose message equals `message`.
pub fn by_level_and_message(
    records: &[LogEvent],
    level: TestLogLevel,
    message: &str,
) -> Vec<LogEvent> {
    select(records, |r| r.level() == level && message_is(r, message))
}

/// Events at `level` whose message contains `part`.
pub fn by_level_and_message_containing(
    records: &[LogEvent],
    level: TestLogLevel,
    part: &str,
) -> Vec<LogEvent> {
    select(records, |r| r.level() == level && message_contains(r, part))
}

/// Events at `level` with message `message` and an error satisfying `error`.
pub fn by_level_message_and_error(
    records: &[LogEvent],
    level: TestLogLevel,
    message: &str,
    error: &ErrorMatch,
) -> Vec<LogEvent> {
    select(records, |r| {
        r.level() == level && message_is(r, message) && error.matches_event(r)
    })
}

/// Events at `level` whose message contains `part` and whose error satisfies
/// `error`.
pub fn by_level_containing_and_error(
    records: &[LogEvent],
    level: TestLogLevel,
    part: &str,
    error: &ErrorMatch,
) -> Vec<LogEvent> {
    select(records, |r| {
        r.level() == level && message_contains(r, part) && error.matches_event(r)
    })
}

/// Events from the logger called `logger`, ignoring ASCII case.
///
/// # Panics
///
/// Panics if `logger` is empty.
#[track_caller]
pub fn by_logger_name(records: &[LogEvent], logger: &str) -> Vec<LogEvent> {
    assert!(!logger.is_empty(), "{LOGGER_MUST_NOT_BE_EMPTY}");
    select(records, |r| r.logger().eq_ignore_ascii_case(logger))
}

/// Events from the logger called `logger` at exactly `level`.
///
/// # Panics
///
/// Panics if `logger` is empty.
#[track_caller]
pub fn by_logger_name_and_level(
    records: &[LogEvent],
    logger: &str,
    level: TestLogLevel,
) -> Vec<LogEvent> {
    assert!(!logger.is_empty(), "{LOGGER_MUST_NOT_BE_EMPTY}");
    select(records, |r| {
        r.level() == level && r.logger().eq_ignore_ascii_case(logger)
    })
}

/// Render `records` for failure messages.
///
/// Events are sorted by ascending severity; events of equal severity keep
/// their insertion order.
pub fn records_as_string(records: &[LogEvent]) -> String {
    if records.is_empty() {
        return "No log messages available".to_owned();
    }
    let mut sorted: Vec<&LogEvent> = records.iter().collect();
    sorted.sort_by_key(|r| r.level());
    let mut out = String::from("Available Messages:");
    for record in sorted {
        out.push('\n');
        out.push_str(&record.to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::errors::{LayeredError, OtherFailure, RootCause};
    use crate::test_utils::events::event;
    use rstest::{fixture, rstest};

    const MESSAGE: &str = "message";
    const MESSAGE_2: &str = "message2";
    const MESSAGE_PART: &str = "essag";

    #[fixture]
    fn plain_records() -> Vec<LogEvent> {
        vec![
            event(TestLogLevel::Debug, Some(MESSAGE)),
            event(TestLogLevel::Info, Some(MESSAGE)),
            event(TestLogLevel::Info, Some(MESSAGE_2)),
        ]
    }

    #[rstest]
    #[case(TestLogLevel::Error, 0)]
    #[case(TestLogLevel::Debug, 1)]
    #[case(TestLogLevel::Info, 2)]
    fn filters_by_level(
        plain_records: Vec<LogEvent>,
        #[case] level: TestLogLevel,
        #[case] expected: usize,
    ) {
        assert_eq!(by_level(&plain_records, level).len(), expected);
    }

    #[rstest]
    #[case(TestLogLevel::Error, MESSAGE, 0)]
    #[case(TestLogLevel::Debug, MESSAGE, 1)]
    #[case(TestLogLevel::Debug, MESSAGE_2, 0)]
    #[case(TestLogLevel::Info, MESSAGE_2, 1)]
    fn filters_by_level_and_message(
        plain_records: Vec<LogEvent>,
        #[case] level: TestLogLevel,
        #[case] message: &str,
        #[case] expected: usize,
    ) {
        assert_eq!(
            by_level_and_message(&plain_records, level, message).len(),
            expected
        );
    }

    #[test]
    fn containing_skips_missing_messages() {
        let records = vec![
            event(TestLogLevel::Info, Some(MESSAGE)),
            event(TestLogLevel::Info, Some(MESSAGE_2)),
            event(TestLogLevel::Info, None),
        ];
        assert_eq!(
            by_level_and_message_containing(&records, TestLogLevel::Info, MESSAGE_PART).len(),
            2
        );
        assert!(by_level_and_message_containing(&records, TestLogLevel::Info, "notIn").is_empty());
    }

    #[test]
    fn missing_message_never_equals_a_target() {
        let records = vec![event(TestLogLevel::Info, None)];
        assert!(by_level_and_message(&records, TestLogLevel::Info, "").is_empty());
        assert!(by_level_and_message_containing(&records, TestLogLevel::Info, "").is_empty());
    }

    #[test]
    fn exact_match_uses_value_equality() {
        let owned = String::from("mess") + "age";
        let records = vec![event(TestLogLevel::Warn, Some(owned.as_str()))];
        assert_eq!(by_level_and_message(&records, TestLogLevel::Warn, MESSAGE).len(), 1);
    }

    #[test]
    fn filters_by_error_instance() {
        let first: SharedError = Arc::new(RootCause);
        let second: SharedError = Arc::new(RootCause);
        let records = vec![
            event(TestLogLevel::Info, Some(MESSAGE)).with_error(first.clone()),
            event(TestLogLevel::Info, Some(MESSAGE)).with_error(second),
            event(TestLogLevel::Info, Some(MESSAGE)),
        ];
        let found =
            by_level_message_and_error(&records, TestLogLevel::Info, MESSAGE, &first.into());
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn filters_by_exact_error_type() {
        let records = vec![
            event(TestLogLevel::Info, Some(MESSAGE)).with_error(Arc::new(RootCause)),
            event(TestLogLevel::Info, Some(MESSAGE)).with_error(Arc::new(OtherFailure)),
            event(TestLogLevel::Info, Some(MESSAGE))
                .with_error(Arc::new(LayeredError::new("wrapper", RootCause))),
            event(TestLogLevel::Info, Some(MESSAGE)),
        ];
        let root = ErrorMatch::of_type::<RootCause>();
        assert_eq!(
            by_level_message_and_error(&records, TestLogLevel::Info, MESSAGE, &root).len(),
            1
        );
        let layered = ErrorMatch::of_type::<LayeredError>();
        assert_eq!(
            by_level_containing_and_error(&records, TestLogLevel::Info, "mess", &layered).len(),
            1
        );
    }

    #[rstest]
    fn filters_by_logger_name_ignoring_case(plain_records: Vec<LogEvent>) {
        let records = {
            let mut all = plain_records;
            all.push(LogEvent::new("other::logger", TestLogLevel::Info, MESSAGE));
            all
        };
        let name = crate::test_utils::events::TEST_LOGGER;
        assert_eq!(by_logger_name(&records, name).len(), 3);
        assert_eq!(by_logger_name(&records, &name.to_ascii_uppercase()).len(), 3);
        assert_eq!(by_logger_name(&records, "missing").len(), 0);
        assert_eq!(by_logger_name_and_level(&records, name, TestLogLevel::Info).len(), 2);
        assert_eq!(by_logger_name_and_level(&records, name, TestLogLevel::Warn).len(), 0);
        assert_eq!(
            by_logger_name_and_level(&records, "other::logger", TestLogLevel::Info).len(),
            1
        );
    }

    #[test]
    #[should_panic(expected = "Logger must not be empty")]
    fn empty_logger_name_is_rejected() {
        by_logger_name(&[], "");
    }

    #[test]
    fn dump_sorts_by_severity() {
        let records = vec![
            LogEvent::new("b", TestLogLevel::Error, "late"),
            LogEvent::new("a", TestLogLevel::Debug, "first"),
            LogEvent::new("c", TestLogLevel::Debug, "second"),
        ];
        assert_eq!(
            records_as_string(&records),
            "Available Messages:\nDEBUG: a-first\nDEBUG: c-second\nERROR: b-late"
        );
        assert_eq!(records_as_string(&[]), "No log messages available");
    }
}
