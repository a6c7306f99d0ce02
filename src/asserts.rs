//! Assertions against captured events.
//!
//! [`LogAsserts`] works on any [`CaptureStore`]; the free `assert_*`
//! functions run against the installed store. A failed assertion panics with
//! the unmet condition followed by a dump of every captured event:
//!
//! ```text
//! No log message found with level=INFO and message is exactly=started, All recorded Logs:
//! Available Messages:
//! DEBUG: app::server-binding
//! WARN: app::server-slow start
//! ```

use std::fmt;

use thiserror::Error;

use crate::capture::CaptureStore;
use crate::installer;
use crate::level::{LoggerTarget, TestLogLevel};
use crate::log_record::LogEvent;
use crate::query::ErrorMatch;

/// How many matching events an assertion expects.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Expectation {
    /// One or more.
    AtLeastOne,
    /// Exactly one.
    ExactlyOne,
    /// None at all.
    Absent,
}

impl Expectation {
    fn is_met(self, found: usize) -> bool {
        match self {
            Self::AtLeastOne => found > 0,
            Self::ExactlyOne => found == 1,
            Self::Absent => found == 0,
        }
    }

    fn failure_prefix(self) -> &'static str {
        match self {
            Self::AtLeastOne => "No log message found with level=",
            Self::ExactlyOne => "Expected one message to be found with level=",
            Self::Absent => "At least one log message found with level=",
        }
    }
}

/// How an event's message is compared.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageMatch<'a> {
    /// The message equals the text.
    Exactly(&'a str),
    /// The message contains the text.
    Containing(&'a str),
}

impl fmt::Display for MessageMatch<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exactly(text) => write!(f, " and message is exactly={text}"),
            Self::Containing(text) => write!(f, " and message containing={text}"),
        }
    }
}

/// An unmet expectation, with the dump of all captured events.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{condition}, All recorded Logs:\n{records}")]
pub struct AssertionFailure {
    /// The unmet condition.
    pub condition: String,
    /// Number of events that matched.
    pub found: usize,
    /// [`CaptureStore::records_as_string`] at the time of the check.
    pub records: String,
}

/// Assertions bound to one capture store.
#[derive(Clone, Debug)]
pub struct LogAsserts {
    store: CaptureStore,
}

impl LogAsserts {
    pub fn new(store: CaptureStore) -> Self {
        Self { store }
    }

    /// Assertions against the installed store.
    ///
    /// # Panics
    ///
    /// Panics if the capture store is not installed.
    #[track_caller]
    pub fn installed() -> Self {
        Self::new(installer::capture_store())
    }

    pub fn store(&self) -> &CaptureStore {
        &self.store
    }

    fn resolve(
        &self,
        level: TestLogLevel,
        message: MessageMatch<'_>,
        error: Option<&ErrorMatch>,
    ) -> Vec<LogEvent> {
        match (message, error) {
            (MessageMatch::Exactly(text), None) => self.store.resolve_messages(level, text),
            (MessageMatch::Exactly(text), Some(error)) => {
                self.store.resolve_messages_with_error(level, text, error)
            }
            (MessageMatch::Containing(part), None) => self.store.resolve_containing(level, part),
            (MessageMatch::Containing(part), Some(error)) => {
                self.store.resolve_containing_with_error(level, part, error)
            }
        }
    }

    fn verdict(
        &self,
        expectation: Expectation,
        found: usize,
        condition: impl FnOnce() -> String,
    ) -> Result<(), AssertionFailure> {
        if expectation.is_met(found) {
            return Ok(());
        }
        Err(AssertionFailure {
            condition: condition(),
            found,
            records: self.store.records_as_string(),
        })
    }

    /// Check events at `level` matching `message` and, if given, `error`
    /// against `expectation`.
    pub fn check(
        &self,
        expectation: Expectation,
        level: TestLogLevel,
        message: MessageMatch<'_>,
        error: Option<&ErrorMatch>,
    ) -> Result<(), AssertionFailure> {
        let found = self.resolve(level, message, error).len();
        self.verdict(expectation, found, || {
            let mut condition = format!("{}{level}{message}", expectation.failure_prefix());
            if let Some(error) = error {
                condition.push_str(&format!(" and error={error}"));
            }
            condition
        })
    }

    /// Check events at `level` from `logger` against `expectation`.
    ///
    /// # Panics
    ///
    /// Panics if `logger` is empty.
    #[track_caller]
    pub fn check_logger(
        &self,
        expectation: Expectation,
        level: TestLogLevel,
        logger: &str,
    ) -> Result<(), AssertionFailure> {
        let found = self.store.resolve_for_logger_at(level, logger).len();
        self.verdict(expectation, found, || {
            format!("{}{level}, on logger= {logger}", expectation.failure_prefix())
        })
    }

    #[track_caller]
    fn enforce(result: Result<(), AssertionFailure>) {
        if let Err(failure) = result {
            panic!("{failure}");
        }
    }

    /// At least one event at `level` has exactly `message`.
    #[track_caller]
    pub fn log_message_present(&self, level: TestLogLevel, message: &str) {
        Self::enforce(self.check(
            Expectation::AtLeastOne,
            level,
            MessageMatch::Exactly(message),
            None,
        ));
    }

    /// At least one event at `level` has exactly `message` and an error
    /// satisfying `error`.
    #[track_caller]
    pub fn log_message_present_with_error(
        &self,
        level: TestLogLevel,
        message: &str,
        error: impl Into<ErrorMatch>,
    ) {
        Self::enforce(self.check(
            Expectation::AtLeastOne,
            level,
            MessageMatch::Exactly(message),
            Some(&error.into()),
        ));
    }

    /// Exactly one event at `level` has exactly `message`.
    #[track_caller]
    pub fn single_log_message_present(&self, level: TestLogLevel, message: &str) {
        Self::enforce(self.check(
            Expectation::ExactlyOne,
            level,
            MessageMatch::Exactly(message),
            None,
        ));
    }

    #[track_caller]
    pub fn single_log_message_present_with_error(
        &self,
        level: TestLogLevel,
        message: &str,
        error: impl Into<ErrorMatch>,
    ) {
        Self::enforce(self.check(
            Expectation::ExactlyOne,
            level,
            MessageMatch::Exactly(message),
            Some(&error.into()),
        ));
    }

    /// At least one event at `level` has a message containing `part`.
    #[track_caller]
    pub fn log_message_present_containing(&self, level: TestLogLevel, part: &str) {
        Self::enforce(self.check(
            Expectation::AtLeastOne,
            level,
            MessageMatch::Containing(part),
            None,
        ));
    }

    #[track_caller]
    pub fn log_message_present_containing_with_error(
        &self,
        level: TestLogLevel,
        part: &str,
        error: impl Into<ErrorMatch>,
    ) {
        Self::enforce(self.check(
            Expectation::AtLeastOne,
            level,
            MessageMatch::Containing(part),
            Some(&error.into()),
        ));
    }

    /// Exactly one event at `level` has a message containing `part`.
    #[track_caller]
    pub fn single_log_message_present_containing(&self, level: TestLogLevel, part: &str) {
        Self::enforce(self.check(
            Expectation::ExactlyOne,
            level,
            MessageMatch::Containing(part),
            None,
        ));
    }

    #[track_caller]
    pub fn single_log_message_present_containing_with_error(
        &self,
        level: TestLogLevel,
        part: &str,
        error: impl Into<ErrorMatch>,
    ) {
        Self::enforce(self.check(
            Expectation::ExactlyOne,
            level,
            MessageMatch::Containing(part),
            Some(&error.into()),
        ));
    }

    /// No event at `level` has a message containing `part`.
    #[track_caller]
    pub fn no_log_message_present(&self, level: TestLogLevel, part: &str) {
        Self::enforce(self.check(
            Expectation::Absent,
            level,
            MessageMatch::Containing(part),
            None,
        ));
    }

    /// No event at `level` came from `logger`.
    ///
    /// # Panics
    ///
    /// Panics if `logger` is empty or such an event exists.
    #[track_caller]
    pub fn no_log_message_present_for_logger(&self, level: TestLogLevel, logger: &str) {
        Self::enforce(self.check_logger(Expectation::Absent, level, logger));
    }

    /// No event at `level` came from the logger of `T`'s module.
    #[track_caller]
    pub fn no_log_message_present_for<T: ?Sized>(&self, level: TestLogLevel) {
        self.no_log_message_present_for_logger(level, LoggerTarget::of::<T>().name());
    }
}

/// See [`LogAsserts::log_message_present`].
#[track_caller]
pub fn assert_log_message_present(level: TestLogLevel, message: &str) {
    LogAsserts::installed().log_message_present(level, message);
}

/// See [`LogAsserts::log_message_present_with_error`].
#[track_caller]
pub fn assert_log_message_present_with_error(
    level: TestLogLevel,
    message: &str,
    error: impl Into<ErrorMatch>,
) {
    LogAsserts::installed().log_message_present_with_error(level, message, error);
}

/// See [`LogAsserts::single_log_message_present`].
#[track_caller]
pub fn assert_single_log_message_present(level: TestLogLevel, message: &str) {
    LogAsserts::installed().single_log_message_present(level, message);
}

#[track_caller]
pub fn assert_single_log_message_present_with_error(
    level: TestLogLevel,
    message: &str,
    error: impl Into<ErrorMatch>,
) {
    LogAsserts::installed().single_log_message_present_with_error(level, message, error);
}

/// See [`LogAsserts::log_message_present_containing`].
#[track_caller]
pub fn assert_log_message_present_containing(level: TestLogLevel, part: &str) {
    LogAsserts::installed().log_message_present_containing(level, part);
}

#[track_caller]
pub fn assert_log_message_present_containing_with_error(
    level: TestLogLevel,
    part: &str,
    error: impl Into<ErrorMatch>,
) {
    LogAsserts::installed().log_message_present_containing_with_error(level, part, error);
}

#[track_caller]
pub fn assert_single_log_message_present_containing(level: TestLogLevel, part: &str) {
    LogAsserts::installed().single_log_message_present_containing(level, part);
}

#[track_caller]
pub fn assert_single_log_message_present_containing_with_error(
    level: TestLogLevel,
    part: &str,
    error: impl Into<ErrorMatch>,
) {
    LogAsserts::installed().single_log_message_present_containing_with_error(level, part, error);
}

/// See [`LogAsserts::no_log_message_present`].
#[track_caller]
pub fn assert_no_log_message_present(level: TestLogLevel, part: &str) {
    LogAsserts::installed().no_log_message_present(level, part);
}

/// See [`LogAsserts::no_log_message_present_for_logger`].
#[track_caller]
pub fn assert_no_log_message_present_for_logger(level: TestLogLevel, logger: &str) {
    LogAsserts::installed().no_log_message_present_for_logger(level, logger);
}

/// See [`LogAsserts::no_log_message_present_for`].
#[track_caller]
pub fn assert_no_log_message_present_for<T: ?Sized>(level: TestLogLevel) {
    LogAsserts::installed().no_log_message_present_for::<T>(level);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log_record::SharedError;
    use crate::test_utils::errors::{OtherFailure, RootCause};
    use crate::test_utils::events::{TEST_LOGGER, event};
    use rstest::{fixture, rstest};
    use std::sync::Arc;

    const MESSAGE: &str = "message";

    #[fixture]
    fn asserts() -> LogAsserts {
        LogAsserts::new(CaptureStore::new())
    }

    #[rstest]
    fn empty_store_reports_no_messages(asserts: LogAsserts) {
        asserts.no_log_message_present(TestLogLevel::Info, "x");
        let failure = asserts
            .check(
                Expectation::AtLeastOne,
                TestLogLevel::Info,
                MessageMatch::Exactly("x"),
                None,
            )
            .expect_err("nothing was logged");
        assert_eq!(failure.found, 0);
        assert_eq!(
            failure.to_string(),
            "No log message found with level=INFO and message is exactly=x, \
             All recorded Logs:\nNo log messages available"
        );
    }

    #[rstest]
    #[case(Expectation::AtLeastOne, 0, false)]
    #[case(Expectation::AtLeastOne, 2, true)]
    #[case(Expectation::ExactlyOne, 1, true)]
    #[case(Expectation::ExactlyOne, 2, false)]
    #[case(Expectation::Absent, 0, true)]
    #[case(Expectation::Absent, 1, false)]
    fn expectations_count_matches(
        #[case] expectation: Expectation,
        #[case] found: usize,
        #[case] met: bool,
    ) {
        assert_eq!(expectation.is_met(found), met);
    }

    #[rstest]
    fn passing_assertions_do_not_panic(asserts: LogAsserts) {
        let cause: SharedError = Arc::new(RootCause);
        asserts
            .store()
            .publish(event(TestLogLevel::Info, Some(MESSAGE)).with_error(cause.clone()));
        asserts
            .store()
            .publish(event(TestLogLevel::Warn, Some("other message")));

        asserts.log_message_present(TestLogLevel::Info, MESSAGE);
        asserts.single_log_message_present(TestLogLevel::Info, MESSAGE);
        asserts.log_message_present_with_error(TestLogLevel::Info, MESSAGE, &cause);
        asserts.single_log_message_present_with_error(
            TestLogLevel::Info,
            MESSAGE,
            ErrorMatch::of_type::<RootCause>(),
        );
        asserts.log_message_present_containing(TestLogLevel::Warn, "other");
        asserts.single_log_message_present_containing(TestLogLevel::Info, "ess");
        asserts.log_message_present_containing_with_error(TestLogLevel::Info, "ess", &cause);
        asserts.single_log_message_present_containing_with_error(
            TestLogLevel::Info,
            "mess",
            cause,
        );
        asserts.no_log_message_present(TestLogLevel::Error, MESSAGE);
        asserts.no_log_message_present_for_logger(TestLogLevel::Debug, TEST_LOGGER);
    }

    #[rstest]
    fn failure_names_error_criterion(asserts: LogAsserts) {
        asserts
            .store()
            .publish(event(TestLogLevel::Info, Some(MESSAGE)).with_error(Arc::new(OtherFailure)));
        let root = ErrorMatch::of_type::<RootCause>();
        let failure = asserts
            .check(
                Expectation::ExactlyOne,
                TestLogLevel::Info,
                MessageMatch::Containing("mess"),
                Some(&root),
            )
            .expect_err("error type differs");
        assert!(
            failure
                .condition
                .starts_with("Expected one message to be found with level=INFO and message containing=mess and error=type "),
            "unexpected condition: {}",
            failure.condition
        );
        assert!(failure.records.contains("INFO: test::logger-message"));
    }

    #[rstest]
    #[should_panic(expected = "At least one log message found with level=WARN, on logger= test::logger")]
    fn logger_assertion_panics_with_logger_name(asserts: LogAsserts) {
        asserts.store().publish(event(TestLogLevel::Warn, Some(MESSAGE)));
        asserts.no_log_message_present_for_logger(TestLogLevel::Warn, TEST_LOGGER);
    }

    #[rstest]
    #[should_panic(expected = "Expected one message to be found with level=DEBUG")]
    fn duplicate_messages_fail_single_assertion(asserts: LogAsserts) {
        asserts.store().publish(event(TestLogLevel::Debug, Some(MESSAGE)));
        asserts.store().publish(event(TestLogLevel::Debug, Some(MESSAGE)));
        asserts.single_log_message_present(TestLogLevel::Debug, MESSAGE);
    }

    mod worker {
        pub struct Job;
    }

    #[rstest]
    #[should_panic(
        expected = "At least one log message found with level=ERROR, on logger= logcapture::asserts::tests::worker"
    )]
    fn type_assertion_uses_module_logger(asserts: LogAsserts) {
        asserts.store().publish(LogEvent::new(
            "logcapture::asserts::tests::worker",
            TestLogLevel::Error,
            MESSAGE,
        ));
        asserts.no_log_message_present_for::<worker::Job>(TestLogLevel::Warn);
        asserts.no_log_message_present_for::<worker::Job>(TestLogLevel::Error);
    }

    #[rstest]
    #[should_panic(expected = "Logger must not be empty")]
    fn empty_logger_name_is_rejected(asserts: LogAsserts) {
        asserts.no_log_message_present_for_logger(TestLogLevel::Info, "");
    }
}
