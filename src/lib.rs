//! Capture log records during tests and assert against them.
//!
//! The crate keeps a small process-wide logger hierarchy. [`install`] hangs
//! a [`CaptureStore`] off its root logger; from then on every record that
//! passes a logger's threshold, whether it comes from the `log` macros, from
//! `tracing` (feature `tracing-compat`) or from a [`Logger`] directly, is
//! captured until [`uninstall`] detaches the store again.
//!
//! ```rust,ignore
//! use logcapture::{TestLogLevel, TestLoggerConfig, TestLoggerGuard};
//!
//! #[test]
//! fn warns_on_retry() {
//!     let _guard = TestLoggerGuard::start(&TestLoggerConfig::new());
//!     log::warn!("retrying request");
//!     logcapture::assert_single_log_message_present(TestLogLevel::Warn, "retrying request");
//! }
//! ```

pub mod asserts;
pub mod capture;
pub mod config;
pub mod console;
pub mod formatter;
pub mod handler;
pub mod installer;
pub mod level;
pub mod lifecycle;
#[cfg(feature = "log-compat")]
pub mod log_compat;
pub mod log_record;
pub mod logger;
mod logging_macros;
pub mod manager;
pub mod query;
pub mod stream_handler;
#[cfg(feature = "tracing-compat")]
pub mod tracing_compat;

#[cfg(any(test, feature = "test-util"))]
pub mod test_utils;

pub use asserts::{
    AssertionFailure, Expectation, LogAsserts, MessageMatch, assert_log_message_present,
    assert_log_message_present_containing, assert_log_message_present_containing_with_error,
    assert_log_message_present_with_error, assert_no_log_message_present,
    assert_no_log_message_present_for, assert_no_log_message_present_for_logger,
    assert_single_log_message_present,
    assert_single_log_message_present_containing,
    assert_single_log_message_present_containing_with_error,
    assert_single_log_message_present_with_error,
};
pub use capture::CaptureStore;
pub use config::{EnvironmentSource, LoggerConfiguration, MapSource, PropertySource};
pub use console::ConsoleThresholdModifier;
pub use formatter::{DefaultFormatter, LogFormatter, SharedFormatter};
pub use handler::{HandlerError, LogHandler};
pub use installer::{
    add_logger, capture_store, configuration, configure_logger, install, is_installed,
    try_capture_store, uninstall,
};
pub use level::{LoggerTarget, ParseLevelError, TestLogLevel};
pub use lifecycle::{
    LevelOverride, TestLoggerConfig, TestLoggerGuard, after_suite, before_each_test,
    before_suite, collect_overrides,
};
#[cfg(feature = "log-compat")]
pub use log_compat::CaptureLogAdapter;
pub use log_record::{LogEvent, RecordMetadata, SharedError};
pub use logger::Logger;
pub use manager::{ManagerError, get_logger, reset_manager, root_logger};
pub use query::ErrorMatch;
pub use stream_handler::{ConsoleHandler, ThresholdControl};
#[cfg(feature = "tracing-compat")]
pub use tracing_compat::CaptureLayer;
