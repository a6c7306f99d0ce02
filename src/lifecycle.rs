//! Suite and test call-ins for driving the installer.
//!
//! libtest has no before/after hooks, so a test harness calls
//! [`before_suite`], [`before_each_test`] and [`after_suite`] itself, or
//! holds a [`TestLoggerGuard`] for the duration of a test:
//!
//! ```rust,ignore
//! let config = TestLoggerConfig::new().debug::<my_crate::Service>();
//! let guard = TestLoggerGuard::start(&config);
//! my_crate::Service::new().run();
//! guard.asserts().log_message_present(TestLogLevel::Debug, "started");
//! ```

use delegate::delegate;

use crate::asserts::LogAsserts;
use crate::capture::CaptureStore;
use crate::installer;
use crate::level::{LoggerTarget, TestLogLevel};
use crate::log_record::LogEvent;

/// A level to apply to one logger before a test.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LevelOverride {
    pub target: LoggerTarget,
    pub level: TestLogLevel,
}

impl LevelOverride {
    pub fn new(target: impl Into<LoggerTarget>, level: TestLogLevel) -> Self {
        Self {
            target: target.into(),
            level,
        }
    }

    /// Override for the root logger.
    pub fn root(level: TestLogLevel) -> Self {
        Self::new(LoggerTarget::Root, level)
    }

    /// Set the level, lowering the console threshold if needed.
    pub fn apply(&self) {
        self.level.add_logger_target(&self.target);
    }
}

/// Install the capture store. Call once before the tests of a suite.
pub fn before_suite() {
    installer::install();
}

/// Reset levels from the configuration, drop captured events, then apply
/// `overrides` in order so later entries win.
///
/// # Panics
///
/// Panics if [`before_suite`] has not run.
#[track_caller]
pub fn before_each_test(overrides: &[LevelOverride]) {
    installer::configure_logger();
    installer::capture_store().clear();
    for level_override in overrides {
        level_override.apply();
    }
}

/// Uninstall the capture store. Call once after the tests of a suite.
pub fn after_suite() {
    installer::uninstall();
}

/// Declarative level setup for a test or a group of tests.
///
/// Entries keep their declaration order. Without an explicit root level the
/// configured root level stays in force.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TestLoggerConfig {
    root_level: Option<TestLogLevel>,
    loggers: Vec<LevelOverride>,
}

impl TestLoggerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Level of the root logger.
    pub fn root_level(mut self, level: TestLogLevel) -> Self {
        self.root_level = Some(level);
        self
    }

    /// Level of the logger called `name`; `""` is the root.
    pub fn logger(self, level: TestLogLevel, name: impl Into<String>) -> Self {
        self.target(level, LoggerTarget::named(name))
    }

    pub fn target(mut self, level: TestLogLevel, target: LoggerTarget) -> Self {
        self.loggers.push(LevelOverride::new(target, level));
        self
    }

    /// TRACE for the logger of `T`'s module.
    pub fn trace<T: ?Sized>(self) -> Self {
        self.target(TestLogLevel::Trace, LoggerTarget::of::<T>())
    }

    /// DEBUG for the logger of `T`'s module.
    pub fn debug<T: ?Sized>(self) -> Self {
        self.target(TestLogLevel::Debug, LoggerTarget::of::<T>())
    }

    pub fn info<T: ?Sized>(self) -> Self {
        self.target(TestLogLevel::Info, LoggerTarget::of::<T>())
    }

    pub fn warn<T: ?Sized>(self) -> Self {
        self.target(TestLogLevel::Warn, LoggerTarget::of::<T>())
    }

    pub fn error<T: ?Sized>(self) -> Self {
        self.target(TestLogLevel::Error, LoggerTarget::of::<T>())
    }

    /// The overrides to apply: the root level first, then every logger in
    /// declaration order.
    pub fn overrides(&self) -> Vec<LevelOverride> {
        self.root_level
            .map(LevelOverride::root)
            .into_iter()
            .chain(self.loggers.iter().cloned())
            .collect()
    }
}

/// Flatten nested configurations, outermost scope first, so inner scopes
/// override outer ones when applied in order.
pub fn collect_overrides(scopes: &[&TestLoggerConfig]) -> Vec<LevelOverride> {
    scopes
        .iter()
        .flat_map(|scope| scope.overrides())
        .collect()
}

/// Keeps the capture store installed while alive.
///
/// Dropping the guard uninstalls the store and restores the console
/// threshold. Guards share process-wide state, so tests holding one must not
/// run concurrently.
#[must_use = "the capture store is uninstalled when the guard is dropped"]
#[derive(Debug)]
pub struct TestLoggerGuard {
    store: CaptureStore,
}

impl TestLoggerGuard {
    /// Install the capture store and apply `config`.
    pub fn start(config: &TestLoggerConfig) -> Self {
        Self::start_with(&config.overrides())
    }

    /// Install the capture store and apply `overrides` in order.
    pub fn start_with(overrides: &[LevelOverride]) -> Self {
        before_suite();
        before_each_test(overrides);
        Self {
            store: installer::capture_store(),
        }
    }

    /// Assertions against the captured events.
    pub fn asserts(&self) -> LogAsserts {
        LogAsserts::new(self.store.clone())
    }

    pub fn store(&self) -> &CaptureStore {
        &self.store
    }

    delegate! {
        to self.store {
            /// Drop every captured event.
            pub fn clear(&self);
            pub fn snapshot(&self) -> Vec<LogEvent>;
            pub fn len(&self) -> usize;
            pub fn is_empty(&self) -> bool;
            pub fn records_as_string(&self) -> String;
            pub fn resolve_by_level(&self, level: TestLogLevel) -> Vec<LogEvent>;
            pub fn resolve_messages(&self, level: TestLogLevel, message: &str) -> Vec<LogEvent>;
            pub fn resolve_containing(&self, level: TestLogLevel, part: &str) -> Vec<LogEvent>;
            #[track_caller]
            pub fn resolve_for_logger(&self, logger: &str) -> Vec<LogEvent>;
        }
    }
}

impl Drop for TestLoggerGuard {
    fn drop(&mut self) {
        after_suite();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    struct Service;

    #[test]
    fn config_lists_root_first_then_declaration_order() {
        let config = TestLoggerConfig::new()
            .warn::<Service>()
            .logger(TestLogLevel::Trace, "app::db")
            .root_level(TestLogLevel::Debug);
        let overrides = config.overrides();
        assert_eq!(
            overrides,
            vec![
                LevelOverride::root(TestLogLevel::Debug),
                LevelOverride::new(LoggerTarget::of::<Service>(), TestLogLevel::Warn),
                LevelOverride::new("app::db", TestLogLevel::Trace),
            ]
        );
        assert_eq!(overrides[1].target.name(), "logcapture::lifecycle::tests");
    }

    #[test]
    fn config_without_root_keeps_configured_root() {
        assert!(TestLoggerConfig::new().overrides().is_empty());
        let root = TestLoggerConfig::new().logger(TestLogLevel::Error, "");
        assert_eq!(root.overrides()[0].target, LoggerTarget::Root);
    }

    #[rstest]
    fn outer_scopes_come_first() {
        let outer = TestLoggerConfig::new()
            .root_level(TestLogLevel::Info)
            .logger(TestLogLevel::Debug, "app");
        let inner = TestLoggerConfig::new().logger(TestLogLevel::Error, "app");
        let collected = collect_overrides(&[&outer, &inner]);
        assert_eq!(collected.len(), 3);
        assert_eq!(collected[0], LevelOverride::root(TestLogLevel::Info));
        assert_eq!(collected[2], LevelOverride::new("app", TestLogLevel::Error));
    }
}
