//! Test log levels and their mapping onto the native `log` levels.
//!
//! [`TestLogLevel`] is the vocabulary used by the configuration, the capture
//! store queries and the assertions. Each variant maps 1:1 onto a
//! [`log::Level`], which is what the logger hierarchy works with.

use std::any;
use std::fmt;
use std::str::FromStr;

use log::{Level, LevelFilter, debug};

use crate::installer;
use crate::logger::Logger;

/// Severity understood by the test logger.
///
/// Ordered by verbosity: `Trace` is the most verbose and sorts first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TestLogLevel {
    /// Maps to [`Level::Trace`].
    Trace,
    /// Maps to [`Level::Debug`].
    Debug,
    /// Maps to [`Level::Info`].
    Info,
    /// Maps to [`Level::Warn`].
    Warn,
    /// Maps to [`Level::Error`].
    Error,
}

/// All levels, most verbose first.
pub const ALL_LEVELS: [TestLogLevel; 5] = [
    TestLogLevel::Trace,
    TestLogLevel::Debug,
    TestLogLevel::Info,
    TestLogLevel::Warn,
    TestLogLevel::Error,
];

impl Default for TestLogLevel {
    fn default() -> Self {
        Self::Info
    }
}

impl fmt::Display for TestLogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name a [`TestLogLevel`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown log level {0:?}, expected one of TRACE, DEBUG, INFO, WARN, ERROR")]
pub struct ParseLevelError(pub String);

impl FromStr for TestLogLevel {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "TRACE" => Ok(Self::Trace),
            "DEBUG" => Ok(Self::Debug),
            "INFO" => Ok(Self::Info),
            "WARN" | "WARNING" => Ok(Self::Warn),
            "ERROR" => Ok(Self::Error),
            _ => Err(ParseLevelError(s.to_owned())),
        }
    }
}

impl From<Level> for TestLogLevel {
    fn from(level: Level) -> Self {
        match level {
            Level::Trace => Self::Trace,
            Level::Debug => Self::Debug,
            Level::Info => Self::Info,
            Level::Warn => Self::Warn,
            Level::Error => Self::Error,
        }
    }
}

impl From<TestLogLevel> for Level {
    fn from(level: TestLogLevel) -> Self {
        level.native()
    }
}

impl TestLogLevel {
    /// Upper-case name of the level, e.g. `"WARN"`.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "TRACE",
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }

    /// The native `log` level this variant maps to.
    pub const fn native(self) -> Level {
        match self {
            Self::Trace => Level::Trace,
            Self::Debug => Level::Debug,
            Self::Info => Level::Info,
            Self::Warn => Level::Warn,
            Self::Error => Level::Error,
        }
    }

    /// The native threshold that lets exactly this level and everything
    /// less verbose through.
    pub fn native_filter(self) -> LevelFilter {
        self.native().to_level_filter()
    }

    /// Return `true` if `logger` currently emits records at this level.
    pub fn is_enabled(self, logger: &Logger) -> bool {
        logger.is_enabled_for(self.native())
    }

    /// Use this level as threshold of the root logger.
    ///
    /// Returns `self` so calls can be chained.
    pub fn set_as_root_level(self) -> Self {
        self.add_logger("")
    }

    /// Use this level as threshold of the logger called `name`.
    ///
    /// An empty name designates the root logger. The change applies
    /// process-wide immediately.
    pub fn add_logger(self, name: &str) -> Self {
        installer::add_logger(self, name);
        self
    }

    /// Use this level as threshold of the logger of `T`'s module.
    pub fn add_logger_for<T: ?Sized>(self) -> Self {
        self.add_logger_target(&LoggerTarget::of::<T>())
    }

    /// Use this level as threshold of `target`.
    pub fn add_logger_target(self, target: &LoggerTarget) -> Self {
        self.add_logger(target.name())
    }

    /// Parse `value` case-insensitively, falling back to `default`.
    ///
    /// Empty input yields `default` silently. Unrecognised input yields
    /// `default` and emits a debug diagnostic.
    pub fn parse_or_default(value: &str, default: Self) -> Self {
        if value.trim().is_empty() {
            return default;
        }
        match value.parse() {
            Ok(level) => level,
            Err(err) => {
                debug!("unable to determine log level, falling back to {default}: {err}");
                default
            }
        }
    }
}

/// Encode a threshold for storage in an `AtomicU8`.
pub(crate) fn filter_to_u8(filter: LevelFilter) -> u8 {
    filter as usize as u8
}

/// Decode a threshold stored with [`filter_to_u8`].
pub(crate) fn u8_to_filter(value: u8) -> LevelFilter {
    match value {
        0 => LevelFilter::Off,
        1 => LevelFilter::Error,
        2 => LevelFilter::Warn,
        3 => LevelFilter::Info,
        4 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Logger a level override applies to.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum LoggerTarget {
    /// The root logger.
    Root,
    /// A named logger.
    Named(String),
}

impl LoggerTarget {
    /// Target named after a logger name. An empty name is the root.
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        if name.is_empty() {
            Self::Root
        } else {
            Self::Named(name)
        }
    }

    /// Target named after the module that defines `T`.
    ///
    /// This is the target the `log` and `tracing` macros use for records
    /// emitted from code next to `T`. Generic arguments are dropped first, so
    /// `alloc::vec::Vec<my::Type>` maps to `alloc::vec`. A path without a
    /// module, such as a primitive, is used as is.
    pub fn of<T: ?Sized>() -> Self {
        Self::named(module_of(any::type_name::<T>()))
    }

    /// Logger name, `""` for the root.
    pub fn name(&self) -> &str {
        match self {
            Self::Root => "",
            Self::Named(name) => name,
        }
    }
}

/// Module part of a type path, generics removed.
fn module_of(type_path: &str) -> &str {
    let base = type_path
        .split_once('<')
        .map_or(type_path, |(head, _)| head);
    base.rsplit_once("::").map_or(base, |(module, _)| module)
}

impl Default for LoggerTarget {
    fn default() -> Self {
        Self::Root
    }
}

impl fmt::Display for LoggerTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root => f.write_str("<root>"),
            Self::Named(name) => f.write_str(name),
        }
    }
}

impl From<&str> for LoggerTarget {
    fn from(name: &str) -> Self {
        Self::named(name)
    }
}

impl From<Option<&str>> for LoggerTarget {
    fn from(name: Option<&str>) -> Self {
        name.map_or(Self::Root, Self::named)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Level::Trace, TestLogLevel::Trace)]
    #[case(Level::Debug, TestLogLevel::Debug)]
    #[case(Level::Info, TestLogLevel::Info)]
    #[case(Level::Warn, TestLogLevel::Warn)]
    #[case(Level::Error, TestLogLevel::Error)]
    fn level_mapping_is_direct(#[case] native: Level, #[case] expected: TestLogLevel) {
        assert_eq!(TestLogLevel::from(native), expected);
        assert_eq!(expected.native(), native);
    }

    #[rstest]
    #[case("ERROR", TestLogLevel::Error)]
    #[case("error", TestLogLevel::Error)]
    #[case("", TestLogLevel::Debug)]
    #[case("   ", TestLogLevel::Debug)]
    #[case("bogus", TestLogLevel::Debug)]
    #[case("notThere", TestLogLevel::Debug)]
    #[case("Warning", TestLogLevel::Warn)]
    fn parse_or_default_falls_back(#[case] input: &str, #[case] expected: TestLogLevel) {
        assert_eq!(
            TestLogLevel::parse_or_default(input, TestLogLevel::Debug),
            expected
        );
    }

    #[test]
    fn ordering_follows_verbosity() {
        let mut shuffled = [
            TestLogLevel::Error,
            TestLogLevel::Trace,
            TestLogLevel::Warn,
            TestLogLevel::Info,
            TestLogLevel::Debug,
        ];
        shuffled.sort();
        assert_eq!(shuffled, ALL_LEVELS);
    }

    #[test]
    fn more_verbose_levels_have_more_permissive_filters() {
        for pair in ALL_LEVELS.windows(2) {
            assert!(pair[0].native_filter() > pair[1].native_filter());
        }
    }

    #[rstest]
    #[case(LevelFilter::Off)]
    #[case(LevelFilter::Error)]
    #[case(LevelFilter::Info)]
    #[case(LevelFilter::Trace)]
    fn filter_encoding_is_lossless(#[case] filter: LevelFilter) {
        assert_eq!(u8_to_filter(filter_to_u8(filter)), filter);
    }

    struct Generic<T>(T);

    #[test]
    fn target_of_type_is_its_module() {
        let target = LoggerTarget::of::<Generic<u8>>();
        assert_eq!(target.name(), module_path!());
        assert_eq!(LoggerTarget::of::<TestLogLevel>().name(), "logcapture::level");
        assert_eq!(
            LoggerTarget::of::<Vec<Generic<u8>>>().name(),
            "alloc::vec"
        );
    }

    #[rstest]
    #[case("app::db::Pool", "app::db")]
    #[case("app::db::Pool<app::Conn>", "app::db")]
    #[case("u8", "u8")]
    fn module_of_drops_type_name(#[case] path: &str, #[case] expected: &str) {
        assert_eq!(module_of(path), expected);
    }

    #[test]
    fn empty_or_missing_target_is_root() {
        assert_eq!(LoggerTarget::named(""), LoggerTarget::Root);
        assert_eq!(LoggerTarget::from(None), LoggerTarget::Root);
        assert_eq!(LoggerTarget::Root.name(), "");
    }
}
