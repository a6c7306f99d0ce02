//! Level configuration from programmatic overrides, the environment and
//! built-in defaults.
//!
//! Keys follow a property naming scheme. The root level lives under
//! [`ROOT_LOG_LEVEL_KEY`]; every key starting with [`LOGGER_PREFIX`] sets the
//! level of the logger named by the rest of the key:
//!
//! ```text
//! logcapture.logging.root_log_level=DEBUG
//! logcapture.logger.my_crate::db=TRACE
//! ```
//!
//! Lookups consult the programmatic overrides first, then the process
//! environment (keys used verbatim as variable names), then the defaults.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::env;

use parking_lot::RwLock;

use crate::level::TestLogLevel;

/// Prefix of per-logger level settings.
pub const LOGGER_PREFIX: &str = "logcapture.logger.";

/// Key of the root level.
pub const ROOT_LOG_LEVEL_KEY: &str = "logcapture.logging.root_log_level";

/// Root level used when nothing else is configured.
pub const DEFAULT_ROOT_LOG_LEVEL: TestLogLevel = TestLogLevel::Info;

/// Read-only key/value source consulted after the programmatic overrides.
pub trait PropertySource: Send + Sync {
    /// Value stored under `key`.
    fn property(&self, key: &str) -> Option<String>;

    /// Every key this source knows.
    fn keys(&self) -> Vec<String>;
}

/// Reads properties from the process environment.
#[derive(Clone, Copy, Debug, Default)]
pub struct EnvironmentSource;

impl PropertySource for EnvironmentSource {
    fn property(&self, key: &str) -> Option<String> {
        env::var(key).ok()
    }

    fn keys(&self) -> Vec<String> {
        env::vars_os()
            .filter_map(|(key, _)| key.into_string().ok())
            .collect()
    }
}

/// Fixed in-memory properties, mostly for tests.
#[derive(Clone, Debug, Default)]
pub struct MapSource(HashMap<String, String>);

impl MapSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `key` with `value`.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapSource {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl PropertySource for MapSource {
    fn property(&self, key: &str) -> Option<String> {
        self.0.get(key).cloned()
    }

    fn keys(&self) -> Vec<String> {
        self.0.keys().cloned().collect()
    }
}

/// Layered configuration of the test logger.
pub struct LoggerConfiguration {
    overrides: RwLock<HashMap<String, String>>,
    source: Box<dyn PropertySource>,
    defaults: HashMap<String, String>,
}

impl Default for LoggerConfiguration {
    fn default() -> Self {
        Self::new()
    }
}

impl LoggerConfiguration {
    /// Configuration backed by the process environment.
    pub fn new() -> Self {
        Self::with_source(EnvironmentSource)
    }

    /// Configuration backed by `source` instead of the environment.
    pub fn with_source(source: impl PropertySource + 'static) -> Self {
        let mut defaults = HashMap::new();
        defaults.insert(
            ROOT_LOG_LEVEL_KEY.to_owned(),
            DEFAULT_ROOT_LOG_LEVEL.to_string(),
        );
        Self {
            overrides: RwLock::new(HashMap::new()),
            source: Box::new(source),
            defaults,
        }
    }

    /// Set a programmatic override, taking precedence over every other
    /// source.
    pub fn set_property(&self, key: impl Into<String>, value: impl Into<String>) {
        self.overrides.write().insert(key.into(), value.into());
    }

    /// Remove a programmatic override. Returns the previous value.
    pub fn remove_property(&self, key: &str) -> Option<String> {
        self.overrides.write().remove(key)
    }

    /// Remove every programmatic override.
    pub fn clear_properties(&self) {
        self.overrides.write().clear();
    }

    /// Look up `key`. An empty key never resolves.
    pub fn string_property(&self, key: &str) -> Option<String> {
        if key.is_empty() {
            return None;
        }
        if let Some(value) = self.overrides.read().get(key) {
            return Some(value.clone());
        }
        self.source
            .property(key)
            .or_else(|| self.defaults.get(key).cloned())
    }

    /// Look up `key` as a boolean; only `"true"` (any case) is `true`.
    pub fn bool_property(&self, key: &str) -> Option<bool> {
        self.string_property(key)
            .map(|value| value.trim().eq_ignore_ascii_case("true"))
    }

    /// The configured root level, [`DEFAULT_ROOT_LOG_LEVEL`] if absent or
    /// unparsable.
    pub fn root_level(&self) -> TestLogLevel {
        let configured = self.string_property(ROOT_LOG_LEVEL_KEY).unwrap_or_default();
        TestLogLevel::parse_or_default(&configured, DEFAULT_ROOT_LOG_LEVEL)
    }

    /// Per-logger levels from every key under [`LOGGER_PREFIX`].
    ///
    /// The map key is the logger name, `""` for the root. Unparsable values
    /// resolve to INFO.
    pub fn configured_loggers(&self) -> BTreeMap<String, TestLogLevel> {
        let mut keys: BTreeSet<String> = self.source.keys().into_iter().collect();
        keys.extend(self.overrides.read().keys().cloned());
        keys.into_iter()
            .filter(|key| key.starts_with(LOGGER_PREFIX))
            .filter_map(|key| {
                let value = self.string_property(&key)?;
                let name = key[LOGGER_PREFIX.len()..].to_owned();
                Some((name, TestLogLevel::parse_or_default(&value, TestLogLevel::Info)))
            })
            .collect()
    }
}
