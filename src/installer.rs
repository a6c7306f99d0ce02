//! Attach the capture store to the root logger and apply configured levels.
//!
//! The installer is either *installed* (a [`CaptureStore`] hangs off the root
//! logger) or *uninstalled*. Both transitions are idempotent. The console
//! threshold found at install time is saved and restored on uninstall;
//! in between it may only be lowered.

use std::sync::Arc;

use log::warn;
use once_cell::sync::Lazy;
use parking_lot::Mutex;

use crate::capture::CaptureStore;
use crate::config::LoggerConfiguration;
use crate::console::ConsoleThresholdModifier;
use crate::level::TestLogLevel;
use crate::manager;
use crate::stream_handler::{ConsoleHandler, ThresholdControl};

pub(crate) const MISSING_INSTALLATION: &str =
    "Unable to access the capture store, call install() first";

static CONFIGURATION: Lazy<LoggerConfiguration> = Lazy::new(LoggerConfiguration::new);

static CONSOLE: Mutex<ConsoleThresholdModifier> = Mutex::new(ConsoleThresholdModifier::new());

/// Run `f` with the first console handler on the root logger, if any.
fn with_console<R>(f: impl FnOnce(Option<&dyn ThresholdControl>) -> R) -> R {
    let handlers = manager::root_logger().handlers();
    let console = handlers
        .iter()
        .find_map(|handler| handler.as_any().downcast_ref::<ConsoleHandler>())
        .map(|console| console as &dyn ThresholdControl);
    f(console)
}

#[cfg(feature = "log-compat")]
fn ensure_log_bridge() {
    static REPORTED: std::sync::Once = std::sync::Once::new();
    if !crate::log_compat::install_global_logger() {
        REPORTED.call_once(|| {
            eprintln!(
                "logcapture: another global `log` logger is installed; \
                 records from the `log` macros will not be captured"
            );
        });
    }
}

/// Attach a fresh capture store to the root logger.
///
/// Does nothing if a store is already attached. Also routes the `log` facade
/// into the logger hierarchy when the `log-compat` feature is enabled.
pub fn install() {
    #[cfg(feature = "log-compat")]
    ensure_log_bridge();

    let mut console = CONSOLE.lock();
    if try_capture_store().is_some() {
        return;
    }
    with_console(|handler| console.save(handler));
    manager::root_logger().add_handler(Arc::new(CaptureStore::new()));
}

/// Restore the console threshold and detach every capture store from the
/// root logger. Does nothing when not installed.
pub fn uninstall() {
    let mut console = CONSOLE.lock();
    with_console(|handler| console.restore(handler));
    manager::root_logger().retain_handlers(|handler| !handler.as_any().is::<CaptureStore>());
}

/// Return `true` if a capture store is attached to the root logger.
pub fn is_installed() -> bool {
    try_capture_store().is_some()
}

/// Apply the configured root level and the configured per-logger levels.
///
/// The console threshold is lowered wherever a configured level is more
/// verbose than it.
pub fn configure_logger() {
    let root = CONFIGURATION.root_level();
    let loggers = CONFIGURATION.configured_loggers();
    add_logger(root, manager::ROOT_LOGGER_NAME);
    for (name, level) in &loggers {
        add_logger(*level, name);
    }
}

/// The store attached to the root logger.
///
/// # Panics
///
/// Panics if [`install`] has not been called.
#[track_caller]
pub fn capture_store() -> CaptureStore {
    match try_capture_store() {
        Some(store) => store,
        None => panic!("{MISSING_INSTALLATION}"),
    }
}

/// The store attached to the root logger, `None` when uninstalled.
pub fn try_capture_store() -> Option<CaptureStore> {
    manager::root_logger()
        .handlers()
        .iter()
        .find_map(|handler| handler.as_any().downcast_ref::<CaptureStore>().cloned())
}

/// Set the threshold of the logger called `name` to `level`.
///
/// An empty name designates the root logger. The console threshold is
/// lowered first if `level` is more verbose. Invalid names are reported and
/// skipped.
pub fn add_logger(level: TestLogLevel, name: &str) {
    with_console(|handler| CONSOLE.lock().adjust(handler, level));
    match manager::get_logger(name) {
        Ok(logger) => logger.set_level(level.native_filter()),
        Err(err) => warn!("not setting level {level}: {err}"),
    }
}

/// Process-wide configuration consulted by [`configure_logger`].
pub fn configuration() -> &'static LoggerConfiguration {
    &CONFIGURATION
}
