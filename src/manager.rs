//! Global registry mapping logger names to instances.
//!
//! Names are `::`-separated paths, matching Rust module paths and `log`
//! targets. The root logger is called `""`. Access is guarded by a
//! `parking_lot::RwLock`; the lock is never held while handlers run, so
//! handlers may log without deadlocking.

use std::collections::HashMap;
use std::sync::Arc;

use log::LevelFilter;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use thiserror::Error;

use crate::log_record::LogEvent;
use crate::logger::Logger;
use crate::stream_handler::ConsoleHandler;

/// Name of the root logger.
pub const ROOT_LOGGER_NAME: &str = "";

/// Threshold of a freshly created root logger.
pub const DEFAULT_ROOT_LEVEL: LevelFilter = LevelFilter::Info;

/// Errors raised by the registry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ManagerError {
    /// The name contains an empty `::` segment.
    #[error("invalid logger name {0:?}: empty path segment")]
    InvalidName(String),
}

struct Manager {
    root: Arc<Logger>,
    loggers: HashMap<String, Arc<Logger>>,
}

impl Manager {
    fn new() -> Self {
        let root = Arc::new(Logger::new(ROOT_LOGGER_NAME, Some(DEFAULT_ROOT_LEVEL)));
        root.add_handler(Arc::new(ConsoleHandler::stderr()));
        Self {
            root,
            loggers: HashMap::new(),
        }
    }

    fn lookup(&self, name: &str) -> Option<Arc<Logger>> {
        if name.is_empty() {
            Some(Arc::clone(&self.root))
        } else {
            self.loggers.get(name).cloned()
        }
    }
}

static MANAGER: Lazy<RwLock<Manager>> = Lazy::new(|| RwLock::new(Manager::new()));

/// Check that `name` is a usable logger name.
pub fn validate_name(name: &str) -> Result<(), ManagerError> {
    if !name.is_empty() && name.split("::").any(str::is_empty) {
        return Err(ManagerError::InvalidName(name.to_owned()));
    }
    Ok(())
}

/// The root logger.
pub fn root_logger() -> Arc<Logger> {
    Arc::clone(&MANAGER.read().root)
}

/// Retrieve an existing logger or create one.
///
/// Ancestors are not created; they only take part in level inheritance and
/// handler propagation once somebody registers them.
pub fn get_logger(name: &str) -> Result<Arc<Logger>, ManagerError> {
    validate_name(name)?;
    if let Some(logger) = MANAGER.read().lookup(name) {
        return Ok(logger);
    }
    let mut mgr = MANAGER.write();
    let logger = mgr
        .loggers
        .entry(name.to_owned())
        .or_insert_with(|| Arc::new(Logger::new(name, None)));
    Ok(Arc::clone(logger))
}

/// Retrieve a logger only if it is already registered.
pub fn existing_logger(name: &str) -> Option<Arc<Logger>> {
    MANAGER.read().lookup(name)
}

/// Names of all registered loggers except the root, sorted.
pub fn logger_names() -> Vec<String> {
    let mut names: Vec<String> = MANAGER.read().loggers.keys().cloned().collect();
    names.sort();
    names
}

/// Replace the registry with a fresh root logger.
///
/// The new root has [`DEFAULT_ROOT_LEVEL`] and a stderr console handler.
/// Loggers handed out before the reset are detached from the hierarchy.
pub fn reset_manager() {
    *MANAGER.write() = Manager::new();
}

/// `name` followed by each enclosing path, ending with the root.
fn ancestor_names(name: &str) -> impl Iterator<Item = &str> {
    let mut next = Some(name);
    std::iter::from_fn(move || {
        let current = next?;
        next = if current.is_empty() {
            None
        } else {
            Some(current.rsplit_once("::").map_or("", |(parent, _)| parent))
        };
        Some(current)
    })
}

/// The registered loggers governing `name`, nearest first, root last.
pub(crate) fn lineage(name: &str) -> Vec<Arc<Logger>> {
    let mgr = MANAGER.read();
    ancestor_names(name)
        .filter_map(|candidate| mgr.lookup(candidate))
        .collect()
}

/// Threshold of the nearest registered logger with an explicit level.
pub(crate) fn effective_level(name: &str) -> LevelFilter {
    lineage(name)
        .iter()
        .find_map(|logger| logger.level())
        .unwrap_or(DEFAULT_ROOT_LEVEL)
}

/// Hand `event` to the handlers of `origin` and then to those of each
/// registered ancestor, nearest first.
///
/// Handler failures are reported on stderr rather than logged, as logging
/// them would re-enter this dispatch.
pub(crate) fn dispatch(origin: &Logger, event: &LogEvent) {
    let ancestors = origin.parent().map(lineage).unwrap_or_default();
    let handlers = std::iter::once((origin.name(), origin.handlers())).chain(
        ancestors
            .iter()
            .map(|logger| (logger.name(), logger.handlers())),
    );
    for (name, handlers) in handlers {
        for handler in handlers {
            if let Err(err) = handler.handle(event) {
                eprintln!("logcapture: handler on logger {name:?} failed: {err}");
            }
        }
    }
}

/// Flush the handlers of every registered logger. Returns `false` if any
/// flush failed.
pub fn flush_all_handlers() -> bool {
    let loggers: Vec<Arc<Logger>> = {
        let mgr = MANAGER.read();
        std::iter::once(Arc::clone(&mgr.root))
            .chain(mgr.loggers.values().cloned())
            .collect()
    };
    loggers
        .iter()
        .fold(true, |ok, logger| logger.flush_handlers() && ok)
}
