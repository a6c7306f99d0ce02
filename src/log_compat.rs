//! Compatibility bridge for the Rust `log` crate.
//!
//! [`CaptureLogAdapter`] implements `log::Log` and forwards every record into
//! the logger hierarchy, where the installed capture store picks it up. The
//! record's target is used as the logger name, so by default records are
//! filed under the module path of the call site.

use std::sync::{Arc, OnceLock};

use log::{Metadata, Record};

use crate::level::TestLogLevel;
use crate::log_record::{LogEvent, RecordMetadata};
use crate::logger::Logger;
use crate::manager;

/// Adapter implementing the Rust `log::Log` trait.
pub struct CaptureLogAdapter;

/// Resolve the logger for `target`, falling back to the root for names the
/// registry rejects.
fn resolve_logger(target: &str) -> Arc<Logger> {
    manager::get_logger(target).unwrap_or_else(|_| manager::root_logger())
}

fn is_enabled_by_global_max(level: log::Level) -> bool {
    log::max_level() >= level.to_level_filter()
}

impl log::Log for CaptureLogAdapter {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        is_enabled_by_global_max(metadata.level())
            && resolve_logger(metadata.target()).is_enabled_for(metadata.level())
    }

    fn log(&self, record: &Record<'_>) {
        if !is_enabled_by_global_max(record.level()) {
            return;
        }
        let logger = resolve_logger(record.target());
        if !logger.is_enabled_for(record.level()) {
            return;
        }

        let metadata = RecordMetadata {
            module_path: record.module_path().unwrap_or_default().to_owned(),
            filename: record.file().unwrap_or_default().to_owned(),
            line_number: record.line().unwrap_or(0),
            ..Default::default()
        };
        let event = LogEvent::new(
            record.target(),
            TestLogLevel::from(record.level()),
            &record.args().to_string(),
        )
        .with_metadata(metadata);
        manager::dispatch(&logger, &event);
    }

    fn flush(&self) {
        manager::flush_all_handlers();
    }
}

static CAPTURE_LOG_ADAPTER: CaptureLogAdapter = CaptureLogAdapter;
static INSTALL_RESULT: OnceLock<bool> = OnceLock::new();

/// Install the adapter as the global Rust logger.
///
/// Returns `true` on success. When a different global logger is already set,
/// installation fails and `false` is returned. Subsequent calls return the
/// cached outcome.
pub fn install_global_logger() -> bool {
    *INSTALL_RESULT.get_or_init(|| {
        if log::set_logger(&CAPTURE_LOG_ADAPTER).is_err() {
            return false;
        }
        log::set_max_level(log::LevelFilter::Trace);
        true
    })
}
