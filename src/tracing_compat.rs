//! Compatibility bridge for `tracing`.
//!
//! [`CaptureLayer`] is a `tracing_subscriber` layer that turns every event
//! into a [`LogEvent`] and dispatches it through the logger named after the
//! event's target, exactly as the `log` bridge does.

use std::fmt::{self, Write as _};

use tracing::field::{Field, Visit};
use tracing::subscriber::DefaultGuard;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::{Context, SubscriberExt};

use crate::level::TestLogLevel;
use crate::log_record::{LogEvent, RecordMetadata};
use crate::manager;

/// Layer forwarding `tracing` events into the logger hierarchy.
#[derive(Clone, Copy, Debug, Default)]
pub struct CaptureLayer;

fn map_level(level: &Level) -> TestLogLevel {
    if *level == Level::ERROR {
        TestLogLevel::Error
    } else if *level == Level::WARN {
        TestLogLevel::Warn
    } else if *level == Level::INFO {
        TestLogLevel::Info
    } else if *level == Level::DEBUG {
        TestLogLevel::Debug
    } else {
        TestLogLevel::Trace
    }
}

/// Collects the `message` field and renders the remaining fields as
/// ` name=value` pairs after it.
#[derive(Default)]
struct MessageVisitor {
    message: Option<String>,
    fields: String,
}

impl MessageVisitor {
    fn into_message(self) -> Option<String> {
        match (self.message, self.fields.is_empty()) {
            (message, true) => message,
            (Some(message), false) => Some(message + &self.fields),
            (None, false) => Some(self.fields.trim_start().to_owned()),
        }
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_owned());
        } else {
            let _ = write!(self.fields, " {}={value}", field.name());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{value:?}"));
        } else {
            let _ = write!(self.fields, " {}={value:?}", field.name());
        }
    }
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let level = map_level(metadata.level());
        let logger = manager::get_logger(metadata.target())
            .unwrap_or_else(|_| manager::root_logger());
        if !logger.is_enabled_for(level.native()) {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        let message = visitor.into_message();

        let record = LogEvent::with_optional_message(metadata.target(), level, message.as_deref())
            .with_metadata(RecordMetadata {
                module_path: metadata.module_path().unwrap_or_default().to_owned(),
                filename: metadata.file().unwrap_or_default().to_owned(),
                line_number: metadata.line().unwrap_or(0),
                ..Default::default()
            });
        manager::dispatch(&logger, &record);
    }
}

/// Route `tracing` events on the current thread into the logger hierarchy
/// until the returned guard is dropped.
pub fn set_default() -> DefaultGuard {
    tracing::subscriber::set_default(tracing_subscriber::registry().with(CaptureLayer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::CaptureStore;
    use log::LevelFilter;
    use rstest::rstest;
    use serial_test::serial;
    use std::sync::Arc;

    #[rstest]
    #[case(Level::TRACE, TestLogLevel::Trace)]
    #[case(Level::DEBUG, TestLogLevel::Debug)]
    #[case(Level::INFO, TestLogLevel::Info)]
    #[case(Level::WARN, TestLogLevel::Warn)]
    #[case(Level::ERROR, TestLogLevel::Error)]
    fn level_mapping_is_direct(#[case] level: Level, #[case] expected: TestLogLevel) {
        assert_eq!(map_level(&level), expected);
    }

    #[test]
    #[serial]
    fn events_reach_target_logger() {
        manager::reset_manager();
        let store = CaptureStore::new();
        let logger = manager::get_logger("tracing::bridge").expect("valid name");
        logger.set_level(LevelFilter::Debug);
        logger.add_handler(Arc::new(store.clone()));

        {
            let _guard = set_default();
            tracing::debug!(target: "tracing::bridge", user = "ada", "signed in");
            tracing::trace!(target: "tracing::bridge", "filtered");
        }
        tracing::warn!(target: "tracing::bridge", "not routed");

        let records = store.snapshot();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].level(), TestLogLevel::Debug);
        assert_eq!(records[0].message(), Some("signed in user=ada"));
        assert_eq!(records[0].logger(), "tracing::bridge");
        manager::reset_manager();
    }
}
