//! Save, lower and restore the console handler threshold.
//!
//! Tests that enable verbose levels also want to see those records on the
//! console, so raising a logger's verbosity lowers the console threshold to
//! match. The console is never made stricter than it was.

use log::LevelFilter;

use crate::level::TestLogLevel;
use crate::stream_handler::ThresholdControl;

/// Remembers the console threshold found at install time.
#[derive(Debug, Default)]
pub struct ConsoleThresholdModifier {
    initial: Option<LevelFilter>,
}

impl ConsoleThresholdModifier {
    pub const fn new() -> Self {
        Self { initial: None }
    }

    /// Threshold recorded by the last [`save`](Self::save), if any.
    pub fn saved(&self) -> Option<LevelFilter> {
        self.initial
    }

    /// Record the current threshold of `console`. Without a console nothing
    /// is recorded.
    pub fn save(&mut self, console: Option<&dyn ThresholdControl>) {
        self.initial = console.map(|console| console.threshold());
    }

    /// Lower the threshold of `console` to `level` if that is more
    /// permissive than the current threshold. Returns `true` if it changed.
    pub fn adjust(&self, console: Option<&dyn ThresholdControl>, level: TestLogLevel) -> bool {
        let Some(console) = console else {
            return false;
        };
        let wanted = level.native_filter();
        if wanted > console.threshold() {
            console.set_threshold(wanted);
            true
        } else {
            false
        }
    }

    /// Put back the recorded threshold and forget it.
    ///
    /// The console is only touched when its threshold differs from the
    /// recorded one.
    pub fn restore(&mut self, console: Option<&dyn ThresholdControl>) {
        let Some(initial) = self.initial.take() else {
            return;
        };
        if let Some(console) = console {
            if console.threshold() != initial {
                console.set_threshold(initial);
            }
        }
    }
}
