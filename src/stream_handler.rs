//! Console handler writing formatted records to a stream.
//!
//! The root logger carries one [`ConsoleHandler`] by default. Its threshold is
//! the only piece of handler state the installer touches, through the
//! [`ThresholdControl`] capability.

use std::any::Any;
use std::fmt;
use std::io::Write;
use std::sync::atomic::{AtomicU8, Ordering};

use log::LevelFilter;
use parking_lot::Mutex;

use crate::formatter::{DefaultFormatter, LogFormatter, SharedFormatter};
use crate::handler::{HandlerError, LogHandler};
use crate::level::{filter_to_u8, u8_to_filter};
use crate::log_record::LogEvent;

/// Threshold a console handler starts with.
pub const DEFAULT_CONSOLE_THRESHOLD: LevelFilter = LevelFilter::Info;

/// Read and replace the threshold of a sink.
pub trait ThresholdControl: Send + Sync {
    /// Current threshold; records more verbose than this are dropped.
    fn threshold(&self) -> LevelFilter;

    /// Replace the threshold.
    fn set_threshold(&self, threshold: LevelFilter);
}

enum Sink {
    Stdout,
    Stderr,
    Writer(Mutex<Box<dyn Write + Send>>),
}

/// Handler that writes formatted records to stdout, stderr or any writer.
///
/// Records are written synchronously on the logging thread. The stdout and
/// stderr sinks go through the print macros so the test harness captures
/// them per test.
pub struct ConsoleHandler {
    sink: Sink,
    formatter: SharedFormatter,
    threshold: AtomicU8,
}

impl ConsoleHandler {
    /// Create a handler writing to `stdout` with a [`DefaultFormatter`].
    pub fn stdout() -> Self {
        Self::from_sink(Sink::Stdout, SharedFormatter::new(DefaultFormatter))
    }

    /// Create a handler writing to `stderr` with a [`DefaultFormatter`].
    pub fn stderr() -> Self {
        Self::from_sink(Sink::Stderr, SharedFormatter::new(DefaultFormatter))
    }

    /// Create a handler from an arbitrary writer and formatter.
    pub fn new<W, F>(writer: W, formatter: F) -> Self
    where
        W: Write + Send + 'static,
        F: LogFormatter + 'static,
    {
        Self::from_sink(
            Sink::Writer(Mutex::new(Box::new(writer))),
            SharedFormatter::new(formatter),
        )
    }

    /// Set the initial threshold.
    pub fn with_threshold(self, threshold: LevelFilter) -> Self {
        self.set_threshold(threshold);
        self
    }

    fn from_sink(sink: Sink, formatter: SharedFormatter) -> Self {
        Self {
            sink,
            formatter,
            threshold: AtomicU8::new(filter_to_u8(DEFAULT_CONSOLE_THRESHOLD)),
        }
    }
}

impl ThresholdControl for ConsoleHandler {
    fn threshold(&self) -> LevelFilter {
        u8_to_filter(self.threshold.load(Ordering::Relaxed))
    }

    fn set_threshold(&self, threshold: LevelFilter) {
        self.threshold
            .store(filter_to_u8(threshold), Ordering::Relaxed);
    }
}

impl LogHandler for ConsoleHandler {
    fn handle(&self, record: &LogEvent) -> Result<(), HandlerError> {
        if record.level().native() > self.threshold() {
            return Ok(());
        }
        let msg = self.formatter.format(record);
        match &self.sink {
            Sink::Stdout => println!("{msg}"),
            Sink::Stderr => eprintln!("{msg}"),
            Sink::Writer(writer) => {
                let mut writer = writer.lock();
                writeln!(writer, "{msg}")?;
                writer.flush()?;
            }
        }
        Ok(())
    }

    fn flush(&self) -> bool {
        match &self.sink {
            Sink::Writer(writer) => writer.lock().flush().is_ok(),
            Sink::Stdout | Sink::Stderr => true,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl fmt::Debug for ConsoleHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sink = match self.sink {
            Sink::Stdout => "stdout",
            Sink::Stderr => "stderr",
            Sink::Writer(_) => "writer",
        };
        f.debug_struct("ConsoleHandler")
            .field("sink", &sink)
            .field("threshold", &self.threshold())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::TestLogLevel;
    use crate::test_utils::shared_buf::SharedBuf;
    use rstest::rstest;
    use std::io;

    #[rstest]
    #[case(LevelFilter::Info, TestLogLevel::Info, true)]
    #[case(LevelFilter::Info, TestLogLevel::Debug, false)]
    #[case(LevelFilter::Trace, TestLogLevel::Trace, true)]
    #[case(LevelFilter::Off, TestLogLevel::Error, false)]
    fn threshold_gates_output(
        #[case] threshold: LevelFilter,
        #[case] level: TestLogLevel,
        #[case] written: bool,
    ) {
        let buf = SharedBuf::default();
        let handler = ConsoleHandler::new(buf.clone(), DefaultFormatter).with_threshold(threshold);
        handler
            .handle(&LogEvent::new("core", level, "msg"))
            .expect("write should succeed");
        assert_eq!(!buf.contents_string().is_empty(), written);
    }

    #[test]
    fn writes_one_line_per_record() {
        let buf = SharedBuf::default();
        let handler = ConsoleHandler::new(buf.clone(), DefaultFormatter);
        for msg in ["first", "second"] {
            handler
                .handle(&LogEvent::new("core", TestLogLevel::Warn, msg))
                .expect("write should succeed");
        }
        assert_eq!(
            buf.contents_string(),
            "core [WARN] first\ncore [WARN] second\n"
        );
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_failures_surface_as_handler_errors() {
        let handler = ConsoleHandler::new(FailingWriter, DefaultFormatter);
        let err = handler
            .handle(&LogEvent::new("core", TestLogLevel::Error, "lost"))
            .expect_err("write should fail");
        assert!(matches!(err, HandlerError::Io(_)));
    }

    #[test]
    fn threshold_is_adjustable() {
        let handler = ConsoleHandler::stderr();
        assert_eq!(handler.threshold(), DEFAULT_CONSOLE_THRESHOLD);
        handler.set_threshold(LevelFilter::Debug);
        assert_eq!(handler.threshold(), LevelFilter::Debug);
    }
}
