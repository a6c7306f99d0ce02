//! Logging macros that capture source location.
//!
//! Each macro captures `file!()`, `line!()`, and `module_path!()` at the
//! call site and embeds them in the event's [`RecordMetadata`]. They log
//! through a [`Logger`](crate::Logger) directly, bypassing the `log` facade,
//! and accept an optional `error: expr` argument attaching a
//! [`SharedError`](crate::SharedError).
//!
//! The macros are prefixed with `logcapture_` to avoid collision with the
//! `log` crate's identically named macros.
//!
//! # Examples
//!
//! ```rust,ignore
//! let logger = logcapture::get_logger("app::server")?;
//! logcapture_info!(logger, "server started on port {}", 8080);
//! logcapture_error!(logger, error: Arc::new(err), "connection failed");
//! ```
//!
//! [`RecordMetadata`]: crate::log_record::RecordMetadata

/// Log at `TRACE` level, capturing the call site's source location.
#[macro_export]
macro_rules! logcapture_trace {
    ($logger:expr, $($rest:tt)+) => {
        $crate::__logcapture_impl!($logger, $crate::TestLogLevel::Trace, $($rest)+)
    };
}

/// Log at `DEBUG` level, capturing the call site's source location.
///
/// Accepts either a plain string or `format!`-style arguments.
#[macro_export]
macro_rules! logcapture_debug {
    ($logger:expr, $($rest:tt)+) => {
        $crate::__logcapture_impl!($logger, $crate::TestLogLevel::Debug, $($rest)+)
    };
}

/// Log at `INFO` level, capturing the call site's source location.
///
/// # Examples
///
/// ```rust,ignore
/// logcapture_info!(logger, "server started");
/// logcapture_info!(logger, "listening on port {}", port);
/// ```
#[macro_export]
macro_rules! logcapture_info {
    ($logger:expr, $($rest:tt)+) => {
        $crate::__logcapture_impl!($logger, $crate::TestLogLevel::Info, $($rest)+)
    };
}

/// Log at `WARN` level, capturing the call site's source location.
#[macro_export]
macro_rules! logcapture_warn {
    ($logger:expr, $($rest:tt)+) => {
        $crate::__logcapture_impl!($logger, $crate::TestLogLevel::Warn, $($rest)+)
    };
}

/// Log at `ERROR` level, capturing the call site's source location.
///
/// # Examples
///
/// ```rust,ignore
/// logcapture_error!(logger, "failed to open database");
/// logcapture_error!(logger, error: shared, "connection to {} lost", host);
/// ```
#[macro_export]
macro_rules! logcapture_error {
    ($logger:expr, $($rest:tt)+) => {
        $crate::__logcapture_impl!($logger, $crate::TestLogLevel::Error, $($rest)+)
    };
}

/// Internal implementation macro, not part of the public API.
///
/// Evaluates to `true` if the event passed the logger's threshold.
#[doc(hidden)]
#[macro_export]
macro_rules! __logcapture_impl {
    ($logger:expr, $level:expr, error: $error:expr, $message:expr) => {{
        let logger = &$logger;
        let event = $crate::LogEvent::new(logger.name(), $level, $message)
            .with_error($error)
            .with_metadata($crate::__logcapture_metadata!());
        logger.log_event(event)
    }};
    ($logger:expr, $level:expr, error: $error:expr, $fmt:expr, $($arg:tt)+) => {{
        let logger = &$logger;
        let event = $crate::LogEvent::new(logger.name(), $level, &::std::format!($fmt, $($arg)+))
            .with_error($error)
            .with_metadata($crate::__logcapture_metadata!());
        logger.log_event(event)
    }};
    ($logger:expr, $level:expr, $message:expr) => {{
        $logger.log_with_metadata($level, $message, $crate::__logcapture_metadata!())
    }};
    ($logger:expr, $level:expr, $fmt:expr, $($arg:tt)+) => {{
        $logger.log_with_metadata(
            $level,
            &::std::format!($fmt, $($arg)+),
            $crate::__logcapture_metadata!(),
        )
    }};
}

#[doc(hidden)]
#[macro_export]
macro_rules! __logcapture_metadata {
    () => {
        $crate::RecordMetadata {
            module_path: ::std::string::String::from(::std::module_path!()),
            filename: ::std::string::String::from(::std::file!()),
            line_number: ::std::line!(),
            ..::std::default::Default::default()
        }
    };
}
