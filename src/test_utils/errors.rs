//! Error types for attaching to events.

use thiserror::Error;

/// A leaf error.
#[derive(Debug, Default, Error)]
#[error("root cause")]
pub struct RootCause;

/// A second leaf error, distinct from [`RootCause`].
#[derive(Debug, Default, Error)]
#[error("other failure")]
pub struct OtherFailure;

/// An error wrapping another one as its source.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct LayeredError {
    message: String,
    #[source]
    source: Box<dyn std::error::Error + Send + Sync + 'static>,
}

impl LayeredError {
    pub fn new(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Box::new(source),
        }
    }
}
