//! Errors raised while a keyword runs.

use std::time::Duration;

use crate::types::Arity;

/// A boxed, thread-safe error. The cause type carried by failing keywords.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors from keyword invocation.
///
/// These never escape the dispatcher: it turns every variant into a
/// [`Failure`](crate::Failure) with the matching [`FailureKind`](crate::FailureKind).
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum KeywordError {
    /// The argument count is outside the keyword's arity.
    #[error("expected {expected} arguments, got {actual}")]
    Arity {
        /// Declared arity.
        expected: Arity,
        /// Number of arguments supplied.
        actual: usize,
    },
    /// A required positional argument was not supplied.
    #[error("missing argument {index} ({name})")]
    MissingArgument {
        /// Zero-based position.
        index: usize,
        /// Declared parameter name.
        name: String,
    },
    /// A positional argument could not be converted to the parameter type.
    #[error("invalid argument {index} ({name}): {source}")]
    InvalidArgument {
        /// Zero-based position.
        index: usize,
        /// Declared parameter name.
        name: String,
        /// Conversion failure.
        #[source]
        source: serde_json::Error,
    },
    /// The keyword's own logic failed.
    #[error("execution failed: {0}")]
    Execution(#[source] BoxError),
    /// The return value could not be converted to a [`Value`](crate::Value).
    #[error("could not encode return value: {0}")]
    Encode(#[source] serde_json::Error),
    /// The invocation did not finish before its deadline.
    #[error("timed out after {:.1}s", .0.as_secs_f64())]
    Timeout(Duration),
    /// The keyword panicked.
    #[error("keyword panicked: {0}")]
    Panicked(String),
}

impl KeywordError {
    /// Wrap an arbitrary failure raised by keyword logic.
    pub fn execution(err: impl Into<BoxError>) -> Self {
        Self::Execution(err.into())
    }

    /// Convert any error into a `KeywordError`.
    ///
    /// A `KeywordError` passes through unchanged; anything else becomes
    /// [`KeywordError::Execution`] with the original error as its source.
    pub fn from_error<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        let boxed: BoxError = Box::new(err);
        match boxed.downcast::<KeywordError>() {
            Ok(inner) => *inner,
            Err(other) => Self::Execution(other),
        }
    }
}
