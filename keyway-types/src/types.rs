//! Arity, keyword metadata and dispatch outcomes.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::KeywordError;

/// How many positional arguments a keyword accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Arity {
    /// Exactly `n` arguments.
    Fixed(usize),
    /// Between `min` and `max` arguments, inclusive. Trailing arguments are optional.
    Range {
        /// Required arguments.
        min: usize,
        /// Required plus optional arguments.
        max: usize,
    },
    /// At least `min` arguments; the rest are collected into a list.
    Variadic {
        /// Required arguments before the rest list.
        min: usize,
    },
}

impl Arity {
    /// Whether a call with `count` arguments satisfies this arity.
    #[must_use]
    pub fn accepts(&self, count: usize) -> bool {
        match *self {
            Self::Fixed(n) => count == n,
            Self::Range { min, max } => (min..=max).contains(&count),
            Self::Variadic { min } => count >= min,
        }
    }

    /// Number of arguments that must always be supplied.
    #[must_use]
    pub fn required(&self) -> usize {
        match *self {
            Self::Fixed(n) => n,
            Self::Range { min, .. } | Self::Variadic { min } => min,
        }
    }

    /// Largest accepted argument count, `None` when unbounded.
    #[must_use]
    pub fn maximum(&self) -> Option<usize> {
        match *self {
            Self::Fixed(n) => Some(n),
            Self::Range { max, .. } => Some(max),
            Self::Variadic { .. } => None,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(n) => write!(f, "{n}"),
            Self::Range { min, max } => write!(f, "{min} to {max}"),
            Self::Variadic { min } => write!(f, "at least {min}"),
        }
    }
}

/// Introspection record for a keyword.
///
/// Argument names follow the host driver's convention: `name` for a
/// required argument, `name=` (or `name=default`) for an optional one and
/// `*name` for the rest list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordSpec {
    /// Keyword name.
    pub name: String,
    /// Accepted argument counts.
    pub arity: Arity,
    /// Argument names, possibly empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<String>,
    /// Human-readable documentation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
    /// Grouping marker (library name).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub library: Option<String>,
}

impl KeywordSpec {
    /// Create a spec with no argument names or documentation.
    pub fn new(name: impl Into<String>, arity: Arity) -> Self {
        Self {
            name: name.into(),
            arity,
            arguments: Vec::new(),
            documentation: None,
            library: None,
        }
    }

    /// Set the argument names.
    #[must_use]
    pub fn with_arguments<I, S>(mut self, arguments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.arguments = arguments.into_iter().map(Into::into).collect();
        self
    }

    /// Set the documentation.
    #[must_use]
    pub fn with_documentation(mut self, documentation: impl Into<String>) -> Self {
        self.documentation = Some(documentation.into());
        self
    }

    /// Set the library marker.
    #[must_use]
    pub fn with_library(mut self, library: impl Into<String>) -> Self {
        self.library = Some(library.into());
        self
    }
}

/// Classification of a failed dispatch.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// No keyword is registered under the requested name.
    NotFound,
    /// The argument count does not satisfy the keyword's arity.
    ArityMismatch,
    /// The keyword ran and failed.
    ActionError,
    /// The invocation exceeded its deadline.
    Timeout,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::NotFound => "not found",
            Self::ArityMismatch => "arity mismatch",
            Self::ActionError => "action error",
            Self::Timeout => "timeout",
        };
        f.write_str(label)
    }
}

/// A reported dispatch failure.
#[derive(Debug, Clone)]
pub struct Failure {
    /// What went wrong.
    pub kind: FailureKind,
    /// Human-readable message.
    pub message: String,
    /// The original error, when there is one.
    pub cause: Option<Arc<dyn std::error::Error + Send + Sync>>,
}

impl Failure {
    /// Create a failure without a cause.
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            cause: None,
        }
    }

    /// Attach a cause.
    #[must_use]
    pub fn with_cause(mut self, cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.cause = Some(Arc::new(cause));
        self
    }

    /// Messages of the cause and each of its sources, outermost first.
    pub fn cause_chain(&self) -> Vec<String> {
        let mut chain = Vec::new();
        let mut next = self
            .cause
            .as_deref()
            .map(|cause| cause as &(dyn std::error::Error + 'static));
        while let Some(err) = next {
            chain.push(err.to_string());
            next = err.source();
        }
        chain
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl From<KeywordError> for Failure {
    fn from(err: KeywordError) -> Self {
        let kind = match &err {
            KeywordError::Arity { .. } => FailureKind::ArityMismatch,
            KeywordError::Timeout(_) => FailureKind::Timeout,
            _ => FailureKind::ActionError,
        };
        Self {
            kind,
            message: err.to_string(),
            cause: Some(Arc::new(err)),
        }
    }
}

/// Result of a single dispatch. Every dispatch produces exactly one.
///
/// A keyword that returns nothing succeeds with [`Value::Null`].
#[derive(Debug, Clone)]
pub enum Outcome {
    /// The keyword returned a value.
    Success(Value),
    /// The dispatch failed.
    Failure(Failure),
}

impl Outcome {
    /// Success carrying the "no value" sentinel.
    pub fn void() -> Self {
        Self::Success(Value::Null)
    }

    /// Failure of the given kind with no cause.
    pub fn failure(kind: FailureKind, message: impl Into<String>) -> Self {
        Self::Failure(Failure::new(kind, message))
    }

    /// Whether the dispatch succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Kind of failure, `None` on success.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Self::Success(_) => None,
            Self::Failure(failure) => Some(failure.kind),
        }
    }

    /// The returned value, if any.
    pub fn value(&self) -> Option<&Value> {
        match self {
            Self::Success(value) => Some(value),
            Self::Failure(_) => None,
        }
    }

    /// Convert into a `Result`.
    pub fn into_result(self) -> Result<Value, Failure> {
        match self {
            Self::Success(value) => Ok(value),
            Self::Failure(failure) => Err(failure),
        }
    }

    /// Serializable summary for a remote adapter to encode.
    pub fn to_record(&self) -> OutcomeRecord {
        match self {
            Self::Success(value) => OutcomeRecord {
                status: OutcomeStatus::Pass,
                return_value: value.clone(),
                error: String::new(),
                kind: None,
                traceback: Vec::new(),
            },
            Self::Failure(failure) => OutcomeRecord {
                status: OutcomeStatus::Fail,
                return_value: Value::Null,
                error: failure.message.clone(),
                kind: Some(failure.kind),
                traceback: failure.cause_chain(),
            },
        }
    }
}

impl From<Result<Value, KeywordError>> for Outcome {
    fn from(result: Result<Value, KeywordError>) -> Self {
        match result {
            Ok(value) => Self::Success(value),
            Err(err) => Self::Failure(Failure::from(err)),
        }
    }
}

/// PASS/FAIL marker of an [`OutcomeRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OutcomeStatus {
    /// The keyword succeeded.
    Pass,
    /// The dispatch failed.
    Fail,
}

/// Wire-neutral view of an [`Outcome`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeRecord {
    /// PASS or FAIL.
    pub status: OutcomeStatus,
    /// Returned value, `null` on failure.
    #[serde(rename = "return", default)]
    pub return_value: Value,
    /// Failure message, empty on success.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error: String,
    /// Failure kind.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<FailureKind>,
    /// Cause chain, outermost first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub traceback: Vec<String>,
}
