//! Registration and lookup errors.

use crate::config::ConflictPolicy;

/// A single failed validation check.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Violation {
    /// Neither an explicit name nor a derivable identifier.
    #[error("no name and no derivable identifier")]
    MissingName,
    /// The chosen name is empty or blank.
    #[error("name is empty")]
    EmptyName,
    /// The chosen name contains characters a keyword name cannot hold.
    #[error("invalid name {name:?}: {reason}")]
    InvalidName {
        /// The offending name.
        name: String,
        /// What is wrong with it.
        reason: &'static str,
    },
    /// No invocation entry point.
    #[error("no invocation entry point")]
    MissingEntryPoint,
    /// The entry point exists but is not callable from outside its owner.
    #[error("entry point is not public")]
    NotCallable,
    /// Declared argument names disagree with the declared arity.
    #[error("arguments {arguments:?} do not match arity {arity}")]
    ArityInconsistent {
        /// Declared arity, rendered.
        arity: String,
        /// Declared argument names.
        arguments: Vec<String>,
    },
    /// The library marker is present but malformed.
    #[error("malformed library name {0:?}")]
    MalformedLibrary(String),
}

/// A candidate that failed one or more checks.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("candidate '{label}' rejected: {}", join(.violations))]
pub struct ValidationError {
    /// Name or identifier of the rejected candidate.
    pub label: String,
    /// Every check that failed, in check order.
    pub violations: Vec<Violation>,
}

fn join(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// A candidate whose name collided with an existing entry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("keyword '{name}' conflicts with registered '{existing}' (policy: {policy})")]
pub struct ConflictError {
    /// Name of the incoming candidate.
    pub name: String,
    /// Name of the entry already holding the slot.
    pub existing: String,
    /// Policy that resolved the conflict.
    pub policy: ConflictPolicy,
}

/// Why a registration batch was aborted.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationError {
    /// A name conflict under [`ConflictPolicy::FailFast`].
    #[error("registration aborted: {0}")]
    Conflict(ConflictError),
    /// An invalid candidate from a declared keyword source.
    #[error("registration aborted: {0}")]
    Invalid(ValidationError),
}

/// Errors from registry lookups.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    /// No keyword registered under the name.
    #[error("no keyword registered for name '{0}'")]
    NotFound(String),
}

