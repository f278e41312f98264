//! Contract validation: may a candidate become a keyword?
//!
//! Every check runs independently and reports its own [`Violation`]. Name
//! uniqueness is not checked here; that needs the registry.

use std::sync::Arc;

use keyway_types::{
    Arity, BoxFuture, Candidate, KeywordDyn, KeywordError, KeywordSpec, Value, Visibility,
};

use crate::error::{ValidationError, Violation};

/// A candidate that passed validation, bound to its entry point.
#[derive(Clone)]
pub struct Admitted {
    /// Spec under the normalized name.
    pub spec: KeywordSpec,
    /// Invocation entry point. Its [`KeywordDyn::spec`] is `spec`.
    pub keyword: Arc<dyn KeywordDyn>,
}

impl std::fmt::Debug for Admitted {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Admitted").field("spec", &self.spec).finish()
    }
}

/// An entry point carrying the spec it was admitted under.
struct Bound {
    spec: KeywordSpec,
    inner: Arc<dyn KeywordDyn>,
}

impl KeywordDyn for Bound {
    fn spec(&self) -> KeywordSpec {
        self.spec.clone()
    }

    fn call_dyn(&self, args: Vec<Value>) -> BoxFuture<'_, Result<Value, KeywordError>> {
        self.inner.call_dyn(args)
    }
}

/// Validate a candidate in isolation.
///
/// The normalized name is the explicit name when present, else the derived
/// identifier, unchanged. Pure: no side effects.
pub fn validate(candidate: &Candidate) -> Result<Admitted, ValidationError> {
    let mut violations = Vec::new();

    let name = candidate
        .name
        .as_deref()
        .or(candidate.identifier.as_deref());
    match name {
        None => violations.push(Violation::MissingName),
        Some(name) => check_name(name, &mut violations),
    }

    match &candidate.entry {
        None => violations.push(Violation::MissingEntryPoint),
        Some(_) if candidate.visibility != Visibility::Public => {
            violations.push(Violation::NotCallable);
        }
        Some(_) => {}
    }

    if !arguments_match(&candidate.arity, &candidate.arguments) {
        violations.push(Violation::ArityInconsistent {
            arity: candidate.arity.to_string(),
            arguments: candidate.arguments.clone(),
        });
    }

    if let Some(library) = &candidate.library {
        if !library_is_well_formed(library) {
            violations.push(Violation::MalformedLibrary(library.clone()));
        }
    }

    let (Some(name), Some(keyword), true) = (name, &candidate.entry, violations.is_empty()) else {
        tracing::trace!(candidate = %candidate.label(), ?violations, "candidate invalid");
        return Err(ValidationError {
            label: candidate.label(),
            violations,
        });
    };

    let spec = KeywordSpec {
        name: name.to_string(),
        arity: candidate.arity,
        arguments: candidate.arguments.clone(),
        documentation: candidate.documentation.clone(),
        library: candidate.library.clone(),
    };
    Ok(Admitted {
        keyword: Arc::new(Bound {
            spec: spec.clone(),
            inner: Arc::clone(keyword),
        }),
        spec,
    })
}

fn check_name(name: &str, violations: &mut Vec<Violation>) {
    if name.trim().is_empty() {
        violations.push(Violation::EmptyName);
    } else if name.chars().any(char::is_control) {
        violations.push(Violation::InvalidName {
            name: name.to_string(),
            reason: "contains control characters",
        });
    } else if name.trim() != name {
        violations.push(Violation::InvalidName {
            name: name.to_string(),
            reason: "has leading or trailing whitespace",
        });
    }
}

/// Argument names are optional metadata; when present they must agree with
/// the arity.
fn arguments_match(arity: &Arity, arguments: &[String]) -> bool {
    if let Arity::Range { min, max } = *arity {
        if min > max {
            return false;
        }
    }
    if arguments.is_empty() {
        return true;
    }

    let rest = arguments.iter().filter(|a| a.starts_with('*')).count();
    let optional = arguments
        .iter()
        .filter(|a| !a.starts_with('*') && a.contains('='))
        .count();
    let required = arguments.len() - rest - optional;

    // Required names come first, the rest list (if any) last.
    let ordered = arguments
        .iter()
        .take(required)
        .all(|a| !a.starts_with('*') && !a.contains('='));
    let rest_last = rest == 0 || arguments.last().is_some_and(|a| a.starts_with('*'));
    if !ordered || !rest_last {
        return false;
    }

    match *arity {
        Arity::Fixed(n) => required == n && optional == 0 && rest == 0,
        Arity::Range { min, max } => required == min && required + optional == max && rest == 0,
        Arity::Variadic { min } => required == min && rest == 1,
    }
}

fn library_is_well_formed(library: &str) -> bool {
    !library.is_empty()
        && library
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ':'))
}
