//! Candidate descriptors: potential keywords awaiting validation.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::KeywordError;
use crate::traits::{FnKeyword, Keyword, KeywordDyn};
use crate::types::{Arity, KeywordSpec};

/// Whether a candidate's entry point may be called from outside its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Callable by the dispatcher.
    #[default]
    Public,
    /// Discovered but not callable from outside its owner.
    Private,
}

/// A structural descriptor of a potential keyword.
///
/// Sources build candidates without checking them; the registry runs every
/// candidate through validation before anything is inserted. Both "a type
/// that is one keyword" and "a method on a host object" end up here, and
/// nothing downstream distinguishes them.
#[derive(Clone)]
pub struct Candidate {
    /// Explicit name override.
    pub name: Option<String>,
    /// Name derived from the candidate's own identifier (type or method name).
    pub identifier: Option<String>,
    /// Optional grouping marker.
    pub library: Option<String>,
    /// Declared argument counts.
    pub arity: Arity,
    /// Declared argument names.
    pub arguments: Vec<String>,
    /// Documentation.
    pub documentation: Option<String>,
    /// Declared visibility of the entry point.
    pub visibility: Visibility,
    /// Invocation entry point.
    pub entry: Option<Arc<dyn KeywordDyn>>,
}

impl Candidate {
    /// A candidate with no name and no entry point.
    pub fn empty(arity: Arity) -> Self {
        Self {
            name: None,
            identifier: None,
            library: None,
            arity,
            arguments: Vec::new(),
            documentation: None,
            visibility: Visibility::Public,
            entry: None,
        }
    }

    /// A candidate for a strongly-typed keyword.
    ///
    /// The explicit name is [`Keyword::NAME`]; the identifier is the type's
    /// own name.
    pub fn from_keyword<K: Keyword + 'static>(keyword: K) -> Self {
        let identifier = short_type_name::<K>().to_string();
        let mut candidate = Self::from_dyn(Arc::new(keyword));
        candidate.identifier = Some(identifier);
        candidate
    }

    /// A candidate for an already type-erased keyword, described by its spec.
    pub fn from_dyn(keyword: Arc<dyn KeywordDyn>) -> Self {
        let spec = keyword.spec();
        Self {
            name: Some(spec.name),
            identifier: None,
            library: spec.library,
            arity: spec.arity,
            arguments: spec.arguments,
            documentation: spec.documentation,
            visibility: Visibility::Public,
            entry: Some(keyword),
        }
    }

    /// A candidate backed by a closure over the raw argument list.
    ///
    /// The candidate has no name until [`named`](Self::named) or
    /// [`identified`](Self::identified) supplies one.
    pub fn from_fn<F, Fut>(arity: Arity, f: F) -> Self
    where
        F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, KeywordError>> + Send + 'static,
    {
        let entry = FnKeyword::new(KeywordSpec::new("", arity), f);
        Self {
            entry: Some(Arc::new(entry)),
            ..Self::empty(arity)
        }
    }

    /// Set the explicit name.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the derived identifier.
    #[must_use]
    pub fn identified(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    /// Set the library marker.
    #[must_use]
    pub fn in_library(mut self, library: impl Into<String>) -> Self {
        self.library = Some(library.into());
        self
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
    pub fn documented(mut self, documentation: impl Into<String>) -> Self {
        self.documentation = Some(documentation.into());
        self
    }

    /// Set the visibility.
    #[must_use]
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Name used in reports: the explicit name, else the identifier.
    pub fn label(&self) -> String {
        self.name
            .as_deref()
            .or(self.identifier.as_deref())
            .unwrap_or("<unnamed>")
            .to_string()
    }
}

impl fmt::Debug for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Candidate")
            .field("name", &self.name)
            .field("identifier", &self.identifier)
            .field("library", &self.library)
            .field("arity", &self.arity)
            .field("arguments", &self.arguments)
            .field("visibility", &self.visibility)
            .field("entry", &self.entry.is_some())
            .finish()
    }
}

fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Greeter;

    #[test]
    fn short_type_name_strips_path() {
        assert_eq!(short_type_name::<Greeter>(), "Greeter");
        assert_eq!(short_type_name::<Vec<String>>(), "Vec");
    }

    #[test]
    fn label_prefers_explicit_name() {
        let candidate = Candidate::empty(Arity::Fixed(0))
            .identified("set_property")
            .named("Set Property");
        assert_eq!(candidate.label(), "Set Property");
        assert_eq!(Candidate::empty(Arity::Fixed(0)).label(), "<unnamed>");
    }
}
