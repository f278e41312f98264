//! Several keyword libraries behind one [`KeywordLibrary`] surface.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use keyway_types::{FailureKind, KeywordLibrary, Outcome, Value};

/// Routes calls across an ordered list of libraries.
///
/// A name is served by the first library that has it; later libraries
/// offering the same name are shadowed.
#[derive(Clone, Default)]
pub struct LibraryChain {
    libraries: Vec<Arc<dyn KeywordLibrary>>,
}

impl LibraryChain {
    /// Create an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a library; it has lower priority than those already added.
    pub fn push(&mut self, library: Arc<dyn KeywordLibrary>) -> &mut Self {
        self.libraries.push(library);
        self
    }

    /// Builder form of [`push`](Self::push).
    #[must_use]
    pub fn with(mut self, library: impl KeywordLibrary + 'static) -> Self {
        self.libraries.push(Arc::new(library));
        self
    }

    /// Number of libraries in the chain.
    pub fn len(&self) -> usize {
        self.libraries.len()
    }

    /// Whether the chain has no libraries.
    pub fn is_empty(&self) -> bool {
        self.libraries.is_empty()
    }

    async fn owner(&self, name: &str) -> Option<&Arc<dyn KeywordLibrary>> {
        for library in &self.libraries {
            if library.has_keyword(name).await {
                return Some(library);
            }
        }
        None
    }
}

impl std::fmt::Debug for LibraryChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LibraryChain")
            .field("libraries", &self.libraries.len())
            .finish()
    }
}

#[async_trait]
impl KeywordLibrary for LibraryChain {
    async fn names(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut names = Vec::new();
        for library in &self.libraries {
            for name in library.names().await {
                if seen.insert(name.clone()) {
                    names.push(name);
                }
            }
        }
        names
    }

    async fn has_keyword(&self, name: &str) -> bool {
        self.owner(name).await.is_some()
    }

    async fn dispatch(&self, name: &str, args: Vec<Value>) -> Outcome {
        match self.owner(name).await {
            Some(library) => library.dispatch(name, args).await,
            None => {
                tracing::debug!(keyword = name, libraries = self.libraries.len(), "no library has keyword");
                Outcome::failure(
                    FailureKind::NotFound,
                    format!("no keyword named '{name}' in any library"),
                )
            }
        }
    }

    async fn arguments(&self, name: &str) -> Option<Vec<String>> {
        self.owner(name).await?.arguments(name).await
    }

    async fn documentation(&self, name: &str) -> Option<String> {
        self.owner(name).await?.documentation(name).await
    }
}
