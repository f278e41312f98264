//! Dispatcher: resolve a name, invoke the keyword, package the outcome.
//!
//! Every failure becomes an [`Outcome::Failure`]; nothing raised by a
//! keyword (errors, panics, deadlines) escapes [`Dispatcher::dispatch`].

use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use keyway_types::{
    Failure, FailureKind, KeywordError, KeywordLibrary, Outcome, Value, ensure_arity,
};

use crate::config::DispatcherConfig;
use crate::middleware::{DispatchCall, DispatchMiddleware, Next};
use crate::registry::{Entry, KeywordRegistry};

#[derive(Clone, Default)]
struct MiddlewareTable {
    global: Vec<Arc<dyn DispatchMiddleware>>,
    per_keyword: HashMap<String, Vec<Arc<dyn DispatchMiddleware>>>,
}

/// Runs keywords by name against a shared [`KeywordRegistry`].
///
/// Cheap to clone; clones share the registry and the middleware installed so
/// far. Safe to call from many tasks at once: dispatch only reads the
/// registry snapshot, and keywords synchronize their own state.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<KeywordRegistry>,
    config: DispatcherConfig,
    middleware: Arc<MiddlewareTable>,
}

impl Dispatcher {
    /// Create a dispatcher with the default configuration.
    pub fn new(registry: Arc<KeywordRegistry>) -> Self {
        Self::with_config(registry, DispatcherConfig::default())
    }

    /// Create a dispatcher with an explicit configuration.
    pub fn with_config(registry: Arc<KeywordRegistry>, config: DispatcherConfig) -> Self {
        Self {
            registry,
            config,
            middleware: Arc::new(MiddlewareTable::default()),
        }
    }

    /// The registry this dispatcher resolves names against.
    pub fn registry(&self) -> &Arc<KeywordRegistry> {
        &self.registry
    }

    /// The dispatcher's configuration.
    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// Add middleware that wraps every keyword.
    pub fn add_middleware(&mut self, m: impl DispatchMiddleware + 'static) -> &mut Self {
        Arc::make_mut(&mut self.middleware)
            .global
            .push(Arc::new(m));
        self
    }

    /// Add middleware that only wraps the keyword registered as `name`.
    pub fn add_keyword_middleware(
        &mut self,
        name: &str,
        m: impl DispatchMiddleware + 'static,
    ) -> &mut Self {
        let key = self.registry.config().name_matching.key(name);
        Arc::make_mut(&mut self.middleware)
            .per_keyword
            .entry(key)
            .or_default()
            .push(Arc::new(m));
        self
    }

    /// Run the keyword registered as `name` with `args`.
    ///
    /// Order of checks: an unknown name fails with
    /// [`FailureKind::NotFound`]; an argument count outside the keyword's
    /// arity fails with [`FailureKind::ArityMismatch`] without invoking it.
    /// Otherwise the keyword runs through the middleware chain (global
    /// first, then per-keyword) under the configured deadline. A keyword
    /// that returns nothing succeeds with [`Value::Null`]. Errors and panics
    /// raised while the keyword runs are [`FailureKind::ActionError`].
    ///
    /// # Panics
    ///
    /// With [`DispatcherConfig::timeout_ms`] set, panics when polled outside
    /// a Tokio runtime.
    pub async fn dispatch(&self, name: &str, args: Vec<Value>) -> Outcome {
        let entry = match self.registry.entry(name) {
            Ok(entry) => entry,
            Err(err) => {
                tracing::debug!(keyword = name, "dispatch to unknown keyword");
                return Outcome::Failure(
                    Failure::new(FailureKind::NotFound, err.to_string()).with_cause(err),
                );
            }
        };

        if let Err(err) = ensure_arity(&entry.spec.arity, args.len()) {
            tracing::debug!(keyword = %entry.spec.name, error = %err, "arity mismatch");
            return Outcome::Failure(err.into());
        }

        let outcome = match self.invoke(&entry, args).await {
            // The count already matched; this came from inside the keyword.
            Err(err @ KeywordError::Arity { .. }) => Outcome::Failure(
                Failure::new(FailureKind::ActionError, err.to_string()).with_cause(err),
            ),
            result => Outcome::from(result),
        };
        if let Outcome::Failure(failure) = &outcome {
            tracing::debug!(keyword = %entry.spec.name, kind = %failure.kind, "keyword failed");
        }
        outcome
    }

    /// Dispatch several calls concurrently. Results come back in input order.
    ///
    /// # Panics
    ///
    /// Each call runs on its own task spawned with [`tokio::spawn`], so this
    /// panics when called outside a Tokio runtime.
    pub async fn dispatch_many(&self, calls: Vec<(String, Vec<Value>)>) -> Vec<Outcome> {
        let mut handles = Vec::with_capacity(calls.len());
        for (name, args) in calls {
            let dispatcher = self.clone();
            handles.push(tokio::spawn(
                async move { dispatcher.dispatch(&name, args).await },
            ));
        }

        let mut outcomes = Vec::with_capacity(handles.len());
        for handle in handles {
            match handle.await {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => outcomes.push(Outcome::Failure(
                    Failure::new(FailureKind::ActionError, e.to_string()).with_cause(e),
                )),
            }
        }
        outcomes
    }

    async fn invoke(&self, entry: &Entry, args: Vec<Value>) -> Result<Value, KeywordError> {
        let key = self.registry.config().name_matching.key(&entry.spec.name);
        let mut chain = self.middleware.global.clone();
        if let Some(per_keyword) = self.middleware.per_keyword.get(&key) {
            chain.extend(per_keyword.iter().cloned());
        }

        let call = DispatchCall {
            name: entry.spec.name.clone(),
            args,
        };
        let run = Next::new(entry.keyword.as_ref(), &chain).run(&call);
        let guarded = async {
            match AssertUnwindSafe(run).catch_unwind().await {
                Ok(result) => result,
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    tracing::error!(keyword = %call.name, panic = %message, "keyword panicked");
                    Err(KeywordError::Panicked(message))
                }
            }
        };

        match self.config.timeout() {
            Some(limit) => tokio::time::timeout(limit, guarded)
                .await
                .unwrap_or_else(|_elapsed| {
                    tracing::warn!(keyword = %call.name, timeout = ?limit, "keyword timed out");
                    Err(KeywordError::Timeout(limit))
                }),
            None => guarded.await,
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .field("middleware", &self.middleware.global.len())
            .finish()
    }
}

#[async_trait]
impl KeywordLibrary for Dispatcher {
    async fn names(&self) -> Vec<String> {
        self.registry.names()
    }

    async fn has_keyword(&self, name: &str) -> bool {
        self.registry.contains(name)
    }

    async fn dispatch(&self, name: &str, args: Vec<Value>) -> Outcome {
        Dispatcher::dispatch(self, name, args).await
    }

    async fn arguments(&self, name: &str) -> Option<Vec<String>> {
        self.registry.spec(name).map(|spec| spec.arguments)
    }

    async fn documentation(&self, name: &str) -> Option<String> {
        self.registry.spec(name).and_then(|spec| spec.documentation)
    }
}
