//! Built-in dispatch middleware.

use std::time::{Duration, Instant};

use futures::future::BoxFuture;
use keyway_types::{KeywordError, Value};

use crate::config::NameMatching;
use crate::middleware::{DispatchCall, DispatchMiddleware, Next};

/// Middleware that enforces a deadline on keyword invocation.
///
/// Wraps the rest of the chain in [`tokio::time::timeout`]. A call that does
/// not finish in time fails with [`KeywordError::Timeout`]. Cancellation is
/// best-effort: the keyword's future is dropped, but blocking work it
/// already started is not interrupted.
///
/// Per-keyword overrides allow different deadlines for keywords with known
/// different latency profiles. Override names are compared with the
/// middleware's [`NameMatching`], exact by default; set it to the registry's
/// mode with [`with_name_matching`](Self::with_name_matching).
pub struct TimeoutMiddleware {
    default_timeout: Duration,
    per_keyword: Vec<(String, Duration)>,
    name_matching: NameMatching,
}

impl TimeoutMiddleware {
    /// Create a timeout middleware with the given default deadline.
    #[must_use]
    pub fn new(default_timeout: Duration) -> Self {
        Self {
            default_timeout,
            per_keyword: Vec::new(),
            name_matching: NameMatching::default(),
        }
    }

    /// Compare override names the way a registry with `matching` does.
    #[must_use]
    pub fn with_name_matching(mut self, matching: NameMatching) -> Self {
        self.name_matching = matching;
        self
    }

    /// Override the deadline for one keyword. A later override for the same
    /// name wins.
    #[must_use]
    pub fn with_keyword_timeout(mut self, name: impl Into<String>, timeout: Duration) -> Self {
        self.per_keyword.push((name.into(), timeout));
        self
    }

    fn timeout_for(&self, name: &str) -> Duration {
        let key = self.name_matching.key(name);
        self.per_keyword
            .iter()
            .rev()
            .find(|(candidate, _)| self.name_matching.key(candidate) == key)
            .map_or(self.default_timeout, |(_, timeout)| *timeout)
    }
}

impl DispatchMiddleware for TimeoutMiddleware {
    fn process<'a>(
        &'a self,
        call: &'a DispatchCall,
        next: Next<'a>,
    ) -> BoxFuture<'a, Result<Value, KeywordError>> {
        Box::pin(async move {
            let timeout = self.timeout_for(&call.name);
            match tokio::time::timeout(timeout, next.run(call)).await {
                Ok(result) => result,
                Err(_elapsed) => {
                    tracing::warn!(keyword = %call.name, ?timeout, "keyword timed out");
                    Err(KeywordError::Timeout(timeout))
                }
            }
        })
    }
}

/// Middleware that emits structured [`tracing`] events around every call.
///
/// | Event | Level |
/// |-------|-------|
/// | `keyway.keyword.start`, `keyway.keyword.success` | `DEBUG` |
/// | `keyway.keyword.failure` | `INFO` |
///
/// Observes only; results pass through unchanged.
pub struct TracingMiddleware;

impl TracingMiddleware {
    /// Create a new `TracingMiddleware`.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for TracingMiddleware {
    fn default() -> Self {
        Self::new()
    }
}

impl DispatchMiddleware for TracingMiddleware {
    fn process<'a>(
        &'a self,
        call: &'a DispatchCall,
        next: Next<'a>,
    ) -> BoxFuture<'a, Result<Value, KeywordError>> {
        Box::pin(async move {
            tracing::debug!(keyword = %call.name, args = call.args.len(), "keyway.keyword.start");
            let started = Instant::now();
            let result = next.run(call).await;
            let elapsed_ms = started.elapsed().as_millis() as u64;
            match &result {
                Ok(_) => tracing::debug!(keyword = %call.name, elapsed_ms, "keyway.keyword.success"),
                Err(err) => {
                    tracing::info!(keyword = %call.name, elapsed_ms, error = %err, "keyway.keyword.failure");
                }
            }
            result
        })
    }
}
