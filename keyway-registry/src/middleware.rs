//! Middleware types for the dispatch pipeline.
//!
//! Middleware wraps keyword invocation with cross-cutting concerns such as
//! deadlines and logging. Each middleware receives a [`Next`] that it can
//! call to continue the chain, or skip to short-circuit. Name resolution and
//! the arity check happen before the chain runs.

use std::sync::Arc;

use futures::future::BoxFuture;
use keyway_types::{KeywordDyn, KeywordError, Value};

/// A keyword call in flight through the middleware pipeline.
#[derive(Debug, Clone)]
pub struct DispatchCall {
    /// Registered name of the keyword being called.
    pub name: String,
    /// Positional arguments.
    pub args: Vec<Value>,
}

/// Middleware that wraps keyword invocation.
///
/// Middleware can:
/// - inspect or rewrite the call before passing it on
/// - short-circuit by returning without calling `next.run()`
/// - inspect or replace the result after the keyword runs
///
/// Uses boxed futures so heterogeneous middleware can share one chain.
pub trait DispatchMiddleware: Send + Sync {
    /// Process a call, optionally delegating to the rest of the chain.
    fn process<'a>(
        &'a self,
        call: &'a DispatchCall,
        next: Next<'a>,
    ) -> BoxFuture<'a, Result<Value, KeywordError>>;
}

/// The remaining middleware chain plus the keyword itself.
///
/// Consumed on run, so a middleware cannot invoke the keyword twice.
pub struct Next<'a> {
    keyword: &'a dyn KeywordDyn,
    middleware: &'a [Arc<dyn DispatchMiddleware>],
}

impl<'a> Next<'a> {
    pub(crate) fn new(
        keyword: &'a dyn KeywordDyn,
        middleware: &'a [Arc<dyn DispatchMiddleware>],
    ) -> Self {
        Self {
            keyword,
            middleware,
        }
    }

    /// Continue the chain, eventually invoking the keyword.
    pub async fn run(self, call: &'a DispatchCall) -> Result<Value, KeywordError> {
        match self.middleware.split_first() {
            Some((head, tail)) => head.process(call, Next::new(self.keyword, tail)).await,
            None => self.keyword.call_dyn(call.args.clone()).await,
        }
    }
}

struct MiddlewareFn<F> {
    f: F,
}

impl<F> DispatchMiddleware for MiddlewareFn<F>
where
    F: for<'a> Fn(&'a DispatchCall, Next<'a>) -> BoxFuture<'a, Result<Value, KeywordError>>
        + Send
        + Sync,
{
    fn process<'a>(
        &'a self,
        call: &'a DispatchCall,
        next: Next<'a>,
    ) -> BoxFuture<'a, Result<Value, KeywordError>> {
        (self.f)(call, next)
    }
}

/// Create middleware from a closure (like axum's `from_fn`).
///
/// The closure must return a `Box::pin(async move { ... })` future.
///
/// # Example
///
/// ```ignore
/// use keyway_registry::*;
///
/// let audit = dispatch_middleware_fn(|call, next| {
///     Box::pin(async move {
///         println!("running {}", call.name);
///         next.run(call).await
///     })
/// });
/// ```
#[must_use]
pub fn dispatch_middleware_fn<F>(f: F) -> impl DispatchMiddleware
where
    F: for<'a> Fn(&'a DispatchCall, Next<'a>) -> BoxFuture<'a, Result<Value, KeywordError>>
        + Send
        + Sync,
{
    MiddlewareFn { f }
}
