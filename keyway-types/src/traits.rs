//! Core traits: Keyword, KeywordDyn, KeywordSource, KeywordLibrary.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use serde::Serialize;
use serde_json::Value;

use crate::args::{FromArgs, encode_return};
use crate::candidate::Candidate;
use crate::error::KeywordError;
use crate::types::{KeywordSpec, Outcome};

/// Strongly-typed keyword. Implement this for your actions.
///
/// The blanket impl of [`KeywordDyn`] decodes the positional argument list
/// into [`Keyword::Args`] and encodes the output as a [`Value`].
///
/// # Example
///
/// ```ignore
/// use keyway_types::*;
///
/// struct Greet;
///
/// impl Keyword for Greet {
///     const NAME: &'static str = "Greet";
///     type Args = (String,);
///     type Output = String;
///     type Error = std::convert::Infallible;
///
///     async fn run(&self, (who,): (String,)) -> Result<String, Self::Error> {
///         Ok(format!("hello, {who}"))
///     }
/// }
/// ```
pub trait Keyword: Send + Sync {
    /// The keyword's name.
    const NAME: &'static str;
    /// Decoded argument list.
    type Args: FromArgs;
    /// Returned value.
    type Output: Serialize;
    /// Keyword-specific failure.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Introspection record. Defaults to the name and the arity of `Args`.
    fn spec(&self) -> KeywordSpec {
        KeywordSpec::new(Self::NAME, Self::Args::arity())
    }

    /// Run the keyword with decoded arguments.
    fn run(
        &self,
        args: Self::Args,
    ) -> impl Future<Output = Result<Self::Output, Self::Error>> + Send;
}

/// Type-erased keyword for dynamic dispatch. Blanket-implemented for all [`Keyword`] impls.
///
/// This is the single invocation entry point the dispatcher knows about:
/// one ordered argument list in, one value or error out.
pub trait KeywordDyn: Send + Sync {
    /// Introspection record.
    fn spec(&self) -> KeywordSpec;

    /// Invoke with a positional argument list.
    fn call_dyn(&self, args: Vec<Value>) -> BoxFuture<'_, Result<Value, KeywordError>>;
}

impl<T: Keyword> KeywordDyn for T {
    fn spec(&self) -> KeywordSpec {
        Keyword::spec(self)
    }

    fn call_dyn(&self, args: Vec<Value>) -> BoxFuture<'_, Result<Value, KeywordError>> {
        Box::pin(async move {
            let args = T::Args::from_args(args)?;
            let output = self.run(args).await.map_err(KeywordError::from_error)?;
            encode_return(output)
        })
    }
}

/// A keyword backed by a closure over the raw argument list.
pub struct FnKeyword<F> {
    spec: KeywordSpec,
    f: F,
}

impl<F, Fut> FnKeyword<F>
where
    F: Fn(Vec<Value>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value, KeywordError>> + Send + 'static,
{
    /// Wrap a closure.
    pub fn new(spec: KeywordSpec, f: F) -> Self {
        Self { spec, f }
    }
}

impl<F, Fut> KeywordDyn for FnKeyword<F>
where
    F: Fn(Vec<Value>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value, KeywordError>> + Send + 'static,
{
    fn spec(&self) -> KeywordSpec {
        self.spec.clone()
    }

    fn call_dyn(&self, args: Vec<Value>) -> BoxFuture<'_, Result<Value, KeywordError>> {
        Box::pin((self.f)(args))
    }
}

/// How a registry treats invalid candidates from a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceKind {
    /// The source was scanned; most of what it yields need not be keywords.
    /// Invalid candidates are skipped and reported.
    #[default]
    Scanned,
    /// The source is declared to be a keyword container. Any invalid
    /// candidate aborts the whole batch.
    Declared,
}

/// A host object that enumerates keyword candidates.
///
/// Candidates typically share the host through the `Arc`; whatever state the
/// host owns is the host's to synchronize.
pub trait KeywordSource: Send + Sync + 'static {
    /// Enumerate candidates in a stable order.
    fn candidates(self: Arc<Self>) -> Vec<Candidate>;

    /// How invalid candidates are treated.
    fn kind(&self) -> SourceKind {
        SourceKind::Scanned
    }

    /// Library marker stamped on candidates that carry none.
    fn library_name(&self) -> Option<&str> {
        None
    }
}

/// The surface exposed to a remote adapter.
///
/// An adapter encodes names, argument lists and [`Outcome`]s on its own
/// wire; it never needs to know how a keyword was produced.
#[async_trait]
pub trait KeywordLibrary: Send + Sync {
    /// Names of every available keyword.
    async fn names(&self) -> Vec<String>;

    /// Whether `name` resolves to a keyword.
    async fn has_keyword(&self, name: &str) -> bool {
        self.names().await.iter().any(|candidate| candidate == name)
    }

    /// Run `name` with `args`.
    async fn dispatch(&self, name: &str, args: Vec<Value>) -> Outcome;

    /// Argument names of `name`, `None` when unknown.
    async fn arguments(&self, name: &str) -> Option<Vec<String>>;

    /// Documentation of `name`, `None` when unknown or undocumented.
    async fn documentation(&self, name: &str) -> Option<String>;
}
