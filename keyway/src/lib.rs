#![deny(missing_docs)]
//! # keyway umbrella crate
//!
//! A single import surface for the keyword registry and dispatcher.
//! Re-exports the member crates, with macros and built-in keywords behind
//! feature flags, plus a `prelude` for the common path.

pub use keyway_registry;
pub use keyway_types;

#[cfg(feature = "builtin")]
pub use keyway_builtin;
#[cfg(feature = "macros")]
pub use keyway_macros;

/// Common imports for registering and dispatching keywords.
pub mod prelude {
    pub use keyway_types::{
        Arity, Candidate, Failure, FailureKind, Keyword, KeywordDyn, KeywordError,
        KeywordLibrary, KeywordSource, KeywordSpec, Outcome, Positional, Rest, SourceKind,
        Value,
    };

    pub use keyway_registry::{
        ConflictPolicy, DispatchMiddleware, Dispatcher, DispatcherConfig, KeywordRegistry,
        LibraryChain, NameMatching, RegistrationReport, RegistryConfig, TimeoutMiddleware,
        TracingMiddleware,
    };

    #[cfg(feature = "macros")]
    pub use keyway_macros::{keyword, keyword_library};

    #[cfg(feature = "builtin")]
    pub use keyway_builtin::{BuiltinKeywords, LogKeyword, LoggingKeyword, SystemProperties};
}
