#![doc = include_str!("../README.md")]
#![deny(missing_docs)]

pub mod args;
pub mod candidate;
pub mod error;
pub mod traits;
pub mod types;

#[cfg(feature = "test-utils")]
pub mod test_utils;

pub use args::*;
pub use candidate::*;
pub use error::*;
pub use traits::*;
pub use types::*;

/// Positional argument and return value type.
pub use serde_json::Value;

/// Boxed `Send` future used at every dyn-compatible async seam.
pub use futures::future::BoxFuture;
