#![doc = include_str!("../README.md")]

pub mod builtin;
pub mod chain;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod middleware;
pub mod registry;
pub mod validator;

pub use builtin::*;
pub use chain::*;
pub use config::*;
pub use dispatcher::*;
pub use error::*;
pub use middleware::*;
pub use registry::*;
pub use validator::*;
