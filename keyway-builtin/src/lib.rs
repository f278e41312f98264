#![deny(missing_docs)]
#![doc = include_str!("../README.md")]

pub mod keywords;
pub mod logging;
pub mod properties;

pub use keywords::*;
pub use logging::*;
pub use properties::*;

use keyway_types::Candidate;

/// Candidates for the keywords that do not belong to a library.
pub fn standalone_keywords() -> Vec<Candidate> {
    vec![
        Candidate::from_keyword(LoggingKeyword),
        Candidate::from_keyword(LogKeyword),
    ]
}
