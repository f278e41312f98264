//! Ready-made keywords for tests.
//!
//! Available behind the `test-utils` feature flag.

mod echo;
mod failing;
mod panicking;
mod recording;
mod sleep;

pub use echo::EchoKeyword;
pub use failing::{FailingKeyword, TestFailure};
pub use panicking::PanickingKeyword;
pub use recording::RecordingKeyword;
pub use sleep::SleepKeyword;
