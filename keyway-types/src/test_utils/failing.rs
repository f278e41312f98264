//! FailingKeyword: always fails with the given message.

use crate::traits::Keyword;

/// Error returned by [`FailingKeyword`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct TestFailure(pub String);

/// Fails with its single argument as the message.
pub struct FailingKeyword;

impl Keyword for FailingKeyword {
    const NAME: &'static str = "Fail";
    type Args = (String,);
    type Output = ();
    type Error = TestFailure;

    async fn run(&self, (message,): (String,)) -> Result<(), TestFailure> {
        Err(TestFailure(message))
    }
}
