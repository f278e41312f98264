//! SleepKeyword: waits for the given number of milliseconds.

use std::time::Duration;

use crate::traits::Keyword;

/// Sleeps for its single argument, in milliseconds, then returns it.
pub struct SleepKeyword;

impl Keyword for SleepKeyword {
    const NAME: &'static str = "Sleep";
    type Args = (u64,);
    type Output = u64;
    type Error = std::convert::Infallible;

    async fn run(&self, (millis,): (u64,)) -> Result<u64, Self::Error> {
        tokio::time::sleep(Duration::from_millis(millis)).await;
        Ok(millis)
    }
}
