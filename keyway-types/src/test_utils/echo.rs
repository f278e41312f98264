//! EchoKeyword: returns its arguments as a list.

use serde_json::Value;

use crate::args::Positional;
use crate::traits::Keyword;

/// Returns the argument list unchanged, as a JSON array.
pub struct EchoKeyword;

impl Keyword for EchoKeyword {
    const NAME: &'static str = "Echo";
    type Args = Positional;
    type Output = Value;
    type Error = std::convert::Infallible;

    async fn run(&self, Positional(args): Positional) -> Result<Value, Self::Error> {
        Ok(Value::Array(args))
    }
}
