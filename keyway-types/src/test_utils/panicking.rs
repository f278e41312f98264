//! PanickingKeyword: panics when run.

use crate::traits::Keyword;

/// Panics with a fixed message.
pub struct PanickingKeyword;

impl PanickingKeyword {
    /// Message passed to `panic!`.
    pub const MESSAGE: &'static str = "keyword blew up";
}

impl Keyword for PanickingKeyword {
    const NAME: &'static str = "Panic";
    type Args = ();
    type Output = ();
    type Error = std::convert::Infallible;

    async fn run(&self, _args: ()) -> Result<(), Self::Error> {
        panic!("{}", Self::MESSAGE)
    }
}
