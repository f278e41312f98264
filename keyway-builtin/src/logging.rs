//! Keywords that produce output.

use std::io::Write;

use keyway_macros::keyword;
use keyway_types::{Keyword, Positional};

/// Writes [`STDOUT_LINE`](Self::STDOUT_LINE) to stdout and
/// [`STDERR_LINE`](Self::STDERR_LINE) to stderr, then returns `true`.
///
/// Accepts any number of arguments and ignores them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingKeyword;

impl LoggingKeyword {
    /// Written to stdout, without a trailing newline.
    pub const STDOUT_LINE: &'static str = "mock keyword executing";
    /// Written to stderr, without a trailing newline.
    pub const STDERR_LINE: &'static str = "some error occurred";

    fn emit() -> std::io::Result<()> {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(Self::STDOUT_LINE.as_bytes())?;
        stdout.flush()?;
        let mut stderr = std::io::stderr().lock();
        stderr.write_all(Self::STDERR_LINE.as_bytes())?;
        stderr.flush()
    }
}

impl Keyword for LoggingKeyword {
    const NAME: &'static str = "LoggingKeyword";
    type Args = Positional;
    type Output = bool;
    type Error = std::io::Error;

    async fn run(&self, _args: Positional) -> Result<bool, std::io::Error> {
        Self::emit()?;
        Ok(true)
    }
}

/// Logs a message at INFO level.
#[keyword(name = "Log")]
pub fn log(message: String) {
    tracing::info!(target: "keyway::log", "{message}");
}
