//! RecordingKeyword: records every argument list it receives.

use std::sync::{Arc, Mutex};

use serde_json::Value;

use crate::args::Positional;
use crate::traits::Keyword;

/// Records each call's arguments and returns the call count.
///
/// Clones share the same record, so a test can keep one handle and
/// register another.
#[derive(Clone, Default)]
pub struct RecordingKeyword {
    calls: Arc<Mutex<Vec<Vec<Value>>>>,
}

impl RecordingKeyword {
    /// Create a keyword with an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of recorded argument lists, oldest first.
    pub fn calls(&self) -> Vec<Vec<Value>> {
        self.calls.lock().unwrap().clone()
    }
}

impl Keyword for RecordingKeyword {
    const NAME: &'static str = "Record";
    type Args = Positional;
    type Output = usize;
    type Error = std::convert::Infallible;

    async fn run(&self, Positional(args): Positional) -> Result<usize, Self::Error> {
        let mut calls = self.calls.lock().unwrap();
        calls.push(args);
        Ok(calls.len())
    }
}
