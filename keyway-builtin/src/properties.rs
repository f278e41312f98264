//! Process-wide string properties.
//!
//! A map shared by every thread of the process and kept apart from the
//! environment, so setting a property never affects child processes.

use std::collections::HashMap;
use std::sync::{LazyLock, PoisonError, RwLock};

static PROPERTIES: LazyLock<RwLock<HashMap<String, String>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));

/// Handle to the process-wide property map.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProperties;

impl SystemProperties {
    /// Set `name` to `value`, returning the previous value.
    pub fn set(name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        PROPERTIES
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.into(), value.into())
    }

    /// Current value of `name`.
    pub fn get(name: &str) -> Option<String> {
        PROPERTIES
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// Remove `name`, returning its value.
    pub fn remove(name: &str) -> Option<String> {
        PROPERTIES
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name)
    }
}
