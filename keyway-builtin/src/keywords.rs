//! The `keyway.builtin` keyword library.

use keyway_macros::keyword_library;

use crate::properties::SystemProperties;

/// Errors from the property keywords.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PropertyError {
    /// Property names cannot be empty.
    #[error("property name must not be empty")]
    EmptyName,
}

/// Keywords over [`SystemProperties`].
///
/// A declared library: registering it aborts if any of its keywords fails
/// validation.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinKeywords;

#[keyword_library(name = "keyway.builtin", declared)]
impl BuiltinKeywords {
    /// Create the library.
    pub fn new() -> Self {
        Self
    }

    /// Sets a process-wide property.
    #[keyword(name = "setSystemProperty")]
    pub fn set_system_property(&self, name: String, value: String) -> Result<(), PropertyError> {
        if name.is_empty() {
            return Err(PropertyError::EmptyName);
        }
        tracing::debug!(property = %name, "setting system property");
        SystemProperties::set(name, value);
        Ok(())
    }

    /// Returns a property's value, or nothing when it is unset.
    #[keyword(name = "getSystemProperty")]
    pub fn get_system_property(&self, name: String) -> Option<String> {
        SystemProperties::get(&name)
    }

    /// Removes a property and returns the value it had.
    #[keyword(name = "clearSystemProperty")]
    pub fn clear_system_property(&self, name: String) -> Option<String> {
        SystemProperties::remove(&name)
    }
}
