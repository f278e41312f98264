//! Registry and dispatcher configuration.
//!
//! Both structs deserialize from plain JSON with every field optional, so a
//! host can embed them in whatever configuration it already loads.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// What happens when a candidate's name is already taken.
///
/// Fixed per registry instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    /// Keep the existing entry, reject the newcomer.
    #[default]
    KeepFirst,
    /// The newcomer replaces the existing entry, keeping its position.
    Replace,
    /// Abort the whole batch; the registry is left unchanged.
    FailFast,
}

impl fmt::Display for ConflictPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::KeepFirst => "keep-first",
            Self::Replace => "replace",
            Self::FailFast => "fail-fast",
        };
        f.write_str(label)
    }
}

/// How names are compared for lookup and conflict detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameMatching {
    /// Case-sensitive exact match.
    #[default]
    Exact,
    /// Ignore case, whitespace and underscores: `Set System Property`,
    /// `set_system_property` and `setSystemProperty` are one name.
    Normalized,
}

impl NameMatching {
    /// The key a name is stored and looked up under.
    pub fn key(&self, name: &str) -> String {
        match self {
            Self::Exact => name.to_string(),
            Self::Normalized => name
                .chars()
                .filter(|c| !c.is_whitespace() && *c != '_')
                .flat_map(char::to_lowercase)
                .collect(),
        }
    }
}

/// Registry configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Conflict policy.
    pub conflict_policy: ConflictPolicy,
    /// Name comparison.
    pub name_matching: NameMatching,
}

impl RegistryConfig {
    /// Set the conflict policy.
    #[must_use]
    pub fn with_conflict_policy(mut self, policy: ConflictPolicy) -> Self {
        self.conflict_policy = policy;
        self
    }

    /// Set the name matching mode.
    #[must_use]
    pub fn with_name_matching(mut self, matching: NameMatching) -> Self {
        self.name_matching = matching;
        self
    }
}

/// Dispatcher configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    /// Deadline for every invocation, in milliseconds. `None` waits forever.
    ///
    /// A timed-out invocation is reported as a timeout failure. The
    /// keyword's future is dropped, which cancels it at its next await
    /// point; blocking work inside it keeps running.
    ///
    /// # Panics
    ///
    /// With a deadline set, dispatch uses the Tokio timer and panics when
    /// polled outside a Tokio runtime.
    pub timeout_ms: Option<u64>,
}

impl DispatcherConfig {
    /// The configured deadline.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Set the deadline. See [`timeout_ms`](Self::timeout_ms) for the
    /// runtime requirement.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_key_ignores_case_spaces_and_underscores() {
        let matching = NameMatching::Normalized;
        assert_eq!(matching.key("Set System Property"), "setsystemproperty");
        assert_eq!(matching.key("set_system_property"), "setsystemproperty");
        assert_eq!(matching.key("setSystemProperty"), "setsystemproperty");
    }

    #[test]
    fn exact_key_is_identity() {
        assert_eq!(NameMatching::Exact.key("Log"), "Log");
    }

    #[test]
    fn configs_deserialize_with_defaults() {
        let registry: RegistryConfig =
            serde_json::from_str(r#"{"conflict_policy": "fail_fast"}"#).unwrap();
        assert_eq!(registry.conflict_policy, ConflictPolicy::FailFast);
        assert_eq!(registry.name_matching, NameMatching::Exact);

        let dispatcher: DispatcherConfig = serde_json::from_str(r#"{"timeout_ms": 250}"#).unwrap();
        assert_eq!(dispatcher.timeout(), Some(Duration::from_millis(250)));
        assert_eq!(DispatcherConfig::default().timeout(), None);
    }
}
