//! Keyword registry: register candidates, look keywords up by name.

use std::sync::{Arc, Mutex, PoisonError, RwLock};

use indexmap::IndexMap;
use keyway_types::{Candidate, KeywordDyn, KeywordSource, KeywordSpec, SourceKind};

use crate::config::{ConflictPolicy, RegistryConfig};
use crate::error::{ConflictError, LookupError, RegistrationError, ValidationError};
use crate::validator::{Admitted, validate};

/// A registered keyword.
#[derive(Clone)]
pub struct Entry {
    /// Spec under the registered name.
    pub spec: KeywordSpec,
    /// Invocation entry point.
    pub keyword: Arc<dyn KeywordDyn>,
}

impl From<Admitted> for Entry {
    fn from(admitted: Admitted) -> Self {
        Self {
            spec: admitted.spec,
            keyword: admitted.keyword,
        }
    }
}

impl std::fmt::Debug for Entry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entry").field("spec", &self.spec).finish()
    }
}

type Snapshot = IndexMap<String, Entry>;

/// Whether a registration batch took effect.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum BatchStatus {
    /// The batch was published.
    #[default]
    Committed,
    /// The batch was discarded; the registry is unchanged.
    Aborted(RegistrationError),
}

/// What a registration batch did.
///
/// When the batch is aborted, `registered` and `replaced` are empty:
/// nothing was applied.
#[derive(Debug, Clone, Default)]
pub struct RegistrationReport {
    /// Names that took a new slot, in registration order.
    pub registered: Vec<String>,
    /// Names that replaced an existing entry under [`ConflictPolicy::Replace`].
    pub replaced: Vec<String>,
    /// Candidates rejected by validation.
    pub invalid: Vec<ValidationError>,
    /// Candidates rejected by the conflict policy.
    pub conflicts: Vec<ConflictError>,
    /// Whether the batch took effect.
    pub status: BatchStatus,
}

impl RegistrationReport {
    /// Whether the batch was published.
    pub fn is_committed(&self) -> bool {
        self.status == BatchStatus::Committed
    }

    /// `Ok(self)` when committed, the abort reason otherwise.
    pub fn into_result(self) -> Result<Self, RegistrationError> {
        match self.status {
            BatchStatus::Committed => Ok(self),
            BatchStatus::Aborted(err) => Err(err),
        }
    }

    fn abort(&mut self, err: RegistrationError) {
        self.registered.clear();
        self.replaced.clear();
        self.status = BatchStatus::Aborted(err);
    }
}

/// Registry of keywords keyed by name.
///
/// The mapping is an immutable snapshot. Each batch is staged on a copy and
/// published with a single swap, so lookups never observe a partially
/// applied batch and an aborted batch leaves the previous snapshot in place.
/// Batches are serialized; lookups only take a read lock long enough to
/// clone the snapshot handle.
pub struct KeywordRegistry {
    config: RegistryConfig,
    snapshot: RwLock<Arc<Snapshot>>,
    writer: Mutex<()>,
}

impl KeywordRegistry {
    /// Create an empty registry.
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            config,
            snapshot: RwLock::new(Arc::new(Snapshot::new())),
            writer: Mutex::new(()),
        }
    }

    /// The registry's configuration.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Register scanned candidates: invalid ones are skipped and reported.
    pub fn register(&self, candidates: impl IntoIterator<Item = Candidate>) -> RegistrationReport {
        self.apply(candidates, SourceKind::Scanned, false)
    }

    /// Register candidates from a declared keyword container: any invalid
    /// candidate aborts the batch.
    pub fn register_declared(
        &self,
        candidates: impl IntoIterator<Item = Candidate>,
    ) -> RegistrationReport {
        self.apply(candidates, SourceKind::Declared, false)
    }

    /// Register every candidate a source yields, with the source's own
    /// [`SourceKind`]. The source's library name is stamped on candidates
    /// that carry none.
    pub fn register_source<S: KeywordSource + ?Sized>(&self, source: Arc<S>) -> RegistrationReport {
        let kind = source.kind();
        let library = source.library_name().map(str::to_string);
        let candidates = Arc::clone(&source).candidates().into_iter().map(|mut c| {
            if c.library.is_none() {
                c.library.clone_from(&library);
            }
            c
        });
        self.apply(candidates, kind, false)
    }

    /// Replace the whole mapping with the given candidates.
    ///
    /// Built from empty and swapped in atomically; on abort the previous
    /// mapping stays.
    pub fn rebuild(&self, candidates: impl IntoIterator<Item = Candidate>) -> RegistrationReport {
        self.apply(candidates, SourceKind::Scanned, true)
    }

    /// Look a keyword up by name.
    pub fn lookup(&self, name: &str) -> Result<Arc<dyn KeywordDyn>, LookupError> {
        self.entry(name).map(|entry| entry.keyword)
    }

    /// Look up the full entry (spec and keyword) by name.
    pub fn entry(&self, name: &str) -> Result<Entry, LookupError> {
        self.current()
            .get(&self.config.name_matching.key(name))
            .cloned()
            .ok_or_else(|| LookupError::NotFound(name.to_string()))
    }

    /// Spec of a registered keyword.
    pub fn spec(&self, name: &str) -> Option<KeywordSpec> {
        self.entry(name).ok().map(|entry| entry.spec)
    }

    /// Whether `name` resolves to a keyword.
    pub fn contains(&self, name: &str) -> bool {
        self.current()
            .contains_key(&self.config.name_matching.key(name))
    }

    /// Registered names in registration order.
    pub fn names(&self) -> Vec<String> {
        self.current()
            .values()
            .map(|entry| entry.spec.name.clone())
            .collect()
    }

    /// Specs of every registered keyword, in registration order.
    pub fn specs(&self) -> Vec<KeywordSpec> {
        self.current()
            .values()
            .map(|entry| entry.spec.clone())
            .collect()
    }

    /// Number of registered keywords.
    pub fn len(&self) -> usize {
        self.current().len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.current().is_empty()
    }

    fn current(&self) -> Arc<Snapshot> {
        Arc::clone(&self.snapshot.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn apply(
        &self,
        candidates: impl IntoIterator<Item = Candidate>,
        kind: SourceKind,
        fresh: bool,
    ) -> RegistrationReport {
        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let mut staged = if fresh {
            Snapshot::new()
        } else {
            Snapshot::clone(&self.current())
        };
        let policy = self.config.conflict_policy;
        let mut report = RegistrationReport::default();

        for candidate in candidates {
            let admitted = match validate(&candidate) {
                Ok(admitted) => admitted,
                Err(err) => {
                    tracing::warn!(candidate = %err.label, error = %err, "keyword candidate rejected");
                    report.invalid.push(err.clone());
                    if kind == SourceKind::Declared {
                        report.abort(RegistrationError::Invalid(err));
                        return report;
                    }
                    continue;
                }
            };

            let key = self.config.name_matching.key(&admitted.spec.name);
            let Some(slot) = staged.get_mut(&key) else {
                tracing::debug!(keyword = %admitted.spec.name, "keyword registered");
                report.registered.push(admitted.spec.name.clone());
                staged.insert(key, Entry::from(admitted));
                continue;
            };

            let conflict = ConflictError {
                name: admitted.spec.name.clone(),
                existing: slot.spec.name.clone(),
                policy,
            };
            match policy {
                ConflictPolicy::KeepFirst => {
                    tracing::warn!(keyword = %conflict.name, %policy, "keyword name conflict, keeping existing entry");
                    report.conflicts.push(conflict);
                }
                ConflictPolicy::Replace => {
                    tracing::warn!(keyword = %conflict.name, %policy, "keyword name conflict, replacing existing entry");
                    report.replaced.push(admitted.spec.name.clone());
                    *slot = Entry::from(admitted);
                }
                ConflictPolicy::FailFast => {
                    tracing::warn!(keyword = %conflict.name, %policy, "keyword name conflict, aborting batch");
                    report.conflicts.push(conflict.clone());
                    report.abort(RegistrationError::Conflict(conflict));
                    return report;
                }
            }
        }

        let total = staged.len();
        *self.snapshot.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(staged);
        tracing::info!(
            registered = report.registered.len(),
            replaced = report.replaced.len(),
            invalid = report.invalid.len(),
            conflicts = report.conflicts.len(),
            total,
            "keyword batch committed"
        );
        report
    }
}

impl Default for KeywordRegistry {
    fn default() -> Self {
        Self::new(RegistryConfig::default())
    }
}

impl std::fmt::Debug for KeywordRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeywordRegistry")
            .field("config", &self.config)
            .field("names", &self.names())
            .finish()
    }
}
