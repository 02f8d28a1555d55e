use foundation::{FeatureId, FeatureKind};
use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::value::{ValidationError, ensure_plain};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FeatureKey {
    pub kind: FeatureKind,
    pub id: FeatureId,
}

impl FeatureKey {
    pub fn new(kind: FeatureKind, id: impl Into<FeatureId>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }
}

/// A single feature's analysis-facing data.
///
/// Attributes hold plain JSON values only; [`Cache::put`] enforces this on
/// every insert. Never store an engine handle (or anything derived from
/// one) in here.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub id: FeatureId,
    pub kind: FeatureKind,
    pub attributes: Map<String, Value>,
}

impl CacheEntry {
    pub fn new(kind: FeatureKind, id: impl Into<FeatureId>, attributes: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            kind,
            attributes,
        }
    }

    pub fn key(&self) -> FeatureKey {
        FeatureKey {
            kind: self.kind,
            id: self.id.clone(),
        }
    }
}

/// Serializable analysis-state cache, the plain-data half of the
/// view/analysis split.
///
/// Holds only data that survives JSON round-trips. Live engine objects live
/// in the scene registry, joined to these entries by feature id.
///
/// Ordering contract:
/// - `get_all` and `iter` yield entries in insertion order; removal does
///   not perturb the order of remaining entries.
#[derive(Debug, Default)]
pub struct Cache {
    entries: IndexMap<FeatureKey, CacheEntry>,
}

impl Cache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Inserts an entry, validating the full attribute tree first.
    ///
    /// Rejecting non-plain values here is the primary defense this
    /// container exists for; the error is surfaced, never coerced.
    pub fn put(&mut self, entry: CacheEntry) -> Result<(), ValidationError> {
        ensure_plain(&entry.attributes)?;
        self.entries.insert(entry.key(), entry);
        Ok(())
    }

    pub fn get(&self, kind: FeatureKind, id: &FeatureId) -> Option<&CacheEntry> {
        self.entries.get(&FeatureKey {
            kind,
            id: id.clone(),
        })
    }

    pub fn contains(&self, kind: FeatureKind, id: &FeatureId) -> bool {
        self.get(kind, id).is_some()
    }

    /// All entries of a kind, in insertion order.
    pub fn get_all(&self, kind: FeatureKind) -> Vec<&CacheEntry> {
        self.entries
            .values()
            .filter(|e| e.kind == kind)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CacheEntry> {
        self.entries.values()
    }

    /// Removes one entry. Returns `true` if it existed.
    pub fn remove(&mut self, kind: FeatureKind, id: &FeatureId) -> bool {
        // shift_remove keeps insertion order stable for the survivors.
        self.entries
            .shift_remove(&FeatureKey {
                kind,
                id: id.clone(),
            })
            .is_some()
    }

    /// Removes every entry of a kind. Returns the removed ids in insertion
    /// order so callers can tear down the paired registry records.
    pub fn clear(&mut self, kind: FeatureKind) -> Vec<FeatureId> {
        let ids: Vec<FeatureId> = self
            .entries
            .values()
            .filter(|e| e.kind == kind)
            .map(|e| e.id.clone())
            .collect();
        self.entries.retain(|key, _| key.kind != kind);
        ids
    }
}
