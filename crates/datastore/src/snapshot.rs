use std::str::FromStr;

use foundation::FeatureKind;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::cache::{Cache, CacheEntry};
use crate::value::ValidationError;

/// Flat, serde-friendly image of the cache for persistence or
/// cross-context messaging. Entry order matches cache insertion order.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheSnapshot {
    pub entries: Vec<SnapshotEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub id: String,
    pub kind: String,
    pub attributes: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    UnknownKind(String),
    Invalid(ValidationError),
}

impl std::fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SnapshotError::UnknownKind(kind) => write!(f, "snapshot has unknown kind {kind:?}"),
            SnapshotError::Invalid(err) => write!(f, "snapshot entry not plain: {err}"),
        }
    }
}

impl std::error::Error for SnapshotError {}

impl Cache {
    pub fn snapshot(&self) -> CacheSnapshot {
        CacheSnapshot {
            entries: self
                .iter()
                .map(|e| SnapshotEntry {
                    id: e.id.as_str().to_string(),
                    kind: e.kind.as_str().to_string(),
                    attributes: e.attributes.clone(),
                })
                .collect(),
        }
    }

    /// Rebuilds a cache from a snapshot, re-running plain-value validation
    /// on every entry. Snapshots from an untrusted context get the same
    /// scrutiny as live inserts.
    pub fn restore(snapshot: &CacheSnapshot) -> Result<Cache, SnapshotError> {
        let mut cache = Cache::new();
        for entry in &snapshot.entries {
            let kind = FeatureKind::from_str(&entry.kind)
                .map_err(|e| SnapshotError::UnknownKind(e.0))?;
            cache
                .put(CacheEntry::new(
                    kind,
                    entry.id.as_str(),
                    entry.attributes.clone(),
                ))
                .map_err(SnapshotError::Invalid)?;
        }
        Ok(cache)
    }
}

#[cfg(test)]
mod tests {
    use super::{CacheSnapshot, SnapshotError};
    use crate::cache::{Cache, CacheEntry};
    use foundation::FeatureKind;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn entry(kind: FeatureKind, id: &str) -> CacheEntry {
        let serde_json::Value::Object(attributes) = json!({ "id": id }) else {
            unreachable!()
        };
        CacheEntry::new(kind, id, attributes)
    }

    #[test]
    fn snapshot_round_trips_through_json() {
        let mut cache = Cache::new();
        cache.put(entry(FeatureKind::Tree, "t1")).unwrap();
        cache.put(entry(FeatureKind::Building, "b1")).unwrap();

        let snap = cache.snapshot();
        let text = serde_json::to_string(&snap).unwrap();
        let back: CacheSnapshot = serde_json::from_str(&text).unwrap();
        assert_eq!(back, snap);

        let restored = Cache::restore(&back).unwrap();
        assert_eq!(restored.snapshot(), snap);
    }

    #[test]
    fn restore_rejects_unknown_kinds() {
        let snap: CacheSnapshot = serde_json::from_value(json!({
            "entries": [{ "id": "x", "kind": "road", "attributes": {} }]
        }))
        .unwrap();
        let err = Cache::restore(&snap).unwrap_err();
        assert_eq!(err, SnapshotError::UnknownKind("road".into()));
    }
}
