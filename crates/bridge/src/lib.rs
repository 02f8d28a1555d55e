//! Cross-layer queries over the analysis cache and the engine registry.
//!
//! Consumers join the two state containers by feature id, one side at a
//! time: charts and snapshots take plain attributes, the scene owner takes
//! handle borrows. There is deliberately no operation that returns
//! attributes and an engine handle in one structure; keeping the two
//! shapes apart is what stops live engine objects from riding along into
//! serializable state.
//!
//! Ids with no matching entry are omitted from results. "Not yet loaded"
//! is a normal state, not an error.

use datastore::Cache;
use foundation::{FeatureId, FeatureKind};
use scene::{EngineHandle, Registry};
use serde_json::{Map, Value};

/// Plain data for one feature: safe to serialize, snapshot, or send across
/// contexts.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRow {
    pub id: FeatureId,
    pub attributes: Map<String, Value>,
}

/// A borrow of one feature's live engine handle. Only the scene-owning
/// component should mutate through these.
#[derive(Debug)]
pub struct VisualRow<'a> {
    pub id: FeatureId,
    pub handle: &'a dyn EngineHandle,
}

/// Cache-side join: plain attributes for the requested ids, in request
/// order, skipping ids that are not loaded.
pub fn join_for_analysis(cache: &Cache, kind: FeatureKind, ids: &[FeatureId]) -> Vec<AnalysisRow> {
    ids.iter()
        .filter_map(|id| analysis_row(cache, kind, id))
        .collect()
}

pub fn analysis_row(cache: &Cache, kind: FeatureKind, id: &FeatureId) -> Option<AnalysisRow> {
    cache.get(kind, id).map(|entry| AnalysisRow {
        id: entry.id.clone(),
        attributes: entry.attributes.clone(),
    })
}

/// Registry-side join: handle borrows for the requested ids, in request
/// order, skipping ids that are not loaded.
pub fn join_for_visualization<'a>(
    registry: &'a Registry,
    kind: FeatureKind,
    ids: &[FeatureId],
) -> Vec<VisualRow<'a>> {
    ids.iter()
        .filter_map(|id| {
            registry.resolve(kind, id).map(|handle| VisualRow {
                id: id.clone(),
                handle,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{join_for_analysis, join_for_visualization};
    use datastore::{Cache, CacheEntry};
    use foundation::{FeatureId, FeatureKind};
    use scene::{EngineHandle, Registry};
    use serde_json::{Value, json};

    #[derive(Debug)]
    struct StubHandle;

    impl EngineHandle for StubHandle {
        fn dispose(&mut self) {}

        fn is_disposed(&self) -> bool {
            false
        }

        fn plain_field(&self, _name: &str) -> Option<Value> {
            None
        }
    }

    fn tree_entry(id: &str) -> CacheEntry {
        let Value::Object(attributes) = json!({ "kohde_id": id }) else {
            unreachable!()
        };
        CacheEntry::new(FeatureKind::Tree, id, attributes)
    }

    #[test]
    fn analysis_join_omits_unloaded_ids() {
        let mut cache = Cache::new();
        cache.put(tree_entry("t1")).unwrap();

        let ids: Vec<FeatureId> = vec!["t1".into(), "t9".into()];
        let rows = join_for_analysis(&cache, FeatureKind::Tree, &ids);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id.as_str(), "t1");
        assert_eq!(rows[0].attributes.get("kohde_id"), Some(&json!("t1")));
    }

    #[test]
    fn analysis_join_never_crosses_kinds() {
        let mut cache = Cache::new();
        cache.put(tree_entry("42")).unwrap();

        let ids: Vec<FeatureId> = vec!["42".into()];
        assert!(join_for_analysis(&cache, FeatureKind::Building, &ids).is_empty());
    }

    #[test]
    fn visualization_join_returns_handles_in_request_order() {
        let mut registry = Registry::new();
        registry.register(FeatureKind::Tree, "t2", Box::new(StubHandle));
        registry.register(FeatureKind::Tree, "t1", Box::new(StubHandle));

        let ids: Vec<FeatureId> = vec!["t2".into(), "t_missing".into(), "t1".into()];
        let rows = join_for_visualization(&registry, FeatureKind::Tree, &ids);

        let got: Vec<&str> = rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(got, vec!["t2", "t1"]);
    }
}
