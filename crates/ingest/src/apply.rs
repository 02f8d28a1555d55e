use datastore::Cache;
use foundation::{FeatureId, FeatureKind};
use scene::{EngineHandle, Registry};
use tracing::{debug, warn};

use crate::adapter::{BatchError, ExtractError, extract};
use crate::geojson::RawFeature;

/// Result of applying one batch: ids that landed in both containers, and
/// per-feature errors for the rest.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub applied: Vec<FeatureId>,
    pub errors: Vec<BatchError>,
}

/// The single write point of the state layer.
///
/// For each feature, either both the cache entry and the registry record
/// are created, or neither: a feature that fails extraction or cache
/// validation has its engine handle disposed on the spot instead of being
/// registered. Readers never observe a half-applied feature; nothing here
/// yields.
///
/// Cache-entry visibility follows batch order. There is no cross-batch
/// ordering guarantee.
pub fn apply_batch(
    cache: &mut Cache,
    registry: &mut Registry,
    kind: FeatureKind,
    batch: Vec<(RawFeature, Box<dyn EngineHandle>)>,
) -> BatchReport {
    let total = batch.len();
    let mut report = BatchReport::default();

    for (index, (feature, mut handle)) in batch.into_iter().enumerate() {
        let entry = match extract(kind, &feature, handle.as_ref()) {
            Ok(entry) => entry,
            Err(error) => {
                warn!(%kind, index, %error, "skipping feature");
                handle.dispose();
                report.errors.push(BatchError { index, error });
                continue;
            }
        };

        let id = entry.id.clone();
        if let Err(err) = cache.put(entry) {
            warn!(%kind, index, id = %id, %err, "cache rejected feature");
            handle.dispose();
            report.errors.push(BatchError {
                index,
                error: ExtractError::NotPlain(err),
            });
            continue;
        }

        registry.register(kind, id.clone(), handle);
        report.applied.push(id);
    }

    debug!(
        %kind,
        total,
        applied = report.applied.len(),
        skipped = report.errors.len(),
        "batch applied"
    );
    report
}

/// Paired eviction for a layer toggle/reload: every registry handle of the
/// kind is disposed synchronously, and the cache entries go with them.
pub fn clear_layer(cache: &mut Cache, registry: &mut Registry, kind: FeatureKind) {
    let disposed = registry.unregister_all(kind);
    let removed = cache.clear(kind).len();
    debug!(%kind, disposed, removed, "layer cleared");
}
