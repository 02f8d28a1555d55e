use datastore::{CacheEntry, ValidationError};
use foundation::{FeatureId, FeatureKind};
use scene::EngineHandle;
use serde_json::{Map, Value};

use crate::geojson::RawFeature;
use crate::unwrap::unwrap_plain;

/// Per-kind extraction policy: which raw property carries the feature id,
/// and which fields may be copied into the analysis cache.
///
/// Only whitelisted fields are read, and every value goes through
/// plain-value unwrapping, so extraction is deterministic for identical
/// input; no kind has volatile fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindProfile {
    pub kind: FeatureKind,
    pub id_field: &'static str,
    /// Raw feature properties copied into `attributes`.
    pub property_fields: &'static [&'static str],
    /// Plain fields read off the engine handle (e.g. measured heights that
    /// only exist after the engine has built the feature).
    pub handle_fields: &'static [&'static str],
}

const TREE_PROFILE: KindProfile = KindProfile {
    kind: FeatureKind::Tree,
    id_field: "kohde_id",
    property_fields: &[
        "kohde_id",
        "paaluokka",
        "alaluokka",
        "koodi",
        "kuvaus",
        "kunta",
        "posno",
    ],
    handle_fields: &["height_m"],
};

const BUILDING_PROFILE: KindProfile = KindProfile {
    kind: FeatureKind::Building,
    id_field: "vtj_prt",
    property_fields: &[
        "vtj_prt",
        "posno",
        "kerala",
        "kavu",
        "kerrosten_lkm",
        "kayttarks",
        "avgheatexposure",
    ],
    handle_fields: &["measured_height"],
};

const POSTAL_AREA_PROFILE: KindProfile = KindProfile {
    kind: FeatureKind::PostalArea,
    id_field: "posno",
    property_fields: &["posno", "nimi", "kunta", "asukkaita", "avgheatexposure"],
    handle_fields: &[],
};

pub fn profile(kind: FeatureKind) -> &'static KindProfile {
    match kind {
        FeatureKind::Tree => &TREE_PROFILE,
        FeatureKind::Building => &BUILDING_PROFILE,
        FeatureKind::PostalArea => &POSTAL_AREA_PROFILE,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    /// The raw feature lacks a usable value in the kind's id property.
    MissingId { kind: FeatureKind },
    /// Extracted attributes failed cache validation. The whitelist and
    /// unwrapping should make this unreachable; surfaced rather than
    /// swallowed if it ever happens.
    NotPlain(ValidationError),
}

impl std::fmt::Display for ExtractError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractError::MissingId { kind } => {
                write!(f, "{kind} feature has no usable {:?}", profile(*kind).id_field)
            }
            ExtractError::NotPlain(err) => write!(f, "extracted attributes not plain: {err}"),
        }
    }
}

impl std::error::Error for ExtractError {}

/// One failed feature inside a batch, by batch position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchError {
    pub index: usize,
    pub error: ExtractError,
}

/// Splits one raw feature into its serializable cache entry. The engine
/// handle is read only through its plain-field accessor; nothing
/// engine-native is copied.
pub fn extract(
    kind: FeatureKind,
    feature: &RawFeature,
    handle: &dyn EngineHandle,
) -> Result<CacheEntry, ExtractError> {
    let profile = profile(kind);

    let id = feature
        .properties
        .get(profile.id_field)
        .and_then(id_from_value)
        .ok_or(ExtractError::MissingId { kind })?;

    let mut attributes = Map::new();
    for field in profile.property_fields {
        let Some(raw) = feature.properties.get(*field) else {
            continue;
        };
        if let Some(plain) = unwrap_plain(raw) {
            attributes.insert((*field).to_string(), plain);
        }
    }
    for field in profile.handle_fields {
        let Some(raw) = handle.plain_field(field) else {
            continue;
        };
        if let Some(plain) = unwrap_plain(&raw) {
            attributes.insert((*field).to_string(), plain);
        }
    }

    Ok(CacheEntry::new(kind, FeatureId::new(id), attributes))
}

/// Extracts a whole batch with partial-failure semantics: one bad feature
/// never blocks the rest, and its error is reported by batch index.
pub fn extract_batch<'a, I>(kind: FeatureKind, batch: I) -> (Vec<CacheEntry>, Vec<BatchError>)
where
    I: IntoIterator<Item = (&'a RawFeature, &'a dyn EngineHandle)>,
{
    let mut extracted = Vec::new();
    let mut errors = Vec::new();
    for (index, (feature, handle)) in batch.into_iter().enumerate() {
        match extract(kind, feature, handle) {
            Ok(entry) => extracted.push(entry),
            Err(error) => errors.push(BatchError { index, error }),
        }
    }
    (extracted, errors)
}

/// Reduces a raw id value to a stable string id.
///
/// Upstream ids arrive as strings or bare numbers (`posno` in particular
/// shows up both ways); wrapped values are unwrapped first. Empty and
/// non-scalar values are unusable.
fn id_from_value(value: &Value) -> Option<String> {
    match unwrap_plain(value)? {
        Value::String(s) if !s.trim().is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
