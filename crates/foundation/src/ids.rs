use std::fmt;

/// Stable identifier for a domain feature, unique within its feature kind.
///
/// Ids originate in the upstream data source (`kohde_id` for trees,
/// `vtj_prt` for buildings, `posno` for postal-code areas) and are the join
/// key between the analysis cache and the engine registry.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FeatureId(String);

impl FeatureId {
    pub fn new(id: impl Into<String>) -> Self {
        FeatureId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FeatureId {
    fn from(id: &str) -> Self {
        FeatureId(id.to_string())
    }
}

impl From<String> for FeatureId {
    fn from(id: String) -> Self {
        FeatureId(id)
    }
}
