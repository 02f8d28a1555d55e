use std::fmt;
use std::str::FromStr;

/// Domain feature kinds tracked by the viewer.
///
/// Entries for a kind are created and evicted together: toggling a layer
/// off tears down that kind across both state containers.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FeatureKind {
    Tree,
    Building,
    PostalArea,
}

impl FeatureKind {
    pub const ALL: [FeatureKind; 3] = [
        FeatureKind::Tree,
        FeatureKind::Building,
        FeatureKind::PostalArea,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureKind::Tree => "tree",
            FeatureKind::Building => "building",
            FeatureKind::PostalArea => "postal_area",
        }
    }
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownKind(pub String);

impl fmt::Display for UnknownKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown feature kind: {}", self.0)
    }
}

impl std::error::Error for UnknownKind {}

impl FromStr for FeatureKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tree" => Ok(FeatureKind::Tree),
            "building" => Ok(FeatureKind::Building),
            "postal_area" => Ok(FeatureKind::PostalArea),
            other => Err(UnknownKind(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::FeatureKind;
    use std::str::FromStr;

    #[test]
    fn kind_round_trips_through_str() {
        for kind in FeatureKind::ALL {
            assert_eq!(FeatureKind::from_str(kind.as_str()), Ok(kind));
        }
    }

    #[test]
    fn unknown_kind_is_rejected() {
        assert!(FeatureKind::from_str("road").is_err());
    }
}
