//! Upstream feature shapes.
//!
//! The data service delivers GeoJSON-like structures over HTTP; by the time
//! they reach the adapter they are already parsed JSON. Parsing is tolerant:
//! unknown fields are ignored and missing blocks default to empty, since
//! upstream layers differ in how much they fill in.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawFeature {
    #[serde(rename = "type", default)]
    pub feature_type: String,

    #[serde(default)]
    pub properties: Map<String, Value>,

    #[serde(default)]
    pub geometry: Value,
}

impl RawFeature {
    pub fn from_properties(properties: Map<String, Value>) -> Self {
        Self {
            feature_type: "Feature".to_string(),
            properties,
            geometry: Value::Null,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawFeatureCollection {
    #[serde(rename = "type", default)]
    pub collection_type: String,

    #[serde(default)]
    pub features: Vec<RawFeature>,
}
