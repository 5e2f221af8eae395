//! Feature sources.
//!
//! Geometry parsing sits behind [`FeatureSource`]: the builders only see
//! single-pass sequences of [`Feature`]s with an opaque geometry payload.

mod geojson;
mod memory;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{HierarchyError, Result};
use crate::models::PlaceKind;

pub use geojson::GeoJsonDir;
pub use memory::MemorySource;

/// Finite, non-restartable sequence of features.
///
/// Builders consume it one feature at a time, but a source may have parsed
/// the whole collection up front; [`GeoJsonDir`] does.
pub type FeatureIter<'a> = Box<dyn Iterator<Item = Result<Feature>> + 'a>;

/// One boundary plus its property fields
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Feature {
    #[serde(default)]
    pub properties: Map<String, Value>,
    #[serde(default)]
    pub geometry: Value,
}

impl Feature {
    pub fn new(properties: Map<String, Value>, geometry: Value) -> Self {
        Self {
            properties,
            geometry,
        }
    }

    pub fn has_property(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    /// Property as text. Numbers are rendered as their JSON text; null and
    /// structured values count as absent.
    pub fn property(&self, key: &str) -> Option<String> {
        match self.properties.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    pub fn require(&self, kind: PlaceKind, key: &'static str) -> Result<String> {
        self.property(key)
            .ok_or(HierarchyError::MissingProperty {
                kind,
                property: key,
            })
    }
}

/// Provider of named feature collections.
pub trait FeatureSource {
    /// Open the named collection as a single-pass feature sequence.
    fn features(&self, name: &str) -> Result<FeatureIter<'_>>;

    /// Names of all collections ending in `suffix`, sorted ascending.
    fn names_with_suffix(&self, suffix: &str) -> Result<Vec<String>>;
}
