use std::collections::BTreeMap;

use super::{Feature, FeatureIter, FeatureSource};
use crate::error::{HierarchyError, Result};

/// In-memory feature collections, for fixtures.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    collections: BTreeMap<String, Vec<Feature>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, features: Vec<Feature>) {
        self.collections.insert(name.into(), features);
    }

    pub fn with(mut self, name: impl Into<String>, features: Vec<Feature>) -> Self {
        self.insert(name, features);
        self
    }
}

impl FeatureSource for MemorySource {
    fn features(&self, name: &str) -> Result<FeatureIter<'_>> {
        let features = self.collections.get(name).ok_or_else(|| {
            HierarchyError::io(
                name,
                std::io::Error::new(std::io::ErrorKind::NotFound, "no such collection"),
            )
        })?;
        Ok(Box::new(features.iter().cloned().map(Ok)))
    }

    fn names_with_suffix(&self, suffix: &str) -> Result<Vec<String>> {
        // BTreeMap keys are already sorted
        Ok(self
            .collections
            .keys()
            .filter(|name| name.ends_with(suffix))
            .cloned()
            .collect())
    }
}
