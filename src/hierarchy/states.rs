use hashbrown::HashMap;
use tracing::{info, warn};

use super::fields;
use crate::error::Result;
use crate::models::{PlaceKind, PlaceRecord};
use crate::source::FeatureSource;

/// Owns the state records for a run, indexed by FIPS id and by postal
/// abbreviation. Iteration follows insertion order.
#[derive(Debug, Default)]
pub struct StateIndex {
    states: Vec<PlaceRecord>,
    by_id: HashMap<String, usize>,
    by_abbreviation: HashMap<String, usize>,
}

impl StateIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a state. A repeated id replaces the earlier record in place.
    pub fn add(&mut self, state: PlaceRecord) {
        let slot = match self.by_id.get(&state.id) {
            Some(&slot) => {
                warn!("Duplicate state id {}, replacing {}", state.id, self.states[slot].name);
                let previous = std::mem::replace(&mut self.states[slot], state);
                if let Some(abbr) = previous.abbreviated_name {
                    self.by_abbreviation.remove(&abbr);
                }
                slot
            }
            None => {
                self.states.push(state);
                self.states.len() - 1
            }
        };

        let state = &self.states[slot];
        self.by_id.insert(state.id.clone(), slot);
        if let Some(abbr) = &state.abbreviated_name {
            self.by_abbreviation.insert(abbr.clone(), slot);
        }
    }

    pub fn by_id(&self, id: &str) -> Option<&PlaceRecord> {
        self.by_id.get(id).map(|&slot| &self.states[slot])
    }

    pub fn by_id_mut(&mut self, id: &str) -> Option<&mut PlaceRecord> {
        let slot = *self.by_id.get(id)?;
        Some(&mut self.states[slot])
    }

    pub fn by_abbreviation(&self, abbreviation: &str) -> Option<&PlaceRecord> {
        self.by_abbreviation
            .get(abbreviation)
            .map(|&slot| &self.states[slot])
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlaceRecord> {
        self.states.iter()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

/// Build one state record per feature, each parented to `nation`.
pub fn build_states<S: FeatureSource + ?Sized>(
    source: &S,
    name: &str,
    nation: &PlaceRecord,
) -> Result<StateIndex> {
    let mut index = StateIndex::new();

    for feature in source.features(name)? {
        let feature = feature?;
        let id = feature.require(PlaceKind::State, fields::STATE_FIPS)?;
        let state_name = feature.require(PlaceKind::State, fields::NAME)?;
        let abbr = feature.require(PlaceKind::State, fields::STATE_ABBREVIATION)?;

        let state = PlaceRecord::new(PlaceKind::State, id, state_name, feature.geometry)
            .with_abbreviated_name(abbr)
            .with_parent(nation.id.clone());
        index.add(state);
    }

    info!("Built {} states", index.len());
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HierarchyError;
    use crate::hierarchy::test_support::feature;
    use crate::source::MemorySource;
    use serde_json::Value;

    fn nation() -> PlaceRecord {
        PlaceRecord::new(PlaceKind::Nation, "US", "United States", Value::Null)
            .with_abbreviated_name("US")
    }

    #[test]
    fn test_states_indexed_by_id_and_abbreviation() {
        let source = MemorySource::new().with(
            "states.json",
            vec![
                feature(&[("STATEFP", "72"), ("NAME", "Puerto Rico"), ("STUSPS", "PR")]),
                feature(&[("STATEFP", "06"), ("NAME", "California"), ("STUSPS", "CA")]),
            ],
        );

        let states = build_states(&source, "states.json", &nation()).unwrap();
        assert_eq!(states.len(), 2);

        let pr = states.by_abbreviation("PR").unwrap();
        assert_eq!(pr.id, "72");
        assert_eq!(pr.parent_id.as_deref(), Some("US"));
        assert_eq!(states.by_id("06").unwrap().name, "California");
        assert!(states.by_abbreviation("TX").is_none());

        let order: Vec<&str> = states.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(order, vec!["72", "06"]);
    }

    #[test]
    fn test_duplicate_id_replaces_in_place() {
        let mut index = StateIndex::new();
        for (id, name, abbr) in [
            ("01", "Alabama", "AL"),
            ("02", "Alaska", "AK"),
            ("01", "Alabama (2)", "AL"),
        ] {
            let state =
                PlaceRecord::new(PlaceKind::State, id, name, Value::Null).with_abbreviated_name(abbr);
            index.add(state);
        }

        assert_eq!(index.len(), 2);
        assert_eq!(index.by_id("01").unwrap().name, "Alabama (2)");
        assert_eq!(index.iter().next().unwrap().name, "Alabama (2)");
    }

    #[test]
    fn test_duplicate_id_drops_stale_abbreviation() {
        let mut index = StateIndex::new();
        for (id, name, abbr) in [("01", "Alabama", "AL"), ("01", "Alabama", "AB")] {
            let state =
                PlaceRecord::new(PlaceKind::State, id, name, Value::Null).with_abbreviated_name(abbr);
            index.add(state);
        }

        assert!(index.by_abbreviation("AL").is_none());
        assert_eq!(index.by_abbreviation("AB").unwrap().id, "01");
    }

    #[test]
    fn test_missing_abbreviation_is_fatal() {
        let source = MemorySource::new().with(
            "states.json",
            vec![feature(&[("STATEFP", "06"), ("NAME", "California")])],
        );
        let err = build_states(&source, "states.json", &nation()).unwrap_err();
        assert!(matches!(
            err,
            HierarchyError::MissingProperty {
                property: "STUSPS",
                ..
            }
        ));
    }
}
