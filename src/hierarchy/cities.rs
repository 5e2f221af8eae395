use tracing::{debug, info};

use super::{fields, StateIndex};
use crate::error::{HierarchyError, Result};
use crate::models::{PlaceKind, PlaceRecord};
use crate::source::{Feature, FeatureIter, FeatureSource};

/// Census-designated places, basically cities and towns.
///
/// Walks every collection ending in the configured suffix in sorted order.
/// Each city name is recorded on its state's seen names, so the iterator
/// must be drained before postal codes are resolved.
pub struct Cities<'a, S: FeatureSource + ?Sized> {
    source: &'a S,
    states: &'a mut StateIndex,
    files: std::vec::IntoIter<String>,
    current: Option<(String, FeatureIter<'a>)>,
    /// State of the last feature in the current file that carried one
    default_parent: Option<String>,
    built: usize,
}

impl<'a, S: FeatureSource + ?Sized> Cities<'a, S> {
    pub fn new(source: &'a S, suffix: &str, states: &'a mut StateIndex) -> Result<Self> {
        let files = source.names_with_suffix(suffix)?;
        info!("Found {} place files ending in {}", files.len(), suffix);

        Ok(Self {
            source,
            states,
            files: files.into_iter(),
            current: None,
            default_parent: None,
            built: 0,
        })
    }

    fn build_city(&mut self, file: &str, feature: Feature) -> Result<PlaceRecord> {
        let id = feature.require(PlaceKind::City, fields::GEOID)?;

        // Files are expected to be single-state, but check every feature.
        if let Some(state_id) = feature.property(fields::STATE_FIPS) {
            if self.states.by_id(&state_id).is_none() {
                return Err(HierarchyError::MissingParent {
                    kind: PlaceKind::City,
                    id,
                    state_id,
                });
            }
            self.default_parent = Some(state_id);
        }

        let parent_id = match &self.default_parent {
            Some(parent_id) => parent_id.clone(),
            None => {
                return Err(HierarchyError::UnscopedCity {
                    id,
                    file: file.to_string(),
                })
            }
        };

        let name = feature.require(PlaceKind::City, fields::NAME)?;
        if let Some(state) = self.states.by_id_mut(&parent_id) {
            state.saw_place_name(&name);
        }

        Ok(PlaceRecord::new(PlaceKind::City, id, name, feature.geometry).with_parent(parent_id))
    }
}

impl<'a, S: FeatureSource + ?Sized> Iterator for Cities<'a, S> {
    type Item = Result<PlaceRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.current.is_none() {
                let file = match self.files.next() {
                    Some(file) => file,
                    None => {
                        info!("Built {} cities", self.built);
                        return None;
                    }
                };
                debug!("Reading places from {}", file);
                let source = self.source;
                let features = match source.features(&file) {
                    Ok(features) => features,
                    Err(e) => return Some(Err(e)),
                };
                self.default_parent = None;
                self.current = Some((file, features));
            }

            let (file, next) = match self.current.as_mut() {
                Some((file, features)) => (file.clone(), features.next()),
                None => continue,
            };

            let feature = match next {
                Some(Ok(feature)) => feature,
                Some(Err(e)) => return Some(Err(e)),
                None => {
                    self.current = None;
                    continue;
                }
            };

            // Postal codes are handled by the postal code resolver.
            if feature.has_property(fields::POSTAL_MARKER) {
                continue;
            }

            let city = self.build_city(&file, feature);
            if city.is_ok() {
                self.built += 1;
            }
            return Some(city);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::test_support::feature;
    use crate::source::MemorySource;
    use serde_json::Value;

    fn states() -> StateIndex {
        let mut index = StateIndex::new();
        for (id, name, abbr) in [("01", "Alabama", "AL"), ("72", "Puerto Rico", "PR")] {
            index.add(
                PlaceRecord::new(PlaceKind::State, id, name, Value::Null)
                    .with_abbreviated_name(abbr)
                    .with_parent("US"),
            );
        }
        index
    }

    #[test]
    fn test_files_read_in_sorted_order_and_names_recorded() {
        let source = MemorySource::new()
            .with(
                "cb_2015_72_place_500k.json",
                vec![feature(&[("GEOID", "7203100"), ("NAME", "Añasco"), ("STATEFP", "72")])],
            )
            .with(
                "cb_2015_01_place_500k.json",
                vec![feature(&[("GEOID", "0107000"), ("NAME", "Birmingham"), ("STATEFP", "01")])],
            )
            .with(
                "cb_2015_us_state_500k.json",
                vec![feature(&[("GEOID", "06"), ("NAME", "California"), ("STATEFP", "06")])],
            );
        let mut states = states();

        let cities: Vec<PlaceRecord> = Cities::new(&source, "_place_500k.json", &mut states)
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();

        let ids: Vec<&str> = cities.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["0107000", "7203100"]);
        assert_eq!(cities[1].parent_id.as_deref(), Some("72"));
        assert!(cities[1].has_alias("Anasco"));

        assert!(states.by_id("72").unwrap().has_seen("Añasco"));
        assert!(states.by_id("01").unwrap().has_seen("Birmingham"));
        assert!(!states.by_id("01").unwrap().has_seen("Añasco"));
    }

    #[test]
    fn test_default_parent_carries_within_file() {
        let source = MemorySource::new().with(
            "cb_2015_01_place_500k.json",
            vec![
                feature(&[("GEOID", "0107000"), ("NAME", "Birmingham"), ("STATEFP", "01")]),
                feature(&[("GEOID", "0150000"), ("NAME", "Mobile")]),
                feature(&[("GEOID", "35801"), ("ZCTA5CE10", "35801"), ("NAME", "35801")]),
            ],
        );
        let mut states = states();

        let cities: Vec<PlaceRecord> = Cities::new(&source, "_place_500k.json", &mut states)
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(cities.len(), 2);
        assert_eq!(cities[1].name, "Mobile");
        assert_eq!(cities[1].parent_id.as_deref(), Some("01"));
        assert!(states.by_id("01").unwrap().has_seen("Mobile"));
        assert!(!states.by_id("01").unwrap().has_seen("35801"));
    }

    #[test]
    fn test_default_parent_resets_between_files() {
        let source = MemorySource::new()
            .with(
                "a_place_500k.json",
                vec![feature(&[("GEOID", "0107000"), ("NAME", "Birmingham"), ("STATEFP", "01")])],
            )
            .with(
                "b_place_500k.json",
                vec![feature(&[("GEOID", "7299999"), ("NAME", "Nowhere")])],
            );
        let mut states = states();

        let results: Vec<Result<PlaceRecord>> =
            Cities::new(&source, "_place_500k.json", &mut states)
                .unwrap()
                .collect();
        assert!(results[0].is_ok());
        assert!(matches!(
            results[1],
            Err(HierarchyError::UnscopedCity { ref file, .. }) if file == "b_place_500k.json"
        ));
    }

    #[test]
    fn test_unknown_state_is_fatal() {
        let source = MemorySource::new().with(
            "cb_2015_48_place_500k.json",
            vec![feature(&[("GEOID", "4835000"), ("NAME", "Houston"), ("STATEFP", "48")])],
        );
        let mut states = states();

        let mut cities = Cities::new(&source, "_place_500k.json", &mut states).unwrap();
        assert!(matches!(
            cities.next(),
            Some(Err(HierarchyError::MissingParent {
                kind: PlaceKind::City,
                ..
            }))
        ));
    }
}
