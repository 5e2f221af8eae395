//! Postal code resolution.
//!
//! Merges three sources into one mapping from postal code to city name and
//! parent: curated overrides first, then the per-region gazetteer files.
//! The postal code polygons then decide which codes are actually emitted.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use csv::ReaderBuilder;
use hashbrown::{HashMap, HashSet};
use regex::Regex;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::{Config, PostalOverride, Precedence};
use crate::error::{HierarchyError, Result};
use crate::hierarchy::{fields, StateIndex};
use crate::models::{PlaceKind, PlaceRecord};
use crate::source::{Feature, FeatureIter};

/// Where a postal code hangs in the hierarchy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParentRef {
    Nation,
    /// State FIPS id
    State(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostalEntry {
    pub city: Option<String>,
    pub parent: ParentRef,
}

/// Postal code to (city, parent) mapping built from overrides and the gazetteer.
#[derive(Debug)]
pub struct PostalCodeResolver {
    entries: HashMap<String, PostalEntry>,
    nation_id: String,
    /// Country code the gazetteer uses for the nation itself
    nation_code: String,
    precedence: Precedence,
    overridden: HashSet<String>,
}

impl PostalCodeResolver {
    pub fn new(nation: &PlaceRecord, precedence: Precedence) -> Self {
        Self {
            entries: HashMap::new(),
            nation_id: nation.id.clone(),
            nation_code: nation
                .abbreviated_name
                .clone()
                .unwrap_or_else(|| nation.id.clone()),
            precedence,
            overridden: HashSet::new(),
        }
    }

    /// Build the full mapping: overrides, then every matching gazetteer file.
    pub fn build(
        config: &Config,
        gazetteer_dir: &Path,
        nation: &PlaceRecord,
        states: &StateIndex,
    ) -> Result<Self> {
        let mut resolver = Self::new(nation, config.gazetteer.precedence);
        resolver.seed_overrides(&config.overrides, states);

        let pattern = Regex::new(&config.gazetteer.file_pattern)?;
        resolver.load_gazetteer_dir(gazetteer_dir, &pattern, states)?;

        info!("Postal code mapping holds {} entries", resolver.len());
        Ok(resolver)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn lookup(&self, postal_code: &str) -> Option<&PostalEntry> {
        self.entries.get(postal_code)
    }

    fn parent_for(&self, abbreviation: &str, states: &StateIndex) -> ParentRef {
        match states.by_abbreviation(abbreviation) {
            Some(state) => ParentRef::State(state.id.clone()),
            None => ParentRef::Nation,
        }
    }

    /// Seed the mapping with the curated table.
    pub fn seed_overrides(&mut self, overrides: &[PostalOverride], states: &StateIndex) {
        for entry in overrides {
            let parent = self.parent_for(&entry.state, states);
            if parent == ParentRef::Nation {
                warn!(
                    "Override for {} names unknown state {}, using nation",
                    entry.postal_code, entry.state
                );
            }
            self.entries.insert(
                entry.postal_code.clone(),
                PostalEntry {
                    city: Some(entry.city.clone()),
                    parent,
                },
            );
            self.overridden.insert(entry.postal_code.clone());
        }
        debug!("Seeded {} curated postal codes", overrides.len());
    }

    /// Load every file in `dir` whose name matches `pattern`, in name order.
    pub fn load_gazetteer_dir(
        &mut self,
        dir: &Path,
        pattern: &Regex,
        states: &StateIndex,
    ) -> Result<()> {
        let mut paths = Vec::new();
        for entry in WalkDir::new(dir)
            .follow_links(true)
            .min_depth(1)
            .max_depth(1) {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let matches = entry
                .file_name()
                .to_str()
                .map_or(false, |name| pattern.is_match(name));
            if !matches {
                // This is the readme
                debug!("Skipping {}", entry.path().display());
                continue;
            }
            paths.push(entry.into_path());
        }
        paths.sort();

        for path in paths {
            let file = File::open(&path).map_err(|e| HierarchyError::io(&path, e))?;
            let origin = path.display().to_string();
            let rows = self.load_gazetteer(BufReader::new(file), &origin, states)?;
            info!("Loaded {} gazetteer rows from {}", rows, origin);
        }
        Ok(())
    }

    /// Read tab-delimited rows of (country, postal code, city, state name,
    /// state abbreviation). Returns the number of rows applied.
    ///
    /// Short or unreadable rows are skipped with a warning.
    pub fn load_gazetteer<R: Read>(
        &mut self,
        reader: R,
        origin: &str,
        states: &StateIndex,
    ) -> Result<usize> {
        let mut rows = ReaderBuilder::new()
            .has_headers(false)
            .delimiter(b'\t')
            .flexible(true)
            .quoting(false)
            .from_reader(reader);

        let mut applied = 0;
        for result in rows.records() {
            let record = match result {
                Ok(record) => record,
                Err(e) => {
                    warn!("Skipping unreadable row in {}: {}", origin, e);
                    continue;
                }
            };

            if record.len() < 5 {
                let line = record.position().map_or(0, |p| p.line());
                warn!(
                    "Skipping row {} in {}: expected 5 columns, found {}",
                    line,
                    origin,
                    record.len()
                );
                continue;
            }

            let country = &record[0];
            let postal_code = &record[1];
            let city = &record[2];

            // The gazetteer treats Puerto Rico et al. as separate countries;
            // the polygon source treats them as states.
            let abbreviation = if country == self.nation_code {
                &record[4]
            } else {
                country
            };

            if self.precedence == Precedence::Overrides && self.overridden.contains(postal_code) {
                debug!("Keeping curated entry for {}", postal_code);
                continue;
            }

            // Armed forces routes and freely associated states are not in the
            // state index; attach them to the nation.
            let parent = self.parent_for(abbreviation, states);
            self.entries.insert(
                postal_code.to_string(),
                PostalEntry {
                    city: (!city.is_empty()).then(|| city.to_string()),
                    parent,
                },
            );
            applied += 1;
        }

        Ok(applied)
    }

    /// Lazily build a postal code record for every polygon feature.
    pub fn resolve<'a>(
        &'a self,
        features: FeatureIter<'a>,
        states: &'a StateIndex,
    ) -> PostalCodes<'a> {
        PostalCodes {
            resolver: self,
            states,
            features,
            built: 0,
            unresolved: 0,
        }
    }

    fn build_postal_code(
        &self,
        feature: Feature,
        states: &StateIndex,
    ) -> Result<(PlaceRecord, bool)> {
        let postal_code = feature.require(PlaceKind::PostalCode, fields::POSTAL_CODE)?;

        let (city, state) = match self.entries.get(&postal_code) {
            Some(PostalEntry {
                city,
                parent: ParentRef::State(state_id),
            }) => (city.as_deref(), states.by_id(state_id)),
            Some(PostalEntry {
                city,
                parent: ParentRef::Nation,
            }) => (city.as_deref(), None),
            None => {
                warn!("{} lacks gazetteer info", postal_code);
                let place = PlaceRecord::new(
                    PlaceKind::PostalCode,
                    postal_code.clone(),
                    postal_code,
                    feature.geometry,
                )
                .with_parent(self.nation_id.clone());
                return Ok((place, false));
            }
        };

        let parent_id = state.map_or_else(|| self.nation_id.clone(), |s| s.id.clone());
        let mut place = PlaceRecord::new(
            PlaceKind::PostalCode,
            postal_code.clone(),
            postal_code,
            feature.geometry,
        )
        .with_parent(parent_id);

        // Alias the postal code to its town only when no city record in the
        // same state already carries that name (helps "Forest Hills" style
        // neighbourhood searches).
        if let (Some(city), Some(state)) = (city, state) {
            if state.has_seen(city) {
                debug!("{} alias {} already a city in {}", place.id, city, state.name);
            } else if place.add_alias(city) {
                debug!("{} has alias {}", place.id, city);
            }
        }

        Ok((place, true))
    }
}

/// Postal code records in polygon order; see [`PostalCodeResolver::resolve`].
pub struct PostalCodes<'a> {
    resolver: &'a PostalCodeResolver,
    states: &'a StateIndex,
    features: FeatureIter<'a>,
    built: usize,
    unresolved: usize,
}

impl PostalCodes<'_> {
    /// Records built so far
    pub fn built(&self) -> usize {
        self.built
    }

    /// Records that fell back to the nation because no tier knew the code.
    /// Each one is also logged as a warning.
    pub fn unresolved(&self) -> usize {
        self.unresolved
    }
}

impl<'a> Iterator for PostalCodes<'a> {
    type Item = Result<PlaceRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        let feature = match self.features.next() {
            Some(Ok(feature)) => feature,
            Some(Err(e)) => return Some(Err(e)),
            None => {
                info!(
                    "Built {} postal codes ({} without gazetteer info)",
                    self.built, self.unresolved
                );
                return None;
            }
        };

        match self.resolver.build_postal_code(feature, self.states) {
            Ok((place, resolved)) => {
                self.built += 1;
                if !resolved {
                    self.unresolved += 1;
                }
                Some(Ok(place))
            }
            Err(e) => Some(Err(e)),
        }
    }
}
