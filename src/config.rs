//! Run configuration.
//!
//! Every field has a default matching the 2015 Census Bureau cartographic
//! boundary files and the GeoNames postal-code dump, so an empty TOML file
//! (or no file at all) is a valid configuration.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{HierarchyError, Result};

/// Known gaps in the GeoNames postal-code data: (postal code, city, state).
const CURATED_OVERRIDES: &[(&str, &str, &str)] = &[
    ("17270", "Williamson", "PA"),
    ("17767", "Salona", "PA"),
    ("19542", "Monocacy Station", "PA"),
    ("20307", "Washington", "DC"),
    ("42084", "Tolu", "KY"),
    ("42731", "Dubre", "KY"),
    ("45145", "Marathon", "OH"),
    ("45418", "Trotwood", "OH"),
    ("48921", "Lansing", "MI"),
    ("56177", "Trosky", "MN"),
    ("64192", "Kansas City", "MO"),
    ("66019", "Clearview City", "KS"),
    ("84144", "Salt Lake City", "UT"),
    ("95250", "Mountain Ranch", "CA"),
    ("95314", "Dardanelle", "CA"),
    ("98205", "Everett", "WA"),
    ("98929", "Goose Prairie", "WA"),
];

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    pub inputs: InputConfig,
    pub gazetteer: GazetteerConfig,
    /// Curated postal codes; defaults to the embedded table
    pub overrides: Vec<PostalOverride>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            inputs: InputConfig::default(),
            gazetteer: GazetteerConfig::default(),
            overrides: default_overrides(),
        }
    }
}

/// Collection names within the feature source
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct InputConfig {
    pub nation: String,
    pub states: String,
    pub counties: String,
    pub postal_codes: String,
    /// Suffix selecting the per-state place files
    pub city_suffix: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            nation: "cb_2015_us_nation_5m.json".to_string(),
            states: "cb_2015_us_state_500k.json".to_string(),
            counties: "cb_2015_us_county_500k.json".to_string(),
            postal_codes: "cb_2015_us_zcta510_500k.json".to_string(),
            city_suffix: "_place_500k.json".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GazetteerConfig {
    /// Regex a gazetteer file name must match; anything else (the readme) is skipped
    pub file_pattern: String,
    pub precedence: Precedence,
}

impl Default for GazetteerConfig {
    fn default() -> Self {
        Self {
            file_pattern: r"^[A-Z]{2}\.txt$".to_string(),
            precedence: Precedence::default(),
        }
    }
}

/// Which source wins when a curated override and a gazetteer row name the
/// same postal code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Precedence {
    /// Gazetteer rows overwrite curated overrides
    #[default]
    Gazetteer,
    /// Curated overrides are never overwritten
    Overrides,
}

/// A curated postal code entry
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct PostalOverride {
    pub postal_code: String,
    pub city: String,
    /// State abbreviation
    pub state: String,
}

impl PostalOverride {
    pub fn new(postal_code: &str, city: &str, state: &str) -> Self {
        Self {
            postal_code: postal_code.to_string(),
            city: city.to_string(),
            state: state.to_string(),
        }
    }
}

fn default_overrides() -> Vec<PostalOverride> {
    CURATED_OVERRIDES
        .iter()
        .map(|(code, city, state)| PostalOverride::new(code, city, state))
        .collect()
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| HierarchyError::io(path, e))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }
}
