//! Nation, state, county and city builders.
//!
//! Each builder makes one pass over its feature sequence. States are kept
//! in a [`StateIndex`] that owns them for the run; everything below a state
//! refers to it by id.

mod cities;
mod counties;
mod nation;
mod states;

pub use cities::Cities;
pub use counties::counties;
pub use nation::build_nation;
pub use states::{build_states, StateIndex};

/// Property keys used by the Census Bureau cartographic boundary files.
pub mod fields {
    pub const GEOID: &str = "GEOID";
    pub const NAME: &str = "NAME";
    pub const STATE_FIPS: &str = "STATEFP";
    pub const STATE_ABBREVIATION: &str = "STUSPS";
    /// Present only on postal code (ZCTA) features
    pub const POSTAL_MARKER: &str = "ZCTA5CE10";
    /// Postal code in the ZCTA polygon file
    pub const POSTAL_CODE: &str = "GEOID10";
}

#[cfg(test)]
pub(crate) mod test_support {
    use serde_json::{json, Map, Value};

    use crate::source::Feature;

    pub fn feature(props: &[(&str, &str)]) -> Feature {
        let properties: Map<String, Value> = props
            .iter()
            .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
            .collect();
        let geometry = json!({
            "type": "Polygon",
            "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]
        });
        Feature::new(properties, geometry)
    }
}
