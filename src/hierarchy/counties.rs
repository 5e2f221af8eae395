use super::{fields, StateIndex};
use crate::error::{HierarchyError, Result};
use crate::models::{PlaceKind, PlaceRecord};
use crate::source::{Feature, FeatureSource};

/// Lazily build county records in input order.
///
/// Every county must name a state present in `states`.
pub fn counties<'a, S: FeatureSource + ?Sized>(
    source: &'a S,
    name: &str,
    states: &'a StateIndex,
) -> Result<impl Iterator<Item = Result<PlaceRecord>> + 'a> {
    let features = source.features(name)?;
    Ok(features.map(move |feature| build_county(feature?, states)))
}

fn build_county(feature: Feature, states: &StateIndex) -> Result<PlaceRecord> {
    let id = feature.require(PlaceKind::County, fields::GEOID)?;
    let state_id = feature.require(PlaceKind::County, fields::STATE_FIPS)?;
    let state = states
        .by_id(&state_id)
        .ok_or_else(|| HierarchyError::MissingParent {
            kind: PlaceKind::County,
            id: id.clone(),
            state_id,
        })?;

    let name = feature.require(PlaceKind::County, fields::NAME)?;
    let full_name = format!("{} County", name);

    Ok(PlaceRecord::new(PlaceKind::County, id, name, feature.geometry)
        .with_full_name(full_name)
        .with_parent(state.id.clone()))
}
