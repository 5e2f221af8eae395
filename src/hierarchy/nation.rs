use tracing::info;

use super::fields;
use crate::error::{HierarchyError, Result};
use crate::models::{PlaceKind, PlaceRecord};
use crate::source::FeatureSource;

/// Build the single nation record from the collection `name`.
///
/// The collection must hold exactly one feature. The identifier doubles as
/// the abbreviated name.
pub fn build_nation<S: FeatureSource + ?Sized>(source: &S, name: &str) -> Result<PlaceRecord> {
    let mut features = source.features(name)?;

    let feature = match features.next() {
        Some(feature) => feature?,
        None => {
            return Err(HierarchyError::Cardinality {
                file: name.to_string(),
                found: 0,
            })
        }
    };

    let extra = features.count();
    if extra > 0 {
        return Err(HierarchyError::Cardinality {
            file: name.to_string(),
            found: extra + 1,
        });
    }

    let id = feature.require(PlaceKind::Nation, fields::GEOID)?;
    let nation_name = feature.require(PlaceKind::Nation, fields::NAME)?;
    info!("Nation: {} ({})", nation_name, id);

    Ok(
        PlaceRecord::new(PlaceKind::Nation, id.clone(), nation_name, feature.geometry)
            .with_abbreviated_name(id),
    )
}
