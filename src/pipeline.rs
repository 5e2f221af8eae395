//! Single streaming pass: nation, states, counties, cities, postal codes.

use std::io::Write;
use std::path::Path;

use tracing::info;

use crate::config::Config;
use crate::emit::PlaceWriter;
use crate::error::Result;
use crate::hierarchy::{build_nation, build_states, counties, Cities};
use crate::postal::PostalCodeResolver;
use crate::source::FeatureSource;

/// Build the hierarchy from `source` and the gazetteer files in
/// `gazetteer_dir`, writing each record as soon as it is built.
///
/// Cities are fully drained before the postal code mapping is consulted,
/// so every state's seen names are complete when aliases are decided.
pub fn consolidate<S, W>(
    source: &S,
    gazetteer_dir: &Path,
    config: &Config,
    writer: &mut PlaceWriter<W>,
) -> Result<()>
where
    S: FeatureSource + ?Sized,
    W: Write,
{
    let inputs = &config.inputs;

    let nation = build_nation(source, &inputs.nation)?;
    writer.write(&nation)?;

    let mut states = build_states(source, &inputs.states, &nation)?;
    for state in states.iter() {
        writer.write(state)?;
    }

    info!("Processing counties from {}", inputs.counties);
    for county in counties(source, &inputs.counties, &states)? {
        writer.write(&county?)?;
    }

    for city in Cities::new(source, &inputs.city_suffix, &mut states)? {
        writer.write(&city?)?;
    }

    let resolver = PostalCodeResolver::build(config, gazetteer_dir, &nation, &states)?;
    info!("Processing postal codes from {}", inputs.postal_codes);
    let features = source.features(&inputs.postal_codes)?;
    for postal_code in resolver.resolve(features, &states) {
        writer.write(&postal_code?)?;
    }

    Ok(())
}
