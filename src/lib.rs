//! Place hierarchy consolidation.
//!
//! Folds nation, state, county, place and postal-code polygons plus a
//! GeoNames-style gazetteer into one stream of `PlaceRecord`s with parent
//! links and name aliases, ready for a downstream geocoding index.

pub mod alias;
pub mod config;
pub mod emit;
pub mod error;
pub mod hierarchy;
pub mod models;
pub mod pipeline;
pub mod postal;
pub mod source;

pub use error::{HierarchyError, Result};
pub use models::{PlaceKind, PlaceRecord};
pub use pipeline::consolidate;
