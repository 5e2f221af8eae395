//! Core data models for the place hierarchy.

pub mod place;

pub use place::{PlaceKind, PlaceRecord};
