//! Place record shared by every level of the hierarchy.

use std::collections::BTreeSet;

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::alias::ascii_alias;

/// Level of a place in the hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceKind {
    Nation,
    State,
    County,
    /// Census-designated place (city, town, CDP)
    City,
    PostalCode,
}

impl PlaceKind {
    /// All kinds in emission order (nation first)
    pub fn all() -> &'static [PlaceKind] {
        &[
            PlaceKind::Nation,
            PlaceKind::State,
            PlaceKind::County,
            PlaceKind::City,
            PlaceKind::PostalCode,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PlaceKind::Nation => "nation",
            PlaceKind::State => "state",
            PlaceKind::County => "county",
            PlaceKind::City => "city",
            PlaceKind::PostalCode => "postal_code",
        }
    }

    /// Whether records of this kind track the city names seen beneath them.
    pub fn tracks_seen_names(&self) -> bool {
        matches!(self, PlaceKind::Nation | PlaceKind::State)
    }
}

impl std::fmt::Display for PlaceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One geographic unit at any scale.
///
/// The parent is held by id only; the state index owns the states and the
/// nation is owned by the pipeline for the run's lifetime.
#[derive(Debug, Clone)]
pub struct PlaceRecord {
    pub kind: PlaceKind,
    pub id: String,
    pub name: String,
    pub abbreviated_name: Option<String>,
    pub full_name: Option<String>,
    /// Geometry payload, passed through untouched
    pub geography: Value,
    pub parent_id: Option<String>,
    aliases: BTreeSet<String>,
    /// Only present on nations and states
    seen_names: Option<HashSet<String>>,
}

impl PlaceRecord {
    /// Create a record with no parent; the ASCII form of `name` is added as
    /// an alias when it differs.
    pub fn new(
        kind: PlaceKind,
        id: impl Into<String>,
        name: impl Into<String>,
        geography: Value,
    ) -> Self {
        let mut place = Self {
            kind,
            id: id.into(),
            name: name.into(),
            abbreviated_name: None,
            full_name: None,
            geography,
            parent_id: None,
            aliases: BTreeSet::new(),
            seen_names: kind.tracks_seen_names().then(HashSet::new),
        };
        if let Some(alias) = ascii_alias(Some(&place.name)) {
            place.add_alias(alias);
        }
        place
    }

    pub fn with_abbreviated_name(mut self, abbreviated_name: impl Into<String>) -> Self {
        let abbreviated_name = abbreviated_name.into();
        self.aliases.remove(&abbreviated_name);
        let alias = ascii_alias(Some(&abbreviated_name));
        self.abbreviated_name = Some(abbreviated_name);
        if let Some(alias) = alias {
            self.add_alias(alias);
        }
        self
    }

    pub fn with_full_name(mut self, full_name: impl Into<String>) -> Self {
        let full_name = full_name.into();
        let alias = ascii_alias(Some(&full_name));
        self.full_name = Some(full_name);
        if let Some(alias) = alias {
            self.add_alias(alias);
        }
        self
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    /// Add an alternate lookup string.
    ///
    /// Returns false when the alias repeats the canonical or abbreviated
    /// name, or is already present.
    pub fn add_alias(&mut self, alias: impl Into<String>) -> bool {
        let alias = alias.into();
        if alias.is_empty()
            || alias == self.name
            || self.abbreviated_name.as_deref() == Some(alias.as_str())
        {
            return false;
        }
        self.aliases.insert(alias)
    }

    /// Aliases in sorted order
    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.aliases.iter().map(String::as_str)
    }

    pub fn has_alias(&self, alias: &str) -> bool {
        self.aliases.contains(alias)
    }

    /// Record that a city with this name exists under this place, so postal
    /// codes are not aliased to a name that already has its own record.
    pub fn saw_place_name(&mut self, name: &str) {
        if let Some(seen) = self.seen_names.as_mut() {
            seen.insert(name.to_string());
        }
    }

    pub fn has_seen(&self, name: &str) -> bool {
        self.seen_names
            .as_ref()
            .map_or(false, |seen| seen.contains(name))
    }
}
