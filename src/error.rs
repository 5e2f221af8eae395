//! Error type shared by the builders, resolver and emitter.

use std::path::PathBuf;

use crate::models::PlaceKind;

/// Errors that abort a consolidation run.
///
/// Postal-code lookups never produce one of these; they degrade to the
/// nation as parent and log a warning instead.
#[derive(Debug, thiserror::Error)]
pub enum HierarchyError {
    #[error("expected exactly one feature in {file}, found {found}")]
    Cardinality { file: String, found: usize },

    #[error("{kind} {id} references state {state_id}, which is not in the state index")]
    MissingParent {
        kind: PlaceKind,
        id: String,
        state_id: String,
    },

    #[error("city {id} in {file} has no state id and no earlier feature set one")]
    UnscopedCity { id: String, file: String },

    #[error("{kind} feature is missing property {property}")]
    MissingProperty {
        kind: PlaceKind,
        property: &'static str,
    },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid feature collection {name}: {source}")]
    Json {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write output: {0}")]
    Write(#[source] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid file pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("invalid config: {0}")]
    Config(#[from] toml::de::Error),
}

impl HierarchyError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        HierarchyError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, HierarchyError>;
