//! Two-line output records: metadata, then geometry.

use std::collections::BTreeMap;
use std::io::Write;

use indicatif::ProgressBar;
use serde::Serialize;
use tracing::debug;

use crate::error::{HierarchyError, Result};
use crate::models::{PlaceKind, PlaceRecord};

const ALIAS_LANGUAGE: &str = "eng";

#[derive(Debug, Serialize)]
struct AliasDoc<'a> {
    name: &'a str,
    language: &'static str,
}

/// Metadata line for one place
#[derive(Debug, Serialize)]
struct PlaceDoc<'a> {
    #[serde(rename = "type")]
    kind: PlaceKind,
    id: &'a str,
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    abbreviated_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    full_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    aliases: Vec<AliasDoc<'a>>,
    parent_id: Option<&'a str>,
}

impl<'a> From<&'a PlaceRecord> for PlaceDoc<'a> {
    fn from(place: &'a PlaceRecord) -> Self {
        Self {
            kind: place.kind,
            id: &place.id,
            name: &place.name,
            abbreviated_name: place.abbreviated_name.as_deref(),
            full_name: place.full_name.as_deref(),
            aliases: place
                .aliases()
                .map(|name| AliasDoc {
                    name,
                    language: ALIAS_LANGUAGE,
                })
                .collect(),
            parent_id: place.parent_id.as_deref(),
        }
    }
}

/// Records written per kind
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmitStats {
    counts: BTreeMap<PlaceKind, usize>,
}

impl EmitStats {
    pub fn count(&self, kind: PlaceKind) -> usize {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }
}

/// Writes each place as a metadata line followed by a geometry line.
///
/// Nothing is buffered beyond the underlying writer.
pub struct PlaceWriter<W: Write> {
    inner: W,
    stats: EmitStats,
    progress: Option<ProgressBar>,
}

impl<W: Write> PlaceWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            stats: EmitStats::default(),
            progress: None,
        }
    }

    /// Tick `progress` once per record written.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn write(&mut self, place: &PlaceRecord) -> Result<()> {
        serde_json::to_writer(&mut self.inner, &PlaceDoc::from(place))
            .map_err(|e| HierarchyError::Write(e.into()))?;
        self.inner.write_all(b"\n").map_err(HierarchyError::Write)?;
        serde_json::to_writer(&mut self.inner, &place.geography)
            .map_err(|e| HierarchyError::Write(e.into()))?;
        self.inner.write_all(b"\n").map_err(HierarchyError::Write)?;

        *self.stats.counts.entry(place.kind).or_insert(0) += 1;
        if let Some(pb) = &self.progress {
            pb.inc(1);
            pb.set_message(place.kind.as_str());
        }
        Ok(())
    }

    pub fn stats(&self) -> &EmitStats {
        &self.stats
    }

    /// Flush and return the per-kind counts.
    pub fn finish(mut self) -> Result<EmitStats> {
        self.inner.flush().map_err(HierarchyError::Write)?;
        if let Some(pb) = self.progress.take() {
            pb.finish_with_message("done");
        }
        debug!("Wrote {} records", self.stats.total());
        Ok(self.stats)
    }
}
