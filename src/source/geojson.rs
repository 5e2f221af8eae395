//! GeoJSON FeatureCollection files in one directory.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use serde::Deserialize;
use tracing::debug;
use walkdir::WalkDir;

use super::{Feature, FeatureIter, FeatureSource};
use crate::error::{HierarchyError, Result};

#[derive(Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

/// Reads `<dir>/<name>` as a FeatureCollection; `.gz` files are gunzipped.
///
/// Each collection is parsed in full before its first feature is yielded.
#[derive(Debug, Clone)]
pub struct GeoJsonDir {
    dir: PathBuf,
}

impl GeoJsonDir {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn open(&self, path: &Path) -> Result<Box<dyn Read>> {
        let file = File::open(path).map_err(|e| HierarchyError::io(path, e))?;
        let reader = BufReader::new(file);
        if path.extension().map_or(false, |e| e == "gz") {
            Ok(Box::new(GzDecoder::new(reader)))
        } else {
            Ok(Box::new(reader))
        }
    }
}

impl FeatureSource for GeoJsonDir {
    fn features(&self, name: &str) -> Result<FeatureIter<'_>> {
        let path = self.dir.join(name);
        debug!("Reading features from {}", path.display());

        let reader = self.open(&path)?;
        let collection: FeatureCollection =
            serde_json::from_reader(reader).map_err(|source| HierarchyError::Json {
                name: name.to_string(),
                source,
            })?;

        Ok(Box::new(collection.features.into_iter().map(Ok)))
    }

    fn names_with_suffix(&self, suffix: &str) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in WalkDir::new(&self.dir)
            .follow_links(true)
            .min_depth(1)
            .max_depth(1) {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if name.ends_with(suffix) {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    const COLLECTION: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {"GEOID": "01"},
                "geometry": {"type": "Point", "coordinates": [1.0, 2.0]}
            },
            {"type": "Feature", "properties": {"GEOID": "02"}, "geometry": null}
        ]
    }"#;

    #[test]
    fn test_reads_plain_and_gzipped_collections() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("plain.json"), COLLECTION).unwrap();

        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(COLLECTION.as_bytes()).unwrap();
        std::fs::write(dir.path().join("packed.json.gz"), encoder.finish().unwrap()).unwrap();

        let source = GeoJsonDir::new(dir.path());
        for name in ["plain.json", "packed.json.gz"] {
            let features: Vec<Feature> = source
                .features(name)
                .unwrap()
                .collect::<Result<_>>()
                .unwrap();
            assert_eq!(features.len(), 2);
            assert_eq!(features[0].property("GEOID"), Some("01".to_string()));
            assert_eq!(features[0].geometry["type"], "Point");
            assert!(features[1].geometry.is_null());
        }
    }

    #[test]
    fn test_names_with_suffix_sorted_and_shallow() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["cb_2015_06_place_500k.json", "cb_2015_01_place_500k.json", "readme.txt"] {
            std::fs::write(dir.path().join(name), "{}").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("nested/cb_2015_02_place_500k.json"), "{}").unwrap();

        let source = GeoJsonDir::new(dir.path());
        let names = source.names_with_suffix("_place_500k.json").unwrap();
        assert_eq!(
            names,
            vec!["cb_2015_01_place_500k.json", "cb_2015_06_place_500k.json"]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_place_file_listed() {
        let data = tempfile::tempdir().unwrap();
        let target = data.path().join("places.json");
        std::fs::write(&target, COLLECTION).unwrap();

        let dir = tempfile::tempdir().unwrap();
        std::os::unix::fs::symlink(&target, dir.path().join("cb_2015_01_place_500k.json"))
            .unwrap();

        let source = GeoJsonDir::new(dir.path());
        let names = source.names_with_suffix("_place_500k.json").unwrap();
        assert_eq!(names, vec!["cb_2015_01_place_500k.json"]);
        assert_eq!(source.features(&names[0]).unwrap().count(), 2);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = GeoJsonDir::new(dir.path());
        assert!(matches!(
            source.features("absent.json"),
            Err(HierarchyError::Io { .. })
        ));
    }
}
