use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::models::MeasurementRecord;
use crate::{AnalyticsError, Result};

/// Immutable set of measurement records, loaded once at startup and shared
/// by reference with every request handler.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<MeasurementRecord>,
}

impl Dataset {
    pub fn from_records(records: Vec<MeasurementRecord>) -> Self {
        Self { records }
    }

    /// Load a JSON array of records from `path`.
    ///
    /// Relative paths are resolved against the crate directory rather than
    /// the working directory. That directory is fixed at build time, so a
    /// relocated binary needs an absolute `dataset.path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = resolve_path(path.as_ref());
        let shown = path.display().to_string();

        let contents = fs::read_to_string(&path).map_err(|e| AnalyticsError::DatasetIo {
            path: shown.clone(),
            message: e.to_string(),
        })?;

        let records: Vec<MeasurementRecord> =
            serde_json::from_str(&contents).map_err(|e| AnalyticsError::DatasetParse {
                path: shown.clone(),
                message: e.to_string(),
            })?;

        info!("Loaded {} records from {}", records.len(), shown);
        Ok(Self { records })
    }

    pub fn records(&self) -> &[MeasurementRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct region names present in the dataset, sorted.
    pub fn regions(&self) -> Vec<String> {
        self.records
            .iter()
            .filter_map(|r| r.region.as_deref())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }
}

pub fn resolve_path(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        Path::new(env!("CARGO_MANIFEST_DIR")).join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::with_suffix(".json").unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_records() {
        let file = write_temp(
            r#"[
                {"region": "apac", "latency_ms": 120.5, "uptime_pct": 99.1},
                {"region": "emea", "latency_ms": 98.0},
                {"latency_ms": 10.0}
            ]"#,
        );

        let dataset = Dataset::load(file.path()).unwrap();
        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.records()[0].region.as_deref(), Some("apac"));
        assert_eq!(dataset.records()[1].uptime_pct, None);
        assert_eq!(dataset.records()[2].region, None);
    }

    #[test]
    fn test_load_empty_array() {
        let file = write_temp("[]");
        let dataset = Dataset::load(file.path()).unwrap();
        assert!(dataset.is_empty());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = Dataset::load("/nonexistent/q-vercel-latency.json").unwrap_err();
        assert!(matches!(err, AnalyticsError::DatasetIo { .. }));
    }

    #[test]
    fn test_malformed_content_is_parse_error() {
        for contents in [
            "not json",
            r#"{"region": "apac"}"#,
            r#"[{"region": "apac", "latency_ms": "fast"}]"#,
        ] {
            let file = write_temp(contents);
            let err = Dataset::load(file.path()).unwrap_err();
            assert!(matches!(err, AnalyticsError::DatasetParse { .. }), "{contents}");
        }
    }

    #[test]
    fn test_regions_are_distinct_and_sorted() {
        let dataset = Dataset::from_records(vec![
            MeasurementRecord {
                region: Some("emea".to_string()),
                ..Default::default()
            },
            MeasurementRecord::default(),
            MeasurementRecord {
                region: Some("apac".to_string()),
                ..Default::default()
            },
            MeasurementRecord {
                region: Some("emea".to_string()),
                ..Default::default()
            },
        ]);

        assert_eq!(dataset.regions(), vec!["apac", "emea"]);
    }

    #[test]
    fn test_resolve_relative_path() {
        let resolved = resolve_path(Path::new("q-vercel-latency.json"));
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("q-vercel-latency.json"));

        let absolute = Path::new("/srv/data.json");
        assert_eq!(resolve_path(absolute), absolute);
    }

    #[test]
    fn test_bundled_dataset_loads() {
        let dataset = Dataset::load("q-vercel-latency.json").unwrap();
        assert!(!dataset.is_empty());
        assert_eq!(dataset.regions(), vec!["amer", "apac", "emea"]);
    }
}
