//! Snapshot loading.
//!
//! A [`Snapshot`] is the complete, already-paginated input of one reporting
//! session: the issue list and every timelog. Collections are accepted as
//!
//! - a bare JSON array of records,
//! - a GraphQL connection object `{ "nodes": [...] }`,
//! - an array of such connection pages, as produced by a paginating fetcher.
//!
//! Decoding is lenient by default: a record that fails to decode is skipped
//! and reported in [`LoadStats`] instead of failing the whole collection.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::error::{Result, TimelensError};

use super::{Issue, Timelog};

/// Complete input for one metrics computation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// The standalone issue list.
    #[serde(default)]
    pub issues: Vec<Issue>,
    /// Every timelog in the reporting window.
    #[serde(default)]
    pub timelogs: Vec<Timelog>,
}

impl Snapshot {
    /// Create a snapshot from both collections.
    pub fn new(issues: Vec<Issue>, timelogs: Vec<Timelog>) -> Self {
        Self { issues, timelogs }
    }

    /// Whether there are no timelogs at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.timelogs.is_empty()
    }
}

/// Statistics about snapshot decoding.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadStats {
    /// Records found in the input.
    pub records_seen: usize,
    /// Records decoded successfully.
    pub records_decoded: usize,
    /// Records skipped because they failed to decode.
    pub records_skipped: usize,
    /// Details for every skipped record.
    pub errors: Vec<DecodeFailure>,
}

impl LoadStats {
    /// Calculate the decode success rate as a percentage.
    #[must_use]
    pub fn success_rate(&self) -> f64 {
        if self.records_seen == 0 {
            return 100.0;
        }
        (self.records_decoded as f64 / self.records_seen as f64) * 100.0
    }
}

/// A record that could not be decoded.
#[derive(Debug, Clone, Serialize)]
pub struct DecodeFailure {
    /// Collection the record belongs to.
    pub collection: &'static str,
    /// Position of the record within the flattened collection.
    pub index: usize,
    /// Error message.
    pub message: String,
}

/// Loader for issue and timelog collections.
#[derive(Debug)]
pub struct SnapshotLoader {
    /// Whether to skip undecodable records instead of failing.
    lenient: bool,
    /// Statistics about decoding.
    stats: LoadStats,
}

impl Default for SnapshotLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotLoader {
    /// Create a new lenient loader.
    #[must_use]
    pub fn new() -> Self {
        Self {
            lenient: true,
            stats: LoadStats::default(),
        }
    }

    /// Set lenient mode (skip undecodable records instead of failing).
    #[must_use]
    pub fn with_lenient(mut self, lenient: bool) -> Self {
        self.lenient = lenient;
        self
    }

    /// Statistics gathered so far.
    #[must_use]
    pub fn stats(&self) -> &LoadStats {
        &self.stats
    }

    /// Load both collections from files.
    #[instrument(skip_all, fields(issues = %issues_path.display(), timelogs = %timelogs_path.display()))]
    pub fn load_files(&mut self, issues_path: &Path, timelogs_path: &Path) -> Result<Snapshot> {
        let issues = self.load_file("issues", issues_path)?;
        let timelogs = self.load_file("timelogs", timelogs_path)?;
        debug!(issues = issues.len(), timelogs = timelogs.len(), "Snapshot loaded");
        Ok(Snapshot::new(issues, timelogs))
    }

    /// Load one collection from a file.
    pub fn load_file<T: DeserializeOwned>(&mut self, collection: &'static str, path: &Path) -> Result<Vec<T>> {
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => TimelensError::FileNotFound {
                path: path.to_path_buf(),
            },
            std::io::ErrorKind::PermissionDenied => TimelensError::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => TimelensError::io(format!("Failed to read {collection} file: {}", path.display()), e),
        })?;

        self.decode_str(collection, &content)
    }

    /// Decode one collection from a JSON string.
    pub fn decode_str<T: DeserializeOwned>(&mut self, collection: &'static str, content: &str) -> Result<Vec<T>> {
        let root: Value = serde_json::from_str(content).map_err(|e| {
            TimelensError::decode_with_source(collection, "input is not valid JSON", e)
        })?;

        let records = flatten_pages(collection, root)?;
        let mut decoded = Vec::with_capacity(records.len());

        for (index, record) in records.into_iter().enumerate() {
            self.stats.records_seen += 1;
            match serde_json::from_value::<T>(record) {
                Ok(value) => {
                    self.stats.records_decoded += 1;
                    decoded.push(value);
                }
                Err(e) if self.lenient => {
                    warn!(collection, index, error = %e, "Skipping undecodable record");
                    self.stats.records_skipped += 1;
                    self.stats.errors.push(DecodeFailure {
                        collection,
                        index,
                        message: e.to_string(),
                    });
                }
                Err(e) => {
                    return Err(TimelensError::decode_with_source(
                        collection,
                        format!("record {index} is invalid"),
                        e,
                    ));
                }
            }
        }

        Ok(decoded)
    }
}

/// Flatten the accepted collection shapes into a list of records.
fn flatten_pages(collection: &'static str, root: Value) -> Result<Vec<Value>> {
    match root {
        Value::Array(items) => {
            let mut records = Vec::with_capacity(items.len());
            for item in items {
                match page_nodes(item) {
                    Ok(nodes) => records.extend(nodes),
                    Err(record) => records.push(record),
                }
            }
            Ok(records)
        }
        Value::Object(_) => page_nodes(root).map_err(|_| {
            TimelensError::decode(collection, "expected an array or an object with a \"nodes\" array")
        }),
        _ => Err(TimelensError::decode(
            collection,
            "expected an array or an object with a \"nodes\" array",
        )),
    }
}

/// Extract `nodes` from a connection page, handing the value back otherwise.
fn page_nodes(value: Value) -> std::result::Result<Vec<Value>, Value> {
    match value {
        Value::Object(mut map) if matches!(map.get("nodes"), Some(Value::Array(_))) => {
            match map.remove("nodes") {
                Some(Value::Array(nodes)) => Ok(nodes),
                _ => Err(Value::Object(map)),
            }
        }
        other => Err(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMELOG: &str = r#"{"user":{"name":"Alice"},"issue":{"iid":"1","labels":{"nodes":[]}},"spentAt":"2024-01-01T10:00:00Z","timeSpent":60}"#;

    #[test]
    fn test_decode_bare_array() {
        let mut loader = SnapshotLoader::new();
        let logs: Vec<Timelog> = loader.decode_str("timelogs", &format!("[{TIMELOG},{TIMELOG}]")).unwrap();
        assert_eq!(logs.len(), 2);
        assert_eq!(loader.stats().records_decoded, 2);
    }

    #[test]
    fn test_decode_connection_and_pages() {
        let mut loader = SnapshotLoader::new();
        let single = format!(r#"{{"nodes":[{TIMELOG}],"pageInfo":{{"hasNextPage":false}}}}"#);
        let logs: Vec<Timelog> = loader.decode_str("timelogs", &single).unwrap();
        assert_eq!(logs.len(), 1);

        let pages = format!(r#"[{{"nodes":[{TIMELOG}]}},{{"nodes":[{TIMELOG},{TIMELOG}]}}]"#);
        let logs: Vec<Timelog> = loader.decode_str("timelogs", &pages).unwrap();
        assert_eq!(logs.len(), 3);
    }

    #[test]
    fn test_lenient_skips_bad_records() {
        let mut loader = SnapshotLoader::new();
        let content = format!(r#"[{TIMELOG}, {{"timeSpent": "lots"}}, 17]"#);
        let logs: Vec<Timelog> = loader.decode_str("timelogs", &content).unwrap();

        assert_eq!(logs.len(), 1);
        let stats = loader.stats();
        assert_eq!(stats.records_seen, 3);
        assert_eq!(stats.records_skipped, 2);
        assert_eq!(stats.errors[0].index, 1);
        assert!(stats.success_rate() < 50.0);
    }

    #[test]
    fn test_strict_fails_on_bad_record() {
        let mut loader = SnapshotLoader::new().with_lenient(false);
        let result: Result<Vec<Timelog>> = loader.decode_str("timelogs", r#"[{"timeSpent": "lots"}]"#);
        assert!(matches!(result, Err(TimelensError::DecodeError { collection: "timelogs", .. })));
    }

    #[test]
    fn test_rejects_scalar_root() {
        let mut loader = SnapshotLoader::new();
        let result: Result<Vec<Issue>> = loader.decode_str("issues", "42");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let mut loader = SnapshotLoader::new();
        let result: Result<Vec<Issue>> = loader.load_file("issues", Path::new("/nonexistent/issues.json"));
        assert!(matches!(result, Err(TimelensError::FileNotFound { .. })));
    }

    #[test]
    fn test_load_files() {
        let dir = tempfile::tempdir().unwrap();
        let issues = dir.path().join("issues.json");
        let timelogs = dir.path().join("timelogs.json");
        std::fs::write(&issues, r#"{"nodes":[{"iid":"1","title":"One"}]}"#).unwrap();
        std::fs::write(&timelogs, format!("[{TIMELOG}]")).unwrap();

        let snapshot = SnapshotLoader::new().load_files(&issues, &timelogs).unwrap();
        assert_eq!(snapshot.issues.len(), 1);
        assert_eq!(snapshot.timelogs.len(), 1);
        assert!(!snapshot.is_empty());
    }
}
