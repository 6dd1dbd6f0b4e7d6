// ============================================================
// Layer 4 — JSON Record Loader
// ============================================================
// Reads the raw title-generation corpus: one JSON file holding an
// array of objects shaped
//
//   [ { "content": "...", "title": "..." }, ... ]
//
// The whole array is parsed in one go with serde_json; a missing
// file or malformed JSON is an error for the caller, there is no
// partial load.
//
// Reference: serde_json crate documentation
//            Rust Book §9 (Error Handling)

use anyhow::{Context, Result};
use std::{fs::File, io::BufReader, path::PathBuf};

use crate::domain::record::NewsRecord;
use crate::domain::traits::RecordSource;

/// Loads NewsRecords from a JSON array file.
/// Implements the RecordSource trait from Layer 3.
pub struct JsonRecordLoader {
    /// Path to the raw JSON file
    path: PathBuf,
}

impl JsonRecordLoader {
    /// Create a loader pointed at a JSON file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RecordSource for JsonRecordLoader {
    fn load_all(&self) -> Result<Vec<NewsRecord>> {
        let file = File::open(&self.path)
            .with_context(|| format!("Cannot open raw data file '{}'", self.path.display()))?;

        let records: Vec<NewsRecord> = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Malformed JSON records in '{}'", self.path.display()))?;

        tracing::info!(
            "Loaded {} raw records from '{}'",
            records.len(),
            self.path.display()
        );
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn scratch_file(name: &str, body: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("nmt-titlegen-loader-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_loads_records_in_order() {
        let path = scratch_file(
            "ok.json",
            r#"[{"content": "first body", "title": "one"},
                {"content": "second body", "title": "two"}]"#,
        );
        let records = JsonRecordLoader::new(&path).load_all().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].title, "one");
        assert_eq!(records[1].content, "second body");
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let path = std::env::temp_dir().join("nmt-titlegen-definitely-missing.json");
        assert!(JsonRecordLoader::new(path).load_all().is_err());
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        let path = scratch_file("bad.json", r#"{"content": "not an array"}"#);
        assert!(JsonRecordLoader::new(path).load_all().is_err());
    }
}
