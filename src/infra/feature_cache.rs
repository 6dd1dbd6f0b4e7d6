// ============================================================
// Layer 6 — Feature Cache
// ============================================================
// Persists built FeatureRecords so the raw corpus is tokenised
// only once per (dataset name, max length):
//
//   <data_dir>/cached_<dataset_name>_<max_len>
//
// The cache is trusted on existence alone. Changing anything that
// is not part of the file name (tokenizer, title budget) requires
// `overwrite = true`.
//
// Encoding is bincode's standard config over serde.

use anyhow::{Context, Result};
use std::{fs, path::{Path, PathBuf}};

use crate::data::dataset::FeatureRecord;

pub struct FeatureCache {
    path: PathBuf,
}

impl FeatureCache {
    pub fn new(data_dir: impl AsRef<Path>, dataset_name: &str, max_len: usize) -> Self {
        let path = data_dir.as_ref().join(format!("cached_{dataset_name}_{max_len}"));
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Load the cache if present, otherwise run `build` and store its result.
    /// `overwrite` forces a rebuild even when the file exists.
    pub fn load_or_build<F>(&self, overwrite: bool, build: F) -> Result<Vec<FeatureRecord>>
    where
        F: FnOnce() -> Result<Vec<FeatureRecord>>,
    {
        if self.exists() && !overwrite {
            tracing::info!("Loading cached features from '{}'", self.path.display());
            return self.load();
        }

        tracing::info!("Building features for '{}'", self.path.display());
        let features = build()?;
        self.save(&features)?;
        Ok(features)
    }

    pub fn load(&self) -> Result<Vec<FeatureRecord>> {
        let bytes = fs::read(&self.path)
            .with_context(|| format!("Cannot read feature cache '{}'", self.path.display()))?;
        let (features, _): (Vec<FeatureRecord>, usize) =
            bincode::serde::decode_from_slice(&bytes, bincode::config::standard())
                .with_context(|| format!("Corrupt feature cache '{}'", self.path.display()))?;
        tracing::debug!("Decoded {} cached features", features.len());
        Ok(features)
    }

    pub fn save(&self, features: &[FeatureRecord]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Cannot create data dir '{}'", parent.display()))?;
        }
        let bytes = bincode::serde::encode_to_vec(features, bincode::config::standard())
            .context("Cannot encode features")?;
        fs::write(&self.path, &bytes)
            .with_context(|| format!("Cannot write feature cache '{}'", self.path.display()))?;
        tracing::info!(
            "Cached {} features ({} bytes) to '{}'",
            features.len(),
            bytes.len(),
            self.path.display()
        );
        Ok(())
    }
}
