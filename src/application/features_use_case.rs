// ============================================================
// Layer 2 — FeaturesUseCase
// ============================================================
// Prepares title-generation features for an external trainer:
//
//   Step 1: Look for the cached features         (Layer 6 - infra)
//   Step 2: On a miss, load the tokenizer        (Layer 6 - infra)
//           read the raw JSON records            (Layer 4 - data)
//           and convert them to features         (Layer 4 - data)
//   Step 3: Wrap the features in a Burn dataset  (Layer 4 - data)
//   Step 4: Stream padded batches through a
//           DataLoader and report their shapes   (Layer 4 - data)
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

use anyhow::{ensure, Result};
use burn::{
    data::{dataloader::DataLoaderBuilder, dataset::Dataset},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use crate::data::{
    batcher::TitleBatcher,
    dataset::TitleDataset,
    features::FeatureBuilder,
    loader::JsonRecordLoader,
};
use crate::domain::traits::RecordSource;
use crate::infra::{feature_cache::FeatureCache, tokenizer_store::TokenizerStore};

/// Feature batching runs on the CPU.
pub type FeatureBackend = burn::backend::NdArray;

// ─── Features Configuration ───────────────────────────────────────────────────
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeaturesConfig {
    pub raw_path:       String,
    pub data_dir:       String,
    pub dataset_name:   String,
    pub tokenizer_path: String,
    pub max_len:        usize,
    pub title_max_len:  usize,
    pub batch_size:     usize,
    pub overwrite:      bool,
    pub shuffle_seed:   Option<u64>,
}

impl Default for FeaturesConfig {
    fn default() -> Self {
        Self {
            raw_path:       "data/train.json".to_string(),
            data_dir:       "data".to_string(),
            dataset_name:   "train".to_string(),
            tokenizer_path: "tokenizer/tokenizer.json".to_string(),
            max_len:        512,
            title_max_len:  32,
            batch_size:     16,
            overwrite:      false,
            shuffle_seed:   None,
        }
    }
}

/// What one run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSummary {
    pub records: usize,
    pub batches: usize,
    /// Widest padded batch seen
    pub widest:  usize,
}

// ─── FeaturesUseCase ──────────────────────────────────────────────────────────
pub struct FeaturesUseCase {
    config: FeaturesConfig,
}

impl FeaturesUseCase {
    pub fn new(config: FeaturesConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<FeatureSummary> {
        let cfg = &self.config;
        ensure!(cfg.batch_size > 0, "batch_size must be at least 1");

        // ── Steps 1–2: cached features, or build them ─────────────────────────
        let cache    = FeatureCache::new(&cfg.data_dir, &cfg.dataset_name, cfg.max_len);
        let features = cache.load_or_build(cfg.overwrite, || {
            let (tokenizer, ids) = TokenizerStore::new(&cfg.tokenizer_path).load_with_ids()?;
            let records          = JsonRecordLoader::new(&cfg.raw_path).load_all()?;
            FeatureBuilder::new(&tokenizer, ids, cfg.max_len, cfg.title_max_len)?
                .convert_all(&records)
        })?;

        // ── Step 3: Burn dataset ──────────────────────────────────────────────
        let dataset = TitleDataset::new(features);
        let records = dataset.len();
        tracing::info!("Dataset ready: {} records, longest {}", records, dataset.longest());

        // ── Step 4: DataLoader pass ───────────────────────────────────────────
        let mut builder = DataLoaderBuilder::<FeatureBackend, _, _>::new(TitleBatcher::new())
            .batch_size(cfg.batch_size)
            .num_workers(1);
        if let Some(seed) = cfg.shuffle_seed {
            builder = builder.shuffle(seed);
        }
        let loader = builder.build(dataset);

        let mut batches = 0;
        let mut widest  = 0;
        for batch in loader.iter().flatten() {
            let [rows, width] = batch.input_ids.dims();
            tracing::debug!("Batch {}: [{}, {}]", batches + 1, rows, width);
            batches += 1;
            widest = widest.max(width);
        }

        tracing::info!("Streamed {} batches (widest {})", batches, widest);
        Ok(FeatureSummary { records, batches, widest })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::tokenizer_store::testing;
    use std::{fs, path::PathBuf};

    fn scratch_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("nmt-titlegen-uc-{tag}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn config(dir: &PathBuf) -> FeaturesConfig {
        let tokenizer = testing::write_tokenizer(dir, &["今", "天", "好", "新", "闻"]);
        let raw = dir.join("raw.json");
        fs::write(
            &raw,
            r#"[{"content": "今天好", "title": "新闻"},
                {"content": "今天", "title": "新"},
                {"content": "好", "title": "闻"}]"#,
        )
        .unwrap();

        FeaturesConfig {
            raw_path:       raw.display().to_string(),
            data_dir:       dir.display().to_string(),
            dataset_name:   "unit".to_string(),
            tokenizer_path: tokenizer.display().to_string(),
            max_len:        16,
            title_max_len:  4,
            batch_size:     2,
            overwrite:      false,
            shuffle_seed:   None,
        }
    }

    #[test]
    fn test_builds_cache_and_batches() {
        let dir = scratch_dir("build");
        let cfg = config(&dir);

        let summary = FeaturesUseCase::new(cfg).execute().unwrap();
        assert_eq!(summary, FeatureSummary { records: 3, batches: 2, widest: 8 });
        assert!(dir.join("cached_unit_16").is_file());
    }

    #[test]
    fn test_second_run_does_not_touch_raw_file() {
        let dir = scratch_dir("reuse");
        let cfg = config(&dir);
        FeaturesUseCase::new(cfg.clone()).execute().unwrap();

        // raw file and tokenizer gone: only the cache can satisfy this run
        fs::remove_file(&cfg.raw_path).unwrap();
        fs::remove_file(&cfg.tokenizer_path).unwrap();
        let summary = FeaturesUseCase::new(cfg.clone()).execute().unwrap();
        assert_eq!(summary.records, 3);

        let forced = FeaturesConfig { overwrite: true, ..cfg };
        assert!(FeaturesUseCase::new(forced).execute().is_err());
    }
}
