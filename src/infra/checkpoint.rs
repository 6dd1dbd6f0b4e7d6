// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores decoder weights using Burn's CompactRecorder.
//
// What gets saved:
//   1. decoder.mpk          — all learned parameters
//   2. decoder_config.json  — DecoderConfig (architecture + special ids)
//
// The config is needed to rebuild a Decoder of the right shape
// before its weights can be loaded into it.
//
// Reference: Burn Book §5 (Records and Checkpointing)
//            Rust Book §9 (Error Handling)

use anyhow::{Context, Result};
use std::{fs, path::PathBuf};
use burn::{
    prelude::*,
    record::{CompactRecorder, Recorder},
};

use crate::ml::model::{Decoder, DecoderConfig};

const WEIGHTS_STEM:  &str = "decoder";
const CONFIG_FILE:   &str = "decoder_config.json";

/// Manages saving and loading of decoder checkpoints.
pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Point the manager at `dir`, creating it if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create checkpoint dir '{}'", dir.display()))?;
        Ok(Self { dir })
    }

    /// Write both the config and the weights.
    pub fn save_decoder<B: Backend>(&self, decoder: &Decoder<B>, cfg: &DecoderConfig) -> Result<()> {
        self.save_config(cfg)?;

        // recorder appends its own extension
        let path = self.dir.join(WEIGHTS_STEM);
        CompactRecorder::new()
            .record(decoder.clone().into_record(), path.clone())
            .with_context(|| format!("Failed to save decoder to '{}'", path.display()))?;

        tracing::info!("Saved decoder checkpoint to '{}'", self.dir.display());
        Ok(())
    }

    /// Rebuild a decoder from the saved config and load its weights.
    pub fn load_decoder<B: Backend>(&self, device: &B::Device) -> Result<Decoder<B>> {
        let cfg   = self.load_config()?;
        let model = cfg.init::<B>(device);

        let path   = self.dir.join(WEIGHTS_STEM);
        let record = CompactRecorder::new()
            .load(path.clone(), device)
            .with_context(|| {
                format!("Cannot load decoder weights '{}'. Run 'init-decoder' first?", path.display())
            })?;

        tracing::info!(
            "Loaded decoder ({} layers, d_model {}, vocab {})",
            cfg.n_layers, cfg.d_model, cfg.vocab_size
        );
        Ok(model.load_record(record))
    }

    pub fn save_config(&self, cfg: &DecoderConfig) -> Result<()> {
        let path = self.dir.join(CONFIG_FILE);
        let json = serde_json::to_string_pretty(cfg)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;
        tracing::debug!("Saved decoder config to '{}'", path.display());
        Ok(())
    }

    pub fn load_config(&self) -> Result<DecoderConfig> {
        let path = self.dir.join(CONFIG_FILE);
        let json = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read config from '{}'", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("Malformed decoder config in '{}'", path.display()))
    }
}
