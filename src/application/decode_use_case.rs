// ============================================================
// Layer 2 — Decoder Use Cases
// ============================================================
// Two workflows around the Transformer decoder:
//
//   InitDecoderUseCase — build a decoder from hyperparameters and
//                        write its checkpoint (config + weights)
//
//   DecodeUseCase      — load a checkpoint, read one encoder output
//                        from JSON, beam-search it, render n-best
//
// Encoder output file format (one row per encoder frame):
//
//   [[0.12, -0.40, ...], [0.03, 0.91, ...], ...]

use anyhow::{Context, Result};
use burn::prelude::*;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

use crate::domain::hypothesis::Hypothesis;
use crate::infra::{checkpoint::CheckpointManager, symbols::SymbolTable};
use crate::ml::{
    beam::BeamConfig,
    inferencer::{InferBackend, Inferencer},
    model::DecoderConfig,
};

// ─── Init-decoder Configuration ───────────────────────────────────────────────
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitDecoderConfig {
    pub checkpoint_dir: String,
    pub vocab_size:     usize,
    pub sos_id:         u32,
    pub eos_id:         u32,
    pub d_model:        usize,
    pub n_layers:       usize,
    pub n_heads:        usize,
    pub d_inner:        usize,
    pub dropout:        f64,
    pub share_weights:  bool,
    pub pe_maxlen:      usize,
}

impl Default for InitDecoderConfig {
    fn default() -> Self {
        Self {
            checkpoint_dir: "checkpoints".to_string(),
            vocab_size:     4233,
            sos_id:         1,
            eos_id:         2,
            d_model:        512,
            n_layers:       6,
            n_heads:        8,
            d_inner:        2048,
            dropout:        0.1,
            share_weights:  true,
            pe_maxlen:      5000,
        }
    }
}

impl From<&InitDecoderConfig> for DecoderConfig {
    fn from(c: &InitDecoderConfig) -> Self {
        DecoderConfig::new(c.vocab_size, c.sos_id, c.eos_id)
            .with_d_model(c.d_model)
            .with_n_layers(c.n_layers)
            .with_n_heads(c.n_heads)
            .with_d_inner(c.d_inner)
            .with_dropout(c.dropout)
            .with_share_weights(c.share_weights)
            .with_pe_maxlen(c.pe_maxlen)
    }
}

pub struct InitDecoderUseCase {
    config: InitDecoderConfig,
}

impl InitDecoderUseCase {
    pub fn new(config: InitDecoderConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<()> {
        self.execute_on::<InferBackend>(&Default::default())
    }

    pub fn execute_on<B: Backend>(&self, device: &B::Device) -> Result<()> {
        anyhow::ensure!(
            self.config.n_heads > 0 && self.config.d_model % self.config.n_heads == 0,
            "d_model ({}) must be divisible by n_heads ({})",
            self.config.d_model,
            self.config.n_heads
        );
        let model_cfg = DecoderConfig::from(&self.config);
        let decoder   = model_cfg.init::<B>(device);
        CheckpointManager::new(&self.config.checkpoint_dir)?.save_decoder(&decoder, &model_cfg)
    }
}

// ─── Decode Configuration ─────────────────────────────────────────────────────
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecodeConfig {
    pub checkpoint_dir:   String,
    pub encoder_out_path: String,
    /// Symbol table for rendering; ids are printed when absent
    pub symbols_path:     Option<String>,
    pub beam:             BeamConfig,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            checkpoint_dir:   "checkpoints".to_string(),
            encoder_out_path: "encoder_out.json".to_string(),
            symbols_path:     None,
            beam:             BeamConfig::default(),
        }
    }
}

/// One rendered n-best entry.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedHypothesis {
    pub hypothesis: Hypothesis,
    pub text:       Option<String>,
}

pub struct DecodeUseCase {
    config: DecodeConfig,
}

impl DecodeUseCase {
    pub fn new(config: DecodeConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<Vec<DecodedHypothesis>> {
        self.execute_on::<InferBackend>(Default::default())
    }

    pub fn execute_on<B: Backend>(&self, device: B::Device) -> Result<Vec<DecodedHypothesis>> {
        let cfg = &self.config;

        let ckpt       = CheckpointManager::new(&cfg.checkpoint_dir)?;
        let inferencer = Inferencer::<B>::from_checkpoint(&ckpt, device)?;
        let frames     = read_encoder_output(&cfg.encoder_out_path)?;
        let symbols    = cfg.symbols_path.as_ref().map(|p| SymbolTable::load(p)).transpose()?;

        tracing::info!(
            "Decoding {} encoder frames (beam {}, nbest {}, maxlen {})",
            frames.len(), cfg.beam.beam, cfg.beam.nbest, cfg.beam.maxlen
        );
        let nbest = inferencer.recognize(&frames, cfg.beam)?;

        let tokens = inferencer.decoder().special_tokens();
        let skip   = [tokens.sos_id, tokens.eos_id];
        nbest
            .into_iter()
            .map(|hypothesis| {
                let text = symbols
                    .as_ref()
                    .map(|table| table.render(&hypothesis.yseq, &skip))
                    .transpose()?;
                Ok(DecodedHypothesis { hypothesis, text })
            })
            .collect()
    }
}

fn read_encoder_output(path: impl AsRef<Path>) -> Result<Vec<Vec<f32>>> {
    let path = path.as_ref();
    let json = fs::read_to_string(path)
        .with_context(|| format!("Cannot read encoder output '{}'", path.display()))?;
    serde_json::from_str(&json)
        .with_context(|| format!("Encoder output '{}' is not a [[f32]] array", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use std::path::PathBuf;

    fn scratch_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("nmt-titlegen-dec-{tag}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn small_decoder(dir: &Path) -> InitDecoderConfig {
        InitDecoderConfig {
            checkpoint_dir: dir.join("ckpt").display().to_string(),
            vocab_size:     5,
            d_model:        8,
            n_layers:       1,
            n_heads:        2,
            d_inner:        16,
            dropout:        0.0,
            ..InitDecoderConfig::default()
        }
    }

    #[test]
    fn test_init_then_decode_renders_symbols() {
        let dir  = scratch_dir("e2e");
        let init = small_decoder(&dir);
        InitDecoderUseCase::new(init.clone()).execute_on::<NdArray>(&Default::default()).unwrap();

        let enc_path = dir.join("enc.json");
        fs::write(&enc_path, serde_json::to_string(&vec![vec![0.5_f32; 8]; 3]).unwrap()).unwrap();
        let sym_path = dir.join("symbols.txt");
        fs::write(&sym_path, "<blank>\n<sos>\n<eos>\nx\ny\n").unwrap();

        let cfg = DecodeConfig {
            checkpoint_dir:   init.checkpoint_dir,
            encoder_out_path: enc_path.display().to_string(),
            symbols_path:     Some(sym_path.display().to_string()),
            beam:             BeamConfig { beam: 2, nbest: 2, maxlen: 3 },
        };
        let out = DecodeUseCase::new(cfg).execute_on::<NdArray>(Default::default()).unwrap();

        assert!(!out.is_empty() && out.len() <= 2);
        for entry in &out {
            let text = entry.text.as_deref().unwrap();
            assert!(!text.contains("<sos>") && !text.contains("<eos>"));
        }
    }

    #[test]
    fn test_rejects_heads_not_dividing_d_model() {
        let dir  = scratch_dir("heads");
        let init = InitDecoderConfig { n_heads: 3, ..small_decoder(&dir) };
        assert!(InitDecoderUseCase::new(init).execute_on::<NdArray>(&Default::default()).is_err());
    }

    #[test]
    fn test_malformed_encoder_output_is_an_error() {
        let dir  = scratch_dir("badenc");
        let path = dir.join("enc.json");
        fs::write(&path, r#"{"frames": 3}"#).unwrap();
        assert!(read_encoder_output(&path).is_err());
    }
}
