// ============================================================
// Layer 5 — Inferencer
// ============================================================
// Runs beam search for one utterance against a trained decoder.
//
//   encoder output [T, H] ──► DecoderScorer ──► BeamSearch ──► n-best
//
// DecoderScorer is the StepScorer adapter: each call re-runs the
// full decoder stack over the hypothesis prefix.

use anyhow::{ensure, Result};
use burn::prelude::*;

use crate::domain::hypothesis::Hypothesis;
use crate::domain::traits::StepScorer;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::beam::{BeamConfig, BeamSearch};
use crate::ml::model::Decoder;

pub type InferBackend = burn::backend::Wgpu;

// ─── DecoderScorer ────────────────────────────────────────────────────────────
/// Scores prefixes with a decoder against a fixed encoder output.
pub struct DecoderScorer<'a, B: Backend> {
    decoder:     &'a Decoder<B>,
    /// `[T, H]`
    encoder_out: Tensor<B, 2>,
}

impl<'a, B: Backend> DecoderScorer<'a, B> {
    pub fn new(decoder: &'a Decoder<B>, encoder_out: Tensor<B, 2>) -> Self {
        Self { decoder, encoder_out }
    }
}

impl<B: Backend> StepScorer for DecoderScorer<'_, B> {
    fn vocab_size(&self) -> usize {
        self.decoder.vocab_size()
    }

    fn next_log_probs(&self, prefix: &[u32]) -> Result<Vec<f32>> {
        let log_probs = self.decoder.step_log_probs(prefix, self.encoder_out.clone());
        Ok(log_probs.into_data().iter::<f32>().collect())
    }
}

// ─── Inferencer ───────────────────────────────────────────────────────────────
pub struct Inferencer<B: Backend = InferBackend> {
    decoder: Decoder<B>,
    device:  B::Device,
}

impl<B: Backend> Inferencer<B> {
    pub fn new(decoder: Decoder<B>, device: B::Device) -> Self {
        Self { decoder, device }
    }

    pub fn from_checkpoint(ckpt_manager: &CheckpointManager, device: B::Device) -> Result<Self> {
        let decoder = ckpt_manager.load_decoder::<B>(&device)?;
        tracing::info!("Decoder loaded from checkpoint");
        Ok(Self { decoder, device })
    }

    pub fn decoder(&self) -> &Decoder<B> {
        &self.decoder
    }

    /// Beam-search one utterance. `encoder_out` holds one row per
    /// encoder frame, each `d_model` wide.
    pub fn recognize(&self, encoder_out: &[Vec<f32>], config: BeamConfig) -> Result<Vec<Hypothesis>> {
        ensure!(!encoder_out.is_empty(), "encoder output has no frames");
        let hidden = self.decoder.d_model;
        ensure!(
            encoder_out.iter().all(|frame| frame.len() == hidden),
            "every encoder frame must have {hidden} values"
        );
        ensure!(
            config.maxlen <= self.decoder.pe_maxlen,
            "maxlen {} exceeds the decoder's pe_maxlen {}",
            config.maxlen,
            self.decoder.pe_maxlen
        );

        let frames = encoder_out.len();
        let flat: Vec<f32> = encoder_out.iter().flatten().copied().collect();
        let memory = Tensor::<B, 2>::from_floats(TensorData::new(flat, [frames, hidden]), &self.device);

        let scorer = DecoderScorer::new(&self.decoder, memory);
        let nbest  = BeamSearch::search(&scorer, config, self.decoder.special_tokens())?;

        for hyp in &nbest {
            tracing::debug!("score={:.4} yseq={:?}", hyp.score, hyp.yseq);
        }
        Ok(nbest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::model::DecoderConfig;
    use burn::backend::NdArray;

    type TB = NdArray;

    fn inferencer() -> Inferencer<TB> {
        inferencer_with_pe_maxlen(64)
    }

    fn inferencer_with_pe_maxlen(pe_maxlen: usize) -> Inferencer<TB> {
        let device = Default::default();
        let decoder = DecoderConfig::new(6, 1, 2)
            .with_d_model(8)
            .with_n_layers(1)
            .with_n_heads(2)
            .with_d_inner(16)
            .with_dropout(0.0)
            .with_pe_maxlen(pe_maxlen)
            .init::<TB>(&device);
        Inferencer::new(decoder, device)
    }

    fn frames(n: usize) -> Vec<Vec<f32>> {
        (0..n).map(|i| (0..8).map(|j| ((i * 8 + j) as f32 * 0.1).sin()).collect()).collect()
    }

    #[test]
    fn test_scorer_returns_full_distribution() {
        let inf    = inferencer();
        let memory = Tensor::<TB, 2>::zeros([3, 8], &Default::default());
        let scorer = DecoderScorer::new(inf.decoder(), memory);

        let log_probs = scorer.next_log_probs(&[1]).unwrap();
        assert_eq!(log_probs.len(), scorer.vocab_size());
        assert!(log_probs.iter().all(|lp| *lp <= 1e-5));
    }

    #[test]
    fn test_recognize_returns_terminated_nbest() {
        let config = BeamConfig { beam: 3, nbest: 2, maxlen: 4 };
        let nbest  = inferencer().recognize(&frames(5), config).unwrap();

        assert!(!nbest.is_empty() && nbest.len() <= 2);
        for hyp in &nbest {
            assert_eq!(hyp.yseq[0], 1);
            assert_eq!(hyp.last_token(), Some(2));
            assert!(hyp.len() <= config.maxlen + 2);
        }
    }

    #[test]
    fn test_recognize_rejects_bad_frames() {
        let inf = inferencer();
        assert!(inf.recognize(&[], BeamConfig::default()).is_err());
        assert!(inf.recognize(&[vec![0.0; 3]], BeamConfig::default()).is_err());
    }

    #[test]
    fn test_maxlen_past_positional_table_is_an_error() {
        let inf = inferencer_with_pe_maxlen(4);

        let too_long = BeamConfig { beam: 1, nbest: 1, maxlen: 10 };
        assert!(inf.recognize(&frames(2), too_long).is_err());

        // prefixes never exceed maxlen tokens, so maxlen == pe_maxlen fits
        let fits = BeamConfig { beam: 1, nbest: 1, maxlen: 4 };
        assert!(inf.recognize(&frames(2), fits).is_ok());
    }
}
