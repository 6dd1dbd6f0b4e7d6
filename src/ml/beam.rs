// ============================================================
// Layer 5 — Beam Search
// ============================================================
// Decodes ONE utterance at a time against any StepScorer.
//
// Each step:
//   1. every active hypothesis asks the scorer for next-token
//      log-probabilities and proposes its top-`beam` extensions
//   2. all proposals are merged and only the global top-`beam`
//      survive (score = plain sum of log-probs)
//   3. on the last allowed step EOS is appended to survivors
//      that do not already end with it
//   4. hypotheses ending in EOS move to the ended set
//
// Ended hypotheses are not replaced, so the active pool can drop
// below `beam` and stays that way. Search stops after `maxlen`
// steps or as soon as the active pool is empty.
//
// Reference: Koehn (2004) Pharaoh: a beam search decoder

use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};

use crate::domain::hypothesis::Hypothesis;
use crate::domain::tokens::SpecialTokens;
use crate::domain::traits::StepScorer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeamConfig {
    /// Hypotheses kept per step
    pub beam:   usize,
    /// Hypotheses returned
    pub nbest:  usize,
    /// Decode steps before EOS is forced
    pub maxlen: usize,
}

impl Default for BeamConfig {
    fn default() -> Self {
        Self { beam: 5, nbest: 1, maxlen: 100 }
    }
}

pub struct BeamSearch<'a, S: StepScorer> {
    scorer: &'a S,
    config: BeamConfig,
    tokens: SpecialTokens,
    active: Vec<Hypothesis>,
    ended:  Vec<Hypothesis>,
    step:   usize,
}

impl<'a, S: StepScorer> BeamSearch<'a, S> {
    pub fn new(scorer: &'a S, config: BeamConfig, tokens: SpecialTokens) -> Result<Self> {
        ensure!(config.beam > 0, "beam width must be at least 1");
        ensure!(config.nbest > 0, "nbest must be at least 1");
        ensure!(config.maxlen > 0, "maxlen must be at least 1");
        Ok(Self {
            scorer,
            config,
            tokens,
            active: vec![Hypothesis::start(tokens.sos_id)],
            ended:  Vec::new(),
            step:   0,
        })
    }

    /// Run the whole search and return the n-best ended hypotheses.
    pub fn search(scorer: &'a S, config: BeamConfig, tokens: SpecialTokens) -> Result<Vec<Hypothesis>> {
        let mut search = Self::new(scorer, config, tokens)?;
        while !search.is_finished() {
            search.step()?;
        }
        Ok(search.finish())
    }

    pub fn active(&self) -> &[Hypothesis] {
        &self.active
    }

    pub fn ended(&self) -> &[Hypothesis] {
        &self.ended
    }

    pub fn steps_taken(&self) -> usize {
        self.step
    }

    pub fn is_finished(&self) -> bool {
        self.step >= self.config.maxlen || self.active.is_empty()
    }

    /// Advance every active hypothesis by one token.
    pub fn step(&mut self) -> Result<()> {
        if self.is_finished() {
            return Ok(());
        }

        let vocab = self.scorer.vocab_size();
        let k     = self.config.beam.min(vocab);

        let mut candidates = Vec::with_capacity(self.active.len() * k);
        for hyp in &self.active {
            let log_probs = self.scorer.next_log_probs(&hyp.yseq)?;
            ensure!(
                log_probs.len() == vocab,
                "scorer returned {} log-probs for a vocabulary of {vocab}",
                log_probs.len()
            );
            for (token, log_prob) in top_k(&log_probs, k) {
                candidates.push(hyp.extend(token, log_prob));
            }
        }

        candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
        candidates.truncate(self.config.beam);

        // the final step must leave nothing unterminated
        if self.step + 1 == self.config.maxlen {
            for hyp in &mut candidates {
                if !hyp.is_ended(self.tokens.eos_id) {
                    hyp.yseq.push(self.tokens.eos_id);
                }
            }
        }

        let (ended, active): (Vec<_>, Vec<_>) = candidates
            .into_iter()
            .partition(|hyp| hyp.is_ended(self.tokens.eos_id));
        self.ended.extend(ended);
        self.active = active;
        self.step += 1;

        tracing::debug!(
            "Beam step {}: {} active, {} ended",
            self.step,
            self.active.len(),
            self.ended.len()
        );
        Ok(())
    }

    /// Ended hypotheses sorted by score, best first, cut to `nbest`.
    pub fn finish(self) -> Vec<Hypothesis> {
        let mut ended = self.ended;
        ended.sort_by(|a, b| b.score.total_cmp(&a.score));
        ended.truncate(self.config.nbest);
        ended
    }
}

/// The `k` highest entries as (token id, log-prob), best first.
/// Ties keep the lower id first.
fn top_k(log_probs: &[f32], k: usize) -> Vec<(u32, f32)> {
    let mut ranked: Vec<(u32, f32)> = log_probs
        .iter()
        .enumerate()
        .map(|(id, &lp)| (id as u32, lp))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked.truncate(k);
    ranked
}
