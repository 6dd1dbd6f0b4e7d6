// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The two seams the rest of the crate programs against:
//
//   RecordSource — anything that yields raw NewsRecords
//                  (JsonRecordLoader reads a JSON array file)
//
//   StepScorer   — anything that, given a token prefix, returns
//                  next-token log-probabilities
//                  (DecoderScorer runs the Transformer decoder;
//                   tests use small deterministic fakes)
//
// Beam search only sees StepScorer, so the search itself never
// touches Burn tensors.
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;
use crate::domain::record::NewsRecord;

// ─── RecordSource ─────────────────────────────────────────────────────────────
/// Any component that can load raw title-generation records.
pub trait RecordSource {
    /// Load every record, in source order.
    fn load_all(&self) -> Result<Vec<NewsRecord>>;
}

// ─── StepScorer ───────────────────────────────────────────────────────────────
/// Scores the next token of a partial sequence.
pub trait StepScorer {
    /// Number of entries returned by `next_log_probs`.
    fn vocab_size(&self) -> usize;

    /// Log-probabilities over the whole vocabulary for the token
    /// following `prefix`. `prefix` always starts with SOS.
    fn next_log_probs(&self, prefix: &[u32]) -> Result<Vec<f32>>;
}
