// ============================================================
// Layer 3 — Hypothesis Domain Type
// ============================================================
// One candidate output sequence tracked by beam search.
//
// Lifecycle:
//   start   → { score: 0.0, yseq: [SOS] }
//   extend  → append one token id, add its log-probability
//   end     → last id == EOS, moved to the ended set
//
// The score is a plain SUM of log-probabilities, so it is never
// normalised by length.
//
// Reference: Rust Book §5 (Structs)

use serde::{Deserialize, Serialize};

/// A scored token sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hypothesis {
    /// Cumulative log-probability of `yseq`
    pub score: f32,

    /// Token ids so far, always starting with SOS
    pub yseq: Vec<u32>,
}

impl Hypothesis {
    /// The initial hypothesis: just the start token, score zero.
    pub fn start(sos_id: u32) -> Self {
        Self { score: 0.0, yseq: vec![sos_id] }
    }

    /// A new hypothesis with `token` appended and `log_prob` added.
    pub fn extend(&self, token: u32, log_prob: f32) -> Self {
        let mut yseq = Vec::with_capacity(self.yseq.len() + 1);
        yseq.extend_from_slice(&self.yseq);
        yseq.push(token);
        Self { score: self.score + log_prob, yseq }
    }

    /// The most recent token id.
    pub fn last_token(&self) -> Option<u32> {
        self.yseq.last().copied()
    }

    /// True when the sequence is terminated by `eos_id`.
    pub fn is_ended(&self, eos_id: u32) -> bool {
        self.last_token() == Some(eos_id)
    }

    pub fn len(&self) -> usize {
        self.yseq.len()
    }

    pub fn is_empty(&self) -> bool {
        self.yseq.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extend_accumulates_score() {
        let h = Hypothesis::start(1).extend(7, -0.5).extend(2, -1.25);
        assert_eq!(h.yseq, vec![1, 7, 2]);
        assert!((h.score - (-1.75)).abs() < 1e-6);
    }

    #[test]
    fn test_extend_leaves_parent_untouched() {
        let parent = Hypothesis::start(1);
        let _child = parent.extend(3, -0.1);
        assert_eq!(parent.yseq, vec![1]);
        assert_eq!(parent.score, 0.0);
    }

    #[test]
    fn test_is_ended() {
        let h = Hypothesis::start(1).extend(2, -0.1);
        assert!(h.is_ended(2));
        assert!(!h.is_ended(3));
    }
}
