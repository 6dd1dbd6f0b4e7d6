// ============================================================
// Layer 3 — Decoder Special Tokens
// ============================================================
// The decoder needs to know two vocabulary ids:
//
//   sos_id — prepended to every decoder input ("start of sequence")
//   eos_id — appended to every gold sequence ("end of sequence"),
//            and reused as the pad value for decoder inputs
//
// Gold label rows are padded with IGNORE_ID instead, a value that
// can never be a real vocabulary id, so padded positions are
// dropped from the loss.

use serde::{Deserialize, Serialize};

/// Padding sentinel for label matrices. Never a valid vocabulary id.
pub const IGNORE_ID: i64 = -1;

/// Start and end token ids for one target vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialTokens {
    pub sos_id: u32,
    pub eos_id: u32,
}

impl SpecialTokens {
    pub fn new(sos_id: u32, eos_id: u32) -> Self {
        Self { sos_id, eos_id }
    }

    pub fn sos(&self) -> i64 {
        i64::from(self.sos_id)
    }

    pub fn eos(&self) -> i64 {
        i64::from(self.eos_id)
    }
}
