// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Orchestrates the other layers for one goal at a time.
//
// Rules for this layer:
//   - No ML math or model code here
//   - No printing here (that's Layer 1)
//   - Only workflow coordination
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// Title feature preparation: raw JSON → cache → batches
pub mod features_use_case;

// Decoder checkpoint creation and beam-search decoding
pub mod decode_use_case;
