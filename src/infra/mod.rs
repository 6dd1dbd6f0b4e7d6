// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Persistence and external resources used across layers:
//
//   checkpoint.rs      — decoder weights (CompactRecorder) and
//                        DecoderConfig (JSON)
//
//   tokenizer_store.rs — loads the HuggingFace tokenizer and
//                        resolves the title special tokens
//
//   feature_cache.rs   — bincode cache of built features,
//                        keyed by dataset name and max length
//
//   symbols.rs         — id → symbol table for rendering
//                        decoded hypotheses
//
// Reference: Rust Book §7 (Modules)
//            Burn Book §5 (Checkpointing)

/// Decoder checkpoint saving and loading
pub mod checkpoint;

/// Tokenizer loading and special-token lookup
pub mod tokenizer_store;

/// On-disk feature cache
pub mod feature_cache;

/// Output symbol table
pub mod symbols;
