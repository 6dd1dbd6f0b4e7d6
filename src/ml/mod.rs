// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All Burn module code lives here.
//
//   masks.rs      — pad, causal and encoder-length attention masks
//
//   model.rs      — the masked Transformer decoder:
//                   • token embedding + sinusoidal positions
//                   • self-attention / cross-attention / FFN blocks
//                   • output projection, optionally tied to the
//                     embedding table
//                   • cross-entropy loss over non-ignored labels
//
//   beam.rs       — backend-free beam search over a StepScorer
//
//   inferencer.rs — loads a checkpoint and decodes one utterance
//
// Reference: Burn Book §3 (Building Blocks)
//            Vaswani et al. (2017) Attention Is All You Need

/// Attention masks for the decoder
pub mod masks;

/// Transformer decoder architecture
pub mod model;

/// Beam search decoding
pub mod beam;

/// Inference engine — checkpoint loading and n-best decoding
pub mod inferencer;
