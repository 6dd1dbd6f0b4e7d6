// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust structs and traits shared by both pipelines.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O or network calls
//   - Only plain Rust structs, enums, and traits
//
// The two pipelines meet here only by living in the same crate:
//
//   record.rs      — a raw news article (content + title) as read from JSON
//   hypothesis.rs  — one partial or finished beam-search hypothesis
//   tokens.rs      — special token ids and the IGNORE_ID padding sentinel
//   traits.rs      — RecordSource and StepScorer abstractions
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// A raw (content, title) news record
pub mod record;

// A scored token sequence produced by beam search
pub mod hypothesis;

// Decoder special tokens and the label padding sentinel
pub mod tokens;

// Core abstractions (traits) that other layers implement
pub mod traits;
