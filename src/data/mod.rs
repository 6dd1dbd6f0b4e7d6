// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between raw files and tensor batches.
//
// Title-generation pipeline:
//
//   JSON records
//       │
//       ▼
//   JsonRecordLoader  → reads {"content","title"} objects
//       │
//       ▼
//   FeatureBuilder    → tokenises, truncates, tags segments
//       │
//       ▼
//   FeatureCache      → (infra) persists the built features
//       │
//       ▼
//   TitleDataset      → implements Burn's Dataset trait
//       │
//       ▼
//   TitleBatcher      → pads records into tensor batches
//
// Decoder side:
//
//   padded labels → DecoderTargets → (SOS ++ y, y ++ EOS)
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Loads raw records from a JSON array file
pub mod loader;

/// Converts raw records into tagged id sequences
pub mod features;

/// Implements Burn's Dataset trait for feature records
pub mod dataset;

/// Implements Burn's Batcher trait with right-padding
pub mod batcher;

/// Builds decoder input / gold sequences from label rows
pub mod targets;
