// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction, parsed with clap.
// All work is delegated to Layer 2 (application).
//
// Three commands are supported:
//   1. `features`      — build/load title features and batch them
//   2. `init-decoder`  — write a fresh decoder checkpoint
//   3. `decode`        — beam-search one encoder output
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, DecodeArgs, FeaturesArgs, InitDecoderArgs};

#[derive(Parser, Debug)]
#[command(
    name = "nmt-titlegen",
    version = "0.1.0",
    about = "Transformer decoder with beam search, and a news-title feature pipeline."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Dispatch to the matching use case.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Features(args)    => run_features(args),
            Commands::InitDecoder(args) => run_init_decoder(args),
            Commands::Decode(args)      => run_decode(args),
        }
    }
}

fn run_features(args: FeaturesArgs) -> Result<()> {
    use crate::application::features_use_case::FeaturesUseCase;

    tracing::info!("Preparing features from: {}", args.raw_path);
    let summary = FeaturesUseCase::new(args.into()).execute()?;

    println!(
        "{} records, {} batches, widest batch {} tokens",
        summary.records, summary.batches, summary.widest
    );
    Ok(())
}

fn run_init_decoder(args: InitDecoderArgs) -> Result<()> {
    use crate::application::decode_use_case::InitDecoderUseCase;

    let dir = args.checkpoint_dir.clone();
    InitDecoderUseCase::new(args.into()).execute()?;

    println!("Decoder checkpoint written to '{dir}'.");
    Ok(())
}

fn run_decode(args: DecodeArgs) -> Result<()> {
    use crate::application::decode_use_case::DecodeUseCase;

    let nbest = DecodeUseCase::new(args.into()).execute()?;
    for (rank, entry) in nbest.iter().enumerate() {
        let rendered = match &entry.text {
            Some(text) => text.clone(),
            None       => format!("{:?}", entry.hypothesis.yseq),
        };
        println!("{}\t{:.4}\t{}", rank + 1, entry.hypothesis.score, rendered);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::decode_use_case::DecodeConfig;

    #[test]
    fn test_decode_args_map_to_beam_config() {
        let cli = Cli::try_parse_from([
            "nmt-titlegen", "decode", "--encoder-out", "enc.json", "--beam", "3", "--maxlen", "20",
        ])
        .unwrap();

        let Commands::Decode(args) = cli.command else { panic!("expected decode") };
        let cfg: DecodeConfig = args.into();
        assert_eq!(cfg.beam.beam, 3);
        assert_eq!(cfg.beam.nbest, 1);
        assert_eq!(cfg.beam.maxlen, 20);
        assert!(cfg.symbols_path.is_none());
    }

    #[test]
    fn test_init_decoder_flag_disables_sharing() {
        let cli = Cli::try_parse_from([
            "nmt-titlegen", "init-decoder", "--vocab-size", "100", "--no-weight-sharing",
        ])
        .unwrap();

        let Commands::InitDecoder(args) = cli.command else { panic!("expected init-decoder") };
        let cfg: crate::application::decode_use_case::InitDecoderConfig = args.into();
        assert!(!cfg.share_weights);
        assert_eq!(cfg.vocab_size, 100);
    }
}
