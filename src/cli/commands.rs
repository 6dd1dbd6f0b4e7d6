// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the subcommands `features`, `init-decoder` and
// `decode` and all their configurable flags.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};

use crate::application::{
    decode_use_case::{DecodeConfig, InitDecoderConfig},
    features_use_case::FeaturesConfig,
};
use crate::ml::beam::BeamConfig;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build (or load cached) title-generation features and batch them
    Features(FeaturesArgs),

    /// Write a freshly initialised decoder checkpoint
    InitDecoder(InitDecoderArgs),

    /// Beam-search one encoder output with a decoder checkpoint
    Decode(DecodeArgs),
}

// ─── features ─────────────────────────────────────────────────────────────────
#[derive(Args, Debug)]
pub struct FeaturesArgs {
    /// JSON array of {"content", "title"} records
    #[arg(long, default_value = "data/train.json")]
    pub raw_path: String,

    /// Directory holding the feature cache
    #[arg(long, default_value = "data")]
    pub data_dir: String,

    /// Cache key, together with --max-len
    #[arg(long, default_value = "train")]
    pub dataset_name: String,

    /// HuggingFace tokenizer.json with [Content], [Title] and [Space]
    #[arg(long, default_value = "tokenizer/tokenizer.json")]
    pub tokenizer_path: String,

    /// Longest feature sequence, special tokens included
    #[arg(long, default_value_t = 512)]
    pub max_len: usize,

    /// Longest title, in tokens
    #[arg(long, default_value_t = 32)]
    pub title_max_len: usize,

    #[arg(long, default_value_t = 16)]
    pub batch_size: usize,

    /// Rebuild the cache even if it exists
    #[arg(long)]
    pub overwrite: bool,

    /// Shuffle batches with this seed
    #[arg(long)]
    pub seed: Option<u64>,
}

impl From<FeaturesArgs> for FeaturesConfig {
    fn from(a: FeaturesArgs) -> Self {
        FeaturesConfig {
            raw_path:       a.raw_path,
            data_dir:       a.data_dir,
            dataset_name:   a.dataset_name,
            tokenizer_path: a.tokenizer_path,
            max_len:        a.max_len,
            title_max_len:  a.title_max_len,
            batch_size:     a.batch_size,
            overwrite:      a.overwrite,
            shuffle_seed:   a.seed,
        }
    }
}

// ─── init-decoder ─────────────────────────────────────────────────────────────
#[derive(Args, Debug)]
pub struct InitDecoderArgs {
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Target vocabulary size
    #[arg(long)]
    pub vocab_size: usize,

    #[arg(long, default_value_t = 1)]
    pub sos_id: u32,

    #[arg(long, default_value_t = 2)]
    pub eos_id: u32,

    #[arg(long, default_value_t = 512)]
    pub d_model: usize,

    #[arg(long, default_value_t = 6)]
    pub n_layers: usize,

    /// d_model must be divisible by n_heads
    #[arg(long, default_value_t = 8)]
    pub n_heads: usize,

    /// Inner width of the feed-forward network
    #[arg(long, default_value_t = 2048)]
    pub d_inner: usize,

    #[arg(long, default_value_t = 0.1)]
    pub dropout: f64,

    /// Use an independent output projection instead of the embedding table
    #[arg(long)]
    pub no_weight_sharing: bool,

    #[arg(long, default_value_t = 5000)]
    pub pe_maxlen: usize,
}

impl From<InitDecoderArgs> for InitDecoderConfig {
    fn from(a: InitDecoderArgs) -> Self {
        InitDecoderConfig {
            checkpoint_dir: a.checkpoint_dir,
            vocab_size:     a.vocab_size,
            sos_id:         a.sos_id,
            eos_id:         a.eos_id,
            d_model:        a.d_model,
            n_layers:       a.n_layers,
            n_heads:        a.n_heads,
            d_inner:        a.d_inner,
            dropout:        a.dropout,
            share_weights:  !a.no_weight_sharing,
            pe_maxlen:      a.pe_maxlen,
        }
    }
}

// ─── decode ───────────────────────────────────────────────────────────────────
#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// JSON [[f32]] encoder output, one row per frame
    #[arg(long)]
    pub encoder_out: String,

    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// One symbol per line; line number is the id
    #[arg(long)]
    pub symbols: Option<String>,

    #[arg(long, default_value_t = 5)]
    pub beam: usize,

    #[arg(long, default_value_t = 1)]
    pub nbest: usize,

    #[arg(long, default_value_t = 100)]
    pub maxlen: usize,
}

impl From<DecodeArgs> for DecodeConfig {
    fn from(a: DecodeArgs) -> Self {
        DecodeConfig {
            checkpoint_dir:   a.checkpoint_dir,
            encoder_out_path: a.encoder_out,
            symbols_path:     a.symbols,
            beam:             BeamConfig { beam: a.beam, nbest: a.nbest, maxlen: a.maxlen },
        }
    }
}
