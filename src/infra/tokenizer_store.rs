// ============================================================
// Layer 6 — Tokenizer Store
// ============================================================
// Loads the pretrained subword tokenizer used by the title
// pipeline and resolves the special tokens it must carry:
//
//   [CLS]      — leading classification token
//   [SEP]      — separator closing the content and title regions
//   [Content]  — segment id for content positions
//   [Title]    — segment id for title positions
//   [Space]    — placeholder for literal spaces inside titles
//
// The tokenizer itself is an external HuggingFace `tokenizer.json`.
// The three bracketed domain tokens must be registered as added
// tokens so they are never split.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokenizers::Tokenizer;

pub const CLS_TOKEN:     &str = "[CLS]";
pub const SEP_TOKEN:     &str = "[SEP]";
pub const CONTENT_TOKEN: &str = "[Content]";
pub const TITLE_TOKEN:   &str = "[Title]";
pub const SPACE_TOKEN:   &str = "[Space]";

/// Vocabulary ids of every special token the feature builder needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TitleTokenIds {
    pub cls:     u32,
    pub sep:     u32,
    pub content: u32,
    pub title:   u32,
    pub space:   u32,
}

impl TitleTokenIds {
    /// Look every special token up in `tokenizer`.
    /// Fails if any of them is missing from the vocabulary.
    pub fn resolve(tokenizer: &Tokenizer) -> Result<Self> {
        let lookup = |token: &str| {
            tokenizer
                .token_to_id(token)
                .with_context(|| format!("Tokenizer has no id for special token '{token}'"))
        };
        Ok(Self {
            cls:     lookup(CLS_TOKEN)?,
            sep:     lookup(SEP_TOKEN)?,
            content: lookup(CONTENT_TOKEN)?,
            title:   lookup(TITLE_TOKEN)?,
            space:   lookup(SPACE_TOKEN)?,
        })
    }
}

pub struct TokenizerStore {
    path: PathBuf,
}

impl TokenizerStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }

    /// Load the tokenizer JSON from disk
    pub fn load(&self) -> Result<Tokenizer> {
        let tokenizer = Tokenizer::from_file(&self.path)
            .map_err(|e| anyhow::anyhow!(
                "Cannot load tokenizer from '{}': {}", self.path.display(), e
            ))?;
        tracing::info!(
            "Loaded tokenizer from '{}' ({} entries)",
            self.path.display(),
            tokenizer.get_vocab_size(true)
        );
        Ok(tokenizer)
    }

    /// Load the tokenizer and resolve the title special tokens in one go.
    pub fn load_with_ids(&self) -> Result<(Tokenizer, TitleTokenIds)> {
        let tokenizer = self.load()?;
        let ids       = TitleTokenIds::resolve(&tokenizer)?;
        tracing::debug!("Resolved title special tokens: {:?}", ids);
        Ok((tokenizer, ids))
    }
}

/// Writes a small word-level tokenizer in HuggingFace JSON format.
/// Only used to give tests a real `Tokenizer` without network access.
#[cfg(test)]
pub mod testing {
    use super::*;

    /// Special tokens first (ids 0..=6), then `words` in order.
    pub fn write_tokenizer(dir: &Path, words: &[&str]) -> PathBuf {
        let specials = ["[PAD]", "[UNK]", CLS_TOKEN, SEP_TOKEN, CONTENT_TOKEN, TITLE_TOKEN, SPACE_TOKEN];

        let mut vocab = serde_json::Map::new();
        let mut added = Vec::new();
        for (id, token) in specials.iter().enumerate() {
            vocab.insert(token.to_string(), serde_json::json!(id));
            added.push(serde_json::json!({
                "id": id, "content": token, "single_word": false, "lstrip": false,
                "rstrip": false, "normalized": false, "special": true
            }));
        }
        for (offset, word) in words.iter().enumerate() {
            vocab.insert(word.to_string(), serde_json::json!(specials.len() + offset));
        }

        let tokenizer_json = serde_json::json!({
            "version": "1.0",
            "truncation": null,
            "padding": null,
            "added_tokens": added,
            "normalizer": {
                "type": "BertNormalizer",
                "clean_text": true,
                "handle_chinese_chars": true,
                "strip_accents": null,
                "lowercase": true
            },
            "pre_tokenizer": { "type": "Whitespace" },
            "post_processor": null,
            "decoder": null,
            "model": { "type": "WordLevel", "vocab": vocab, "unk_token": "[UNK]" }
        });

        std::fs::create_dir_all(dir).unwrap();
        let path = dir.join("tokenizer.json");
        std::fs::write(&path, serde_json::to_string_pretty(&tokenizer_json).unwrap()).unwrap();
        path
    }
}
