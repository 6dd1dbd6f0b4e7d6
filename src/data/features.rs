// ============================================================
// Layer 4 — Title Feature Builder
// ============================================================
// Converts one raw NewsRecord into the id sequences the title
// model is trained on.
//
// Sequence layout and segment tags:
//
//   ids:   [CLS]  c1 … cN  [SEP]  t1 … tM  [SEP]
//   types: CONT   CONT…    CONT   TITL…    TITL
//
// Truncation, applied in this order:
//   1. title   → at most `title_max_len` tokens
//   2. content → at most `max_len - title_len - 3` tokens
// The 3 reserved slots are [CLS] and the two [SEP]s, so the
// result never exceeds `max_len`.
//
// Literal spaces in the title are rewritten to [Space] before
// tokenisation; the subword tokenizer would otherwise drop them.

use anyhow::{ensure, Result};
use tokenizers::Tokenizer;

use crate::data::dataset::FeatureRecord;
use crate::domain::record::NewsRecord;
use crate::infra::tokenizer_store::{TitleTokenIds, SPACE_TOKEN};

/// Number of special positions around content and title.
const RESERVED_SLOTS: usize = 3;

pub struct FeatureBuilder<'a> {
    tokenizer:     &'a Tokenizer,
    ids:           TitleTokenIds,
    max_len:       usize,
    title_max_len: usize,
}

impl<'a> FeatureBuilder<'a> {
    /// Build a FeatureBuilder.
    ///
    /// Fails if `title_max_len` plus the reserved slots cannot fit in
    /// `max_len`, since every record would then break the length bound.
    pub fn new(
        tokenizer:     &'a Tokenizer,
        ids:           TitleTokenIds,
        max_len:       usize,
        title_max_len: usize,
    ) -> Result<Self> {
        ensure!(
            title_max_len + RESERVED_SLOTS <= max_len,
            "title_max_len ({title_max_len}) + {RESERVED_SLOTS} must not exceed max_len ({max_len})"
        );
        Ok(Self { tokenizer, ids, max_len, title_max_len })
    }

    /// Convert one record into input ids and segment ids.
    pub fn convert(&self, record: &NewsRecord) -> Result<FeatureRecord> {
        let mut content_ids = self.tokenize(&record.content)?;
        let mut title_ids   = self.tokenize(&record.title.replace(' ', SPACE_TOKEN))?;

        title_ids.truncate(self.title_max_len);
        content_ids.truncate(self.max_len - title_ids.len() - RESERVED_SLOTS);

        let total = content_ids.len() + title_ids.len() + RESERVED_SLOTS;
        let mut input_ids      = Vec::with_capacity(total);
        let mut token_type_ids = Vec::with_capacity(total);

        // [CLS] + content + [SEP], all tagged as content
        input_ids.push(self.ids.cls);
        input_ids.extend_from_slice(&content_ids);
        input_ids.push(self.ids.sep);
        token_type_ids.resize(content_ids.len() + 2, self.ids.content);

        // title + closing [SEP], tagged as title
        input_ids.extend_from_slice(&title_ids);
        input_ids.push(self.ids.sep);
        token_type_ids.resize(input_ids.len(), self.ids.title);

        assert_eq!(input_ids.len(), token_type_ids.len());
        assert!(input_ids.len() <= self.max_len);

        Ok(FeatureRecord { input_ids, token_type_ids })
    }

    /// Convert a whole corpus, logging progress every 1000 records.
    pub fn convert_all(&self, records: &[NewsRecord]) -> Result<Vec<FeatureRecord>> {
        let mut features = Vec::with_capacity(records.len());
        for (idx, record) in records.iter().enumerate() {
            features.push(self.convert(record)?);
            if (idx + 1) % 1000 == 0 {
                tracing::debug!("Converted {}/{} records", idx + 1, records.len());
            }
        }
        tracing::info!("Converted {} records into features", features.len());
        Ok(features)
    }

    fn tokenize(&self, text: &str) -> Result<Vec<u32>> {
        let encoding = self
            .tokenizer
            .encode(text, false)
            .map_err(|e| anyhow::anyhow!("Tokenisation error: {e}"))?;
        Ok(encoding.get_ids().to_vec())
    }
}
