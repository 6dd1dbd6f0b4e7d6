// ============================================================
// Layer 3 — NewsRecord Domain Type
// ============================================================
// One raw training example for title generation, exactly as it
// appears in the source JSON file:
//
//   { "content": "<article body>", "title": "<headline>" }
//
// No cleaning or tokenisation has happened yet; that is the job
// of the FeatureBuilder in the data layer.
//
// Reference: Rust Book §5 (Structs and Methods)

use serde::{Deserialize, Serialize};

/// A news article body paired with its headline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsRecord {
    /// Article body text
    pub content: String,

    /// Headline the model learns to generate
    pub title: String,
}

impl NewsRecord {
    /// Create a new record. Accepts &str or String for either field.
    ///
    /// Example:
    ///   let rec = NewsRecord::new("今天天气很好", "天气");
    pub fn new(content: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            title:   title.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialises_source_shape() {
        let json = r#"[{"content": "body text", "title": "a headline"}]"#;
        let records: Vec<NewsRecord> = serde_json::from_str(json).unwrap();
        assert_eq!(records, vec![NewsRecord::new("body text", "a headline")]);
    }
}
