use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};

/// One tokenised title-generation sample, unpadded.
/// Sequence format: [CLS] content [SEP] title [SEP]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub input_ids:      Vec<u32>,
    pub token_type_ids: Vec<u32>,
}

impl FeatureRecord {
    pub fn len(&self) -> usize {
        self.input_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.input_ids.is_empty()
    }

    /// Input ids tagged with `segment_id`.
    pub fn segment_ids(&self, segment_id: u32) -> Vec<u32> {
        self.input_ids
            .iter()
            .zip(&self.token_type_ids)
            .filter(|(_, &tag)| tag == segment_id)
            .map(|(&id, _)| id)
            .collect()
    }
}

pub struct TitleDataset {
    records: Vec<FeatureRecord>,
}

impl TitleDataset {
    pub fn new(records: Vec<FeatureRecord>) -> Self { Self { records } }

    pub fn longest(&self) -> usize {
        self.records.iter().map(FeatureRecord::len).max().unwrap_or(0)
    }
}

impl Dataset<FeatureRecord> for TitleDataset {
    fn get(&self, index: usize) -> Option<FeatureRecord> {
        self.records.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.records.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(ids: &[u32], tags: &[u32]) -> FeatureRecord {
        FeatureRecord { input_ids: ids.to_vec(), token_type_ids: tags.to_vec() }
    }

    #[test]
    fn test_dataset_get_and_len() {
        let ds = TitleDataset::new(vec![record(&[2, 9, 3], &[4, 4, 4]), record(&[2, 3, 8, 3], &[4, 4, 5, 5])]);
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.longest(), 4);
        assert_eq!(ds.get(1).unwrap().input_ids, vec![2, 3, 8, 3]);
        assert!(ds.get(2).is_none());
    }

    #[test]
    fn test_segment_ids_select_title_region() {
        let r = record(&[2, 9, 10, 3, 11, 3], &[4, 4, 4, 4, 5, 5]);
        assert_eq!(r.segment_ids(5), vec![11, 3]);
        assert_eq!(r.segment_ids(4), vec![2, 9, 10, 3]);
    }
}
