// ============================================================
// Layer 4 — Title Batcher
// ============================================================
// Implements Burn's Batcher trait to turn a Vec<FeatureRecord>
// into padded tensor batches.
//
// FeatureRecords are stored unpadded, so collation pads here:
//   Input:  N records of lengths L1 … LN
//   Output: TitleBatch with tensors of shape [N, max(Li)]
//
// Both input ids and segment ids are right-padded with 0. The
// pad value coincides with whatever id the tokenizer puts at 0,
// so 0 must not be a meaningful id for the consuming model.
//
// An empty list collates to None instead of panicking.
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::dataset::FeatureRecord;

/// Pad value for both input ids and segment ids.
pub const PAD_VALUE: u32 = 0;

// ─── TitleBatch ───────────────────────────────────────────────────────────────
/// A padded batch of title-generation samples.
#[derive(Debug, Clone)]
pub struct TitleBatch<B: Backend> {
    /// Token ids — shape: [batch_size, max_len_in_batch]
    pub input_ids: Tensor<B, 2, Int>,

    /// Segment ids — shape: [batch_size, max_len_in_batch]
    pub token_type_ids: Tensor<B, 2, Int>,
}

/// Right-pad `items` to the longest record and stack them.
/// Returns None for an empty list.
pub fn collate<B: Backend>(items: &[FeatureRecord], device: &B::Device) -> Option<TitleBatch<B>> {
    let width = items.iter().map(FeatureRecord::len).max()?;
    let rows  = items.len();

    let pad_row = |seq: &[u32]| {
        seq.iter()
            .map(|&x| x as i64)
            .chain(std::iter::repeat(PAD_VALUE as i64))
            .take(width)
            .collect::<Vec<_>>()
    };

    let input_flat: Vec<i64> = items.iter().flat_map(|r| pad_row(&r.input_ids)).collect();
    let types_flat: Vec<i64> = items.iter().flat_map(|r| pad_row(&r.token_type_ids)).collect();

    let input_ids = Tensor::<B, 2, Int>::from_ints(
        TensorData::new(input_flat, [rows, width]), device,
    );
    let token_type_ids = Tensor::<B, 2, Int>::from_ints(
        TensorData::new(types_flat, [rows, width]), device,
    );

    Some(TitleBatch { input_ids, token_type_ids })
}

// ─── TitleBatcher ─────────────────────────────────────────────────────────────
#[derive(Clone, Debug, Default)]
pub struct TitleBatcher;

impl TitleBatcher {
    pub fn new() -> Self {
        Self
    }
}

// ─── Burn Batcher Trait Implementation ────────────────────────────────────────
// The DataLoader calls .batch(items, device) with each mini-batch.
impl<B: Backend> Batcher<B, FeatureRecord, Option<TitleBatch<B>>> for TitleBatcher {
    fn batch(&self, items: Vec<FeatureRecord>, device: &B::Device) -> Option<TitleBatch<B>> {
        collate(&items, device)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn record(ids: &[u32], tags: &[u32]) -> FeatureRecord {
        FeatureRecord { input_ids: ids.to_vec(), token_type_ids: tags.to_vec() }
    }

    #[test]
    fn test_pads_to_longest_with_zero() {
        let device = Default::default();
        let items  = vec![
            record(&[2, 9, 3, 11, 3], &[4, 4, 4, 5, 5]),
            record(&[2, 3, 3],        &[4, 4, 5]),
        ];

        let batch = collate::<TestBackend>(&items, &device).unwrap();
        assert_eq!(batch.input_ids.dims(), [2, 5]);
        assert_eq!(batch.token_type_ids.dims(), [2, 5]);

        let ids: Vec<i64> = batch.input_ids.into_data().iter::<i64>().collect();
        assert_eq!(ids, vec![2, 9, 3, 11, 3, 2, 3, 3, 0, 0]);

        let tags: Vec<i64> = batch.token_type_ids.into_data().iter::<i64>().collect();
        assert_eq!(tags, vec![4, 4, 4, 5, 5, 4, 4, 5, 0, 0]);
    }

    #[test]
    fn test_empty_batch_is_none() {
        let device = Default::default();
        assert!(collate::<TestBackend>(&[], &device).is_none());

        let out: Option<TitleBatch<TestBackend>> = TitleBatcher::new().batch(Vec::new(), &device);
        assert!(out.is_none());
    }
}
