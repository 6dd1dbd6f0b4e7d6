// ============================================================
// Layer 4 — Decoder Targets
// ============================================================
// Turns a padded label matrix into the two sequences the decoder
// is trained with:
//
//   label row:      y1 y2 y3 -1 -1
//   decoder input:  SOS y1 y2 y3        (padded with EOS)
//   gold output:    y1 y2 y3 EOS        (padded with IGNORE_ID)
//
// Both results share one [batch, max_len + 1] shape.

use burn::prelude::*;

use crate::domain::tokens::{SpecialTokens, IGNORE_ID};

/// Decoder input and gold rows, padded to a common width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderTargets {
    pub input: Vec<Vec<i64>>,
    pub gold:  Vec<Vec<i64>>,
}

impl DecoderTargets {
    /// Build targets from label rows padded with IGNORE_ID.
    pub fn from_padded(rows: &[Vec<i64>], tokens: SpecialTokens) -> Self {
        let unpadded: Vec<Vec<i64>> = rows
            .iter()
            .map(|row| row.iter().copied().filter(|&id| id != IGNORE_ID).collect())
            .collect();

        let mut input: Vec<Vec<i64>> = unpadded
            .iter()
            .map(|y| std::iter::once(tokens.sos()).chain(y.iter().copied()).collect())
            .collect();
        let mut gold: Vec<Vec<i64>> = unpadded
            .iter()
            .map(|y| y.iter().copied().chain(std::iter::once(tokens.eos())).collect())
            .collect();

        let width = input.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut input {
            row.resize(width, tokens.eos());
        }
        for row in &mut gold {
            row.resize(width, IGNORE_ID);
        }

        assert_eq!(input.len(), gold.len());
        assert!(input.iter().zip(&gold).all(|(i, g)| i.len() == g.len()));

        Self { input, gold }
    }

    /// Read label rows out of a `[B, T]` int tensor.
    pub fn from_tensor<B: Backend>(padded: Tensor<B, 2, Int>, tokens: SpecialTokens) -> Self {
        let [_, width] = padded.dims();
        let flat: Vec<i64> = padded.into_data().iter::<i64>().collect();
        let rows: Vec<Vec<i64>> = if width == 0 {
            Vec::new()
        } else {
            flat.chunks(width).map(<[i64]>::to_vec).collect()
        };
        Self::from_padded(&rows, tokens)
    }

    pub fn batch_size(&self) -> usize {
        self.input.len()
    }

    pub fn width(&self) -> usize {
        self.input.first().map_or(0, Vec::len)
    }

    /// Stack both matrices into `[B, T]` int tensors (input, gold).
    pub fn to_tensors<B: Backend>(&self, device: &B::Device) -> (Tensor<B, 2, Int>, Tensor<B, 2, Int>) {
        let shape = [self.batch_size(), self.width()];
        let stack = |rows: &[Vec<i64>]| {
            let flat: Vec<i64> = rows.iter().flatten().copied().collect();
            Tensor::<B, 2, Int>::from_ints(TensorData::new(flat, shape), device)
        };
        (stack(&self.input), stack(&self.gold))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    const SOS: u32 = 1;
    const EOS: u32 = 2;

    fn tokens() -> SpecialTokens {
        SpecialTokens::new(SOS, EOS)
    }

    #[test]
    fn test_prepends_sos_and_appends_eos() {
        let rows = vec![vec![5, 6, 7], vec![8, -1, -1]];
        let t = DecoderTargets::from_padded(&rows, tokens());

        assert_eq!(t.input, vec![vec![1, 5, 6, 7], vec![1, 8, 2, 2]]);
        assert_eq!(t.gold,  vec![vec![5, 6, 7, 2], vec![8, 2, -1, -1]]);
    }

    #[test]
    fn test_input_and_gold_share_shape() {
        let rows = vec![vec![5, -1, -1, -1], vec![5, 6, -1, -1], vec![3, 4, 5, 6]];
        let t = DecoderTargets::from_padded(&rows, tokens());

        assert_eq!(t.input.len(), t.gold.len());
        for (i, g) in t.input.iter().zip(&t.gold) {
            assert_eq!(i.len(), 5);
            assert_eq!(g.len(), 5);
        }
    }

    #[test]
    fn test_tensor_round_trip_shapes() {
        let device = Default::default();
        let padded = Tensor::<NdArray, 2, Int>::from_ints([[5, 6], [7, -1]], &device);
        let t = DecoderTargets::from_tensor(padded, tokens());
        let (input, gold) = t.to_tensors::<NdArray>(&device);

        assert_eq!(input.dims(), [2, 3]);
        assert_eq!(gold.dims(), [2, 3]);
        let gold: Vec<i64> = gold.into_data().iter::<i64>().collect();
        assert_eq!(gold, vec![5, 6, 2, 7, 2, -1]);
    }
}
