// ============================================================
// Layer 5 — Attention Masks
// ============================================================
// Masks used by the decoder. Burn's MultiHeadAttention treats
// `true` as "blocked", so every Bool mask here follows that rule.
//
//   non_pad_mask      [B, T, 1]      float, 0.0 at pad positions
//   subsequent_mask   [B, T, T]      true where key j > query i
//   key_pad_mask      [B, T, T]      true where key j is pad
//   self_attn_mask    [B, T, T]      subsequent OR key_pad
//   encoder_pad_mask  [B, T_dec, S]  true where s >= encoder length
//
// Reference: Vaswani et al. (2017) §3.2.3 (masking in the decoder)

use burn::prelude::*;

/// 1.0 at real tokens, 0.0 where `ys_in == pad`. Shape `[B, T, 1]`.
pub fn non_pad_mask<B: Backend>(ys_in: Tensor<B, 2, Int>, pad: i64) -> Tensor<B, 3> {
    ys_in.not_equal_elem(pad).float().unsqueeze_dim::<3>(2)
}

/// Strictly upper-triangular causal mask, repeated over the batch.
pub fn subsequent_mask<B: Backend>(ys_in: &Tensor<B, 2, Int>) -> Tensor<B, 3, Bool> {
    let [batch, len] = ys_in.dims();
    // tril_mask leaves the lower triangle and diagonal false
    Tensor::<B, 2, Bool>::tril_mask([len, len], 0, &ys_in.device())
        .unsqueeze::<3>()
        .expand([batch, len, len])
}

/// Blocks every query from attending to pad keys.
pub fn key_pad_mask<B: Backend>(ys_in: Tensor<B, 2, Int>, pad: i64) -> Tensor<B, 3, Bool> {
    let [batch, len] = ys_in.dims();
    ys_in
        .equal_elem(pad)
        .unsqueeze_dim::<3>(1)
        .expand([batch, len, len])
}

/// Decoder self-attention mask: blocked if causal OR key-padding says so.
pub fn self_attn_mask<B: Backend>(ys_in: Tensor<B, 2, Int>, pad: i64) -> Tensor<B, 3, Bool> {
    let causal = subsequent_mask(&ys_in);
    key_pad_mask(ys_in, pad).bool_or(causal)
}

/// Cross-attention mask from valid encoder lengths, identical for all
/// `expand_len` decoder steps.
pub fn encoder_pad_mask<B: Backend>(
    lengths:    &[usize],
    enc_len:    usize,
    expand_len: usize,
    device:     &B::Device,
) -> Tensor<B, 3, Bool> {
    let flags: Vec<bool> = lengths
        .iter()
        .flat_map(|&valid| (0..enc_len).map(move |pos| pos >= valid))
        .collect();

    Tensor::<B, 3, Bool>::from_bool(TensorData::new(flags, [lengths.len(), 1, enc_len]), device)
        .expand([lengths.len(), expand_len, enc_len])
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TB = NdArray;

    fn bools(mask: Tensor<TB, 3, Bool>) -> Vec<bool> {
        mask.into_data().iter::<bool>().collect()
    }

    fn ys(rows: [[i64; 4]; 2]) -> Tensor<TB, 2, Int> {
        Tensor::<TB, 2, Int>::from_ints(rows, &Default::default())
    }

    #[test]
    fn test_subsequent_mask_is_strictly_upper_triangular() {
        let mask = bools(subsequent_mask(&ys([[1, 5, 6, 7], [1, 8, 2, 2]])));
        for b in 0..2 {
            for i in 0..4 {
                for j in 0..4 {
                    assert_eq!(mask[b * 16 + i * 4 + j], j > i, "b={b} i={i} j={j}");
                }
            }
        }
    }

    #[test]
    fn test_self_mask_is_union_of_causal_and_padding() {
        let input  = ys([[1, 5, 6, 7], [1, 8, 2, 2]]);
        let causal = bools(subsequent_mask(&input));
        let keypad = bools(key_pad_mask(input.clone(), 2));
        let joint  = bools(self_attn_mask(input, 2));

        for idx in 0..joint.len() {
            assert_eq!(joint[idx], causal[idx] || keypad[idx]);
        }
        // second row: query 3 is blocked from the past pad key 2
        assert!(joint[16 + 3 * 4 + 2]);
        assert!(!causal[16 + 3 * 4 + 2]);
    }

    #[test]
    fn test_non_pad_mask_zeroes_pad() {
        let mask = non_pad_mask(ys([[1, 5, 6, 7], [1, 8, 2, 2]]), 2);
        assert_eq!(mask.dims(), [2, 4, 1]);
        let vals: Vec<f32> = mask.into_data().iter::<f32>().collect();
        assert_eq!(vals, vec![1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_encoder_pad_mask_broadcasts_over_decoder_steps() {
        let mask = encoder_pad_mask::<TB>(&[3, 1], 3, 2, &Default::default());
        assert_eq!(mask.dims(), [2, 2, 3]);
        assert_eq!(
            bools(mask),
            vec![
                false, false, false,  false, false, false,
                false, true,  true,   false, true,  true,
            ]
        );
    }
}
