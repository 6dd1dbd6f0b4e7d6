// ============================================================
// Layer 5 — Masked Transformer Decoder
// ============================================================
// Decoder half of an encoder-decoder Transformer.
//
//   padded labels ──► preprocess ──► ys_in  [B, T]   gold [B, T]
//                                       │
//             embedding · scale + sinusoids, dropout
//                                       │
//          ┌────────── DecoderBlock × n_layers ──────────┐
//          │  masked self-attention   → × non_pad        │
//          │  cross-attention (enc)   → × non_pad        │
//          │  feed-forward            → × non_pad        │
//          └─────────────────────────────────────────────┘
//                                       │
//                         output projection ──► logits [B, T, V]
//
// Weight sharing: when enabled there is no separate projection
// layer. `project` multiplies by the embedding table itself and
// scales by d_model^-0.5; the embedding lookup is scaled the same.
//
// Reference: Vaswani et al. (2017) Attention Is All You Need
//            Press & Wolf (2017) Using the Output Embedding to
//            Improve Language Models

use burn::{
    nn::{
        attention::{MhaInput, MultiHeadAttention, MultiHeadAttentionConfig},
        Dropout, DropoutConfig,
        Embedding, EmbeddingConfig,
        Initializer,
        LayerNorm, LayerNormConfig,
        Linear, LinearConfig,
        PositionalEncoding, PositionalEncodingConfig,
    },
    prelude::*,
    tensor::activation::{log_softmax, relu},
};

use crate::data::targets::DecoderTargets;
use crate::domain::tokens::{SpecialTokens, IGNORE_ID};
use crate::ml::masks;

// #[derive(Config)] already provides Clone and Serialize/Deserialize.
#[derive(Config, Debug)]
pub struct DecoderConfig {
    pub vocab_size: usize,
    pub sos_id:     u32,
    pub eos_id:     u32,
    #[config(default = 512)]
    pub d_model:    usize,
    #[config(default = 6)]
    pub n_layers:   usize,
    #[config(default = 8)]
    pub n_heads:    usize,
    #[config(default = 2048)]
    pub d_inner:    usize,
    #[config(default = 0.1)]
    pub dropout:    f64,
    /// Tie the output projection to the embedding table.
    #[config(default = true)]
    pub share_weights: bool,
    /// Longest sequence the positional table covers.
    #[config(default = 5000)]
    pub pe_maxlen:  usize,
}

impl DecoderConfig {
    pub fn special_tokens(&self) -> SpecialTokens {
        SpecialTokens::new(self.sos_id, self.eos_id)
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> Decoder<B> {
        let token_embedding     = EmbeddingConfig::new(self.vocab_size, self.d_model).init(device);
        let positional_encoding = PositionalEncodingConfig::new(self.d_model)
            .with_max_sequence_size(self.pe_maxlen)
            .init(device);
        let layers: Vec<DecoderBlock<B>> = (0..self.n_layers)
            .map(|_| self.build_decoder_block(device))
            .collect();

        let (output_projection, logit_scale) = if self.share_weights {
            (None, (self.d_model as f64).powf(-0.5))
        } else {
            let linear = LinearConfig::new(self.d_model, self.vocab_size)
                .with_bias(false)
                .with_initializer(Initializer::XavierNormal { gain: 1.0 })
                .init(device);
            (Some(linear), 1.0)
        };

        Decoder {
            token_embedding,
            positional_encoding,
            layers,
            output_projection,
            dropout: DropoutConfig::new(self.dropout).init(),
            sos_id:  self.sos_id,
            eos_id:  self.eos_id,
            d_model: self.d_model,
            pe_maxlen: self.pe_maxlen,
            logit_scale,
        }
    }

    fn build_decoder_block<B: Backend>(&self, device: &B::Device) -> DecoderBlock<B> {
        let attention = || {
            MultiHeadAttentionConfig::new(self.d_model, self.n_heads)
                .with_dropout(self.dropout)
                .init(device)
        };
        DecoderBlock {
            self_attn:   attention(),
            cross_attn:  attention(),
            ffn_linear1: LinearConfig::new(self.d_model, self.d_inner).init(device),
            ffn_linear2: LinearConfig::new(self.d_inner, self.d_model).init(device),
            norm_self:   LayerNormConfig::new(self.d_model).init(device),
            norm_cross:  LayerNormConfig::new(self.d_model).init(device),
            norm_ffn:    LayerNormConfig::new(self.d_model).init(device),
            dropout:     DropoutConfig::new(self.dropout).init(),
        }
    }
}

// ─── Decoder block ────────────────────────────────────────────────────────────

/// Masks shared by every block of one forward pass.
pub struct BlockMasks<B: Backend> {
    /// `[B, T, 1]`, None when no position is padding
    pub non_pad:    Option<Tensor<B, 3>>,
    /// `[B, T, T]`
    pub self_mask:  Tensor<B, 3, Bool>,
    /// `[B, T, S]`, None when every encoder position is valid
    pub cross_mask: Option<Tensor<B, 3, Bool>>,
}

impl<B: Backend> BlockMasks<B> {
    fn keep_real(&self, x: Tensor<B, 3>) -> Tensor<B, 3> {
        match &self.non_pad {
            Some(mask) => {
                let dims = x.dims();
                x * mask.clone().expand(dims)
            }
            None => x,
        }
    }
}

pub struct BlockOutput<B: Backend> {
    pub states:     Tensor<B, 3>,
    /// `[B, heads, T, T]`
    pub self_attn:  Tensor<B, 4>,
    /// `[B, heads, T, S]`
    pub cross_attn: Tensor<B, 4>,
}

#[derive(Module, Debug)]
pub struct DecoderBlock<B: Backend> {
    pub self_attn:   MultiHeadAttention<B>,
    pub cross_attn:  MultiHeadAttention<B>,
    pub ffn_linear1: Linear<B>,
    pub ffn_linear2: Linear<B>,
    pub norm_self:   LayerNorm<B>,
    pub norm_cross:  LayerNorm<B>,
    pub norm_ffn:    LayerNorm<B>,
    pub dropout:     Dropout,
}

impl<B: Backend> DecoderBlock<B> {
    pub fn forward(&self, x: Tensor<B, 3>, memory: Tensor<B, 3>, masks: &BlockMasks<B>) -> BlockOutput<B> {
        // Masked self-attention
        let attn = self.self_attn.forward(
            MhaInput::self_attn(x.clone()).mask_attn(masks.self_mask.clone()),
        );
        let x = self.norm_self.forward(x + self.dropout.forward(attn.context));
        let x = masks.keep_real(x);

        // Cross-attention over encoder states
        let mut cross_input = MhaInput::new(x.clone(), memory.clone(), memory);
        if let Some(mask) = &masks.cross_mask {
            cross_input = cross_input.mask_attn(mask.clone());
        }
        let cross = self.cross_attn.forward(cross_input);
        let x = self.norm_cross.forward(x + self.dropout.forward(cross.context));
        let x = masks.keep_real(x);

        // Position-wise feed-forward
        let ffn_out = self.ffn_linear2.forward(relu(self.ffn_linear1.forward(x.clone())));
        let x = self.norm_ffn.forward(x + self.dropout.forward(ffn_out));
        let states = masks.keep_real(x);

        BlockOutput { states, self_attn: attn.weights, cross_attn: cross.weights }
    }
}

// ─── Decoder ──────────────────────────────────────────────────────────────────

#[derive(Module, Debug)]
pub struct Decoder<B: Backend> {
    pub token_embedding:     Embedding<B>,
    pub positional_encoding: PositionalEncoding<B>,
    pub layers:              Vec<DecoderBlock<B>>,
    /// None when the projection is tied to `token_embedding`
    pub output_projection:   Option<Linear<B>>,
    pub dropout:             Dropout,
    pub sos_id:              u32,
    pub eos_id:              u32,
    pub d_model:             usize,
    /// Longest decoder input the positional table covers
    pub pe_maxlen:           usize,
    pub logit_scale:         f64,
}

/// Training-time result of one forward pass.
pub struct DecoderOutput<B: Backend> {
    /// `[B, T, V]`, before softmax
    pub logits: Tensor<B, 3>,
    /// `[B, T]`, padded with IGNORE_ID
    pub gold:   Tensor<B, 2, Int>,
}

/// Per-layer attention weights, in layer order.
pub struct DecoderAttentions<B: Backend> {
    pub self_attns:  Vec<Tensor<B, 4>>,
    pub cross_attns: Vec<Tensor<B, 4>>,
}

pub struct DecoderLoss<B: Backend> {
    /// Mean token cross-entropy over non-ignored positions
    pub loss:      Tensor<B, 1>,
    pub n_correct: usize,
    pub n_tokens:  usize,
}

impl<B: Backend> DecoderOutput<B> {
    /// Cross-entropy against `gold`, skipping IGNORE_ID positions.
    pub fn loss(&self) -> DecoderLoss<B> {
        let [batch, len, vocab] = self.logits.dims();
        let rows = batch * len;

        let log_probs = log_softmax(self.logits.clone().reshape([rows, vocab]), 1);
        let gold      = self.gold.clone().reshape([rows]);
        let valid     = gold.clone().not_equal_elem(IGNORE_ID);

        // IGNORE_ID cannot index a row; those picks are masked out below
        let index  = gold.clone().clamp_min(0).reshape([rows, 1]);
        let picked = log_probs.clone().gather(1, index).reshape([rows]);

        let valid_f  = valid.clone().float();
        let n_tokens = valid.clone().int().sum().into_scalar().elem::<i64>() as usize;
        let loss     = -(picked * valid_f).sum() / (n_tokens.max(1) as f64);

        let predicted = log_probs.argmax(1).reshape([rows]);
        let n_correct = predicted
            .equal(gold)
            .int()
            .mul(valid.int())
            .sum()
            .into_scalar()
            .elem::<i64>() as usize;

        DecoderLoss { loss, n_correct, n_tokens }
    }
}

impl<B: Backend> Decoder<B> {
    pub fn special_tokens(&self) -> SpecialTokens {
        SpecialTokens::new(self.sos_id, self.eos_id)
    }

    pub fn vocab_size(&self) -> usize {
        self.token_embedding.weight.dims()[0]
    }

    /// Split padded labels into (SOS ++ y, y ++ EOS), both `[B, T]`.
    pub fn preprocess(&self, padded: Tensor<B, 2, Int>) -> (Tensor<B, 2, Int>, Tensor<B, 2, Int>) {
        let device  = padded.device();
        let targets = DecoderTargets::from_tensor(padded, self.special_tokens());
        targets.to_tensors::<B>(&device)
    }

    /// padded: [B, T_lab], encoder_out: [B, S, H] → logits [B, T, V], gold [B, T]
    pub fn forward(
        &self,
        padded:          Tensor<B, 2, Int>,
        encoder_out:     Tensor<B, 3>,
        encoder_lengths: &[usize],
    ) -> DecoderOutput<B> {
        self.run(padded, encoder_out, encoder_lengths, false).0
    }

    /// `forward`, also returning every layer's attention weights.
    pub fn forward_with_attentions(
        &self,
        padded:          Tensor<B, 2, Int>,
        encoder_out:     Tensor<B, 3>,
        encoder_lengths: &[usize],
    ) -> (DecoderOutput<B>, DecoderAttentions<B>) {
        self.run(padded, encoder_out, encoder_lengths, true)
    }

    fn run(
        &self,
        padded:          Tensor<B, 2, Int>,
        encoder_out:     Tensor<B, 3>,
        encoder_lengths: &[usize],
        keep_attns:      bool,
    ) -> (DecoderOutput<B>, DecoderAttentions<B>) {
        let (ys_in, gold) = self.preprocess(padded);
        let [batch, dec_len] = ys_in.dims();
        let [_, enc_len, _]  = encoder_out.dims();
        let pad = i64::from(self.eos_id);

        assert_eq!(
            encoder_lengths.len(), batch,
            "one encoder length per batch row expected"
        );
        assert!(
            dec_len <= self.pe_maxlen,
            "decoder input of length {dec_len} exceeds pe_maxlen {}", self.pe_maxlen
        );

        let block_masks = BlockMasks {
            non_pad:    Some(masks::non_pad_mask(ys_in.clone(), pad)),
            self_mask:  masks::self_attn_mask(ys_in.clone(), pad),
            cross_mask: Some(masks::encoder_pad_mask::<B>(
                encoder_lengths, enc_len, dec_len, &encoder_out.device(),
            )),
        };

        let mut attns = DecoderAttentions { self_attns: Vec::new(), cross_attns: Vec::new() };
        let mut x = self.embed(ys_in);
        for layer in &self.layers {
            let out = layer.forward(x, encoder_out.clone(), &block_masks);
            if keep_attns {
                attns.self_attns.push(out.self_attn);
                attns.cross_attns.push(out.cross_attn);
            }
            x = out.states;
        }

        let logits = self.project(x);
        (DecoderOutput { logits, gold }, attns)
    }

    /// Log-probabilities of the token after `prefix`, for a single
    /// unpadded hypothesis. encoder_out: [S, H] → [V]
    pub fn step_log_probs(&self, prefix: &[u32], encoder_out: Tensor<B, 2>) -> Tensor<B, 1> {
        assert!(!prefix.is_empty(), "prefix must contain at least SOS");
        let device = encoder_out.device();
        let len    = prefix.len();
        assert!(
            len <= self.pe_maxlen,
            "prefix of length {len} exceeds pe_maxlen {}", self.pe_maxlen
        );

        let ids: Vec<i64> = prefix.iter().map(|&id| i64::from(id)).collect();
        let ys = Tensor::<B, 2, Int>::from_ints(TensorData::new(ids, [1, len]), &device);

        // no padding in a single hypothesis: causal mask only
        let block_masks = BlockMasks {
            non_pad:    None,
            self_mask:  masks::subsequent_mask(&ys),
            cross_mask: None,
        };

        let memory = encoder_out.unsqueeze::<3>();
        let mut x  = self.embed(ys);
        for layer in &self.layers {
            x = layer.forward(x, memory.clone(), &block_masks).states;
        }

        let last   = x.slice([0..1, len - 1..len, 0..self.d_model]);
        let logits = self.project(last).reshape([1, self.vocab_size()]);
        log_softmax(logits, 1).reshape([self.vocab_size()])
    }

    fn embed(&self, ys_in: Tensor<B, 2, Int>) -> Tensor<B, 3> {
        let emb = self.token_embedding.forward(ys_in).mul_scalar(self.logit_scale);
        self.dropout.forward(self.positional_encoding.forward(emb))
    }

    /// Map decoder states [B, T, H] to vocabulary logits [B, T, V].
    pub fn project(&self, states: Tensor<B, 3>) -> Tensor<B, 3> {
        match &self.output_projection {
            Some(linear) => linear.forward(states),
            None => {
                let [batch, len, hidden] = states.dims();
                let table = self.token_embedding.weight.val();
                let vocab = table.dims()[0];
                states
                    .reshape([batch * len, hidden])
                    .matmul(table.transpose())
                    .reshape([batch, len, vocab])
                    .mul_scalar(self.logit_scale)
            }
        }
    }

    /// The matrix `project` multiplies by, laid out `[V, H]`.
    pub fn projection_weight(&self) -> Tensor<B, 2> {
        match &self.output_projection {
            Some(linear) => linear.weight.val().transpose(),
            None => self.token_embedding.weight.val(),
        }
    }
}
