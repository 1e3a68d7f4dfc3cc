use burn::{
    nn::{
        attention::{MhaInput, MultiHeadAttention, MultiHeadAttentionConfig},
        Embedding, EmbeddingConfig,
        LayerNorm, LayerNormConfig,
        Linear, LinearConfig,
    },
    prelude::*,
};

// #[derive(Config)] brings Clone and Serialize/Deserialize with it; adding
// them again gives conflicting impls.
#[derive(Config, Debug)]
pub struct SpanEncoderConfig {
    pub vocab_size:      usize,
    pub max_seq_len:     usize,
    pub type_vocab_size: usize,
    pub d_model:         usize,
    pub num_heads:       usize,
    pub num_layers:      usize,
    pub d_ff:            usize,
}

impl SpanEncoderConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> SpanEncoder<B> {
        let token_embedding    = EmbeddingConfig::new(self.vocab_size, self.d_model).init(device);
        let segment_embedding  = EmbeddingConfig::new(self.type_vocab_size, self.d_model).init(device);
        let position_embedding = EmbeddingConfig::new(self.max_seq_len, self.d_model).init(device);
        let embed_norm = LayerNormConfig::new(self.d_model).init(device);
        let layers: Vec<EncoderBlock<B>> = (0..self.num_layers)
            .map(|_| self.build_encoder_block(device))
            .collect();
        let span_head = LinearConfig::new(self.d_model, 2).init(device);
        SpanEncoder {
            token_embedding, segment_embedding, position_embedding,
            embed_norm, layers, span_head,
        }
    }

    fn build_encoder_block<B: Backend>(&self, device: &B::Device) -> EncoderBlock<B> {
        let self_attn   = MultiHeadAttentionConfig::new(self.d_model, self.num_heads).init(device);
        let ffn_linear1 = LinearConfig::new(self.d_model, self.d_ff).init(device);
        let ffn_linear2 = LinearConfig::new(self.d_ff, self.d_model).init(device);
        let norm1 = LayerNormConfig::new(self.d_model).init(device);
        let norm2 = LayerNormConfig::new(self.d_model).init(device);
        EncoderBlock { self_attn, ffn_linear1, ffn_linear2, norm1, norm2 }
    }
}

#[derive(Module, Debug)]
pub struct EncoderBlock<B: Backend> {
    pub self_attn:   MultiHeadAttention<B>,
    pub ffn_linear1: Linear<B>,
    pub ffn_linear2: Linear<B>,
    pub norm1:       LayerNorm<B>,
    pub norm2:       LayerNorm<B>,
}

impl<B: Backend> EncoderBlock<B> {
    /// `pad_mask` is true at padding positions, which attention ignores.
    pub fn forward(&self, x: Tensor<B, 3>, pad_mask: Tensor<B, 2, Bool>) -> Tensor<B, 3> {
        let attn_input  = MhaInput::self_attn(x.clone()).mask_pad(pad_mask);
        let attn_output = self.self_attn.forward(attn_input).context;
        let x = self.norm1.forward(x + attn_output);
        let ffn_out = self.ffn_linear2.forward(
            burn::tensor::activation::gelu(self.ffn_linear1.forward(x.clone()))
        );
        self.norm2.forward(x + ffn_out)
    }
}

/// BERT-style encoder with a 2-way span head: one start and one
/// end logit per input position.
#[derive(Module, Debug)]
pub struct SpanEncoder<B: Backend> {
    pub token_embedding:    Embedding<B>,
    pub segment_embedding:  Embedding<B>,
    pub position_embedding: Embedding<B>,
    pub embed_norm:         LayerNorm<B>,
    pub layers:             Vec<EncoderBlock<B>>,
    pub span_head:          Linear<B>,
}

pub struct SpanLogits<B: Backend> {
    pub start_logits: Tensor<B, 2>,
    pub end_logits:   Tensor<B, 2>,
}

impl<B: Backend> SpanEncoder<B> {
    /// All inputs: [batch, seq_len] → start_logits, end_logits: [batch, seq_len]
    ///
    /// `input_mask` is 1 for real tokens and 0 for padding.
    pub fn forward(
        &self,
        input_ids:   Tensor<B, 2, Int>,
        segment_ids: Tensor<B, 2, Int>,
        input_mask:  Tensor<B, 2, Int>,
    ) -> SpanLogits<B> {
        let [batch_size, seq_len] = input_ids.dims();

        let tok_emb = self.token_embedding.forward(input_ids);
        let seg_emb = self.segment_embedding.forward(segment_ids);

        // Self-attention is permutation-invariant, so position must be injected explicitly.
        let positions = Tensor::<B, 1, Int>::arange(0..seq_len as i64, &tok_emb.device())
            .unsqueeze::<2>()
            .expand([batch_size, seq_len]);
        let pos_emb = self.position_embedding.forward(positions);

        let pad_mask = input_mask.equal_elem(0);

        let mut x = self.embed_norm.forward(tok_emb + seg_emb + pos_emb);
        for layer in &self.layers {
            x = layer.forward(x, pad_mask.clone());
        }

        // Project to 2 logits per token then split into start / end.
        let logits = self.span_head.forward(x); // [batch, seq_len, 2]
        let start_logits = logits.clone()
            .slice([0..batch_size, 0..seq_len, 0..1])
            .reshape([batch_size, seq_len]);
        let end_logits = logits
            .slice([0..batch_size, 0..seq_len, 1..2])
            .reshape([batch_size, seq_len]);

        SpanLogits { start_logits, end_logits }
    }
}
