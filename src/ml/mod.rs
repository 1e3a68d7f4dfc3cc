// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All Burn framework code lives here. The rest of the crate
// sees the model only through the SpanScorer trait.
//
//   model.rs      — BERT-style encoder
//                   • Token, segment and position embeddings
//                   • Multi-head self-attention with padding mask
//                   • Feed-forward networks (GELU activation)
//                   • Post-norm residual blocks
//                   • Span head: start and end logit per token
//
//   inferencer.rs — Loads a checkpoint and turns one Feature
//                   into a RawResult on the NdArray CPU backend
//
// Reference: Burn Book §3 (Building Blocks)
//            Vaswani et al. (2017) Attention Is All You Need
//            Devlin et al. (2019) BERT

/// Span encoder architecture
pub mod model;

/// CPU inference engine implementing SpanScorer
pub mod inferencer;
