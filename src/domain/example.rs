// ============================================================
// Layer 3 — Example, Feature and RawResult Domain Types
// ============================================================
// The three records that flow through extractive Q&A:
//
//   Example   → one question against one context passage,
//               with the passage split into whitespace tokens
//   Feature   → one fixed-length WordPiece window over an
//               Example: [CLS] question [SEP] doc span [SEP]
//   RawResult → the model's per-position start/end logits
//               for one Feature, matched by unique_id
//
// A long passage produces several Features (sliding windows).
// The maps on Feature tie every window position back to the
// original whitespace token it came from.
//
// Reference: Devlin et al. (2019) BERT, §4.2 SQuAD v1.1

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One question over one context passage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Example {
    /// Question identifier from the request payload
    pub qas_id: String,

    /// The question exactly as it was asked
    pub question_text: String,

    /// The passage split on whitespace, NOT sub-word tokenised,
    /// so joining a range of these recovers the original casing,
    /// accents and punctuation
    pub doc_tokens: Vec<String>,
}

impl Example {
    pub fn new(
        qas_id:        impl Into<String>,
        question_text: impl Into<String>,
        doc_tokens:    Vec<String>,
    ) -> Self {
        Self {
            qas_id:        qas_id.into(),
            question_text: question_text.into(),
            doc_tokens,
        }
    }
}

/// One tokenised window over an [`Example`].
///
/// `token_to_orig_map` is partial: only positions inside the doc
/// span have an entry. Query and special-token positions do not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub unique_id:     u64,

    /// Index of the owning Example in the input order
    pub example_index: usize,

    /// Which window of the Example this is (0 for the first)
    #[serde(default)]
    pub doc_span_index: usize,

    /// WordPiece tokens, continuation pieces carry the `##` marker
    pub tokens: Vec<String>,

    /// Window position → index into `Example::doc_tokens`
    pub token_to_orig_map: HashMap<usize, usize>,

    /// Window position → true when this window gives the token
    /// its most surrounding context among overlapping windows
    pub token_is_max_context: HashMap<usize, bool>,

    // Model inputs, zero-padded to max_seq_length. Absent from
    // bundles exported after inference has already run.
    #[serde(default)]
    pub input_ids:   Vec<u32>,
    #[serde(default)]
    pub input_mask:  Vec<u32>,
    #[serde(default)]
    pub segment_ids: Vec<u32>,
}

impl Feature {
    /// True when the window owns position `index` (defaults to false
    /// for positions without a flag)
    pub fn is_max_context(&self, index: usize) -> bool {
        self.token_is_max_context.get(&index).copied().unwrap_or(false)
    }

    /// Original doc-token index for a window position, if it has one
    pub fn orig_index(&self, index: usize) -> Option<usize> {
        self.token_to_orig_map.get(&index).copied()
    }
}

/// Model output for one Feature. Both logit vectors are
/// max_seq_length long, one score per window position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawResult {
    pub unique_id:    u64,
    pub start_logits: Vec<f32>,
    pub end_logits:   Vec<f32>,
}

impl RawResult {
    pub fn new(unique_id: u64, start_logits: Vec<f32>, end_logits: Vec<f32>) -> Self {
        Self { unique_id, start_logits, end_logits }
    }
}
