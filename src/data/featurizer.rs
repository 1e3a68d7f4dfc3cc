// ============================================================
// Layer 4 — Feature Builder
// ============================================================
// Converts Examples into fixed-length model inputs (Features).
//
// Sequence format:
//   [CLS] question pieces [SEP] document pieces [SEP] [PAD]...
//    seg 0     seg 0       seg 0     seg 1       seg 1   0
//
// Documents longer than the window are covered by overlapping
// doc spans ("sliding window"):
//
//   max_tokens_for_doc = max_seq_length - question_len - 3
//   span k starts where span k-1 started + min(length, doc_stride)
//
// A token that appears in several spans is "owned" by the span
// where it has the most context on both sides:
//
//   score = min(left_context, right_context) + 0.01 * span_length
//
// Only the owning span may start an answer at that token.
//
// Every doc-span position also records which original
// whitespace token it came from (token_to_orig_map), so the
// answer projector can recover the untouched original text.
//
// Reference: Devlin et al. (2019) BERT, §4.2
//            Rust Book §8 (Vectors), §13 (Iterators)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokenizers::Tokenizer;

use crate::domain::{Example, Feature};

/// First unique_id handed out; ids count up from here
pub const FIRST_UNIQUE_ID: u64 = 1_000_000_000;

/// Window and truncation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Total window length including special tokens and padding
    pub max_seq_length:   usize,
    /// Step between consecutive doc spans
    pub doc_stride:       usize,
    /// Questions are truncated to this many word pieces
    pub max_query_length: usize,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            max_seq_length:   384,
            doc_stride:       128,
            max_query_length: 64,
        }
    }
}

/// A contiguous range of document word pieces covered by one Feature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocSpan {
    pub start:  usize,
    pub length: usize,
}

pub struct FeatureBuilder<'a> {
    tokenizer: &'a Tokenizer,
    config:    FeatureConfig,
    cls_id:    u32,
    sep_id:    u32,
}

impl<'a> FeatureBuilder<'a> {
    /// Fails when the vocabulary lacks [CLS] or [SEP], or the
    /// window parameters cannot produce any feature.
    pub fn new(tokenizer: &'a Tokenizer, config: FeatureConfig) -> Result<Self> {
        let cls_id = tokenizer
            .token_to_id("[CLS]")
            .ok_or_else(|| anyhow::anyhow!("Vocabulary has no [CLS] token"))?;
        let sep_id = tokenizer
            .token_to_id("[SEP]")
            .ok_or_else(|| anyhow::anyhow!("Vocabulary has no [SEP] token"))?;

        if config.doc_stride == 0 {
            anyhow::bail!("doc_stride must be at least 1");
        }
        if config.max_seq_length <= config.max_query_length + 3 {
            anyhow::bail!(
                "max_seq_length ({}) must exceed max_query_length ({}) + 3",
                config.max_seq_length,
                config.max_query_length
            );
        }

        Ok(Self { tokenizer, config, cls_id, sep_id })
    }

    /// Build every Feature for every Example, in example order.
    pub fn build(&self, examples: &[Example]) -> Result<Vec<Feature>> {
        let mut features  = Vec::new();
        let mut unique_id = FIRST_UNIQUE_ID;

        for (example_index, example) in examples.iter().enumerate() {
            let (mut query_tokens, mut query_ids) = self.word_pieces(&example.question_text)?;
            query_tokens.truncate(self.config.max_query_length);
            query_ids.truncate(self.config.max_query_length);

            // Word-piece every original token, remembering where each piece came from
            let mut tok_to_orig_index = Vec::new();
            let mut doc_tokens        = Vec::new();
            let mut doc_ids           = Vec::new();
            for (orig_index, token) in example.doc_tokens.iter().enumerate() {
                let (pieces, ids) = self.word_pieces(token)?;
                tok_to_orig_index.extend(std::iter::repeat(orig_index).take(pieces.len()));
                doc_tokens.extend(pieces);
                doc_ids.extend(ids);
            }

            let max_tokens_for_doc = self.config.max_seq_length - query_tokens.len() - 3;
            let spans = doc_spans(doc_tokens.len(), max_tokens_for_doc, self.config.doc_stride);

            for (doc_span_index, span) in spans.iter().enumerate() {
                let mut tokens      = Vec::with_capacity(self.config.max_seq_length);
                let mut input_ids   = Vec::with_capacity(self.config.max_seq_length);
                let mut segment_ids = Vec::with_capacity(self.config.max_seq_length);
                let mut token_to_orig_map    = HashMap::new();
                let mut token_is_max_context = HashMap::new();

                tokens.push("[CLS]".to_string());
                input_ids.push(self.cls_id);
                segment_ids.push(0);

                tokens.extend(query_tokens.iter().cloned());
                input_ids.extend_from_slice(&query_ids);
                segment_ids.extend(std::iter::repeat(0).take(query_ids.len()));

                tokens.push("[SEP]".to_string());
                input_ids.push(self.sep_id);
                segment_ids.push(0);

                for split_index in span.start..span.start + span.length {
                    let position = tokens.len();
                    token_to_orig_map.insert(position, tok_to_orig_index[split_index]);
                    token_is_max_context
                        .insert(position, is_max_context(&spans, doc_span_index, split_index));

                    tokens.push(doc_tokens[split_index].clone());
                    input_ids.push(doc_ids[split_index]);
                    segment_ids.push(1);
                }

                tokens.push("[SEP]".to_string());
                input_ids.push(self.sep_id);
                segment_ids.push(1);

                // 1 for real tokens, 0 for padding
                let mut input_mask = vec![1u32; input_ids.len()];
                input_ids.resize(self.config.max_seq_length, 0);
                input_mask.resize(self.config.max_seq_length, 0);
                segment_ids.resize(self.config.max_seq_length, 0);

                features.push(Feature {
                    unique_id,
                    example_index,
                    doc_span_index,
                    tokens,
                    token_to_orig_map,
                    token_is_max_context,
                    input_ids,
                    input_mask,
                    segment_ids,
                });
                unique_id += 1;
            }
        }

        tracing::info!("Built {} features from {} questions", features.len(), examples.len());
        Ok(features)
    }

    /// WordPiece tokens and ids for a piece of text
    fn word_pieces(&self, text: &str) -> Result<(Vec<String>, Vec<u32>)> {
        let enc = self
            .tokenizer
            .encode(text, false)
            .map_err(|e| anyhow::anyhow!("Tokenise '{text}': {e}"))?;
        Ok((enc.get_tokens().to_vec(), enc.get_ids().to_vec()))
    }
}

/// Cover `total` word pieces with windows of at most `max_len`,
/// advancing by `min(length, stride)`.
///
/// An empty document still gets one empty span so every Example
/// produces at least one Feature.
pub fn doc_spans(total: usize, max_len: usize, stride: usize) -> Vec<DocSpan> {
    if total == 0 {
        return vec![DocSpan { start: 0, length: 0 }];
    }

    let mut spans = Vec::new();
    let mut start = 0usize;

    while start < total {
        let length = (total - start).min(max_len);
        spans.push(DocSpan { start, length });
        if start + length == total {
            break;
        }
        start += length.min(stride);
    }

    spans
}

/// True when span `current` is the best context for word piece `position`.
/// Earlier spans win ties.
pub fn is_max_context(spans: &[DocSpan], current: usize, position: usize) -> bool {
    let mut best: Option<(usize, f32)> = None;

    for (index, span) in spans.iter().enumerate() {
        if span.length == 0 {
            continue;
        }
        let end = span.start + span.length - 1;
        if position < span.start || position > end {
            continue;
        }
        let left  = position - span.start;
        let right = end - position;
        let score = left.min(right) as f32 + 0.01 * span.length as f32;

        if best.map_or(true, |(_, s)| score > s) {
            best = Some((index, score));
        }
    }

    best.map(|(index, _)| index) == Some(current)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::tokenizer_store::TokenizerStore;

    fn tokenizer() -> Tokenizer {
        let vocab: Vec<String> = [
            "[PAD]", "[UNK]", "[CLS]", "[SEP]", "[MASK]",
            "where", "was", "obama", "born", "?", "barack", "in", "hawaii", ".",
            "question", "##ing",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        TokenizerStore::from_vocab(&vocab, true).unwrap()
    }

    fn example() -> Example {
        Example::new(
            "q1",
            "Where was Obama born?",
            ["Barack", "Obama", "was", "born", "in", "Hawaii."]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        )
    }

    #[test]
    fn test_single_window_layout() {
        let tok = tokenizer();
        let config = FeatureConfig { max_seq_length: 24, doc_stride: 8, max_query_length: 10 };
        let features = FeatureBuilder::new(&tok, config).unwrap().build(&[example()]).unwrap();
        assert_eq!(features.len(), 1);

        let f = &features[0];
        assert_eq!(f.unique_id, FIRST_UNIQUE_ID);
        assert_eq!(
            f.tokens,
            vec![
                "[CLS]", "where", "was", "obama", "born", "?", "[SEP]",
                "barack", "obama", "was", "born", "in", "hawaii", ".", "[SEP]",
            ]
        );
        // "hawaii" and "." both come from the original "Hawaii."
        assert_eq!(f.orig_index(12), Some(5));
        assert_eq!(f.orig_index(13), Some(5));
        assert_eq!(f.orig_index(7), Some(0));
        assert_eq!(f.orig_index(0), None);
        assert_eq!(f.orig_index(6), None);
        assert!((7..14).all(|i| f.is_max_context(i)));

        assert_eq!(f.input_ids.len(), 24);
        assert_eq!(f.input_mask.iter().sum::<u32>(), 15);
        assert_eq!(&f.segment_ids[..7], &[0; 7]);
        assert_eq!(&f.segment_ids[7..15], &[1; 8]);
        assert_eq!(f.input_ids[0], 2);
        assert_eq!(f.input_ids[12], 12);
        assert_eq!(f.input_ids[15..], [0; 9]);
    }

    #[test]
    fn test_query_is_truncated() {
        let tok = tokenizer();
        let config = FeatureConfig { max_seq_length: 24, doc_stride: 8, max_query_length: 2 };
        let features = FeatureBuilder::new(&tok, config).unwrap().build(&[example()]).unwrap();
        assert_eq!(&features[0].tokens[..4], &["[CLS]", "where", "was", "[SEP]"]);
    }

    #[test]
    fn test_sliding_windows_and_ownership() {
        let tok = tokenizer();
        // 7 doc pieces, 5 query pieces → 12 - 5 - 3 = 4 pieces per window
        let config = FeatureConfig { max_seq_length: 12, doc_stride: 2, max_query_length: 5 };
        let features = FeatureBuilder::new(&tok, config).unwrap().build(&[example()]).unwrap();

        // spans: [0,4) [2,6) [4,7)
        assert_eq!(features.len(), 3);
        let ids: Vec<u64> = features.iter().map(|f| f.unique_id).collect();
        assert_eq!(ids, vec![FIRST_UNIQUE_ID, FIRST_UNIQUE_ID + 1, FIRST_UNIQUE_ID + 2]);
        assert!(features.iter().all(|f| f.example_index == 0));
        assert_eq!(features[2].doc_span_index, 2);

        // Piece 3 ("born") sits at position 10 of window 0 (left 3, right 0)
        // and position 8 of window 1 (left 1, right 2): window 1 owns it.
        assert!(!features[0].is_max_context(10));
        assert!(features[1].is_max_context(8));
        // Piece 2 ("was") has more context in window 0
        assert!(features[0].is_max_context(9));
        assert!(!features[1].is_max_context(7));
    }

    #[test]
    fn test_every_piece_has_exactly_one_owner() {
        let spans = doc_spans(20, 6, 3);
        for position in 0..20 {
            let owners = (0..spans.len()).filter(|&s| is_max_context(&spans, s, position)).count();
            assert_eq!(owners, 1, "piece {position}");
        }
    }

    #[test]
    fn test_doc_spans_cover_document() {
        assert_eq!(
            doc_spans(10, 4, 3),
            vec![
                DocSpan { start: 0, length: 4 },
                DocSpan { start: 3, length: 4 },
                DocSpan { start: 6, length: 4 },
            ]
        );
        assert_eq!(doc_spans(3, 4, 3), vec![DocSpan { start: 0, length: 3 }]);
        assert_eq!(doc_spans(0, 4, 3), vec![DocSpan { start: 0, length: 0 }]);
    }

    #[test]
    fn test_empty_context_still_yields_feature() {
        let tok = tokenizer();
        let empty = Example::new("q9", "Where?", Vec::new());
        let features = FeatureBuilder::new(&tok, FeatureConfig::default())
            .unwrap()
            .build(&[empty])
            .unwrap();
        assert_eq!(features.len(), 1);
        assert!(features[0].token_to_orig_map.is_empty());
    }

    #[test]
    fn test_rejects_bad_config() {
        let tok = tokenizer();
        let zero_stride = FeatureConfig { doc_stride: 0, ..FeatureConfig::default() };
        assert!(FeatureBuilder::new(&tok, zero_stride).is_err());
        let tiny = FeatureConfig { max_seq_length: 10, doc_stride: 4, max_query_length: 7 };
        assert!(FeatureBuilder::new(&tok, tiny).is_err());
    }
}
