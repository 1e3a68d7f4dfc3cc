// ============================================================
// Layer 5b — Span Validator and Span Selector
// ============================================================
// Every (start candidate, end candidate) pair is a potential
// answer span. Most pairs cannot be answers (an end before its
// start, a start inside the question), so each pair is checked
// against the Feature before it becomes a PrelimPrediction.
//
// Checks, in order:
//   1. both indices inside the window's token list
//   2. both indices map back to an original doc token
//   3. the window owns the start token (max-context flag)
//   4. end >= start
//   5. span length < max_answer_length
//
// Survivors keep generation order: start-candidate-major,
// end-candidate-minor. The selector takes the FIRST survivor,
// not the one with the highest combined logit.

use crate::domain::Feature;

/// A span that passed every validity check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrelimPrediction {
    pub feature_index: usize,
    pub start_index:   usize,
    pub end_index:     usize,
    pub start_logit:   f32,
    pub end_logit:     f32,
}

impl PrelimPrediction {
    /// Combined span score
    pub fn score(&self) -> f32 {
        self.start_logit + self.end_logit
    }

    /// Number of tokens in the span
    pub fn span_length(&self) -> usize {
        self.end_index - self.start_index + 1
    }
}

/// Filter the cross product of start × end candidates down to
/// admissible spans.
///
/// Candidate indices must index into the logit slices; they come
/// from [`best_indexes`](super::candidates::best_indexes) over
/// those same slices.
pub fn admissible_spans(
    feature_index:     usize,
    feature:           &Feature,
    start_indexes:     &[usize],
    end_indexes:       &[usize],
    start_logits:      &[f32],
    end_logits:        &[f32],
    max_answer_length: usize,
) -> Vec<PrelimPrediction> {
    let num_tokens = feature.tokens.len();
    let mut spans  = Vec::new();

    for &start_index in start_indexes {
        for &end_index in end_indexes {
            // Positions past the window are padding
            if start_index >= num_tokens || end_index >= num_tokens {
                continue;
            }
            // Question and special tokens never map back to the document
            if feature.orig_index(start_index).is_none()
                || feature.orig_index(end_index).is_none()
            {
                continue;
            }
            // Another window sees this token with more context
            if !feature.is_max_context(start_index) {
                continue;
            }
            if end_index < start_index {
                continue;
            }
            if end_index - start_index + 1 >= max_answer_length {
                continue;
            }

            let (Some(&start_logit), Some(&end_logit)) =
                (start_logits.get(start_index), end_logits.get(end_index))
            else {
                continue;
            };

            spans.push(PrelimPrediction {
                feature_index,
                start_index,
                end_index,
                start_logit,
                end_logit,
            });
        }
    }

    spans
}

/// Pick the answer span: the first admissible span in generation
/// order, or None when nothing survived validation.
///
/// The pick is positional and never consults `score()`: the
/// best-ranked admissible start wins, then its best-ranked end.
pub fn select_span(spans: &[PrelimPrediction]) -> Option<PrelimPrediction> {
    spans.first().copied()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    /// [CLS] q q [SEP] d0 d1 d2 d3 [SEP], doc tokens at positions 4..=7
    fn feature() -> Feature {
        let tokens: Vec<String> = ["[CLS]", "who", "?", "[SEP]", "a", "b", "c", "d", "[SEP]"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        Feature {
            unique_id:            1_000_000_000,
            example_index:        0,
            doc_span_index:       0,
            tokens,
            token_to_orig_map:    (4..=7).map(|i| (i, i - 4)).collect(),
            token_is_max_context: (4..=7).map(|i| (i, true)).collect(),
            input_ids:            Vec::new(),
            input_mask:           Vec::new(),
            segment_ids:          Vec::new(),
        }
    }

    fn logits() -> Vec<f32> {
        (0..16).map(|i| i as f32 * 0.1).collect()
    }

    #[test]
    fn test_keeps_generation_order() {
        let f = feature();
        let l = logits();
        let spans = admissible_spans(0, &f, &[5, 4], &[6, 5], &l, &l, 30);
        let pairs: Vec<(usize, usize)> = spans.iter().map(|s| (s.start_index, s.end_index)).collect();
        assert_eq!(pairs, vec![(5, 6), (5, 5), (4, 6), (4, 5)]);
    }

    #[test]
    fn test_rejects_out_of_window_and_unmapped() {
        let f = feature();
        let l = logits();
        // 12 is past the 9-token window, 0..=3 and 8 have no orig mapping
        let spans = admissible_spans(0, &f, &[12, 0, 2, 8], &[5, 6, 12], &l, &l, 30);
        assert!(spans.is_empty());
    }

    #[test]
    fn test_rejects_end_before_start() {
        let f = feature();
        let l = logits();
        let spans = admissible_spans(0, &f, &[6], &[4, 5], &l, &l, 30);
        assert!(spans.is_empty());
    }

    #[test]
    fn test_length_limit_is_strict() {
        let f = feature();
        let l = logits();
        // span 4..=6 has length 3: rejected with limit 3, kept with limit 4
        assert!(admissible_spans(0, &f, &[4], &[6], &l, &l, 3).is_empty());
        assert_eq!(admissible_spans(0, &f, &[4], &[6], &l, &l, 4).len(), 1);
    }

    #[test]
    fn test_rejects_start_without_max_context() {
        let mut f = feature();
        f.token_is_max_context.insert(5, false);
        let l = logits();
        let spans = admissible_spans(0, &f, &[5, 6], &[7], &l, &l, 30);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].start_index, 6);
    }

    #[test]
    fn test_missing_max_context_flag_counts_as_false() {
        let mut f = feature();
        f.token_is_max_context = HashMap::from([(6, true)]);
        let l = logits();
        let spans = admissible_spans(0, &f, &[4, 6], &[7], &l, &l, 30);
        assert_eq!(spans.iter().map(|s| s.start_index).collect::<Vec<_>>(), vec![6]);
    }

    #[test]
    fn test_every_span_is_valid() {
        let f = feature();
        let l = logits();
        let all: Vec<usize> = (0..16).collect();
        let spans = admissible_spans(0, &f, &all, &all, &l, &l, 3);
        assert!(!spans.is_empty());
        for s in &spans {
            assert!(s.start_index <= s.end_index);
            assert!(s.span_length() < 3);
            assert!(f.token_to_orig_map.contains_key(&s.start_index));
            assert!(f.token_to_orig_map.contains_key(&s.end_index));
        }
    }

    #[test]
    fn test_carries_logits_and_score() {
        let f = feature();
        let start: Vec<f32> = (0..9).map(|i| i as f32).collect();
        let end = vec![10.0; 9];
        let spans = admissible_spans(3, &f, &[5], &[7], &start, &end, 30);
        assert_eq!(spans[0].feature_index, 3);
        assert_eq!(spans[0].start_logit, 5.0);
        assert_eq!(spans[0].end_logit, 10.0);
        assert_eq!(spans[0].score(), 15.0);
    }

    #[test]
    fn test_select_first_not_best_scored() {
        let first = PrelimPrediction {
            feature_index: 0, start_index: 4, end_index: 4, start_logit: 1.0, end_logit: 1.0,
        };
        let better = PrelimPrediction {
            feature_index: 0, start_index: 5, end_index: 6, start_logit: 9.0, end_logit: 9.0,
        };
        assert_eq!(select_span(&[first, better]), Some(first));
        assert_eq!(select_span(&[]), None);
    }
}
