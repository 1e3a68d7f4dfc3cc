// ============================================================
// Layer 5b — Answer Assembler
// ============================================================
// Runs the decoding pipeline once per question:
//
//   Example ──► first Feature ──► RawResult (by unique_id)
//       │
//       ▼
//   best_indexes (start) × best_indexes (end)
//       │
//       ▼
//   admissible_spans ──► select_span ──► TextProjector
//       │
//       ▼
//   Predictions[qas_id] = (question, answer)
//
// Only the FIRST feature of each example is decoded, even when a
// long passage was split into several windows.
//
// A feature whose RawResult is missing aborts the whole batch:
// it means tokenisation and inference ran over different inputs.
// Everything else (no admissible span, failed alignment) still
// produces an answer entry, possibly empty.

use std::collections::HashMap;

use anyhow::Context;

use crate::domain::{Answer, Example, Feature, Predictions, RawResult, SpanScorer};
use crate::postprocess::candidates::best_indexes;
use crate::postprocess::error::{DecodeError, DecodeResult};
use crate::postprocess::projector::TextProjector;
use crate::postprocess::spans::{admissible_spans, select_span};
use crate::postprocess::DecodeConfig;

pub struct AnswerAssembler {
    config:    DecodeConfig,
    projector: TextProjector,
}

impl AnswerAssembler {
    pub fn new(config: DecodeConfig) -> Self {
        let projector = TextProjector::new(config.do_lower_case);
        Self { config, projector }
    }

    /// Decode one answer per example, in example order.
    pub fn assemble(
        &self,
        examples: &[Example],
        features: &[Feature],
        results:  &[RawResult],
    ) -> DecodeResult<Predictions> {
        let features_by_example = group_by_example(features);
        let results_by_id: HashMap<u64, &RawResult> =
            results.iter().map(|r| (r.unique_id, r)).collect();

        let mut predictions = Predictions::new();

        for (example_index, example) in examples.iter().enumerate() {
            let windows = features_by_example
                .get(&example_index)
                .ok_or_else(|| DecodeError::MissingFeatures {
                    qas_id: example.qas_id.clone(),
                    example_index,
                })?;
            let feature = windows[0];

            if windows.len() > 1 {
                tracing::debug!(
                    qas_id = %example.qas_id,
                    windows = windows.len(),
                    "decoding first window only"
                );
            }

            let result = results_by_id
                .get(&feature.unique_id)
                .ok_or(DecodeError::MissingResult { unique_id: feature.unique_id })?;

            let answer = self.decode_feature(example, feature, result)?;
            tracing::debug!(qas_id = %example.qas_id, answer = %answer, "decoded");

            predictions.insert(Answer::new(
                example.qas_id.clone(),
                example.question_text.clone(),
                answer,
            ));
        }

        Ok(predictions)
    }

    /// Answer text for one feature and its logits. Empty when no
    /// span is admissible or the span starts at [CLS].
    ///
    /// Both logit vectors must have the same length and cover every
    /// token of the feature.
    pub fn decode_feature(
        &self,
        example: &Example,
        feature: &Feature,
        result:  &RawResult,
    ) -> DecodeResult<String> {
        let start_len = result.start_logits.len();
        let end_len   = result.end_logits.len();
        if start_len != end_len || start_len < feature.tokens.len() {
            return Err(DecodeError::LogitLengthMismatch {
                unique_id:  result.unique_id,
                start_len,
                end_len,
                num_tokens: feature.tokens.len(),
            });
        }

        let start_indexes = best_indexes(&result.start_logits, self.config.n_best_size);
        let end_indexes   = best_indexes(&result.end_logits, self.config.n_best_size);

        let spans = admissible_spans(
            0,
            feature,
            &start_indexes,
            &end_indexes,
            &result.start_logits,
            &result.end_logits,
            self.config.max_answer_length,
        );

        Ok(match select_span(&spans) {
            Some(span) => self.projector.project(example, feature, span.start_index, span.end_index),
            None => {
                tracing::debug!(qas_id = %example.qas_id, "no admissible span");
                String::new()
            }
        })
    }

    /// Score the decoded features with `scorer`, then assemble.
    ///
    /// Only the first feature of each example is sent to the scorer.
    pub fn predict<S: SpanScorer + ?Sized>(
        &self,
        scorer:   &S,
        examples: &[Example],
        features: &[Feature],
    ) -> anyhow::Result<Predictions> {
        let features_by_example = group_by_example(features);

        let mut results = Vec::with_capacity(examples.len());
        for example_index in 0..examples.len() {
            let Some(windows) = features_by_example.get(&example_index) else {
                continue;
            };
            let feature = windows[0];
            let result = scorer
                .score(feature)
                .with_context(|| format!("inference failed for feature {}", feature.unique_id))?;
            results.push(result);
        }
        tracing::info!("Scored {} features", results.len());

        Ok(self.assemble(examples, features, &results)?)
    }
}

/// Decode with a one-off assembler.
pub fn assemble(
    examples: &[Example],
    features: &[Feature],
    results:  &[RawResult],
    config:   &DecodeConfig,
) -> DecodeResult<Predictions> {
    AnswerAssembler::new(config.clone()).assemble(examples, features, results)
}

/// example_index → features in input order (never empty)
fn group_by_example(features: &[Feature]) -> HashMap<usize, Vec<&Feature>> {
    let mut grouped: HashMap<usize, Vec<&Feature>> = HashMap::new();
    for feature in features {
        grouped.entry(feature.example_index).or_default().push(feature);
    }
    grouped
}
