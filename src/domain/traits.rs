// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The two external collaborators of the decoding core are
// expressed as traits so the core never depends on where
// questions come from or which model scores them:
//
//   ExampleSource → produces Examples (JSON payload, tests, ...)
//   SpanScorer    → the inference function Feature → RawResult
//
// The scorer is passed explicitly to the Answer Assembler
// rather than living in a process-wide model session, so two
// concurrent requests never share mutable state.
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;

use crate::domain::example::{Example, Feature, RawResult};

// ─── ExampleSource ────────────────────────────────────────────────────────────
/// Any component that can produce questions with their passages.
///
/// Implementations:
///   - SquadLoader → parses a `{"data": [...]}` payload
pub trait ExampleSource {
    /// Load every Example, in payload order
    fn load_all(&self) -> Result<Vec<Example>>;
}

// ─── SpanScorer ───────────────────────────────────────────────────────────────
/// Any component that turns one tokenised Feature into start/end logits.
///
/// Implementations:
///   - Inferencer → burn transformer encoder loaded from a checkpoint
///   - closures `Fn(&Feature) -> Result<RawResult>` (tests, replay)
pub trait SpanScorer {
    /// Score every position of the feature. The returned RawResult
    /// must carry the feature's unique_id.
    fn score(&self, feature: &Feature) -> Result<RawResult>;
}

impl<F> SpanScorer for F
where
    F: Fn(&Feature) -> Result<RawResult>,
{
    fn score(&self, feature: &Feature) -> Result<RawResult> {
        self(feature)
    }
}
