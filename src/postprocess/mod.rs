// ============================================================
// Layer 5b — Post-processing (Answer Decoding)
// ============================================================
// Turns raw start/end logits into answer text taken from the
// original, untokenised passage.
//
//   candidates.rs — top-n positions from one logit vector
//   spans.rs      — validity filter over start × end pairs,
//                   and the first-valid span selector
//   projector.rs  — maps WordPiece span text back onto the
//                   original passage characters
//   assembler.rs  — runs the above once per question and
//                   collects the ordered answers
//   error.rs      — the only fatal case: features and
//                   inference results out of sync
//
// Everything here is synchronous, pure computation. Nothing is
// cached between calls, so concurrent requests can each build
// their own AnswerAssembler without sharing state.

use serde::{Deserialize, Serialize};

pub mod assembler;
pub mod candidates;
pub mod error;
pub mod projector;
pub mod spans;

pub use assembler::{assemble, AnswerAssembler};
pub use error::{DecodeError, DecodeResult};

/// Decoding parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeConfig {
    /// How many start and end candidates to pair up
    pub n_best_size: usize,

    /// Spans must be strictly shorter than this many tokens
    pub max_answer_length: usize,

    /// Must match the WordPiece tokenizer that built the features
    pub do_lower_case: bool,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            n_best_size:       10,
            max_answer_length: 30,
            do_lower_case:     true,
        }
    }
}
