//! Errors raised while decoding answers.
//!
//! Only integration faults are errors. An empty candidate set and
//! a failed character alignment are ordinary outcomes and show up
//! as answer text, never here.

use thiserror::Error;

/// Fatal mismatch between the features and the inference results.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// A feature's unique_id has no RawResult. Tokenisation and
    /// inference ran over different feature sets.
    #[error("no inference result for feature unique_id {unique_id}")]
    MissingResult {
        /// The unique_id that was looked up
        unique_id: u64,
    },

    /// An example has no feature at all, so nothing can be decoded for it.
    #[error("example {example_index} (question '{qas_id}') has no features")]
    MissingFeatures {
        /// Question id of the example
        qas_id: String,
        /// Position of the example in the input
        example_index: usize,
    },

    /// The logit vectors of a result disagree with each other or do
    /// not cover every token of its feature.
    #[error(
        "result for feature unique_id {unique_id} has {start_len} start and \
         {end_len} end logits for {num_tokens} tokens"
    )]
    LogitLengthMismatch {
        unique_id:  u64,
        start_len:  usize,
        end_len:    usize,
        num_tokens: usize,
    },
}

/// Result alias for the decoding core
pub type DecodeResult<T> = Result<T, DecodeError>;
