//! Extractive question answering over BERT-style span logits.
//!
//! The crate is layered the same way top to bottom:
//!
//! | Layer | Module        | Role                                      |
//! |-------|---------------|-------------------------------------------|
//! | 1     | `cli`         | clap commands, response output            |
//! | 2     | `application` | predict / decode workflows                |
//! | 3     | `domain`      | Example, Feature, RawResult, Predictions  |
//! | 4     | `data`        | payload loading, WordPiece featurisation  |
//! | 5     | `ml`          | burn span encoder and inferencer          |
//! | 5b    | `postprocess` | logits → answer text                      |
//! | 6     | `infra`       | checkpoint and tokenizer files            |
//!
//! The decoding core is usable on its own:
//!
//! ```no_run
//! use span_qa::{assemble, DecodeConfig, Example, Feature, RawResult};
//!
//! fn answers(examples: &[Example], features: &[Feature], results: &[RawResult])
//!     -> Result<(), span_qa::DecodeError>
//! {
//!     let predictions = assemble(examples, features, results, &DecodeConfig::default())?;
//!     for answer in &predictions {
//!         println!("{}: {}", answer.question_id, answer.answer);
//!     }
//!     Ok(())
//! }
//! ```

pub mod application;
pub mod cli;
pub mod data;
pub mod domain;
pub mod infra;
pub mod ml;
pub mod postprocess;

pub use domain::{Answer, Example, ExampleSource, Feature, Predictions, RawResult, SpanScorer};
pub use postprocess::{assemble, AnswerAssembler, DecodeConfig, DecodeError};
