// ============================================================
// Layer 2 — Predict Use Case
// ============================================================
// End-to-end question answering over a request payload:
//   1. Load Examples from the payload (SquadLoader)
//   2. Build WordPiece Features (FeatureBuilder)
//   3. Score the first Feature of each Example (SpanScorer)
//   4. Decode logits into answer text (AnswerAssembler)
//
// The scorer is a type parameter: the binary uses the burn
// Inferencer, tests plug in a closure.

use anyhow::{Context, Result};
use std::path::PathBuf;
use tokenizers::Tokenizer;

use crate::data::featurizer::{FeatureBuilder, FeatureConfig};
use crate::domain::{ExampleSource, Predictions, SpanScorer};
use crate::infra::{checkpoint::CheckpointManager, tokenizer_store::TokenizerStore};
use crate::ml::inferencer::Inferencer;
use crate::postprocess::{AnswerAssembler, DecodeConfig};

pub struct PredictUseCase<S: SpanScorer = Inferencer> {
    tokenizer:      Tokenizer,
    scorer:         S,
    feature_config: FeatureConfig,
    assembler:      AnswerAssembler,
}

impl PredictUseCase<Inferencer> {
    /// Load the tokenizer and encoder from `checkpoint_dir`.
    /// `vocab`, when given, replaces the directory's tokenizer files.
    pub fn from_checkpoint(
        checkpoint_dir: impl Into<PathBuf>,
        vocab:          Option<PathBuf>,
        feature_config: FeatureConfig,
        decode_config:  DecodeConfig,
    ) -> Result<Self> {
        let checkpoint_dir = checkpoint_dir.into();
        let do_lower_case  = decode_config.do_lower_case;

        let tokenizer = match vocab {
            Some(path) => TokenizerStore::from_vocab_file(path, do_lower_case)?,
            None       => TokenizerStore::new(&checkpoint_dir).load(do_lower_case)?,
        };

        let ckpt       = CheckpointManager::new(&checkpoint_dir);
        let inferencer = Inferencer::from_checkpoint(&ckpt)?;

        if inferencer.max_seq_len() != feature_config.max_seq_length {
            anyhow::bail!(
                "--max-seq-length is {} but the model in '{}' was built for {}",
                feature_config.max_seq_length,
                checkpoint_dir.display(),
                inferencer.max_seq_len()
            );
        }

        Ok(Self::new(tokenizer, inferencer, feature_config, decode_config))
    }
}

impl<S: SpanScorer> PredictUseCase<S> {
    /// Answer projection folds case the way `tokenizer` does; a
    /// conflicting `decode_config.do_lower_case` is overridden.
    pub fn new(
        tokenizer:      Tokenizer,
        scorer:         S,
        feature_config: FeatureConfig,
        mut decode_config: DecodeConfig,
    ) -> Self {
        if let Some(lowercase) = TokenizerStore::lowercases(&tokenizer) {
            if lowercase != decode_config.do_lower_case {
                tracing::warn!(
                    "Tokenizer {} its input; matching answers with do_lower_case={}",
                    if lowercase { "lowercases" } else { "keeps the case of" },
                    lowercase
                );
                decode_config.do_lower_case = lowercase;
            }
        }

        Self {
            tokenizer,
            scorer,
            feature_config,
            assembler: AnswerAssembler::new(decode_config),
        }
    }

    pub fn answer(&self, source: &dyn ExampleSource) -> Result<Predictions> {
        let examples = source.load_all()?;
        if examples.is_empty() {
            tracing::warn!("Payload contains no questions");
            return Ok(Predictions::new());
        }

        let builder  = FeatureBuilder::new(&self.tokenizer, self.feature_config.clone())?;
        let features = builder.build(&examples).context("Cannot build features")?;
        tracing::info!("Built {} features for {} questions", features.len(), examples.len());

        let predictions = self.assembler.predict(&self.scorer, &examples, &features)?;
        tracing::info!("Answered {} questions", predictions.len());
        Ok(predictions)
    }
}
