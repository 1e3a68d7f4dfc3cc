// ============================================================
// Layer 2 — Decode Use Case
// ============================================================
// Runs only the answer decoder over logits that were produced
// elsewhere. The bundle file carries everything decoding needs:
//
//   {"examples": [...], "features": [...], "results": [...]}
//
// Useful for replaying an inference run, or for decoding the
// output of a model served outside this binary.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

use crate::domain::{Example, Feature, Predictions, RawResult};
use crate::postprocess::{AnswerAssembler, DecodeConfig};

/// Inputs of the decoder, as exported by an inference run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DecodeBundle {
    pub examples: Vec<Example>,
    pub features: Vec<Feature>,
    pub results:  Vec<RawResult>,
}

impl DecodeBundle {
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Cannot read bundle '{}'", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("Invalid bundle JSON in '{}'", path.display()))
    }
}

pub struct DecodeUseCase {
    assembler: AnswerAssembler,
}

impl DecodeUseCase {
    pub fn new(config: DecodeConfig) -> Self {
        Self { assembler: AnswerAssembler::new(config) }
    }

    pub fn run(&self, bundle_path: &Path) -> Result<Predictions> {
        let bundle = DecodeBundle::load(bundle_path)?;
        tracing::info!(
            "Decoding {} questions from {} features and {} results",
            bundle.examples.len(), bundle.features.len(), bundle.results.len()
        );
        self.decode(&bundle)
    }

    pub fn decode(&self, bundle: &DecodeBundle) -> Result<Predictions> {
        Ok(self.assembler.assemble(&bundle.examples, &bundle.features, &bundle.results)?)
    }
}
