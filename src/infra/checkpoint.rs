// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Restores a pretrained span encoder from a model directory.
//
// Directory layout:
//
//   model_dir/
//     model_config.json   ← architecture (vocab size, depth, ...)
//     model.mpk.gz        ← weights, Burn CompactRecorder format
//     vocab.txt           ← or tokenizer.json, see TokenizerStore
//
// The config is read first so the model can be rebuilt with the
// exact shape of the stored weights before they are loaded.
// CompactRecorder rejects a record whose shapes do not match.
//
// Reference: Burn Book §5 (Records and Checkpointing)
//            Rust Book §9 (Error Handling)

use anyhow::{Context, Result};
use burn::{
    prelude::*,
    record::{CompactRecorder, Recorder},
};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::ml::model::{SpanEncoder, SpanEncoderConfig};

const CONFIG_FILE:  &str = "model_config.json";
const WEIGHTS_FILE: &str = "model";

fn default_type_vocab_size() -> usize { 2 }

/// Architecture of a stored span encoder.
/// Defaults describe BERT-base with a 384-token window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub vocab_size:  usize,
    pub max_seq_len: usize,
    #[serde(default = "default_type_vocab_size")]
    pub type_vocab_size: usize,
    pub d_model:     usize,
    pub num_heads:   usize,
    pub num_layers:  usize,
    pub d_ff:        usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            vocab_size:      30_522,
            max_seq_len:     384,
            type_vocab_size: 2,
            d_model:         768,
            num_heads:       12,
            num_layers:      12,
            d_ff:            3072,
        }
    }
}

impl From<&ModelConfig> for SpanEncoderConfig {
    fn from(cfg: &ModelConfig) -> Self {
        SpanEncoderConfig::new(
            cfg.vocab_size, cfg.max_seq_len, cfg.type_vocab_size,
            cfg.d_model, cfg.num_heads, cfg.num_layers, cfg.d_ff,
        )
    }
}

/// Reads the config and weights of a pretrained model directory.
pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Load the architecture description from model_config.json
    pub fn load_config(&self) -> Result<ModelConfig> {
        let path = self.dir.join(CONFIG_FILE);

        let json = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read model config from '{}'", path.display()))?;

        serde_json::from_str(&json)
            .with_context(|| format!("Invalid model config in '{}'", path.display()))
    }

    /// Load the stored weights into `model`.
    /// `model` must already have the architecture from `load_config`.
    pub fn load_model<B: Backend>(
        &self,
        model:  SpanEncoder<B>,
        device: &B::Device,
    ) -> Result<SpanEncoder<B>> {
        let path = self.dir.join(WEIGHTS_FILE);

        let record = CompactRecorder::new()
            .load(path.clone(), device)
            .with_context(|| format!("Cannot load model weights '{}'", path.display()))?;

        tracing::info!("Loaded model weights from '{}'", path.display());
        Ok(model.load_record(record))
    }
}
