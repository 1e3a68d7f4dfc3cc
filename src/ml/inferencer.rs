// ============================================================
// Layer 5 — Inferencer
// ============================================================
// Scores one Feature with the span encoder on the CPU.
// Logits are returned raw: span choice and text projection
// happen in the postprocess layer.
use anyhow::{anyhow, Result};
use burn::prelude::*;

use crate::domain::{Feature, RawResult, SpanScorer};
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::model::{SpanEncoder, SpanEncoderConfig};

pub type InferBackend = burn::backend::NdArray;
type InferDevice = burn::backend::ndarray::NdArrayDevice;

pub struct Inferencer {
    model:       SpanEncoder<InferBackend>,
    max_seq_len: usize,
    device:      InferDevice,
}

impl Inferencer {
    pub fn from_checkpoint(ckpt_manager: &CheckpointManager) -> Result<Self> {
        let device = InferDevice::default();
        let cfg    = ckpt_manager.load_config()?;
        let model: SpanEncoder<InferBackend> = SpanEncoderConfig::from(&cfg).init(&device);
        let model  = ckpt_manager.load_model(model, &device)?;
        tracing::info!(
            "Span encoder ready: {} layers, d_model={}, max_seq_len={}",
            cfg.num_layers, cfg.d_model, cfg.max_seq_len
        );
        Ok(Self { model, max_seq_len: cfg.max_seq_len, device })
    }

    /// Wrap an already-built model
    pub fn from_model(model: SpanEncoder<InferBackend>, max_seq_len: usize) -> Self {
        Self { model, max_seq_len, device: InferDevice::default() }
    }

    pub fn max_seq_len(&self) -> usize {
        self.max_seq_len
    }

    fn int_row(&self, values: &[u32]) -> Tensor<InferBackend, 2, Int> {
        let flat: Vec<i32> = values.iter().map(|&x| x as i32).collect();
        Tensor::<InferBackend, 1, Int>::from_ints(flat.as_slice(), &self.device)
            .unsqueeze::<2>()
    }
}

impl SpanScorer for Inferencer {
    fn score(&self, feature: &Feature) -> Result<RawResult> {
        let len = feature.input_ids.len();
        if len != self.max_seq_len
            || feature.segment_ids.len() != len
            || feature.input_mask.len() != len
        {
            anyhow::bail!(
                "Feature {} has {} input ids, {} segment ids and {} mask entries; \
                 the model expects {} of each",
                feature.unique_id, len, feature.segment_ids.len(),
                feature.input_mask.len(), self.max_seq_len
            );
        }

        let output = self.model.forward(
            self.int_row(&feature.input_ids),
            self.int_row(&feature.segment_ids),
            self.int_row(&feature.input_mask),
        );

        let start_logits: Vec<f32> = output.start_logits.reshape([len])
            .into_data().to_vec::<f32>()
            .map_err(|e| anyhow!("Cannot read start logits: {e:?}"))?;
        let end_logits: Vec<f32> = output.end_logits.reshape([len])
            .into_data().to_vec::<f32>()
            .map_err(|e| anyhow!("Cannot read end logits: {e:?}"))?;

        tracing::debug!("Scored feature {} ({} positions)", feature.unique_id, len);
        Ok(RawResult::new(feature.unique_id, start_logits, end_logits))
    }
}
