// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Orchestrates the other layers for one request.
//
//   predict_use_case.rs — payload → features → scorer → answers
//   decode_use_case.rs  — exported features + logits → answers
//
// No model math and no printing here: Layer 5 scores, Layer 1
// writes the response.
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

use serde::{Deserialize, Serialize};

use crate::domain::{Answer, Predictions};

// Full question-answering workflow
pub mod predict_use_case;

// Decoder-only workflow
pub mod decode_use_case;

/// The JSON document written for every successful run:
/// `{"status": "ok", "predictions": [...]}` in question order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictResponse {
    pub status:      String,
    pub predictions: Vec<Answer>,
}

impl PredictResponse {
    pub fn ok(predictions: Predictions) -> Self {
        Self { status: "ok".to_string(), predictions: predictions.into_vec() }
    }
}
