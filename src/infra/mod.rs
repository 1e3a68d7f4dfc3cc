// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Everything that touches the model directory on disk:
//
//   checkpoint.rs      — model_config.json and the encoder
//                        weights (Burn CompactRecorder)
//
//   tokenizer_store.rs — the WordPiece tokenizer matching the
//                        encoder's vocabulary, from
//                        tokenizer.json or vocab.txt
//
// Both readers point at the same directory, so a single
// --checkpoint-dir flag is enough to run predictions.
//
// Reference: Rust Book §7 (Modules)
//            Burn Book §5 (Checkpointing)

/// Model config and weight loading
pub mod checkpoint;

/// WordPiece tokenizer loading
pub mod tokenizer_store;
