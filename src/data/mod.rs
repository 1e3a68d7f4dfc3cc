// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between the request payload and model-ready
// Features.
//
//   payload.json
//       │
//       ▼
//   SquadLoader       → one Example per question, passage split
//       │               into whitespace tokens
//       ▼
//   FeatureBuilder    → WordPiece windows over each passage,
//       │               with maps back to the whitespace tokens
//       ▼
//   Feature           → handed to the SpanScorer (Layer 5)
//
// BasicTokenizer is the word-level half of the WordPiece
// pipeline; the answer projector uses it to re-tokenise the
// original answer text.
//
// Reference: Rust Book §13 (Iterators and Closures)

/// Parses `{"data": [...]}` payloads into Examples
pub mod loader;

/// Sliding-window WordPiece featurisation
pub mod featurizer;

/// Word and punctuation splitting with BERT normalisation
pub mod basic_tokenizer;
