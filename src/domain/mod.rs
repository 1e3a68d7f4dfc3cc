// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust structs and traits that define the core concepts
// of extractive question answering.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - NO tokenizer code
//   - Only plain Rust structs and traits (plus serde derives
//     so the records can be exported and replayed as JSON)
//
// Think of this layer as the "dictionary" of the system:
// it defines what things ARE, not how they work.
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// Example, Feature and RawResult records
pub mod example;

// The final per-question answers
pub mod answer;

// Core abstractions (traits) that other layers implement
pub mod traits;

pub use answer::{Answer, Predictions};
pub use example::{Example, Feature, RawResult};
pub use traits::{ExampleSource, SpanScorer};
