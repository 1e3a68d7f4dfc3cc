// ============================================================
// Layer 4 — Question Payload Loader
// ============================================================
// Reads the request payload and turns it into Examples.
//
// The payload is a JSON object with a `data` list:
//
//   {"data": [
//     {"paragraphs": [
//       {"context": "Barack Obama was born in Hawaii.",
//        "qas": [{"id": "q1", "question": "Where was Obama born?"}]}
//     ]}
//   ]}
//
// Every question becomes one Example. The context is split into
// doc_tokens on whitespace only. Punctuation stays attached and
// casing stays intact, so a range of doc_tokens joined with
// spaces is exactly what the user should see as an answer.
//
// Reference: Rajpurkar et al. (2016) SQuAD dataset format
//            serde_json crate documentation

use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fs, path::PathBuf};

use crate::domain::{Example, ExampleSource};

#[derive(Debug, Deserialize)]
struct Payload {
    data: Vec<Article>,
}

#[derive(Debug, Deserialize)]
struct Article {
    #[serde(default)]
    paragraphs: Vec<Paragraph>,
}

#[derive(Debug, Deserialize)]
struct Paragraph {
    context: String,
    #[serde(default)]
    qas: Vec<Question>,
}

#[derive(Debug, Deserialize)]
struct Question {
    // Usually a string, but numeric ids appear in hand-written payloads
    id:       serde_json::Value,
    question: String,
}

/// Where the payload comes from
enum PayloadSource {
    File(PathBuf),
    Inline(String),
}

/// Loads Examples from a `{"data": [...]}` payload.
/// Implements the ExampleSource trait from Layer 3.
pub struct SquadLoader {
    source: PayloadSource,
}

impl SquadLoader {
    /// Load from a JSON file on disk
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { source: PayloadSource::File(path.into()) }
    }

    /// Load from an in-memory JSON string
    pub fn from_json(json: impl Into<String>) -> Self {
        Self { source: PayloadSource::Inline(json.into()) }
    }
}

impl ExampleSource for SquadLoader {
    fn load_all(&self) -> Result<Vec<Example>> {
        let payload: Payload = match &self.source {
            PayloadSource::File(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("Cannot read payload '{}'", path.display()))?;
                serde_json::from_str(&text)
                    .with_context(|| format!("Invalid payload JSON in '{}'", path.display()))?
            }
            PayloadSource::Inline(text) => {
                serde_json::from_str(text).context("Invalid payload JSON")?
            }
        };

        let mut examples = Vec::new();

        for article in payload.data {
            for paragraph in article.paragraphs {
                let doc_tokens = split_doc_tokens(&paragraph.context);

                for qa in paragraph.qas {
                    let qas_id = match qa.id {
                        serde_json::Value::String(s) => s,
                        other                        => other.to_string(),
                    };
                    examples.push(Example::new(qas_id, qa.question, doc_tokens.clone()));
                }
            }
        }

        tracing::info!("Loaded {} questions", examples.len());
        Ok(examples)
    }
}

/// Split a context passage into whitespace-separated tokens.
pub fn split_doc_tokens(context: &str) -> Vec<String> {
    context
        .split(is_whitespace)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Space, tab, CR, LF and the narrow no-break space (U+202F)
fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n' | '\u{202F}')
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const PAYLOAD: &str = r#"{
        "data": [
            {"paragraphs": [
                {"context": "Barack Obama was born in Hawaii.",
                 "qas": [
                    {"id": "q1", "question": "Where was Obama born?"},
                    {"id": 2, "question": "Who was born in Hawaii?"}
                 ]}
            ]},
            {"title": "second", "paragraphs": [
                {"context": "  Steve\tSmith's\n\nbat   broke ", "qas": [
                    {"id": "q3", "question": "Whose bat broke?"}
                ]}
            ]}
        ]
    }"#;

    #[test]
    fn test_one_example_per_question_in_order() {
        let examples = SquadLoader::from_json(PAYLOAD).load_all().unwrap();
        let ids: Vec<&str> = examples.iter().map(|e| e.qas_id.as_str()).collect();
        assert_eq!(ids, vec!["q1", "2", "q3"]);
        assert_eq!(examples[1].question_text, "Who was born in Hawaii?");
        assert_eq!(examples[0].doc_tokens, examples[1].doc_tokens);
    }

    #[test]
    fn test_doc_tokens_keep_punctuation_and_case() {
        let examples = SquadLoader::from_json(PAYLOAD).load_all().unwrap();
        assert_eq!(
            examples[0].doc_tokens,
            vec!["Barack", "Obama", "was", "born", "in", "Hawaii."]
        );
    }

    #[test]
    fn test_whitespace_runs_collapse() {
        assert_eq!(
            split_doc_tokens("  Steve\tSmith's\n\nbat \u{202F} broke "),
            vec!["Steve", "Smith's", "bat", "broke"]
        );
        assert!(split_doc_tokens("   ").is_empty());
    }

    #[test]
    fn test_missing_data_field_is_error() {
        let err = SquadLoader::from_json(r#"{"paragraphs": []}"#).load_all().unwrap_err();
        assert!(format!("{err:#}").contains("Invalid payload JSON"));
    }

    #[test]
    fn test_loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(PAYLOAD.as_bytes()).unwrap();
        let examples = SquadLoader::new(file.path()).load_all().unwrap();
        assert_eq!(examples.len(), 3);
    }

    #[test]
    fn test_missing_file_is_error() {
        let err = SquadLoader::new("/nonexistent/payload.json").load_all().unwrap_err();
        assert!(format!("{err:#}").contains("Cannot read payload"));
    }
}
