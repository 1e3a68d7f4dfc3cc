// ============================================================
// Layer 6 — Tokenizer Store
// ============================================================
// Loads the WordPiece tokenizer that matches the pretrained
// model's vocabulary.
//
// Two layouts are accepted in the model directory:
//   tokenizer.json — a complete HuggingFace tokenizer
//   vocab.txt      — one WordPiece per line, line number = id
//
// From vocab.txt we build the tokenizer JSON ourselves and load
// it with Tokenizer::from_str.
//
// A tokenizer.json decides its own case folding. Callers read it
// back with `lowercases` so answer projection folds case the same
// way. Padding and truncation stored in the file are cleared:
// features are built one word at a time and padded by hand.
//
//   normalizer    : BertNormalizer (clean, CJK, lowercase/accents)
//   pre_tokenizer : BertPreTokenizer (whitespace + punctuation)
//   model         : WordPiece, "##" continuation prefix
//
// Reference: tokenizers crate — serialisation format
//            Devlin et al. (2019) BERT, WordPiece vocabulary

use anyhow::{Context, Result};
use std::{fs, path::PathBuf, str::FromStr};
use tokenizers::Tokenizer;

/// Special tokens registered with the tokenizer when the vocab has them
const SPECIAL_TOKENS: [&str; 5] = ["[PAD]", "[UNK]", "[CLS]", "[SEP]", "[MASK]"];

pub struct TokenizerStore {
    dir: PathBuf,
}

impl TokenizerStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Load tokenizer.json if present, otherwise build from vocab.txt
    pub fn load(&self, do_lower_case: bool) -> Result<Tokenizer> {
        let json_path  = self.dir.join("tokenizer.json");
        let vocab_path = self.dir.join("vocab.txt");

        if json_path.exists() {
            tracing::info!("Loading tokenizer from '{}'", json_path.display());
            let mut tokenizer = Tokenizer::from_file(&json_path).map_err(|e| {
                anyhow::anyhow!("Cannot load tokenizer from '{}': {}", json_path.display(), e)
            })?;
            tokenizer
                .with_truncation(None)
                .map_err(|e| anyhow::anyhow!("Cannot disable truncation: {e}"))?;
            tokenizer.with_padding(None);
            Ok(tokenizer)
        } else {
            Self::from_vocab_file(vocab_path, do_lower_case)
        }
    }

    /// Whether `tokenizer` lowercases its input, read from its
    /// normalizer. `None` when it has no normalizer at all.
    pub fn lowercases(tokenizer: &Tokenizer) -> Option<bool> {
        let normalizer = serde_json::to_value(tokenizer.get_normalizer()?).ok()?;
        Some(normalizer_lowercases(&normalizer))
    }

    /// Build a WordPiece tokenizer from a BERT `vocab.txt`
    pub fn from_vocab_file(path: impl Into<PathBuf>, do_lower_case: bool) -> Result<Tokenizer> {
        let path = path.into();
        let text = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read vocabulary '{}'", path.display()))?;

        let vocab: Vec<String> = text.lines().map(|l| l.trim().to_string()).collect();
        tracing::info!("Loaded {} word pieces from '{}'", vocab.len(), path.display());

        Self::from_vocab(&vocab, do_lower_case)
    }

    /// Build a WordPiece tokenizer from an in-memory vocabulary.
    /// The position of each entry is its token id.
    pub fn from_vocab(vocab: &[String], do_lower_case: bool) -> Result<Tokenizer> {
        if vocab.is_empty() {
            anyhow::bail!("Vocabulary is empty");
        }

        // Later duplicates overwrite earlier ids
        let mut vocab_map = serde_json::Map::new();
        for (id, piece) in vocab.iter().enumerate() {
            vocab_map.insert(piece.clone(), serde_json::json!(id));
        }

        let added_tokens: Vec<serde_json::Value> = SPECIAL_TOKENS
            .iter()
            .filter_map(|tok| {
                vocab_map.get(*tok).map(|id| serde_json::json!({
                    "id": id, "content": tok, "single_word": false,
                    "lstrip": false, "rstrip": false, "normalized": false, "special": true
                }))
            })
            .collect();

        if !vocab_map.contains_key("[UNK]") {
            anyhow::bail!("Vocabulary has no [UNK] token");
        }

        let tokenizer_json = serde_json::json!({
            "version": "1.0",
            "truncation": null,
            "padding": null,
            "added_tokens": added_tokens,
            "normalizer": {
                "type": "BertNormalizer",
                "clean_text": true,
                "handle_chinese_chars": true,
                "strip_accents": null,
                "lowercase": do_lower_case
            },
            "pre_tokenizer": {
                "type": "BertPreTokenizer"
            },
            "post_processor": null,
            "decoder": null,
            "model": {
                "type": "WordPiece",
                "unk_token": "[UNK]",
                "continuing_subword_prefix": "##",
                "max_input_chars_per_word": 100,
                "vocab": vocab_map
            }
        });

        Tokenizer::from_str(&tokenizer_json.to_string())
            .map_err(|e| anyhow::anyhow!("Cannot build WordPiece tokenizer: {e}"))
    }
}

/// Walks a serialised normalizer, descending into sequences
fn normalizer_lowercases(normalizer: &serde_json::Value) -> bool {
    match normalizer.get("type").and_then(|t| t.as_str()) {
        Some("BertNormalizer") => normalizer
            .get("lowercase")
            .and_then(|l| l.as_bool())
            .unwrap_or(false),
        Some("Lowercase") => true,
        Some("Sequence") => normalizer
            .get("normalizers")
            .and_then(|n| n.as_array())
            .is_some_and(|list| list.iter().any(normalizer_lowercases)),
        _ => false,
    }
}
