// ============================================================
// Layer 4 — Basic (word-boundary) Tokenizer
// ============================================================
// Splits text into words the same way the WordPiece pipeline
// does BEFORE it breaks words into sub-word pieces:
//
//   1. Clean text (drop control chars, unify whitespace)
//   2. Put spaces around CJK ideographs
//   3. Lowercase + strip accents (only when do_lower_case)
//   4. Split on whitespace and on every punctuation char
//
// "Steve Smith's" → ["steve", "smith", "'", "s"]
//
// The answer projector re-tokenises the original answer text
// with this so it can line it up against the model's tokens.
// Using the tokenizers crate's own BertNormalizer and
// BertPreTokenizer keeps both sides of that comparison in step.
//
// Reference: tokenizers crate — normalizers::bert, pre_tokenizers::bert

use anyhow::Result;
use tokenizers::normalizers::bert::BertNormalizer;
use tokenizers::pre_tokenizers::bert::BertPreTokenizer;
use tokenizers::{
    NormalizedString, Normalizer, OffsetReferential, OffsetType, PreTokenizedString, PreTokenizer,
};

pub struct BasicTokenizer {
    normalizer: BertNormalizer,
}

impl BasicTokenizer {
    /// `do_lower_case` must match the WordPiece tokenizer that
    /// produced the features, otherwise alignment will fail.
    pub fn new(do_lower_case: bool) -> Self {
        // strip_accents = None → follows the lowercase flag
        Self {
            normalizer: BertNormalizer::new(true, true, None, do_lower_case),
        }
    }

    /// Split text into normalised words and punctuation marks.
    pub fn tokenize(&self, text: &str) -> Result<Vec<String>> {
        let mut normalized = NormalizedString::from(text);
        self.normalizer
            .normalize(&mut normalized)
            .map_err(|e| anyhow::anyhow!("normalise '{text}': {e}"))?;

        let mut pretokenized = PreTokenizedString::from(normalized);
        BertPreTokenizer
            .pre_tokenize(&mut pretokenized)
            .map_err(|e| anyhow::anyhow!("pre-tokenise '{text}': {e}"))?;

        Ok(pretokenized
            .get_splits(OffsetReferential::Normalized, OffsetType::Char)
            .into_iter()
            .map(|(word, _, _)| word.to_string())
            .collect())
    }
}

impl Default for BasicTokenizer {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splits_punctuation() {
        let t = BasicTokenizer::new(true);
        assert_eq!(
            t.tokenize("Steve Smith's").unwrap(),
            vec!["steve", "smith", "'", "s"]
        );
    }

    #[test]
    fn test_strips_accents_when_lowercasing() {
        let t = BasicTokenizer::new(true);
        assert_eq!(t.tokenize("Café  Noël.").unwrap(), vec!["cafe", "noel", "."]);
    }

    #[test]
    fn test_keeps_case_when_not_lowercasing() {
        let t = BasicTokenizer::new(false);
        assert_eq!(t.tokenize("Hawaii, USA").unwrap(), vec!["Hawaii", ",", "USA"]);
    }

    #[test]
    fn test_empty_text() {
        let t = BasicTokenizer::default();
        assert!(t.tokenize("").unwrap().is_empty());
        assert!(t.tokenize("   ").unwrap().is_empty());
    }
}
