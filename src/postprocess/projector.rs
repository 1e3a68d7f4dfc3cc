// ============================================================
// Layer 5b — Text Projector
// ============================================================
// The selected span points at WordPiece tokens, which have been
// lowercased, accent-stripped, split into "##" pieces and cut
// at punctuation. The user must see the ORIGINAL text instead.
//
//   feature tokens  : ["steve", "smith"]        → pred_text "steve smith"
//   original tokens : ["Steve", "Smith's"]      → orig_text "Steve Smith's"
//   re-tokenised    : "steve smith ' s"         → tok_text
//
// pred_text is found inside tok_text, then the character offsets
// are carried over to orig_text through the space-free versions
// of both strings, which must have equal length:
//
//   tok_text  "steve smith ' s" → "stevesmith's"
//   orig_text "Steve Smith's"   → "SteveSmith's"
//
// giving "Steve Smith". Any step that cannot be carried out
// falls back to orig_text; the projector never fails.
//
// All offsets are CHARACTER offsets, not bytes.

use std::collections::HashMap;

use crate::data::basic_tokenizer::BasicTokenizer;
use crate::domain::{Example, Feature};

/// Sub-word continuation marker used by WordPiece
const CONTINUATION_MARKER: &str = "##";

pub struct TextProjector {
    basic: BasicTokenizer,
}

impl TextProjector {
    /// `do_lower_case` must match the tokenizer that built the features
    pub fn new(do_lower_case: bool) -> Self {
        Self { basic: BasicTokenizer::new(do_lower_case) }
    }

    /// Answer text for the span `[start_index, end_index]` of `feature`.
    ///
    /// A span starting at position 0 ([CLS]) means "no answer" and
    /// yields an empty string.
    pub fn project(
        &self,
        example:     &Example,
        feature:     &Feature,
        start_index: usize,
        end_index:   usize,
    ) -> String {
        if start_index == 0 {
            return String::new();
        }

        let Some(tok_tokens) = feature.tokens.get(start_index..=end_index) else {
            tracing::debug!(start_index, end_index, "span outside feature tokens");
            return String::new();
        };
        let pred_text = clean_wordpiece_text(tok_tokens);

        let orig_tokens = feature
            .orig_index(start_index)
            .zip(feature.orig_index(end_index))
            .and_then(|(s, e)| example.doc_tokens.get(s..=e));
        let Some(orig_tokens) = orig_tokens else {
            tracing::debug!(start_index, end_index, "span does not map back to document tokens");
            return String::new();
        };
        let orig_text = orig_tokens.join(" ");

        self.final_text(&pred_text, &orig_text)
    }

    /// Project normalised `pred_text` onto `orig_text`.
    ///
    /// Returns the matching substring of `orig_text`, or `orig_text`
    /// unchanged when the two cannot be aligned.
    pub fn final_text(&self, pred_text: &str, orig_text: &str) -> String {
        let tok_text = match self.basic.tokenize(orig_text) {
            Ok(words) => words.join(" "),
            Err(e) => {
                tracing::debug!(error = %e, "could not re-tokenise '{orig_text}'");
                return orig_text.to_string();
            }
        };

        let Some(byte_start) = tok_text.find(pred_text) else {
            tracing::debug!("unable to find text: '{pred_text}' in '{tok_text}'");
            return orig_text.to_string();
        };
        let start_position = tok_text[..byte_start].chars().count();
        let Some(end_position) = (start_position + pred_text.chars().count()).checked_sub(1) else {
            return orig_text.to_string();
        };

        let (orig_ns_text, orig_ns_to_s) = strip_spaces(orig_text);
        let (tok_ns_text, tok_ns_to_s)   = strip_spaces(&tok_text);

        if orig_ns_text.chars().count() != tok_ns_text.chars().count() {
            tracing::debug!(
                "length not equal after stripping spaces: '{orig_ns_text}' vs '{tok_ns_text}'"
            );
            return orig_text.to_string();
        }

        let tok_s_to_ns: HashMap<usize, usize> = tok_ns_to_s
            .iter()
            .enumerate()
            .map(|(ns, &s)| (s, ns))
            .collect();

        let to_orig = |tok_position: usize| {
            tok_s_to_ns
                .get(&tok_position)
                .and_then(|&ns| orig_ns_to_s.get(ns))
                .copied()
        };

        let Some(orig_start) = to_orig(start_position) else {
            tracing::debug!("couldn't map start position");
            return orig_text.to_string();
        };
        let Some(orig_end) = to_orig(end_position) else {
            tracing::debug!("couldn't map end position");
            return orig_text.to_string();
        };

        orig_text
            .chars()
            .skip(orig_start)
            .take((orig_end + 1).saturating_sub(orig_start))
            .collect()
    }
}

/// Join WordPiece tokens back into words: "question ##ing" → "questioning".
/// Whitespace is collapsed to single spaces.
pub fn clean_wordpiece_text(tokens: &[String]) -> String {
    let joined = tokens
        .join(" ")
        .replace(&format!(" {CONTINUATION_MARKER}"), "")
        .replace(CONTINUATION_MARKER, "");
    joined.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Remove ASCII spaces from `text`.
///
/// Returns the space-free string and, for each of its characters,
/// the character index it had in `text`.
pub fn strip_spaces(text: &str) -> (String, Vec<usize>) {
    let mut ns_text   = String::with_capacity(text.len());
    let mut ns_to_s   = Vec::with_capacity(text.len());

    for (i, c) in text.chars().enumerate() {
        if c == ' ' {
            continue;
        }
        ns_to_s.push(i);
        ns_text.push(c);
    }

    (ns_text, ns_to_s)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn strings(words: &[&str]) -> Vec<String> {
        words.iter().map(|s| s.to_string()).collect()
    }

    /// Feature whose doc part starts at window position `offset`
    /// and maps one-to-one onto doc tokens
    fn feature(tokens: &[&str], offset: usize, mapping: &[(usize, usize)]) -> Feature {
        Feature {
            unique_id:            1_000_000_000,
            example_index:        0,
            doc_span_index:       0,
            tokens:               strings(tokens),
            token_to_orig_map:    mapping.iter().copied().collect(),
            token_is_max_context: (offset..tokens.len()).map(|i| (i, true)).collect(),
            input_ids:            Vec::new(),
            input_mask:           Vec::new(),
            segment_ids:          Vec::new(),
        }
    }

    #[test]
    fn test_subword_reassembly() {
        assert_eq!(clean_wordpiece_text(&strings(&["question", "##ing"])), "questioning");
        assert_eq!(clean_wordpiece_text(&strings(&["un", "##aff", "##able", "man"])), "unaffable man");
        assert_eq!(clean_wordpiece_text(&strings(&["##ing"])), "ing");
        assert_eq!(clean_wordpiece_text(&[]), "");
    }

    #[test]
    fn test_strip_spaces_maps_char_indices() {
        let (ns, map) = strip_spaces("a bé c");
        assert_eq!(ns, "abéc");
        assert_eq!(map, vec![0, 2, 3, 5]);
    }

    #[test]
    fn test_possessive_suffix_excluded() {
        let p = TextProjector::new(true);
        assert_eq!(p.final_text("steve smith", "Steve Smith's"), "Steve Smith");
    }

    #[test]
    fn test_recovers_accents_and_case() {
        let p = TextProjector::new(true);
        assert_eq!(p.final_text("cafe noel", "Café Noël."), "Café Noël");
    }

    #[test]
    fn test_fallback_when_not_found() {
        let p = TextProjector::new(true);
        assert_eq!(p.final_text("obama", "Steve Smith's"), "Steve Smith's");
    }

    #[test]
    fn test_fallback_when_lengths_differ() {
        // Decomposed accent: 5 chars in the original, 4 after stripping
        let p = TextProjector::new(true);
        let orig = "Cafe\u{301}";
        assert_eq!(p.final_text("cafe", orig), orig);
    }

    #[test]
    fn test_fallback_on_empty_prediction() {
        let p = TextProjector::new(true);
        assert_eq!(p.final_text("", "Hawaii"), "Hawaii");
    }

    #[test]
    fn test_start_index_zero_is_no_answer() {
        let p = TextProjector::new(true);
        let example = Example::new("q1", "Where?", strings(&["Hawaii"]));
        let f = feature(&["[CLS]", "where", "[SEP]", "hawaii", "[SEP]"], 3, &[(0, 0), (3, 0)]);
        assert_eq!(p.project(&example, &f, 0, 3), "");
    }

    #[test]
    fn test_projects_hawaii() {
        let p = TextProjector::new(true);
        let example = Example::new(
            "q1",
            "Where was Obama born?",
            strings(&["Barack", "Obama", "was", "born", "in", "Hawaii", "."]),
        );
        let tokens = [
            "[CLS]", "where", "was", "obama", "born", "?", "[SEP]",
            "barack", "obama", "was", "born", "in", "hawaii", ".", "[SEP]",
        ];
        let mapping: Vec<(usize, usize)> = (7..14).map(|i| (i, i - 7)).collect();
        let f = feature(&tokens, 7, &mapping);
        assert_eq!(p.project(&example, &f, 12, 12), "Hawaii");
        assert_eq!(p.project(&example, &f, 7, 8), "Barack Obama");
    }

    #[test]
    fn test_projects_split_word() {
        let p = TextProjector::new(true);
        let example = Example::new("q1", "What?", strings(&["Questioning", "minds."]));
        let tokens = ["[CLS]", "what", "[SEP]", "question", "##ing", "minds", ".", "[SEP]"];
        let f = feature(&tokens, 3, &[(3, 0), (4, 0), (5, 1), (6, 1)]);
        assert_eq!(p.project(&example, &f, 3, 4), "Questioning");
        assert_eq!(p.project(&example, &f, 3, 5), "Questioning minds");
    }

    #[test]
    fn test_unmapped_span_is_empty() {
        let p = TextProjector::new(true);
        let example = Example::new("q1", "What?", strings(&["word"]));
        let mut f = feature(&["[CLS]", "what", "[SEP]", "word", "[SEP]"], 3, &[(3, 0)]);
        f.token_to_orig_map = HashMap::new();
        assert_eq!(p.project(&example, &f, 3, 3), "");
    }

    #[test]
    fn test_deterministic() {
        let p = TextProjector::new(true);
        let a = p.final_text("steve smith", "Steve Smith's");
        let b = p.final_text("steve smith", "Steve Smith's");
        assert_eq!(a, b);
    }
}
