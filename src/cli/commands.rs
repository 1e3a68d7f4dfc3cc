// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the two subcommands, `predict` and `decode`, and
// their flags. Defaults match the BERT SQuAD inference setup.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::data::featurizer::FeatureConfig;
use crate::postprocess::DecodeConfig;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Answer every question in a payload with a pretrained model
    Predict(PredictArgs),

    /// Decode answers from exported features and logits
    Decode(DecodeArgs),
}

#[derive(Args, Debug)]
pub struct PredictArgs {
    /// JSON payload: {"data": [{"paragraphs": [{"context", "qas"}]}]}
    #[arg(long)]
    pub input: PathBuf,

    /// Directory holding model_config.json, the weights and the vocabulary
    #[arg(long, default_value = "model")]
    pub checkpoint_dir: PathBuf,

    /// vocab.txt to use instead of the one in --checkpoint-dir
    #[arg(long)]
    pub vocab: Option<PathBuf>,

    /// Window length in word pieces, special tokens included.
    /// Must equal the model's max_seq_len
    #[arg(long, default_value_t = 384)]
    pub max_seq_length: usize,

    /// Step between overlapping passage windows
    #[arg(long, default_value_t = 128)]
    pub doc_stride: usize,

    /// Questions longer than this many word pieces are truncated
    #[arg(long, default_value_t = 64)]
    pub max_query_length: usize,

    #[command(flatten)]
    pub decode: DecodeFlags,

    /// Write the response here instead of stdout
    #[arg(long)]
    pub output: Option<PathBuf>,
}

impl From<&PredictArgs> for FeatureConfig {
    fn from(a: &PredictArgs) -> Self {
        FeatureConfig {
            max_seq_length:   a.max_seq_length,
            doc_stride:       a.doc_stride,
            max_query_length: a.max_query_length,
        }
    }
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// JSON bundle: {"examples": [...], "features": [...], "results": [...]}
    #[arg(long)]
    pub bundle: PathBuf,

    #[command(flatten)]
    pub decode: DecodeFlags,

    /// Write the response here instead of stdout
    #[arg(long)]
    pub output: Option<PathBuf>,
}

/// Flags shared by both subcommands
#[derive(Args, Debug, Clone)]
pub struct DecodeFlags {
    /// Number of start and end candidates to pair up
    #[arg(long, default_value_t = 10)]
    pub n_best_size: usize,

    /// Answers must be shorter than this many word pieces
    #[arg(long, default_value_t = 30)]
    pub max_answer_length: usize,

    /// Keep case when matching answers to the passage (cased models).
    /// A tokenizer.json in the model directory decides this itself
    #[arg(long)]
    pub cased: bool,
}

impl From<&DecodeFlags> for DecodeConfig {
    fn from(f: &DecodeFlags) -> Self {
        DecodeConfig {
            n_best_size:       f.n_best_size,
            max_answer_length: f.max_answer_length,
            do_lower_case:     !f.cased,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;

    #[test]
    fn test_predict_defaults() {
        let cli = Cli::try_parse_from(["span-qa", "predict", "--input", "q.json"]).unwrap();
        let Commands::Predict(args) = cli.command else { panic!("expected predict") };

        assert_eq!(FeatureConfig::from(&args), FeatureConfig::default());
        assert_eq!(DecodeConfig::from(&args.decode), DecodeConfig::default());
        assert_eq!(args.checkpoint_dir, PathBuf::from("model"));
        assert!(args.vocab.is_none());
    }

    #[test]
    fn test_decode_flags_override_config() {
        let cli = Cli::try_parse_from([
            "span-qa", "decode", "--bundle", "b.json",
            "--n-best-size", "20", "--max-answer-length", "5", "--cased",
        ]).unwrap();
        let Commands::Decode(args) = cli.command else { panic!("expected decode") };

        let cfg = DecodeConfig::from(&args.decode);
        assert_eq!(cfg.n_best_size, 20);
        assert_eq!(cfg.max_answer_length, 5);
        assert!(!cfg.do_lower_case);
    }

    #[test]
    fn test_predict_requires_input() {
        assert!(Cli::try_parse_from(["span-qa", "predict"]).is_err());
    }
}
