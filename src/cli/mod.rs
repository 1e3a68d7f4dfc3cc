// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses arguments with clap, hands off to Layer 2 and writes
// the JSON response. Logs go to stderr, so stdout carries the
// response and nothing else.
//
//   1. `predict` — payload + pretrained model → answers
//   2. `decode`  — exported features + logits → answers
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::{Context, Result};
use clap::Parser;
use commands::{Commands, DecodeArgs, PredictArgs};
use std::{fs, path::Path};

use crate::application::PredictResponse;

#[derive(Parser, Debug)]
#[command(
    name = "span-qa",
    version,
    about = "Extractive question answering: find each answer as a span of its passage."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Dispatch to the matching use case. Nothing is computed here.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Predict(args) => run_predict(args),
            Commands::Decode(args)  => run_decode(args),
        }
    }
}

fn run_predict(args: PredictArgs) -> Result<()> {
    use crate::application::predict_use_case::PredictUseCase;
    use crate::data::loader::SquadLoader;

    tracing::info!("Loading model from '{}'", args.checkpoint_dir.display());

    let use_case = PredictUseCase::from_checkpoint(
        args.checkpoint_dir.clone(),
        args.vocab.clone(),
        (&args).into(),
        (&args.decode).into(),
    )?;

    let predictions = use_case.answer(&SquadLoader::new(&args.input))?;
    write_response(&PredictResponse::ok(predictions), args.output.as_deref())
}

fn run_decode(args: DecodeArgs) -> Result<()> {
    use crate::application::decode_use_case::DecodeUseCase;

    let use_case    = DecodeUseCase::new((&args.decode).into());
    let predictions = use_case.run(&args.bundle)?;
    write_response(&PredictResponse::ok(predictions), args.output.as_deref())
}

fn write_response(response: &PredictResponse, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(response)?;
    match output {
        Some(path) => {
            fs::write(path, json)
                .with_context(|| format!("Cannot write response to '{}'", path.display()))?;
            tracing::info!("Wrote {} answers to '{}'", response.predictions.len(), path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Predictions;

    #[test]
    fn test_response_written_to_file() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");

        write_response(&PredictResponse::ok(Predictions::new()), Some(path.as_path())).unwrap();

        let written: PredictResponse =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written.status, "ok");
        assert!(written.predictions.is_empty());
    }
}
