use anyhow::Result;
use clap::Parser;
use span_qa::cli::Cli;

fn main() -> Result<()> {
    // stdout is reserved for the JSON response
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("span_qa=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    cli.run()
}
