use anyhow::Result;
use bsp_console::Cli;
use clap::Parser;

fn main() -> Result<()> {
    // Initialize tracing based on RUST_LOG env var; stdout carries the event stream
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    cli.command.execute()
}
