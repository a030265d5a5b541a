//! Conversation similarity graph builder
//!
//! # Usage
//!
//! ```bash
//! convo-graph build --input conversations.json --output graph.json [--threshold 0.3] [--top-k 5]
//! convo-graph inspect --input graph.json
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded in order (later sources override earlier):
//! 1. Built-in defaults
//! 2. Config file (~/.config/convo-graph/config.toml)
//! 3. `--config` file
//! 4. Environment variables (CONVO_*, nested keys joined with `__`)
//! 5. CLI flags

use anyhow::{Context, Result};
use clap::Parser;

use convo_cli::{
    apply_overrides, init_logging, inspect_graph, print_summary, run_build, Cli, Commands,
    Settings,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings =
        Settings::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(log_level) = &cli.log_level {
        settings.log_level = log_level.clone();
    }
    init_logging(&settings.log_level)?;

    match cli.command {
        Commands::Build(args) => {
            apply_overrides(&mut settings, &args);
            settings.validate().context("Invalid options")?;
            let output = args.output.clone();
            let summary = run_build(settings, args).await?;
            print_summary(&summary, &output);
        }
        Commands::Inspect { input } => {
            print!("{}", inspect_graph(&input)?);
        }
    }

    Ok(())
}
