use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};

use crate::commands::{init_command, replay_command};
use crate::display::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "bsp-console")]
#[command(version, about, long_about = None)]
#[command(after_help = "ENVIRONMENT:\n    RUST_LOG=debug    Enable debug logging")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Which re-run affordance started tasks get
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConsoleKindArg {
    /// Project sync console with a "Reload" action
    Sync,
    /// Build console with a "Rebuild" action
    Build,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay a JSON-lines notification stream and print the console events
    #[command(visible_alias = "r")]
    Replay {
        /// Notification file, or `-` for stdin
        input: String,

        /// Console flavour
        #[arg(short, long, value_enum, default_value_t = ConsoleKindArg::Build)]
        kind: ConsoleKindArg,

        /// Output format of the emitted events
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Write a default .bsp-console.json
    Init {
        /// Specify the current working directory
        #[arg(short, long)]
        cwd: Option<String>,

        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

impl Commands {
    /// Execute the command
    pub fn execute(self) -> Result<()> {
        tracing::debug!("Executing {:?}", self);
        match self {
            Commands::Replay {
                input,
                kind,
                format,
            } => replay_command(&input, kind, format),
            Commands::Init { cwd, force } => init_command(cwd.as_deref(), force),
        }
    }
}
