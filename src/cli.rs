//! Command-line interface definition.

use clap::Parser;

use crate::config::entries::PlacementMode;

/// Top-level CLI entry point for the environment bootstrapper.
#[derive(Parser, Debug)]
#[command(
    name = "homestead",
    about = "Place configs, install fonts and provision the shell",
    version = crate::VERSION
)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Options that shape the run.
    #[command(flatten)]
    pub global: GlobalOpts,

    /// Task selection.
    #[command(flatten)]
    pub tasks: TaskOpts,
}

/// Options that locate the repository and shape placement.
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Override dotfiles root directory
    #[arg(long)]
    pub root: Option<std::path::PathBuf>,

    /// Placement mode for entries without their own (overrides settings.toml)
    #[arg(long, value_enum)]
    pub mode: Option<PlacementMode>,
}

/// Options selecting which tasks run.
#[derive(Parser, Debug, Clone, Default)]
pub struct TaskOpts {
    /// Skip tasks whose name contains any of these
    #[arg(long, value_delimiter = ',')]
    pub skip: Vec<String>,

    /// Run only tasks whose name contains any of these
    #[arg(long, value_delimiter = ',')]
    pub only: Vec<String>,
}
