use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "cfgctl",
    version,
    about = "Command-line client for the configuration management service"
)]
pub struct Cli {
    /// Path to the config file (defaults to ~/.config/cfgctl/config.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Work with the active branch of this checkout.
    #[command(subcommand)]
    Branch(BranchCommand),
    /// Workflow directory commands.
    #[command(subcommand)]
    Workflow(ResourceCommand),
    /// Layout directory commands.
    #[command(subcommand)]
    Layout(ResourceCommand),
    /// Show the target scope and the enclosing resource directory.
    Status {
        /// Target this branch instead of the active one.
        #[arg(long, conflicts_with = "environment")]
        branch: Option<String>,
        /// Environment to fall back to when no branch applies.
        #[arg(long)]
        environment: Option<String>,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum BranchCommand {
    /// Print the active branch slug.
    Current,
    /// Make an existing remote branch the active branch.
    Switch {
        slug: String,
        /// Replace an active branch without asking.
        #[arg(short, long)]
        force: bool,
    },
    /// Leave the active branch.
    Exit {
        /// Skip the confirmation prompt.
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum ResourceCommand {
    /// Print the key this directory targets, checking it against KEY.
    Resolve { key: Option<String> },
}
