mod api;
mod branch;
mod cli;
mod config;
mod error;
mod finder;
mod prompt;
mod resource;
mod target;
mod workspace;

use anyhow::{Context, Result};
use api::HttpApi;
use clap::Parser;
use cli::{BranchCommand, Cli, Commands, ResourceCommand};
use config::Config;
use error::WorkspaceError;
use prompt::TerminalConfirm;
use resource::ResourceType;
use std::env;
use std::io::{self, IsTerminal};
use std::process;
use tracing_subscriber::EnvFilter;
use workspace::{Report, Workspace};

fn init_logging() {
    let filter = EnvFilter::try_from_env("CFGCTL_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .try_init();
}

fn run(cli: Cli) -> Result<Report> {
    let config = Config::load(cli.config.as_deref())?;
    let cwd = env::current_dir().context("reading current directory")?;
    let ws = Workspace::open(cwd, config.environment.clone());

    match cli.command {
        Commands::Branch(BranchCommand::Current) => ws.handle_branch_current(),
        Commands::Branch(BranchCommand::Switch { slug, force }) => {
            let api = HttpApi::from_config(&config)?;
            ws.handle_branch_switch(&api, &TerminalConfirm, &slug, force)
        }
        Commands::Branch(BranchCommand::Exit { force }) => {
            ws.handle_branch_exit(&TerminalConfirm, force)
        }
        Commands::Workflow(ResourceCommand::Resolve { key }) => {
            ws.handle_resolve(ResourceType::Workflow, key.as_deref())
        }
        Commands::Layout(ResourceCommand::Resolve { key }) => {
            ws.handle_resolve(ResourceType::Layout, key.as_deref())
        }
        Commands::Status {
            branch,
            environment,
            json,
        } => ws.handle_status(branch.as_deref(), environment.as_deref(), json),
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging();

    match run(cli) {
        Ok(report) => {
            for note in &report.notes {
                eprintln!("cfgctl: {note}");
            }
            if let Some(out) = report.stdout {
                println!("{out}");
            }
        }
        Err(err) => match err.downcast_ref::<WorkspaceError>() {
            Some(WorkspaceError::NothingToExit) => {
                eprintln!("cfgctl: {err}");
                process::exit(1);
            }
            Some(e) if e.is_conflict() => {
                eprintln!("cfgctl: {err:#}");
                eprintln!("cfgctl: run the command from outside the resource directory, or drop the explicit key");
                process::exit(2);
            }
            _ => {
                eprintln!("cfgctl: {err:#}");
                process::exit(2);
            }
        },
    }
}
