//! Keel CLI - Track research and day-to-day tasks from the command line
//!
//! Local-first: every command works against the on-disk collections, and
//! `keel sync` reconciles them with the remote store when configured.

mod cli;
mod commands;
mod config;
mod error;
#[cfg(test)]
mod tests;

use clap::Parser;

use crate::cli::{Cli, Commands};
use crate::commands::add::run_add;
use crate::commands::common::open_context;
use crate::commands::completions::run_completions;
use crate::commands::config::run_config;
use crate::commands::day::run_day;
use crate::commands::delete::run_delete;
use crate::commands::done::run_done;
use crate::commands::export::run_export;
use crate::commands::list::run_list;
use crate::commands::namespace::run_namespace;
use crate::commands::research::run_research;
use crate::commands::sync::run_sync;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("keel=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    let context = open_context(cli.data_dir.as_deref(), cli.profile.as_deref())?;

    match cli.command {
        Some(Commands::Add { title, due }) => run_add(&context, &title, due.as_deref())?,
        Some(Commands::List { all, json }) => run_list(&context, all, json)?,
        Some(Commands::Done { id }) => run_done(&context, &id)?,
        Some(Commands::Delete { id }) => run_delete(&context, &id)?,
        Some(Commands::Research { command }) => run_research(&context, &command)?,
        Some(Commands::Day { command }) => run_day(&context, &command)?,
        Some(Commands::Sync { bootstrap }) => run_sync(&context, bootstrap).await?,
        Some(Commands::Namespace { command }) => run_namespace(&context, &command).await?,
        Some(Commands::Export { format, output }) => {
            run_export(&context, format, output.as_deref())?;
        }
        Some(Commands::Config { command }) => run_config(cli.profile.as_deref(), &command)?,
        Some(Commands::Completions { shell, output }) => {
            run_completions(shell, output.as_deref())?;
        }
        None => {
            // Quick capture: `keel "buy stamps"`.
            if cli.task.is_empty() {
                run_list(&context, false, false)?;
            } else {
                run_add(&context, &cli.task, None)?;
            }
        }
    }

    Ok(())
}
