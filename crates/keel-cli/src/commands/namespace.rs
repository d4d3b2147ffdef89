use keel_core::sync::{switch_namespace, RemoteCollection};

use crate::cli::NamespaceCommands;
use crate::commands::common::{refresh_all, AppContext};
use crate::error::CliError;

pub async fn run_namespace(
    context: &AppContext,
    command: &NamespaceCommands,
) -> Result<(), CliError> {
    match command {
        NamespaceCommands::Show => run_show(context),
        NamespaceCommands::Verify { owner } => run_verify(context, owner).await,
        NamespaceCommands::Switch { owner } => run_switch(context, owner).await,
    }
}

fn run_show(context: &AppContext) -> Result<(), CliError> {
    println!("{}", context.owner());
    Ok(())
}

/// Read-only record counts for a candidate namespace, without switching,
/// so the user can confirm it holds the expected data first.
async fn run_verify(context: &AppContext, owner: &str) -> Result<(), CliError> {
    let Some(remotes) = context.remotes()? else {
        return Err(CliError::SyncNotConfigured);
    };

    let research = remotes.research.count(owner).await?;
    let todos = remotes.todos.count(owner).await?;

    println!("namespace '{owner}': {research} research tasks, {todos} to-do tasks");
    Ok(())
}

async fn run_switch(context: &AppContext, owner: &str) -> Result<(), CliError> {
    let switched = switch_namespace(&context.kv, owner)?;
    println!("switched: {} -> {}", switched.previous, switched.next);

    // Pull-only refresh so the new partition's view is current before any
    // further mutation risks a push.
    let reports = refresh_all(context, &switched.next).await?;
    for report in &reports {
        println!("{}", report.line());
    }
    Ok(())
}
