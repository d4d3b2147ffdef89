use crate::commands::common::{resolve_record_id, AppContext};
use crate::error::CliError;

/// Tombstone a task in whichever collection holds it; to-do tasks are
/// consulted first, then research tasks.
pub fn run_delete(context: &AppContext, id: &str) -> Result<(), CliError> {
    let owner = context.owner();

    let mut todos = context.load_todos(&owner);
    if let Ok(resolved) = resolve_record_id(&todos, id) {
        if let Some(task) = todos.get_mut(&resolved) {
            task.mark_deleted();
            context.save_todos(&owner, &todos);
            println!("{resolved}");
            return Ok(());
        }
    }

    let mut research = context.load_research(&owner);
    let resolved = resolve_record_id(&research, id)?;
    let task = research
        .get_mut(&resolved)
        .ok_or_else(|| CliError::TaskNotFound(resolved.clone()))?;
    task.mark_deleted();
    context.save_research(&owner, &research);

    println!("{resolved}");
    Ok(())
}
