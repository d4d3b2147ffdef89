use crate::commands::common::{resolve_record_id, AppContext};
use crate::error::CliError;

pub fn run_done(context: &AppContext, id: &str) -> Result<(), CliError> {
    let owner = context.owner();
    let mut todos = context.load_todos(&owner);
    let resolved = resolve_record_id(&todos, id)?;

    let task = todos
        .get_mut(&resolved)
        .ok_or_else(|| CliError::TaskNotFound(resolved.clone()))?;
    task.set_done(true);
    context.save_todos(&owner, &todos);

    println!("{resolved}");
    Ok(())
}
