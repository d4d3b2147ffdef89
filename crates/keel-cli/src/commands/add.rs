use keel_core::TodoTask;

use crate::commands::common::{normalize_title, parse_due_date, AppContext};
use crate::error::CliError;

pub fn run_add(
    context: &AppContext,
    title_parts: &[String],
    due: Option<&str>,
) -> Result<(), CliError> {
    let title = normalize_title(title_parts)?;
    let mut task = TodoTask::new(title);
    if let Some(raw) = due {
        task.due_on = Some(parse_due_date(raw)?);
    }

    let owner = context.owner();
    let mut todos = context.load_todos(&owner);
    todos.insert(task.id.clone(), task.clone());
    context.save_todos(&owner, &todos);

    println!("{}", task.id);
    Ok(())
}
