use crate::commands::common::{
    live_sorted, short_id, todo_to_list_item, AppContext, TodoListItem,
};
use crate::error::CliError;

pub fn run_list(context: &AppContext, include_done: bool, as_json: bool) -> Result<(), CliError> {
    let owner = context.owner();
    let todos = context.load_todos(&owner);

    let visible: Vec<_> = live_sorted(&todos)
        .into_iter()
        .filter(|task| include_done || !task.done)
        .collect();

    if as_json {
        let items = visible
            .iter()
            .map(|task| todo_to_list_item(task))
            .collect::<Vec<TodoListItem>>();
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    if visible.is_empty() {
        println!("No open tasks.");
        return Ok(());
    }

    for task in visible {
        let item = todo_to_list_item(task);
        let marker = if item.done { "x" } else { " " };
        let due = item
            .due_on
            .map(|day| format!(" (due {day})"))
            .unwrap_or_default();
        println!(
            "[{marker}] {}  {}{due}  {}",
            short_id(&item.id),
            item.title,
            item.relative_time
        );
    }
    Ok(())
}
