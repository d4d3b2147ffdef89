use keel_core::clock;
use keel_core::models::{pin_id, DayPin};

use crate::cli::DayCommands;
use crate::commands::common::{day_view, resolve_record_id, AppContext};
use crate::error::CliError;

pub fn run_day(context: &AppContext, command: &DayCommands) -> Result<(), CliError> {
    match command {
        DayCommands::Pin { id } => run_pin(context, id),
        DayCommands::Unpin { id } => run_unpin(context, id),
        DayCommands::Show { json } => run_show(context, *json),
    }
}

/// Resolve an id prefix against both task collections.
fn resolve_task_id(context: &AppContext, owner: &str, id: &str) -> Result<String, CliError> {
    let todos = context.load_todos(owner);
    if let Ok(resolved) = resolve_record_id(&todos, id) {
        return Ok(resolved);
    }
    let research = context.load_research(owner);
    resolve_record_id(&research, id)
}

fn run_pin(context: &AppContext, id: &str) -> Result<(), CliError> {
    let owner = context.owner();
    let task_id = resolve_task_id(context, &owner, id)?;

    let today = clock::today();
    let mut pins = context.load_pins(&owner);
    // Re-pinning after an unpin revives the same derived id with a newer
    // stamp, so the revival wins the merge.
    let pin = DayPin::new(task_id.clone(), today);
    pins.insert(pin.id.clone(), pin);
    context.save_pins(&owner, &pins);

    println!("{task_id}");
    Ok(())
}

fn run_unpin(context: &AppContext, id: &str) -> Result<(), CliError> {
    let owner = context.owner();
    let task_id = resolve_task_id(context, &owner, id)?;

    let today = clock::today();
    let mut pins = context.load_pins(&owner);
    let key = pin_id(&task_id, today);
    let pin = pins
        .get_mut(&key)
        .filter(|pin| pin.deleted_at.is_none())
        .ok_or_else(|| CliError::TaskNotFound(format!("{task_id} is not pinned today")))?;
    pin.mark_deleted();
    context.save_pins(&owner, &pins);

    println!("{task_id}");
    Ok(())
}

fn run_show(context: &AppContext, as_json: bool) -> Result<(), CliError> {
    let owner = context.owner();
    let pins = context.load_pins(&owner);
    let todos = context.load_todos(&owner);
    let research = context.load_research(&owner);

    let today = clock::today();
    let items = day_view(&pins, &todos, &research, today);

    if as_json {
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    if items.is_empty() {
        println!("Nothing pinned for {}.", clock::day_key(today));
        return Ok(());
    }

    println!("My Day — {}", clock::day_key(today));
    for item in items {
        println!("  [{}] {}", item.kind, item.title);
    }
    Ok(())
}
