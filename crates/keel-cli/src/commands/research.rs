use keel_core::models::{ResearchStatus, ResearchStep, ResearchTask};

use crate::cli::ResearchCommands;
use crate::commands::common::{
    live_sorted, normalize_title, research_to_list_item, resolve_record_id, short_id, AppContext,
    ResearchListItem,
};
use crate::error::CliError;

pub fn run_research(context: &AppContext, command: &ResearchCommands) -> Result<(), CliError> {
    match command {
        ResearchCommands::Add { title } => run_add(context, title),
        ResearchCommands::List { tag, json } => run_list(context, tag.as_deref(), *json),
        ResearchCommands::Start { id } => run_set_status(context, id, ResearchStatus::Active),
        ResearchCommands::Finish { id } => run_set_status(context, id, ResearchStatus::Done),
        ResearchCommands::Note { id, text } => run_note(context, id, text),
        ResearchCommands::Step { id, title } => run_step(context, id, title),
    }
}

fn run_add(context: &AppContext, title_parts: &[String]) -> Result<(), CliError> {
    let title = normalize_title(title_parts)?;
    let task = ResearchTask::new(title);

    let owner = context.owner();
    let mut research = context.load_research(&owner);
    research.insert(task.id.clone(), task.clone());
    context.save_research(&owner, &research);

    println!("{}", task.id);
    Ok(())
}

fn run_list(context: &AppContext, tag: Option<&str>, as_json: bool) -> Result<(), CliError> {
    let owner = context.owner();
    let research = context.load_research(&owner);

    let visible: Vec<_> = live_sorted(&research)
        .into_iter()
        .filter(|task| {
            tag.map_or(true, |tag| {
                let tag = tag.to_lowercase();
                task.tags().contains(&tag)
            })
        })
        .collect();

    if as_json {
        let items = visible
            .iter()
            .map(|task| research_to_list_item(task))
            .collect::<Vec<ResearchListItem>>();
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    if visible.is_empty() {
        println!("No research tasks.");
        return Ok(());
    }

    for task in visible {
        let item = research_to_list_item(task);
        let steps = if item.steps_total > 0 {
            format!(" [{}/{}]", item.steps_done, item.steps_total)
        } else {
            String::new()
        };
        println!(
            "{:<8} {}  {}{steps}  {}",
            item.status,
            short_id(&item.id),
            item.title,
            item.relative_time
        );
    }
    Ok(())
}

fn run_set_status(
    context: &AppContext,
    id: &str,
    status: ResearchStatus,
) -> Result<(), CliError> {
    let owner = context.owner();
    let mut research = context.load_research(&owner);
    let resolved = resolve_record_id(&research, id)?;

    let task = research
        .get_mut(&resolved)
        .ok_or_else(|| CliError::TaskNotFound(resolved.clone()))?;
    task.status = status;
    task.touch();
    context.save_research(&owner, &research);

    println!("{resolved}");
    Ok(())
}

fn run_note(context: &AppContext, id: &str, text_parts: &[String]) -> Result<(), CliError> {
    let text = normalize_title(text_parts)?;

    let owner = context.owner();
    let mut research = context.load_research(&owner);
    let resolved = resolve_record_id(&research, id)?;

    let task = research
        .get_mut(&resolved)
        .ok_or_else(|| CliError::TaskNotFound(resolved.clone()))?;
    if !task.notes.is_empty() {
        task.notes.push('\n');
    }
    task.notes.push_str(&text);
    task.touch();
    context.save_research(&owner, &research);

    println!("{resolved}");
    Ok(())
}

fn run_step(context: &AppContext, id: &str, title_parts: &[String]) -> Result<(), CliError> {
    let title = normalize_title(title_parts)?;

    let owner = context.owner();
    let mut research = context.load_research(&owner);
    let resolved = resolve_record_id(&research, id)?;

    let task = research
        .get_mut(&resolved)
        .ok_or_else(|| CliError::TaskNotFound(resolved.clone()))?;
    task.steps.push(ResearchStep::new(title));
    task.touch();
    context.save_research(&owner, &research);

    println!("{resolved}");
    Ok(())
}
