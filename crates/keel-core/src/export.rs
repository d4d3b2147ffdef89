//! Shared task export helpers for CLI and future client parity.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::models::{ResearchStatus, ResearchTask, TodoTask};

/// Export output format shared by all clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportFormat {
    Json,
    Markdown,
}

impl ExportFormat {
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Markdown => "md",
        }
    }
}

/// Serializable research task representation used in exports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportResearchTask {
    pub id: String,
    pub title: String,
    pub status: ResearchStatus,
    pub notes: String,
    pub tags: Vec<String>,
    pub steps_done: usize,
    pub steps_total: usize,
    pub updated_at: Option<String>,
}

/// Serializable to-do task representation used in exports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportTodoTask {
    pub id: String,
    pub title: String,
    pub done: bool,
    pub due_on: Option<String>,
    pub updated_at: Option<String>,
}

/// Both live collections in one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportBundle {
    pub research_tasks: Vec<ExportResearchTask>,
    pub todo_tasks: Vec<ExportTodoTask>,
}

/// Convert a research task into an export record with stable tag ordering.
#[must_use]
pub fn research_to_export_item(task: &ResearchTask) -> ExportResearchTask {
    let mut tags = task.tags();
    tags.sort();

    ExportResearchTask {
        id: task.id.clone(),
        title: task.title.clone(),
        status: task.status,
        notes: task.notes.clone(),
        tags,
        steps_done: task.steps.iter().filter(|step| step.done).count(),
        steps_total: task.steps.len(),
        updated_at: task.updated_at.map(|at| at.to_rfc3339()),
    }
}

/// Convert a to-do task into an export record.
#[must_use]
pub fn todo_to_export_item(task: &TodoTask) -> ExportTodoTask {
    ExportTodoTask {
        id: task.id.clone(),
        title: task.title.clone(),
        done: task.done,
        due_on: task.due_on.map(|day| day.to_string()),
        updated_at: task.updated_at.map(|at| at.to_rfc3339()),
    }
}

/// Build the export bundle, skipping tombstoned records and ordering by
/// title for a stable document.
#[must_use]
pub fn build_export_bundle(research: &[ResearchTask], todos: &[TodoTask]) -> ExportBundle {
    let mut research_tasks: Vec<ExportResearchTask> = research
        .iter()
        .filter(|task| task.deleted_at.is_none())
        .map(research_to_export_item)
        .collect();
    research_tasks.sort_by(|a, b| a.title.cmp(&b.title));

    let mut todo_tasks: Vec<ExportTodoTask> = todos
        .iter()
        .filter(|task| task.deleted_at.is_none())
        .map(todo_to_export_item)
        .collect();
    todo_tasks.sort_by(|a, b| a.title.cmp(&b.title));

    ExportBundle {
        research_tasks,
        todo_tasks,
    }
}

/// Render the bundle as pretty-printed JSON.
pub fn render_json_export(bundle: &ExportBundle) -> serde_json::Result<String> {
    serde_json::to_string_pretty(bundle)
}

/// Render the bundle as Markdown checklists.
#[must_use]
pub fn render_markdown_export(bundle: &ExportBundle) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Research");
    for task in &bundle.research_tasks {
        let marker = if task.status == ResearchStatus::Done {
            'x'
        } else {
            ' '
        };
        let _ = write!(output, "- [{marker}] {}", task.title);
        if task.steps_total > 0 {
            let _ = write!(output, " ({}/{} steps)", task.steps_done, task.steps_total);
        }
        if !task.tags.is_empty() {
            let _ = write!(output, " #{}", task.tags.join(" #"));
        }
        let _ = writeln!(output);
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "# To-do");
    for task in &bundle.todo_tasks {
        let marker = if task.done { 'x' } else { ' ' };
        let _ = write!(output, "- [{marker}] {}", task.title);
        if let Some(due_on) = &task.due_on {
            let _ = write!(output, " (due {due_on})");
        }
        let _ = writeln!(output);
    }

    output
}

/// Render the bundle based on the selected export format.
pub fn render_export(bundle: &ExportBundle, format: ExportFormat) -> serde_json::Result<String> {
    match format {
        ExportFormat::Json => render_json_export(bundle),
        ExportFormat::Markdown => Ok(render_markdown_export(bundle)),
    }
}

/// Build a deterministic default file name for export flows.
#[must_use]
pub fn suggested_export_file_name(format: ExportFormat, day_key: &str) -> String {
    format!("keel-export-{day_key}.{}", format.extension())
}
