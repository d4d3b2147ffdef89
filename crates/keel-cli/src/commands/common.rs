//! Shared wiring and helpers for CLI commands.

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use keel_core::models::{DayPin, EntityKind, ResearchTask, Snapshot, TodoTask};
use keel_core::store::{collection, FileStore};
use keel_core::sync::{
    get_or_create_owner_id, HttpRemote, RemoteConfig, SyncEngine, SyncOptions, SyncStatus,
};
use keel_core::{clock, SyncRecord};

use crate::config::{default_data_dir, CliProfile, CliProfilesConfig};
use crate::error::CliError;

/// Everything a command needs: local store, profile, resolved owner.
pub struct AppContext {
    pub kv: FileStore,
    pub profile: CliProfile,
}

pub fn open_context(
    data_dir: Option<&Path>,
    profile_name: Option<&str>,
) -> Result<AppContext, CliError> {
    let config = CliProfilesConfig::load().map_err(CliError::Config)?;
    let name = config.resolve_profile_name(profile_name);
    let profile = config.profile(&name).cloned().unwrap_or_default();

    let root: PathBuf = data_dir.map_or_else(default_data_dir, Path::to_path_buf);
    Ok(AppContext {
        kv: FileStore::new(root),
        profile,
    })
}

impl AppContext {
    /// Active owner partition: profile/env override, else the persisted
    /// value with its fixed default.
    pub fn owner(&self) -> String {
        self.profile
            .owner_override()
            .unwrap_or_else(|| get_or_create_owner_id(&self.kv))
    }

    pub fn load_todos(&self, owner: &str) -> Snapshot<TodoTask> {
        collection::load(&self.kv, EntityKind::TodoTask, owner)
    }

    pub fn save_todos(&self, owner: &str, records: &Snapshot<TodoTask>) {
        collection::save(&self.kv, EntityKind::TodoTask, owner, records);
    }

    pub fn load_research(&self, owner: &str) -> Snapshot<ResearchTask> {
        collection::load(&self.kv, EntityKind::ResearchTask, owner)
    }

    pub fn save_research(&self, owner: &str, records: &Snapshot<ResearchTask>) {
        collection::save(&self.kv, EntityKind::ResearchTask, owner, records);
    }

    pub fn load_pins(&self, owner: &str) -> Snapshot<DayPin> {
        collection::load(&self.kv, EntityKind::DayPin, owner)
    }

    pub fn save_pins(&self, owner: &str, records: &Snapshot<DayPin>) {
        collection::save(&self.kv, EntityKind::DayPin, owner, records);
    }

    /// Remote collections, `None` when sync is not configured.
    pub fn remotes(&self) -> Result<Option<Remotes>, CliError> {
        let Some(config) = self.profile.remote_config().map_err(CliError::Config)? else {
            return Ok(None);
        };
        Ok(Some(Remotes::new(config, self.profile.day_window_days())?))
    }
}

/// One HTTP remote per synced collection.
pub struct Remotes {
    pub research: HttpRemote<ResearchTask>,
    pub todos: HttpRemote<TodoTask>,
    pub pins: HttpRemote<DayPin>,
}

impl Remotes {
    fn new(config: RemoteConfig, day_window: u32) -> Result<Self, CliError> {
        Ok(Self {
            research: HttpRemote::new(config.clone(), EntityKind::ResearchTask)?,
            todos: HttpRemote::new(config.clone(), EntityKind::TodoTask)?,
            pins: HttpRemote::new(config, EntityKind::DayPin)?.with_day_window(day_window),
        })
    }
}

/// Per-collection line of a sync run, for display.
pub struct SyncReport {
    pub kind: EntityKind,
    pub status: SyncStatus,
    pub records: usize,
    pub pushed: usize,
}

impl SyncReport {
    pub fn line(&self) -> String {
        let status = match self.status {
            SyncStatus::Offline => "offline",
            SyncStatus::Idle => "idle",
            SyncStatus::Syncing => "syncing",
            SyncStatus::Synced => "synced",
            SyncStatus::Error => "error",
        };
        format!(
            "{}: {status} ({} records, pushed {})",
            self.kind, self.records, self.pushed
        )
    }
}

/// Run a full sync cycle over all three collections, persisting each
/// converged snapshot.
pub async fn sync_all(
    context: &AppContext,
    allow_bootstrap_push: bool,
) -> Result<Vec<SyncReport>, CliError> {
    let Some(remotes) = context.remotes()? else {
        return Err(CliError::SyncNotConfigured);
    };
    let owner = context.owner();
    let options = SyncOptions {
        online: true,
        allow_bootstrap_push,
        owner: Some(owner.clone()),
    };

    let mut reports = Vec::with_capacity(EntityKind::ALL.len());

    let engine = SyncEngine::new(EntityKind::ResearchTask, &context.kv, Some(&remotes.research));
    let outcome = engine.sync(context.load_research(&owner), &options, |_| {}).await;
    context.save_research(&owner, &outcome.records);
    reports.push(SyncReport {
        kind: EntityKind::ResearchTask,
        status: outcome.status,
        records: outcome.records.len(),
        pushed: outcome.pushed,
    });

    let engine = SyncEngine::new(EntityKind::TodoTask, &context.kv, Some(&remotes.todos));
    let outcome = engine.sync(context.load_todos(&owner), &options, |_| {}).await;
    context.save_todos(&owner, &outcome.records);
    reports.push(SyncReport {
        kind: EntityKind::TodoTask,
        status: outcome.status,
        records: outcome.records.len(),
        pushed: outcome.pushed,
    });

    let engine = SyncEngine::new(EntityKind::DayPin, &context.kv, Some(&remotes.pins));
    let outcome = engine.sync(context.load_pins(&owner), &options, |_| {}).await;
    context.save_pins(&owner, &outcome.records);
    reports.push(SyncReport {
        kind: EntityKind::DayPin,
        status: outcome.status,
        records: outcome.records.len(),
        pushed: outcome.pushed,
    });

    Ok(reports)
}

/// Pull-only refresh of all three collections for `owner`, persisting each
/// converged snapshot. Used right after a namespace switch.
pub async fn refresh_all(context: &AppContext, owner: &str) -> Result<Vec<SyncReport>, CliError> {
    let Some(remotes) = context.remotes()? else {
        return Err(CliError::SyncNotConfigured);
    };

    let mut reports = Vec::with_capacity(EntityKind::ALL.len());

    let engine = SyncEngine::new(EntityKind::ResearchTask, &context.kv, Some(&remotes.research));
    let outcome = engine.refresh(context.load_research(owner), owner, |_| {}).await;
    context.save_research(owner, &outcome.records);
    reports.push(SyncReport {
        kind: EntityKind::ResearchTask,
        status: outcome.status,
        records: outcome.records.len(),
        pushed: 0,
    });

    let engine = SyncEngine::new(EntityKind::TodoTask, &context.kv, Some(&remotes.todos));
    let outcome = engine.refresh(context.load_todos(owner), owner, |_| {}).await;
    context.save_todos(owner, &outcome.records);
    reports.push(SyncReport {
        kind: EntityKind::TodoTask,
        status: outcome.status,
        records: outcome.records.len(),
        pushed: 0,
    });

    let engine = SyncEngine::new(EntityKind::DayPin, &context.kv, Some(&remotes.pins));
    let outcome = engine.refresh(context.load_pins(owner), owner, |_| {}).await;
    context.save_pins(owner, &outcome.records);
    reports.push(SyncReport {
        kind: EntityKind::DayPin,
        status: outcome.status,
        records: outcome.records.len(),
        pushed: 0,
    });

    Ok(reports)
}

/// Join word arguments into a title, rejecting empty input.
pub fn normalize_title(parts: &[String]) -> Result<String, CliError> {
    let joined = parts.join(" ");
    let trimmed = joined.trim();
    if trimmed.is_empty() {
        return Err(CliError::EmptyContent);
    }
    Ok(trimmed.to_string())
}

pub fn normalize_task_identifier(value: &str) -> Result<String, CliError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CliError::EmptyTaskId);
    }
    Ok(trimmed.to_string())
}

pub fn parse_due_date(raw: &str) -> Result<NaiveDate, CliError> {
    raw.trim()
        .parse()
        .map_err(|_| CliError::InvalidDate(raw.to_string()))
}

/// Resolve a record id from an exact id or a unique prefix over live
/// (non-tombstoned) records.
pub fn resolve_record_id<R: SyncRecord>(
    records: &Snapshot<R>,
    query: &str,
) -> Result<String, CliError> {
    let query = normalize_task_identifier(query)?;

    if records.get(&query).is_some_and(|record| !record.is_deleted()) {
        return Ok(query);
    }

    let mut matches: Vec<&str> = records
        .values()
        .filter(|record| !record.is_deleted())
        .map(SyncRecord::id)
        .filter(|id| id.starts_with(&query))
        .collect();
    matches.sort_unstable();

    match matches.len() {
        0 => Err(CliError::TaskNotFound(query)),
        1 => Ok(matches[0].to_string()),
        _ => {
            let options = matches
                .iter()
                .take(3)
                .map(|id| id.chars().take(13).collect::<String>())
                .collect::<Vec<_>>()
                .join(", ");
            Err(CliError::AmbiguousTaskId(format!(
                "Multiple tasks match '{query}': {options}..."
            )))
        }
    }
}

/// Human-readable age of a record for list output.
pub fn format_relative_time(updated_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(updated_at) = updated_at else {
        return "seeded".to_string();
    };
    let seconds = (now - updated_at).num_seconds().max(0);
    match seconds {
        0..=59 => "just now".to_string(),
        60..=3_599 => format!("{}m ago", seconds / 60),
        3_600..=86_399 => format!("{}h ago", seconds / 3_600),
        _ => format!("{}d ago", seconds / 86_400),
    }
}

#[derive(Debug, Serialize)]
pub struct TodoListItem {
    pub id: String,
    pub title: String,
    pub done: bool,
    pub due_on: Option<String>,
    pub relative_time: String,
}

pub fn todo_to_list_item(task: &TodoTask) -> TodoListItem {
    TodoListItem {
        id: task.id.clone(),
        title: task.title.clone(),
        done: task.done,
        due_on: task.due_on.map(|day| day.to_string()),
        relative_time: format_relative_time(task.updated_at, clock::now()),
    }
}

#[derive(Debug, Serialize)]
pub struct ResearchListItem {
    pub id: String,
    pub title: String,
    pub status: String,
    pub tags: Vec<String>,
    pub steps_done: usize,
    pub steps_total: usize,
    pub relative_time: String,
}

pub fn research_to_list_item(task: &ResearchTask) -> ResearchListItem {
    let mut tags = task.tags();
    tags.sort();
    ResearchListItem {
        id: task.id.clone(),
        title: task.title.clone(),
        status: format!("{:?}", task.status).to_lowercase(),
        tags,
        steps_done: task.steps.iter().filter(|step| step.done).count(),
        steps_total: task.steps.len(),
        relative_time: format_relative_time(task.updated_at, clock::now()),
    }
}

/// Live (non-tombstoned) records of a snapshot, newest first.
pub fn live_sorted<R: SyncRecord>(records: &Snapshot<R>) -> Vec<&R> {
    let mut live: Vec<&R> = records.values().filter(|record| !record.is_deleted()).collect();
    live.sort_by(|a, b| b.updated_at().cmp(&a.updated_at()).then_with(|| a.id().cmp(b.id())));
    live
}

/// Short id prefix for display.
pub fn short_id(id: &str) -> String {
    id.chars().take(8).collect()
}

/// Collect live pins for one day, joined against both task collections.
pub fn day_view(
    pins: &Snapshot<DayPin>,
    todos: &Snapshot<TodoTask>,
    research: &Snapshot<ResearchTask>,
    day: NaiveDate,
) -> Vec<DayViewItem> {
    let mut items: Vec<DayViewItem> = pins
        .values()
        .filter(|pin| !pin.is_deleted() && pin.pinned_on == day)
        .map(|pin| {
            let (title, kind) = todos
                .get(&pin.task_id)
                .map(|task| (task.title.clone(), "todo"))
                .or_else(|| {
                    research
                        .get(&pin.task_id)
                        .map(|task| (task.title.clone(), "research"))
                })
                .unwrap_or_else(|| ("(unknown task)".to_string(), "unknown"));
            DayViewItem {
                task_id: pin.task_id.clone(),
                title,
                kind: kind.to_string(),
            }
        })
        .collect();
    items.sort_by(|a, b| a.title.cmp(&b.title));
    items
}

#[derive(Debug, Serialize)]
pub struct DayViewItem {
    pub task_id: String,
    pub title: String,
    pub kind: String,
}
