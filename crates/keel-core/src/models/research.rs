//! Research task model

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

use super::record::SyncRecord;
use crate::clock;

/// Workflow status of a research task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResearchStatus {
    #[default]
    Backlog,
    Active,
    Done,
}

/// One step inside a research task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchStep {
    pub title: String,
    #[serde(default)]
    pub done: bool,
}

impl ResearchStep {
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            done: false,
        }
    }
}

/// A research task in the system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchTask {
    /// Unique identifier (UUID v7 for user-created tasks, seed slug otherwise)
    pub id: String,
    /// Short title
    pub title: String,
    /// Free-form notes; `#tags` are extracted from here
    #[serde(default)]
    pub notes: String,
    /// Workflow status
    #[serde(default)]
    pub status: ResearchStatus,
    /// Ordered step list
    #[serde(default)]
    pub steps: Vec<ResearchStep>,
    /// Last user mutation; absent on untouched seed data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Tombstone timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl ResearchTask {
    /// Create a new user-authored task, stamped now.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            title: title.into(),
            notes: String::new(),
            status: ResearchStatus::default(),
            steps: Vec::new(),
            updated_at: Some(clock::now()),
            deleted_at: None,
        }
    }

    /// Create a task from a static seed source. Carries no `updated_at`,
    /// so it is never pushed until the user touches it.
    #[must_use]
    pub fn seeded(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            notes: String::new(),
            status: ResearchStatus::default(),
            steps: Vec::new(),
            updated_at: None,
            deleted_at: None,
        }
    }

    /// Stamp a fresh mutation timestamp.
    pub fn touch(&mut self) {
        self.updated_at = Some(clock::now());
    }

    /// Mark logically deleted and stamp the tombstone.
    pub fn mark_deleted(&mut self) {
        let now = clock::now();
        self.deleted_at = Some(now);
        self.updated_at = Some(now);
    }

    /// Extract #tags from the notes field
    #[must_use]
    pub fn tags(&self) -> Vec<String> {
        extract_tags(&self.notes)
    }
}

impl SyncRecord for ResearchTask {
    fn id(&self) -> &str {
        &self.id
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }
}

/// Extract #tags from text
///
/// Valid tags match the pattern: `#[a-zA-Z][a-zA-Z0-9_-]*`
/// Tags are returned in lowercase and deduplicated.
#[must_use]
pub fn extract_tags(text: &str) -> Vec<String> {
    let re = Regex::new(r"#([a-zA-Z][a-zA-Z0-9_-]*)").expect("Invalid regex");
    re.captures_iter(text)
        .map(|cap| cap[1].to_lowercase())
        .collect::<HashSet<_>>()
        .into_iter()
        .collect()
}
