//! To-do task model

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::record::SyncRecord;
use crate::clock;

/// A to-do task in the system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoTask {
    /// Unique identifier
    pub id: String,
    /// Task title
    pub title: String,
    /// Completion flag
    #[serde(default)]
    pub done: bool,
    /// Optional due day (UTC calendar date)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_on: Option<NaiveDate>,
    /// Last user mutation; absent on untouched seed data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Tombstone timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl TodoTask {
    /// Create a new user-authored task, stamped now.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            title: title.into(),
            done: false,
            due_on: None,
            updated_at: Some(clock::now()),
            deleted_at: None,
        }
    }

    /// Create a task from a static seed source, never pushed until touched.
    #[must_use]
    pub fn seeded(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            done: false,
            due_on: None,
            updated_at: None,
            deleted_at: None,
        }
    }

    /// Stamp a fresh mutation timestamp.
    pub fn touch(&mut self) {
        self.updated_at = Some(clock::now());
    }

    /// Flip the completion flag and stamp the mutation.
    pub fn set_done(&mut self, done: bool) {
        self.done = done;
        self.touch();
    }

    /// Mark logically deleted and stamp the tombstone.
    pub fn mark_deleted(&mut self) {
        let now = clock::now();
        self.deleted_at = Some(now);
        self.updated_at = Some(now);
    }
}

impl SyncRecord for TodoTask {
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
