//! My Day pin model

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::record::SyncRecord;
use crate::clock;

/// A task pinned to the My Day view for one calendar day.
///
/// The id is derived from the (day, task) pair, so pinning the same task to
/// the same day on two devices converges to one record under upsert-by-id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayPin {
    /// Derived identifier: `<pinned_on>:<task_id>`
    pub id: String,
    /// Id of the pinned task
    pub task_id: String,
    /// UTC calendar day the pin belongs to
    pub pinned_on: NaiveDate,
    /// Last user mutation; absent on untouched seed data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Tombstone timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl DayPin {
    /// Pin a task to a day, stamped now.
    #[must_use]
    pub fn new(task_id: impl Into<String>, pinned_on: NaiveDate) -> Self {
        let task_id = task_id.into();
        Self {
            id: pin_id(&task_id, pinned_on),
            task_id,
            pinned_on,
            updated_at: Some(clock::now()),
            deleted_at: None,
        }
    }

    /// Stamp a fresh mutation timestamp.
    pub fn touch(&mut self) {
        self.updated_at = Some(clock::now());
    }

    /// Unpin: mark logically deleted and stamp the tombstone.
    pub fn mark_deleted(&mut self) {
        let now = clock::now();
        self.deleted_at = Some(now);
        self.updated_at = Some(now);
    }
}

/// Derived pin id for a (task, day) pair.
#[must_use]
pub fn pin_id(task_id: &str, pinned_on: NaiveDate) -> String {
    format!("{}:{task_id}", clock::day_key(pinned_on))
}

impl SyncRecord for DayPin {
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
