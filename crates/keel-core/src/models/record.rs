//! The contract every synced record kind shares.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

/// A collection snapshot: record id to record, unique keys, no ordering.
pub type Snapshot<R> = HashMap<String, R>;

/// Behavior the sync core needs from a record; payload fields stay opaque.
pub trait SyncRecord: Clone {
    /// Stable id, globally unique within its collection and owner partition.
    fn id(&self) -> &str;

    /// Last user mutation. `None` means untouched seed data, which is
    /// never pushed.
    fn updated_at(&self) -> Option<DateTime<Utc>>;

    /// Tombstone timestamp; presence marks logical deletion.
    fn deleted_at(&self) -> Option<DateTime<Utc>>;

    /// Whether this record is logically deleted.
    fn is_deleted(&self) -> bool {
        self.deleted_at().is_some()
    }
}

/// The three synced collection kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    ResearchTask,
    TodoTask,
    DayPin,
}

impl EntityKind {
    /// Every synced kind, for operations that span the whole workspace
    /// (namespace switch, state reset).
    pub const ALL: [Self; 3] = [Self::ResearchTask, Self::TodoTask, Self::DayPin];

    /// Local storage namespace for this kind.
    #[must_use]
    pub const fn storage_key(self) -> &'static str {
        match self {
            Self::ResearchTask => "research-tasks",
            Self::TodoTask => "todo-tasks",
            Self::DayPin => "day-pins",
        }
    }

    /// Remote table name for this kind.
    #[must_use]
    pub const fn table(self) -> &'static str {
        match self {
            Self::ResearchTask => "research_tasks",
            Self::TodoTask => "todo_tasks",
            Self::DayPin => "day_pins",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.storage_key())
    }
}

/// Build a snapshot from a list of records, keyed by id.
pub fn snapshot_of<R: SyncRecord>(records: impl IntoIterator<Item = R>) -> Snapshot<R> {
    records
        .into_iter()
        .map(|record| (record.id().to_string(), record))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_kind_keys_are_distinct() {
        let mut keys: Vec<&str> = EntityKind::ALL.iter().map(|kind| kind.storage_key()).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), EntityKind::ALL.len());
    }
}
