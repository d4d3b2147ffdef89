//! Versioned collection documents on top of the key-value store.
//!
//! Each (collection, owner) pair persists as one JSON envelope:
//! `{ "version": 1, "records_by_id": { id: record } }`. Loads are tolerant:
//! an unknown shape, a version mismatch, or a single malformed record is
//! treated as absent rather than fatal, and storage failures degrade to a
//! no-op so local edits are never lost to a broken disk.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::kv::KeyValueStore;
use crate::models::{EntityKind, Snapshot, SyncRecord};

const ENVELOPE_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    version: u32,
    records_by_id: serde_json::Map<String, Value>,
}

/// Owner-scoped storage key for a collection document.
#[must_use]
pub fn storage_key(kind: EntityKind, owner: &str) -> String {
    format!("{}/{owner}", kind.storage_key())
}

/// Legacy un-scoped key used before owner partitions were introduced.
#[must_use]
pub fn legacy_key(kind: EntityKind) -> String {
    kind.storage_key().to_string()
}

/// Load the collection snapshot for (kind, owner).
///
/// Falls back to the legacy un-scoped key when the owner-scoped document is
/// missing, and migrates the document forward under the new key.
pub fn load<R>(kv: &dyn KeyValueStore, kind: EntityKind, owner: &str) -> Snapshot<R>
where
    R: SyncRecord + DeserializeOwned + Serialize,
{
    let key = storage_key(kind, owner);
    match read_raw(kv, &key) {
        Some(raw) => parse_envelope(&raw, kind),
        None => {
            let Some(raw) = read_raw(kv, &legacy_key(kind)) else {
                return Snapshot::new();
            };
            tracing::debug!(%kind, owner, "migrating legacy collection document");
            let records = parse_envelope::<R>(&raw, kind);
            save(kv, kind, owner, &records);
            records
        }
    }
}

/// Persist the collection snapshot for (kind, owner).
///
/// A storage failure logs a warning and returns; the in-memory snapshot
/// stays the source of truth for the session.
pub fn save<R>(kv: &dyn KeyValueStore, kind: EntityKind, owner: &str, records: &Snapshot<R>)
where
    R: SyncRecord + Serialize,
{
    let mut records_by_id = serde_json::Map::with_capacity(records.len());
    for (id, record) in records {
        match serde_json::to_value(record) {
            Ok(value) => {
                records_by_id.insert(id.clone(), value);
            }
            Err(error) => {
                tracing::warn!(%kind, owner, %id, %error, "skipping unserializable record");
            }
        }
    }

    let envelope = Envelope {
        version: ENVELOPE_VERSION,
        records_by_id,
    };
    let raw = match serde_json::to_string(&envelope) {
        Ok(raw) => raw,
        Err(error) => {
            tracing::warn!(%kind, owner, %error, "failed to serialize collection document");
            return;
        }
    };

    if let Err(error) = kv.set(&storage_key(kind, owner), &raw) {
        tracing::warn!(%kind, owner, %error, "failed to persist collection document");
    }
}

fn read_raw(kv: &dyn KeyValueStore, key: &str) -> Option<String> {
    match kv.get(key) {
        Ok(value) => value,
        Err(error) => {
            tracing::warn!(%key, %error, "failed to read collection document");
            None
        }
    }
}

fn parse_envelope<R>(raw: &str, kind: EntityKind) -> Snapshot<R>
where
    R: SyncRecord + DeserializeOwned,
{
    let envelope: Envelope = match serde_json::from_str(raw) {
        Ok(envelope) => envelope,
        Err(error) => {
            tracing::warn!(%kind, %error, "malformed collection document, treating as empty");
            return Snapshot::new();
        }
    };

    if envelope.version != ENVELOPE_VERSION {
        tracing::warn!(
            %kind,
            version = envelope.version,
            "unsupported collection document version, treating as empty"
        );
        return Snapshot::new();
    }

    let mut records = Snapshot::with_capacity(envelope.records_by_id.len());
    for (key, value) in envelope.records_by_id {
        match serde_json::from_value::<R>(value) {
            Ok(record) => {
                records.insert(record.id().to_string(), record);
            }
            Err(error) => {
                tracing::debug!(%kind, %key, %error, "skipping malformed record");
            }
        }
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{snapshot_of, TodoTask};
    use crate::store::MemoryStore;
    use pretty_assertions::assert_eq;

    #[test]
    fn roundtrip_preserves_records() {
        let kv = MemoryStore::new();
        let task = TodoTask::new("Water the plants");
        let records = snapshot_of([task.clone()]);

        save(&kv, EntityKind::TodoTask, "default", &records);
        let loaded: Snapshot<TodoTask> = load(&kv, EntityKind::TodoTask, "default");

        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.get(&task.id), Some(&task));
    }

    #[test]
    fn malformed_document_loads_as_empty() {
        let kv = MemoryStore::new();
        kv.set("todo-tasks/default", "not json at all").unwrap();
        let loaded: Snapshot<TodoTask> = load(&kv, EntityKind::TodoTask, "default");
        assert!(loaded.is_empty());
    }

    #[test]
    fn version_mismatch_loads_as_empty() {
        let kv = MemoryStore::new();
        kv.set("todo-tasks/default", r#"{"version":9,"records_by_id":{}}"#)
            .unwrap();
        let loaded: Snapshot<TodoTask> = load(&kv, EntityKind::TodoTask, "default");
        assert!(loaded.is_empty());
    }

    #[test]
    fn malformed_record_is_skipped_not_fatal() {
        let kv = MemoryStore::new();
        let raw = r#"{
            "version": 1,
            "records_by_id": {
                "good": {"id":"good","title":"Keep me","updated_at":"2026-03-05T10:00:00Z"},
                "bad": {"title": 42}
            }
        }"#;
        kv.set("todo-tasks/default", raw).unwrap();

        let loaded: Snapshot<TodoTask> = load(&kv, EntityKind::TodoTask, "default");
        assert_eq!(loaded.len(), 1);
        assert!(loaded.contains_key("good"));
    }

    #[test]
    fn legacy_key_is_consulted_and_migrated() {
        let kv = MemoryStore::new();
        let task = TodoTask::new("From the un-scoped era");
        let records = snapshot_of([task.clone()]);

        // Simulate a document written before owner scoping existed.
        let mut records_by_id = serde_json::Map::new();
        records_by_id.insert(task.id.clone(), serde_json::to_value(&task).unwrap());
        let envelope = serde_json::json!({"version": 1, "records_by_id": records_by_id});
        kv.set("todo-tasks", &envelope.to_string()).unwrap();

        let loaded: Snapshot<TodoTask> = load(&kv, EntityKind::TodoTask, "default");
        assert_eq!(loaded, records);

        // Migrated forward: the owner-scoped key now holds the document.
        assert!(kv.get("todo-tasks/default").unwrap().is_some());
    }

    #[test]
    fn owner_scoped_key_wins_over_legacy() {
        let kv = MemoryStore::new();
        let scoped = TodoTask::new("scoped");
        save(&kv, EntityKind::TodoTask, "default", &snapshot_of([scoped.clone()]));
        kv.set("todo-tasks", r#"{"version":1,"records_by_id":{}}"#)
            .unwrap();

        let loaded: Snapshot<TodoTask> = load(&kv, EntityKind::TodoTask, "default");
        assert_eq!(loaded.len(), 1);
        assert!(loaded.contains_key(&scoped.id));
    }
}
