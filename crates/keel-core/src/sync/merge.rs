//! Pure last-write-wins merge over collection snapshots.
//!
//! A record missing from one side means "not yet synced there", never
//! "deleted there" — deletion only travels as a tombstone, so the merge
//! never drops a record that exists on either side.

use chrono::{DateTime, Utc};

use crate::models::{Snapshot, SyncRecord};

/// Combine a local and a remote snapshot into one converged snapshot.
///
/// Remote is authoritative by default; a local record replaces its remote
/// counterpart only when its `updated_at` is strictly greater. Missing
/// timestamps compare as time zero, so ties and untouched seed data keep
/// the remote version. Records present on only one side are kept.
pub fn merge<R: SyncRecord>(local: &Snapshot<R>, remote: Snapshot<R>) -> Snapshot<R> {
    let mut merged = remote;
    for (id, record) in local {
        match merged.get(id) {
            None => {
                merged.insert(id.clone(), record.clone());
            }
            Some(existing) => {
                if timestamp_or_epoch(record) > timestamp_or_epoch(existing) {
                    merged.insert(id.clone(), record.clone());
                }
            }
        }
    }
    merged
}

/// Minimal set of local records worth pushing: timestamped, and either
/// unknown to the remote or strictly newer than the remote counterpart.
/// Timestamp-less seed records are never pushed.
pub fn upsert_set<R: SyncRecord>(local: &Snapshot<R>, remote: &Snapshot<R>) -> Vec<R> {
    let mut pending: Vec<R> = local
        .values()
        .filter(|record| record.updated_at().is_some())
        .filter(|record| {
            remote.get(record.id()).map_or(true, |counterpart| {
                timestamp_or_epoch(*record) > timestamp_or_epoch(counterpart)
            })
        })
        .cloned()
        .collect();
    pending.sort_by(|a, b| a.id().cmp(b.id()));
    pending
}

fn timestamp_or_epoch<R: SyncRecord>(record: &R) -> DateTime<Utc> {
    record.updated_at().unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}
