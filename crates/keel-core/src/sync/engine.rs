//! Sync orchestrator.
//!
//! One generic engine covers all three collection kinds: pull, record the
//! pull, merge, evaluate the push guardrail, push the minimal upsert set.
//! Every step is safe to repeat; two syncs in a row converge to the same
//! local and remote state because the push is an upsert by id.

use crate::models::{EntityKind, Snapshot, SyncRecord};
use crate::store::KeyValueStore;
use crate::sync::guardrail::{should_block_push, PushBlock, PushContext};
use crate::sync::merge::{merge, upsert_set};
use crate::sync::remote::RemoteCollection;
use crate::sync::state::SyncStateTracker;

/// Sync lifecycle reported to the caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncStatus {
    /// Sync unconfigured or the device is offline; nothing was attempted.
    Offline,
    /// No owner identity resolved; nothing was attempted.
    Idle,
    /// A pull/merge/push cycle is in flight.
    Syncing,
    /// The read side succeeded; the returned snapshot is converged.
    Synced,
    /// A remote call failed; local records are untouched.
    Error,
}

/// Per-invocation inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOptions {
    /// Connectivity signal; false short-circuits before any network call.
    pub online: bool,
    /// Explicit user opt-in to seed an empty remote partition.
    pub allow_bootstrap_push: bool,
    /// Resolved owner partition, `None` while unauthenticated.
    pub owner: Option<String>,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            online: true,
            allow_bootstrap_push: false,
            owner: None,
        }
    }
}

/// Result of one sync cycle. `records` is always the best available local
/// view: converged on success, the untouched input otherwise.
#[derive(Debug, Clone)]
pub struct SyncOutcome<R> {
    pub records: Snapshot<R>,
    pub status: SyncStatus,
    pub pushed: usize,
    pub blocked: Option<PushBlock>,
}

impl<R> SyncOutcome<R> {
    fn unchanged(records: Snapshot<R>, status: SyncStatus) -> Self {
        Self {
            records,
            status,
            pushed: 0,
            blocked: None,
        }
    }
}

/// Stateful coordinator for one collection kind.
pub struct SyncEngine<'a, C> {
    kind: EntityKind,
    kv: &'a dyn KeyValueStore,
    remote: Option<&'a C>,
}

impl<'a, C> SyncEngine<'a, C> {
    #[must_use]
    pub const fn new(kind: EntityKind, kv: &'a dyn KeyValueStore, remote: Option<&'a C>) -> Self {
        Self { kind, kv, remote }
    }

    /// Run a full pull/merge/push cycle.
    pub async fn sync<R>(
        &self,
        local: Snapshot<R>,
        options: &SyncOptions,
        mut on_status: impl FnMut(SyncStatus),
    ) -> SyncOutcome<R>
    where
        R: SyncRecord,
        C: RemoteCollection<R>,
    {
        let Some(remote) = self.remote else {
            on_status(SyncStatus::Offline);
            return SyncOutcome::unchanged(local, SyncStatus::Offline);
        };
        if !options.online {
            on_status(SyncStatus::Offline);
            return SyncOutcome::unchanged(local, SyncStatus::Offline);
        }
        let Some(owner) = options.owner.as_deref() else {
            on_status(SyncStatus::Idle);
            return SyncOutcome::unchanged(local, SyncStatus::Idle);
        };

        on_status(SyncStatus::Syncing);

        let remote_records = match remote.pull(owner).await {
            Ok(records) => records,
            Err(error) => {
                tracing::error!(kind = %self.kind, owner, %error, "pull failed");
                on_status(SyncStatus::Error);
                return SyncOutcome::unchanged(local, SyncStatus::Error);
            }
        };

        let tracker = SyncStateTracker::new(self.kv);
        // Guardrail inputs are captured before this pull is recorded and
        // before the merge: a first-run client stays blocked this cycle.
        let was_pulled_once = tracker.load(self.kind, owner).has_pulled_once;
        tracker.mark_pulled(self.kind, owner);

        let context = PushContext {
            was_pulled_once,
            local_count: local.len(),
            remote_count: remote_records.len(),
            allow_bootstrap_push: options.allow_bootstrap_push,
        };
        let pending = upsert_set(&local, &remote_records);
        let merged = merge(&local, remote_records);

        if let Some(block) = should_block_push(&context) {
            tracing::debug!(kind = %self.kind, owner, reason = %block, "push blocked");
            on_status(SyncStatus::Synced);
            return SyncOutcome {
                records: merged,
                status: SyncStatus::Synced,
                pushed: 0,
                blocked: Some(block),
            };
        }

        if pending.is_empty() {
            on_status(SyncStatus::Synced);
            return SyncOutcome {
                records: merged,
                status: SyncStatus::Synced,
                pushed: 0,
                blocked: None,
            };
        }

        match remote.push(owner, &pending).await {
            Ok(()) => {
                tracing::debug!(kind = %self.kind, owner, count = pending.len(), "pushed records");
                on_status(SyncStatus::Synced);
                SyncOutcome {
                    records: merged,
                    status: SyncStatus::Synced,
                    pushed: pending.len(),
                    blocked: None,
                }
            }
            Err(error) => {
                // The merge result is still the correct local view; the
                // next sync retries the same upsert set.
                tracing::error!(kind = %self.kind, owner, %error, "push failed");
                on_status(SyncStatus::Error);
                SyncOutcome {
                    records: merged,
                    status: SyncStatus::Error,
                    pushed: 0,
                    blocked: None,
                }
            }
        }
    }

    /// Pull-only refresh: pull, record the pull, merge. Never pushes.
    ///
    /// Used right after a namespace switch so the caller can present the
    /// new partition's converged view before any mutation risks a push.
    pub async fn refresh<R>(
        &self,
        local: Snapshot<R>,
        owner: &str,
        mut on_status: impl FnMut(SyncStatus),
    ) -> SyncOutcome<R>
    where
        R: SyncRecord,
        C: RemoteCollection<R>,
    {
        let Some(remote) = self.remote else {
            on_status(SyncStatus::Offline);
            return SyncOutcome::unchanged(local, SyncStatus::Offline);
        };

        on_status(SyncStatus::Syncing);

        let remote_records = match remote.pull(owner).await {
            Ok(records) => records,
            Err(error) => {
                tracing::error!(kind = %self.kind, owner, %error, "pull failed");
                on_status(SyncStatus::Error);
                return SyncOutcome::unchanged(local, SyncStatus::Error);
            }
        };

        SyncStateTracker::new(self.kv).mark_pulled(self.kind, owner);
        let merged = merge(&local, remote_records);
        on_status(SyncStatus::Synced);
        SyncOutcome {
            records: merged,
            status: SyncStatus::Synced,
            pushed: 0,
            blocked: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{snapshot_of, TodoTask};
    use crate::store::MemoryStore;
    use crate::sync::state::SyncStateTracker;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    /// Scripted remote for orchestrator scenarios.
    #[derive(Default)]
    struct ScriptedRemote {
        records: Mutex<Snapshot<TodoTask>>,
        fail_pull: bool,
        fail_push: bool,
        pushes: Mutex<Vec<Vec<TodoTask>>>,
    }

    impl ScriptedRemote {
        fn seeded(records: Snapshot<TodoTask>) -> Self {
            Self {
                records: Mutex::new(records),
                ..Self::default()
            }
        }

        fn pushed_ids(&self) -> Vec<String> {
            let mut ids: Vec<String> = self
                .pushes
                .lock()
                .unwrap()
                .iter()
                .flatten()
                .map(|record| record.id.clone())
                .collect();
            ids.sort();
            ids
        }
    }

    impl RemoteCollection<TodoTask> for ScriptedRemote {
        async fn pull(&self, _owner_id: &str) -> crate::Result<Snapshot<TodoTask>> {
            if self.fail_pull {
                return Err(crate::Error::Remote("pull refused".to_string()));
            }
            Ok(self.records.lock().unwrap().clone())
        }

        async fn push(&self, _owner_id: &str, records: &[TodoTask]) -> crate::Result<()> {
            if self.fail_push {
                return Err(crate::Error::Remote("push refused".to_string()));
            }
            self.pushes.lock().unwrap().push(records.to_vec());
            let mut stored = self.records.lock().unwrap();
            for record in records {
                stored.insert(record.id.clone(), record.clone());
            }
            Ok(())
        }

        async fn count(&self, _owner_id: &str) -> crate::Result<usize> {
            Ok(self.records.lock().unwrap().len())
        }
    }

    fn task(id: &str, title: &str, minute: Option<u32>) -> TodoTask {
        TodoTask {
            id: id.to_string(),
            title: title.to_string(),
            done: false,
            due_on: None,
            updated_at: minute.map(|m| Utc.with_ymd_and_hms(2026, 3, 5, 10, m, 0).unwrap()),
            deleted_at: None,
        }
    }

    fn options(owner: &str) -> SyncOptions {
        SyncOptions {
            owner: Some(owner.to_string()),
            ..SyncOptions::default()
        }
    }

    fn mark_pulled(kv: &MemoryStore, owner: &str) {
        SyncStateTracker::new(kv).mark_pulled(EntityKind::TodoTask, owner);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn unconfigured_remote_reports_offline() {
        let kv = MemoryStore::new();
        let engine: SyncEngine<'_, ScriptedRemote> =
            SyncEngine::new(EntityKind::TodoTask, &kv, None);
        let local = snapshot_of([task("a", "keep", Some(1))]);

        let outcome = engine.sync(local.clone(), &options("default"), |_| {}).await;

        assert_eq!(outcome.status, SyncStatus::Offline);
        assert_eq!(outcome.records, local);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn offline_device_short_circuits_before_network() {
        let kv = MemoryStore::new();
        let remote = ScriptedRemote {
            fail_pull: true, // would fail if reached
            ..ScriptedRemote::default()
        };
        let engine = SyncEngine::new(EntityKind::TodoTask, &kv, Some(&remote));
        let local = snapshot_of([task("a", "keep", Some(1))]);

        let opts = SyncOptions {
            online: false,
            ..options("default")
        };
        let outcome = engine.sync(local.clone(), &opts, |_| {}).await;

        assert_eq!(outcome.status, SyncStatus::Offline);
        assert_eq!(outcome.records, local);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn missing_owner_reports_idle() {
        let kv = MemoryStore::new();
        let remote = ScriptedRemote::default();
        let engine = SyncEngine::new(EntityKind::TodoTask, &kv, Some(&remote));

        let outcome = engine
            .sync(Snapshot::new(), &SyncOptions::default(), |_| {})
            .await;

        assert_eq!(outcome.status, SyncStatus::Idle);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn pull_failure_leaves_local_untouched_and_stays_fresh() {
        let kv = MemoryStore::new();
        let remote = ScriptedRemote {
            fail_pull: true,
            ..ScriptedRemote::default()
        };
        let engine = SyncEngine::new(EntityKind::TodoTask, &kv, Some(&remote));
        let local = snapshot_of([task("a", "keep", Some(1))]);

        let outcome = engine.sync(local.clone(), &options("default"), |_| {}).await;

        assert_eq!(outcome.status, SyncStatus::Error);
        assert_eq!(outcome.records, local);
        // A failed pull must not flip the fresh-client gate.
        let state = SyncStateTracker::new(&kv).load(EntityKind::TodoTask, "default");
        assert!(!state.has_pulled_once);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn first_sync_merges_but_blocks_push_as_fresh_client() {
        let kv = MemoryStore::new();
        let remote = ScriptedRemote::seeded(snapshot_of([task("cloud", "from cloud", Some(2))]));
        let engine = SyncEngine::new(EntityKind::TodoTask, &kv, Some(&remote));
        let local = snapshot_of([task("mine", "local edit", Some(3))]);

        let outcome = engine.sync(local, &options("default"), |_| {}).await;

        assert_eq!(outcome.status, SyncStatus::Synced);
        assert_eq!(outcome.blocked, Some(PushBlock::FreshClient));
        assert_eq!(outcome.pushed, 0);
        assert_eq!(outcome.records.len(), 2);
        assert!(remote.pushes.lock().unwrap().is_empty());
        // The pull itself is recorded, so the next cycle may push.
        let state = SyncStateTracker::new(&kv).load(EntityKind::TodoTask, "default");
        assert!(state.has_pulled_once);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn second_sync_pushes_minimal_upsert_set() {
        let kv = MemoryStore::new();
        mark_pulled(&kv, "default");
        let remote = ScriptedRemote::seeded(snapshot_of([
            task("shared", "remote newer", Some(9)),
            task("stale", "remote copy", Some(5)),
        ]));
        let engine = SyncEngine::new(EntityKind::TodoTask, &kv, Some(&remote));
        let local = snapshot_of([
            task("shared", "older here", Some(1)),
            task("stale", "newer here", Some(7)),
            task("fresh", "offline create", Some(3)),
        ]);

        let outcome = engine.sync(local, &options("default"), |_| {}).await;

        assert_eq!(outcome.status, SyncStatus::Synced);
        assert_eq!(outcome.blocked, None);
        assert_eq!(outcome.pushed, 2);
        assert_eq!(remote.pushed_ids(), vec!["fresh", "stale"]);
        // Converged view keeps the remote's newer "shared".
        assert_eq!(outcome.records["shared"].title, "remote newer");
        assert_eq!(outcome.records["stale"].title, "newer here");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn empty_remote_blocks_push_without_bootstrap() {
        let kv = MemoryStore::new();
        mark_pulled(&kv, "default");
        let remote = ScriptedRemote::default();
        let engine = SyncEngine::new(EntityKind::TodoTask, &kv, Some(&remote));
        let local = snapshot_of([task("a", "seedable", Some(1))]);

        let outcome = engine.sync(local.clone(), &options("default"), |_| {}).await;
        assert_eq!(outcome.blocked, Some(PushBlock::EmptyNamespace));
        assert!(remote.pushes.lock().unwrap().is_empty());

        let opts = SyncOptions {
            allow_bootstrap_push: true,
            ..options("default")
        };
        let outcome = engine.sync(local, &opts, |_| {}).await;
        assert_eq!(outcome.blocked, None);
        assert_eq!(outcome.pushed, 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn small_local_set_is_blocked_from_clobbering() {
        let kv = MemoryStore::new();
        mark_pulled(&kv, "default");
        let cloud: Vec<TodoTask> = (0..10)
            .map(|index| task(&format!("c{index}"), "cloud", Some(1)))
            .collect();
        let remote = ScriptedRemote::seeded(snapshot_of(cloud));
        let engine = SyncEngine::new(EntityKind::TodoTask, &kv, Some(&remote));
        let local = snapshot_of([task("mine", "lonely", Some(9))]);

        let outcome = engine.sync(local, &options("default"), |_| {}).await;

        assert_eq!(outcome.blocked, Some(PushBlock::AntiClobber));
        assert_eq!(outcome.pushed, 0);
        // The merge is still returned: all 11 records.
        assert_eq!(outcome.records.len(), 11);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn push_failure_still_returns_merged_view() {
        let kv = MemoryStore::new();
        mark_pulled(&kv, "default");
        let remote = ScriptedRemote {
            records: Mutex::new(snapshot_of([task("cloud", "cloud", Some(1))])),
            fail_push: true,
            ..ScriptedRemote::default()
        };
        let engine = SyncEngine::new(EntityKind::TodoTask, &kv, Some(&remote));
        let local = snapshot_of([task("mine", "unsynced", Some(2))]);

        let outcome = engine.sync(local, &options("default"), |_| {}).await;

        assert_eq!(outcome.status, SyncStatus::Error);
        assert_eq!(outcome.records.len(), 2);
        assert!(outcome.records.contains_key("mine"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn seed_records_are_never_pushed() {
        let kv = MemoryStore::new();
        mark_pulled(&kv, "default");
        let remote = ScriptedRemote::seeded(snapshot_of([task("cloud", "cloud", Some(1))]));
        let engine = SyncEngine::new(EntityKind::TodoTask, &kv, Some(&remote));
        let local = snapshot_of([
            task("seed-a", "seeded", None),
            task("touched", "edited", Some(2)),
        ]);

        let outcome = engine.sync(local, &options("default"), |_| {}).await;

        assert_eq!(outcome.pushed, 1);
        assert_eq!(remote.pushed_ids(), vec!["touched"]);
        // Seed data still participates in the converged view.
        assert!(outcome.records.contains_key("seed-a"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn status_sequence_is_syncing_then_synced() {
        let kv = MemoryStore::new();
        let remote = ScriptedRemote::default();
        let engine = SyncEngine::new(EntityKind::TodoTask, &kv, Some(&remote));

        let mut statuses = Vec::new();
        engine
            .sync(Snapshot::<TodoTask>::new(), &options("default"), |status| {
                statuses.push(status);
            })
            .await;

        assert_eq!(statuses, vec![SyncStatus::Syncing, SyncStatus::Synced]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn repeated_sync_is_idempotent() {
        let kv = MemoryStore::new();
        mark_pulled(&kv, "default");
        let remote = ScriptedRemote::seeded(snapshot_of([task("cloud", "cloud", Some(1))]));
        let engine = SyncEngine::new(EntityKind::TodoTask, &kv, Some(&remote));
        let local = snapshot_of([task("mine", "mine", Some(2))]);

        let first = engine.sync(local, &options("default"), |_| {}).await;
        assert_eq!(first.pushed, 1);

        let second = engine.sync(first.records.clone(), &options("default"), |_| {}).await;
        assert_eq!(second.status, SyncStatus::Synced);
        assert_eq!(second.pushed, 0);
        assert_eq!(second.records, first.records);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn refresh_pulls_and_merges_without_pushing() {
        let kv = MemoryStore::new();
        let remote = ScriptedRemote::seeded(snapshot_of([task("cloud", "cloud", Some(5))]));
        let engine = SyncEngine::new(EntityKind::TodoTask, &kv, Some(&remote));
        let local = snapshot_of([task("mine", "pushable", Some(9))]);

        let outcome = engine.refresh(local, "fresh-owner", |_| {}).await;

        assert_eq!(outcome.status, SyncStatus::Synced);
        assert_eq!(outcome.records.len(), 2);
        assert!(remote.pushes.lock().unwrap().is_empty());
        let state = SyncStateTracker::new(&kv).load(EntityKind::TodoTask, "fresh-owner");
        assert!(state.has_pulled_once);
    }
}
