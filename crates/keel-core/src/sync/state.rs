//! Persisted pull-state tracker.
//!
//! One small flag set per (entity kind, owner): whether at least one
//! successful pull has ever completed, and when. This is the basis of the
//! fresh-client guardrail, so it is only reset by an explicit namespace
//! switch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clock;
use crate::models::EntityKind;
use crate::store::KeyValueStore;

/// Pull history for one (entity kind, owner) pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullState {
    #[serde(default)]
    pub has_pulled_once: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_pulled_at: Option<DateTime<Utc>>,
}

/// Typed accessors over the key-value store for pull state.
pub struct SyncStateTracker<'a> {
    kv: &'a dyn KeyValueStore,
}

impl<'a> SyncStateTracker<'a> {
    #[must_use]
    pub const fn new(kv: &'a dyn KeyValueStore) -> Self {
        Self { kv }
    }

    fn key(kind: EntityKind, owner: &str) -> String {
        format!("sync-state/{}/{owner}", kind.storage_key())
    }

    /// Load the pull state; missing or malformed state reads as never-pulled.
    pub fn load(&self, kind: EntityKind, owner: &str) -> PullState {
        let key = Self::key(kind, owner);
        match self.kv.get(&key) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|error| {
                tracing::warn!(%key, %error, "malformed sync state, treating as fresh");
                PullState::default()
            }),
            Ok(None) => PullState::default(),
            Err(error) => {
                tracing::warn!(%key, %error, "failed to read sync state");
                PullState::default()
            }
        }
    }

    /// Durably record that a pull completed now for (kind, owner).
    pub fn mark_pulled(&self, kind: EntityKind, owner: &str) {
        let state = PullState {
            has_pulled_once: true,
            last_pulled_at: Some(clock::now()),
        };
        let key = Self::key(kind, owner);
        match serde_json::to_string(&state) {
            Ok(raw) => {
                if let Err(error) = self.kv.set(&key, &raw) {
                    tracing::warn!(%key, %error, "failed to persist sync state");
                }
            }
            Err(error) => tracing::warn!(%key, %error, "failed to serialize sync state"),
        }
    }

    /// Forget the pull state for (kind, owner).
    pub fn reset(&self, kind: EntityKind, owner: &str) {
        let key = Self::key(kind, owner);
        if let Err(error) = self.kv.remove(&key) {
            tracing::warn!(%key, %error, "failed to reset sync state");
        }
    }

    /// Forget the pull state of every entity kind for `owner`.
    pub fn reset_all(&self, owner: &str) {
        for kind in EntityKind::ALL {
            self.reset(kind, owner);
        }
    }
}
