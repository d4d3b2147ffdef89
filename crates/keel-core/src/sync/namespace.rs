//! Owner/namespace resolution.
//!
//! The owner id names the remote partition this client's local data is
//! scoped to. A missing value is filled with a fixed constant — never a
//! random one — so two first-run devices land in the same partition
//! instead of silently forking into separate empty ones.

use crate::store::KeyValueStore;
use crate::sync::state::SyncStateTracker;
use crate::util::normalize_text_option;

/// Fixed fallback partition for clients that never chose one.
pub const DEFAULT_OWNER_ID: &str = "default";

const OWNER_KEY: &str = "namespace/owner";

/// Resolve the active owner id, persisting the fixed default when absent.
pub fn get_or_create_owner_id(kv: &dyn KeyValueStore) -> String {
    match kv.get(OWNER_KEY) {
        Ok(Some(raw)) => {
            if let Some(owner) = normalize_text_option(Some(raw)) {
                return owner;
            }
            persist_default(kv)
        }
        Ok(None) => persist_default(kv),
        Err(error) => {
            tracing::warn!(%error, "failed to read owner id, using default");
            DEFAULT_OWNER_ID.to_string()
        }
    }
}

fn persist_default(kv: &dyn KeyValueStore) -> String {
    if let Err(error) = kv.set(OWNER_KEY, DEFAULT_OWNER_ID) {
        tracing::warn!(%error, "failed to persist default owner id");
    }
    DEFAULT_OWNER_ID.to_string()
}

/// Outcome of a namespace switch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchedNamespace {
    pub previous: String,
    pub next: String,
}

/// Persist `next` as the active partition and reset the pull state of every
/// entity kind for both the old and the new partition, so the next sync
/// against either is gated behind a fresh pull.
///
/// Callers follow this with a pull-only refresh per collection
/// ([`crate::sync::SyncEngine::refresh`]) before any further mutation.
pub fn switch_namespace(
    kv: &dyn KeyValueStore,
    next: &str,
) -> crate::Result<SwitchedNamespace> {
    let next = normalize_text_option(Some(next.to_string()))
        .ok_or_else(|| crate::Error::InvalidInput("owner id must not be empty".to_string()))?;

    let previous = get_or_create_owner_id(kv);
    kv.set(OWNER_KEY, &next)?;

    let tracker = SyncStateTracker::new(kv);
    tracker.reset_all(&previous);
    tracker.reset_all(&next);

    tracing::info!(%previous, %next, "switched namespace");
    Ok(SwitchedNamespace { previous, next })
}
