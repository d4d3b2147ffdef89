//! Offline-first synchronization core.
//!
//! The pieces compose in one direction: the [`merge`] module and the
//! [`guardrail`] module are pure; [`state`] and [`namespace`] persist the
//! small flags the guardrail feeds on; [`engine`] coordinates a pull,
//! merge and minimal push per collection kind against a [`remote`]
//! implementation.

pub mod engine;
pub mod guardrail;
pub mod merge;
pub mod namespace;
pub mod remote;
pub mod state;

pub use engine::{SyncEngine, SyncOptions, SyncOutcome, SyncStatus};
pub use guardrail::{should_block_push, PushBlock, PushContext};
pub use merge::{merge, upsert_set};
pub use namespace::{get_or_create_owner_id, switch_namespace, SwitchedNamespace, DEFAULT_OWNER_ID};
pub use remote::{HttpRemote, RemoteCollection, RemoteConfig};
pub use state::{PullState, SyncStateTracker};
