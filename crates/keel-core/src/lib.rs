//! keel-core - Core library for Keel
//!
//! This crate contains the shared models, local persistence, and the
//! offline-first sync engine used by all Keel interfaces.

pub mod clock;
pub mod error;
pub mod export;
pub mod models;
pub mod store;
pub mod sync;
pub mod util;

pub use error::{Error, Result};
pub use models::{DayPin, EntityKind, ResearchTask, Snapshot, SyncRecord, TodoTask};
