//! Data models for Keel

mod day_pin;
mod record;
mod research;
mod todo;

pub use day_pin::{pin_id, DayPin};
pub use record::{snapshot_of, EntityKind, Snapshot, SyncRecord};
pub use research::{extract_tags, ResearchStatus, ResearchStep, ResearchTask};
pub use todo::TodoTask;
