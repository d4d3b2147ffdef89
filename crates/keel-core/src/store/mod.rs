//! Local persistence layer for Keel

pub mod collection;
mod kv;

pub use kv::{FileStore, KeyValueStore, MemoryStore};
