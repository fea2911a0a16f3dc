//! In-process storage backend
//!
//! Implements every repository trait over `DashMap`s. Each operation locks a
//! single shard entry, which gives the same per-record atomicity the
//! PostgreSQL repositories get from row locks. State is lost on restart.

mod store;

pub use store::MemoryStore;
