//! In-memory collection cache.
//!
//! Holds the last-known response body for each catalog resource in an
//! in-memory SQLite database, accessed asynchronously via tokio-rusqlite.
//! The connection lives on a dedicated thread, so every read and write is
//! serialized through it and a `put` is never observed half-applied.
//!
//! There is no eviction, TTL or capacity bound: an entry is replaced on each
//! successful fetch and lives until the process exits.

pub mod connection;
pub mod migrations;
pub mod snapshots;

pub use crate::Error;

pub use connection::CacheStore;
pub use snapshots::{CachedResource, InvalidSnapshot, Snapshot};
