//! Core types and shared functionality for catalog-cache.
//!
//! This crate provides:
//! - In-memory collection cache backed by SQLite
//! - Query engine (sort and search over cached snapshots)
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod query;
pub mod resource;

pub use cache::{CacheStore, Snapshot};
pub use config::AppConfig;
pub use error::Error;
pub use query::{QuerySpec, SortOrder};
pub use resource::ResourceKind;
