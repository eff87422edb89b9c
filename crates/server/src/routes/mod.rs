//! Route handlers.
//!
//! Only [`collection`] goes through the cache. Item lookups and the
//! search/sort passthroughs are direct proxy calls to the catalog service.

pub mod collection;
pub mod health;
pub mod passthrough;
