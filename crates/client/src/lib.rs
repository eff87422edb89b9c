//! Upstream client code for catalog-cache.
//!
//! This crate provides the read-only catalog service client used by the
//! request handlers and the background refresher.

pub mod catalog;

pub use catalog::{Catalog, CatalogClient, CatalogConfig, CatalogRequest, UpstreamError};
