//! HTTP surface and background refresh for catalog-cache.
//!
//! - [`handler`]: shared state and the axum router
//! - [`routes`]: collection (cached), item and passthrough endpoints
//! - [`refresher`]: periodic full-collection refresh

pub mod error;
pub mod handler;
pub mod refresher;
pub mod routes;

#[cfg(test)]
pub(crate) mod testing;

pub use error::ApiError;
pub use handler::{AppState, router};
pub use refresher::{RefreshError, RefreshReport, Refresher};
