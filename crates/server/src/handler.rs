//! Shared request state and the axum router.
//!
//! The cache and the upstream client are built once at startup and handed to
//! every route through [`AppState`]; nothing is reached through globals.

use std::sync::Arc;

use axum::{Router, routing::get};
use catalog_client::Catalog;
use catalog_core::CacheStore;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::routes::{collection, health, passthrough};

/// State shared by all routes.
#[derive(Clone)]
pub struct AppState {
    pub cache: CacheStore,
    pub catalog: Arc<dyn Catalog>,
}

impl AppState {
    pub fn new(cache: CacheStore, catalog: Arc<dyn Catalog>) -> Self {
        Self { cache, catalog }
    }
}

/// Build the HTTP router.
///
/// `/collection/search` and `/collection/sort` are static routes and win over
/// the `{resource}` capture.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/collection/search", get(passthrough::search))
        .route("/collection/sort", get(passthrough::sort))
        .route("/collection/{resource}", get(collection::get_collection))
        .route("/collection/{resource}/{id}", get(passthrough::get_item))
        .route("/health", get(health::health))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}
