//! Liveness and cache inventory.

use axum::{Json, extract::State};
use catalog_core::cache::CachedResource;
use serde::{Deserialize, Serialize};

use crate::{AppState, ApiError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    /// Resources currently held in the cache, by key.
    pub cached: Vec<CachedResource>,
}

/// `GET /health`.
pub async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    let cached = state.cache.resources().await?;
    Ok(Json(HealthResponse { status: "ok".into(), cached }))
}
