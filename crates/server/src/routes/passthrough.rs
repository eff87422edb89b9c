//! Direct proxy routes.
//!
//! These bypass the cache and the query engine entirely: item lookups and
//! upstream's own search and ordering.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use catalog_core::SortOrder;
use serde::Deserialize;
use serde_json::Value;

use crate::{AppState, ApiError};

/// Query for `GET /collection/search`.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchParams {
    pub resource: String,
    pub query: String,
}

/// Query for `GET /collection/sort`.
#[derive(Debug, Clone, Deserialize)]
pub struct SortParams {
    pub resource: String,
    pub attribute: String,
    /// Exactly `asc` sorts ascending; anything else, or nothing, descending.
    #[serde(default)]
    pub order: Option<String>,
}

impl SortParams {
    /// Upstream ordering direction.
    ///
    /// This route defaults to descending, unlike the cached collection path.
    pub fn sort_order(&self) -> SortOrder {
        match self.order.as_deref() {
            Some("asc") => SortOrder::Asc,
            _ => SortOrder::Desc,
        }
    }
}

/// `GET /collection/{resource}/{id}`.
pub async fn get_item(
    State(state): State<AppState>, Path((resource, id)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    state
        .catalog
        .fetch_item(&resource, &id)
        .await
        .map(Json)
        .map_err(|err| if err.is_not_found() { ApiError::NotFound } else { ApiError::Upstream(err) })
}

/// `GET /collection/search?resource&query`.
pub async fn search(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Result<Json<Value>, ApiError> {
    state
        .catalog
        .fetch_search(&params.resource, &params.query)
        .await
        .map(Json)
        .map_err(ApiError::Passthrough)
}

/// `GET /collection/sort?resource&attribute&order`.
pub async fn sort(State(state): State<AppState>, Query(params): Query<SortParams>) -> Result<Json<Value>, ApiError> {
    state
        .catalog
        .fetch_sorted(&params.resource, &params.attribute, params.sort_order())
        .await
        .map(Json)
        .map_err(ApiError::Passthrough)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::testing::{FakeCatalog, state_with};

    #[test]
    fn test_sort_order_defaults_to_desc() {
        let params = SortParams { resource: "people".into(), attribute: "name".into(), order: None };
        assert_eq!(params.sort_order(), SortOrder::Desc);

        let params = SortParams { order: Some("asc".into()), ..params };
        assert_eq!(params.sort_order(), SortOrder::Asc);

        for other in ["desc", "ASC", "up", ""] {
            let params = SortParams { order: Some(other.into()), ..params.clone() };
            assert_eq!(params.sort_order(), SortOrder::Desc, "order={other:?}");
        }
    }

    #[tokio::test]
    async fn test_item_not_found_maps_to_404_variant() {
        let state = state_with(Arc::new(FakeCatalog::new(3))).await;
        let result = get_item(State(state), Path(("people".into(), "99".into()))).await;
        assert!(matches!(result, Err(ApiError::NotFound)));
    }

    #[tokio::test]
    async fn test_item_other_failure_is_upstream_error() {
        let state = state_with(Arc::new(FakeCatalog::new(3).failing_on("people"))).await;
        let result = get_item(State(state), Path(("people".into(), "1".into()))).await;
        assert!(matches!(result, Err(ApiError::Upstream(_))));
    }

    #[tokio::test]
    async fn test_passthroughs_bypass_cache() {
        let catalog = Arc::new(FakeCatalog::new(3));
        let state = state_with(catalog.clone()).await;

        let params = SearchParams { resource: "people".into(), query: "luke".into() };
        search(State(state.clone()), Query(params)).await.unwrap();
        let params = SortParams { resource: "people".into(), attribute: "name".into(), order: Some("desc".into()) };
        sort(State(state.clone()), Query(params)).await.unwrap();
        get_item(State(state.clone()), Path(("people".into(), "1".into()))).await.unwrap();

        assert_eq!(catalog.calls(), ["search:people:luke", "sorted:people:name:desc", "item:people:1"]);
        assert!(state.cache.is_empty().await.unwrap());
    }

    #[tokio::test]
    async fn test_passthrough_failure_is_opaque() {
        let state = state_with(Arc::new(FakeCatalog::new(3).failing_on("films"))).await;
        let params = SearchParams { resource: "films".into(), query: "hope".into() };
        let err = search(State(state), Query(params)).await.unwrap_err();
        assert_eq!(err.to_string(), "Internal Server Error");
    }
}
