//! Cached collection reads.
//!
//! ### Hit/miss asymmetry
//!
//! - **Hit**: the cached snapshot is copied, sorted, then searched and
//!   returned whole. `page` and `items_per_page` are ignored, so the result
//!   covers whatever was cached: one page or the full collection.
//! - **Miss**: the requested page is fetched, cached as-is and returned
//!   verbatim. Sort and search are not applied until the next request hits.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use catalog_core::{QuerySpec, ResourceKind, Snapshot, query::apply_query};

use crate::{AppState, ApiError};

/// `GET /collection/{resource}`.
pub async fn get_collection(
    State(state): State<AppState>, Path(resource): Path<String>, Query(spec): Query<QuerySpec>,
) -> Result<Json<Snapshot>, ApiError> {
    load_collection(&state, &resource, &spec).await.map(Json)
}

/// Serve one collection request from cache, falling back to a page fetch.
pub async fn load_collection(state: &AppState, resource: &str, spec: &QuerySpec) -> Result<Snapshot, ApiError> {
    if let Some(snapshot) = state.cache.get(resource).await? {
        tracing::debug!(resource, cached = snapshot.results().len(), "cache hit");
        return Ok(apply_query(&snapshot, spec));
    }

    tracing::debug!(
        resource,
        page = spec.page,
        items_per_page = spec.items_per_page,
        offset = spec.offset(),
        "cache miss"
    );
    if resource.parse::<ResourceKind>().is_err() {
        tracing::debug!(resource, "unknown resource, not covered by refresh");
    }

    let page = state
        .catalog
        .fetch_page(resource, spec.page, spec.items_per_page)
        .await?;

    if let Err(err) = state.cache.put(resource, &page).await {
        tracing::warn!(resource, error = %err, "failed to cache fetched page");
    }

    Ok(page)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::testing::{FakeCatalog, state_with};
    use catalog_core::SortOrder;

    fn names(snapshot: &Snapshot) -> Vec<&str> {
        snapshot.results().iter().map(|i| i["name"].as_str().unwrap()).collect()
    }

    #[tokio::test]
    async fn test_miss_fetches_page_and_caches_it() {
        let catalog = Arc::new(FakeCatalog::new(20));
        let state = state_with(catalog.clone()).await;
        let spec = QuerySpec { page: 1, items_per_page: 5, ..Default::default() };

        let page = load_collection(&state, "people", &spec).await.unwrap();

        assert_eq!(catalog.calls(), ["page:people:1:5"]);
        assert_eq!(page.results().len(), 5);
        assert_eq!(state.cache.get("people").await.unwrap(), Some(page));
    }

    #[tokio::test]
    async fn test_miss_ignores_sort_and_search() {
        let catalog = Arc::new(FakeCatalog::new(20));
        let state = state_with(catalog.clone()).await;
        let spec = QuerySpec {
            page: 1,
            items_per_page: 3,
            sort: Some("name".into()),
            order: SortOrder::Desc,
            search: Some("people-2".into()),
            ..Default::default()
        };

        let page = load_collection(&state, "people", &spec).await.unwrap();
        assert_eq!(names(&page), ["people-0", "people-1", "people-2"]);
    }

    #[tokio::test]
    async fn test_hit_skips_upstream() {
        let catalog = Arc::new(FakeCatalog::new(20));
        let state = state_with(catalog.clone()).await;
        let spec = QuerySpec::default();

        load_collection(&state, "films", &spec).await.unwrap();
        load_collection(&state, "films", &spec).await.unwrap();
        load_collection(&state, "films", &QuerySpec { page: 2, ..Default::default() }).await.unwrap();

        assert_eq!(catalog.calls(), ["page:films:1:10"]);
    }

    #[tokio::test]
    async fn test_hit_sorts_cached_page_without_repaginating() {
        let catalog = Arc::new(FakeCatalog::new(20));
        let state = state_with(catalog.clone()).await;

        let first = QuerySpec { page: 1, items_per_page: 5, ..Default::default() };
        load_collection(&state, "people", &first).await.unwrap();

        let second = QuerySpec { sort: Some("name".into()), order: SortOrder::Desc, ..Default::default() };
        let view = load_collection(&state, "people", &second).await.unwrap();

        assert_eq!(names(&view), ["people-4", "people-3", "people-2", "people-1", "people-0"]);
        assert_eq!(catalog.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_hit_does_not_mutate_cache() {
        let catalog = Arc::new(FakeCatalog::new(10));
        let state = state_with(catalog).await;
        load_collection(&state, "planets", &QuerySpec::default()).await.unwrap();
        let before = state.cache.get("planets").await.unwrap();

        let spec = QuerySpec {
            sort: Some("rank".into()),
            order: SortOrder::Desc,
            search: Some("1".into()),
            ..Default::default()
        };
        let view = load_collection(&state, "planets", &spec).await.unwrap();
        assert_eq!(names(&view), ["planets-1"]);

        assert_eq!(state.cache.get("planets").await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_upstream_failure_is_not_cached() {
        let catalog = Arc::new(FakeCatalog::new(10).failing_on("vehicles"));
        let state = state_with(catalog).await;

        let err = load_collection(&state, "vehicles", &QuerySpec::default()).await.unwrap_err();
        assert!(matches!(err, ApiError::Upstream(_)));
        assert!(state.cache.get("vehicles").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unknown_resource_is_attempted_and_cached() {
        let catalog = Arc::new(FakeCatalog::new(3));
        let state = state_with(catalog.clone()).await;

        load_collection(&state, "droids", &QuerySpec::default()).await.unwrap();
        assert_eq!(catalog.calls(), ["page:droids:1:10"]);
        assert!(state.cache.get("droids").await.unwrap().is_some());
    }
}
