//! In-process `Catalog` fake for unit tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use catalog_client::{Catalog, UpstreamError};
use catalog_core::{CacheStore, Snapshot, SortOrder};
use serde_json::{Value, json};

use crate::AppState;

/// Records every call and serves generated collections.
///
/// Collections hold `size` records named `{resource}-{n}`; pages are sliced
/// from that sequence by offset/limit.
#[derive(Debug)]
pub struct FakeCatalog {
    calls: Mutex<Vec<String>>,
    size: usize,
    failing: Option<String>,
}

impl FakeCatalog {
    pub fn new(size: usize) -> Self {
        Self { calls: Mutex::new(Vec::new()), size, failing: None }
    }

    /// Make every call for `resource` fail with a 500.
    pub fn failing_on(mut self, resource: &str) -> Self {
        self.failing = Some(resource.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, resource: &str, call: String) -> Result<(), UpstreamError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
        if self.failing.as_deref() == Some(resource) {
            return Err(UpstreamError::BadStatus { url: format!("fake://{resource}/"), status: 500 });
        }
        Ok(())
    }

    fn records(&self, resource: &str, offset: usize, limit: usize) -> Vec<Value> {
        (offset..self.size.min(offset + limit))
            .map(|n| json!({ "name": format!("{resource}-{n}"), "rank": n }))
            .collect()
    }
}

#[async_trait]
impl Catalog for FakeCatalog {
    async fn fetch_page(&self, resource: &str, page: u32, items_per_page: u32) -> Result<Snapshot, UpstreamError> {
        self.record(resource, format!("page:{resource}:{page}:{items_per_page}"))?;
        let offset = page.saturating_sub(1) as usize * items_per_page as usize;
        Ok(Snapshot::from_results(self.records(resource, offset, items_per_page as usize))
            .with_field("count", json!(self.size)))
    }

    async fn fetch_full(&self, resource: &str) -> Result<Snapshot, UpstreamError> {
        self.record(resource, format!("full:{resource}"))?;
        Ok(Snapshot::from_results(self.records(resource, 0, self.size)).with_field("count", json!(self.size)))
    }

    async fn fetch_search(&self, resource: &str, term: &str) -> Result<Value, UpstreamError> {
        self.record(resource, format!("search:{resource}:{term}"))?;
        Ok(json!({ "search": term }))
    }

    async fn fetch_sorted(&self, resource: &str, attribute: &str, order: SortOrder) -> Result<Value, UpstreamError> {
        self.record(resource, format!("sorted:{resource}:{attribute}:{order}"))?;
        Ok(json!({ "ordering": attribute, "order": order }))
    }

    async fn fetch_item(&self, resource: &str, id: &str) -> Result<Value, UpstreamError> {
        self.record(resource, format!("item:{resource}:{id}"))?;
        match id.parse::<usize>() {
            Ok(n) if n < self.size => Ok(json!({ "name": format!("{resource}-{n}") })),
            _ => Err(UpstreamError::NotFound { url: format!("fake://{resource}/{id}/") }),
        }
    }
}

/// Fresh in-memory state around a fake catalog.
pub async fn state_with(catalog: Arc<FakeCatalog>) -> AppState {
    let cache = CacheStore::open_in_memory().await.unwrap();
    AppState::new(cache, catalog)
}
