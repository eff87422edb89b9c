//! Upstream catalog service client.
//!
//! Reads paginated collections and single records from a read-only catalog
//! API (SWAPI-shaped: `{count, next, previous, results}` envelopes).
//!
//! ### Contract
//!
//! - **Single attempt**: no retries or backoff; every call is bounded by the
//!   configured timeout and failures surface immediately.
//! - **Status mapping**: 404 becomes `NotFound`, any other non-2xx becomes
//!   `BadStatus`.
//! - **Passthrough**: `fetch_search`, `fetch_sorted` and `fetch_item` return
//!   the upstream JSON untouched; only collection reads are parsed into a
//!   [`Snapshot`].

pub mod error;
pub mod request;

pub use error::UpstreamError;
pub use request::CatalogRequest;

use std::time::{Duration, Instant};

use async_trait::async_trait;
use catalog_core::{AppConfig, Snapshot, SortOrder};
use reqwest::header;
use serde_json::Value;
use url::Url;

/// Default base URL for the catalog API.
const DEFAULT_BASE_URL: &str = "https://swapi.dev/api";

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Default user agent.
const DEFAULT_USER_AGENT: &str = "catalog-cache/0.1";

/// Catalog client configuration.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Base URL (default: https://swapi.dev/api).
    pub base_url: String,
    /// Per-request timeout (default: 20s).
    pub timeout: Duration,
    /// User-agent string (default: catalog-cache/0.x).
    pub user_agent: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl From<&AppConfig> for CatalogConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            base_url: config.upstream_base_url.clone(),
            timeout: config.timeout(),
            user_agent: config.user_agent.clone(),
        }
    }
}

/// Read operations against the upstream catalog.
///
/// Handlers and the refresher depend on this trait rather than on
/// [`CatalogClient`] directly.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Fetch one page using `offset = (page-1)*items_per_page`, `limit = items_per_page`.
    async fn fetch_page(&self, resource: &str, page: u32, items_per_page: u32) -> Result<Snapshot, UpstreamError>;

    /// Fetch the collection without pagination constraints.
    async fn fetch_full(&self, resource: &str) -> Result<Snapshot, UpstreamError>;

    /// Delegate search to upstream and return its body unmodified.
    async fn fetch_search(&self, resource: &str, term: &str) -> Result<Value, UpstreamError>;

    /// Delegate ordering to upstream and return its body unmodified.
    async fn fetch_sorted(&self, resource: &str, attribute: &str, order: SortOrder) -> Result<Value, UpstreamError>;

    /// Fetch a single record. Absence is `UpstreamError::NotFound`.
    async fn fetch_item(&self, resource: &str, id: &str) -> Result<Value, UpstreamError>;
}

/// reqwest-backed [`Catalog`] implementation.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    http: reqwest::Client,
    base: Url,
    config: CatalogConfig,
}

impl CatalogClient {
    /// Create a new client with the given configuration.
    pub fn new(config: CatalogConfig) -> Result<Self, UpstreamError> {
        let base = Url::parse(&config.base_url).map_err(|e| UpstreamError::InvalidUrl(e.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(UpstreamError::InvalidUrl(format!("{base} cannot be a base")));
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| UpstreamError::from_reqwest(&config.base_url, e))?;

        Ok(Self { http, base, config })
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Issue one GET and decode the JSON body.
    async fn get_json(&self, url: Url) -> Result<Value, UpstreamError> {
        let start = Instant::now();
        let url_str = url.to_string();

        let response = self
            .http
            .get(url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| UpstreamError::from_reqwest(&url_str, e))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(UpstreamError::NotFound { url: url_str });
        }
        if !status.is_success() {
            return Err(UpstreamError::BadStatus { url: url_str, status: status.as_u16() });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| UpstreamError::from_reqwest(&url_str, e))?;
        let body: Value = serde_json::from_slice(&bytes)
            .map_err(|e| UpstreamError::MalformedBody { url: url_str.clone(), reason: e.to_string() })?;

        tracing::debug!(
            url = %url_str,
            status = status.as_u16(),
            bytes = bytes.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "upstream fetch completed"
        );

        Ok(body)
    }

    async fn get_snapshot(&self, url: Url) -> Result<Snapshot, UpstreamError> {
        let url_str = url.to_string();
        let body = self.get_json(url).await?;
        Snapshot::from_value(body).map_err(|e| UpstreamError::MalformedBody { url: url_str, reason: e.to_string() })
    }
}

#[async_trait]
impl Catalog for CatalogClient {
    async fn fetch_page(&self, resource: &str, page: u32, items_per_page: u32) -> Result<Snapshot, UpstreamError> {
        let url = CatalogRequest::Page { page, items_per_page }.url(&self.base, resource)?;
        self.get_snapshot(url).await
    }

    async fn fetch_full(&self, resource: &str) -> Result<Snapshot, UpstreamError> {
        let url = CatalogRequest::Full.url(&self.base, resource)?;
        self.get_snapshot(url).await
    }

    async fn fetch_search(&self, resource: &str, term: &str) -> Result<Value, UpstreamError> {
        let url = CatalogRequest::Search { term }.url(&self.base, resource)?;
        self.get_json(url).await
    }

    async fn fetch_sorted(&self, resource: &str, attribute: &str, order: SortOrder) -> Result<Value, UpstreamError> {
        let url = CatalogRequest::Sorted { attribute, order }.url(&self.base, resource)?;
        self.get_json(url).await
    }

    async fn fetch_item(&self, resource: &str, id: &str) -> Result<Value, UpstreamError> {
        let url = CatalogRequest::Item { id }.url(&self.base, resource)?;
        self.get_json(url).await
    }
}
