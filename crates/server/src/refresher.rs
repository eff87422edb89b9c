//! Periodic full-collection refresh.
//!
//! Every known [`ResourceKind`] is fetched in full and written over whatever
//! the cache held for it. Runs are aligned to wall-clock multiples of the
//! interval, so the default hourly period fires at the top of each hour.

use std::sync::Arc;
use std::time::Duration;

use catalog_client::{Catalog, UpstreamError};
use catalog_core::{AppConfig, CacheStore, ResourceKind};
use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// A refresh step that failed.
#[derive(Debug, thiserror::Error)]
pub enum RefreshError {
    #[error("refresh of {resource} failed: {source}")]
    Upstream {
        resource: ResourceKind,
        #[source]
        source: UpstreamError,
    },

    #[error("caching {resource} failed: {source}")]
    Cache {
        resource: ResourceKind,
        #[source]
        source: catalog_core::Error,
    },
}

impl RefreshError {
    pub fn resource(&self) -> ResourceKind {
        match self {
            RefreshError::Upstream { resource, .. } | RefreshError::Cache { resource, .. } => *resource,
        }
    }
}

/// Outcome of one refresh run.
#[derive(Debug, Default)]
pub struct RefreshReport {
    pub refreshed: Vec<ResourceKind>,
    /// Only populated when failures are isolated.
    pub failed: Vec<RefreshError>,
    pub elapsed: Duration,
}

#[derive(Clone)]
pub struct Refresher {
    cache: CacheStore,
    catalog: Arc<dyn Catalog>,
    interval: Duration,
    isolate_failures: bool,
}

impl Refresher {
    pub fn new(cache: CacheStore, catalog: Arc<dyn Catalog>, interval: Duration) -> Self {
        Self { cache, catalog, interval, isolate_failures: false }
    }

    pub fn from_config(cache: CacheStore, catalog: Arc<dyn Catalog>, config: &AppConfig) -> Self {
        Self::new(cache, catalog, config.refresh_interval()).with_isolated_failures(config.refresh_isolate_failures)
    }

    /// Keep going past a failed resource instead of abandoning the run.
    pub fn with_isolated_failures(mut self, isolate: bool) -> Self {
        self.isolate_failures = isolate;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Refresh every known resource once, in [`ResourceKind::ALL`] order.
    ///
    /// By default the first failure ends the run; resources after it keep
    /// their previous cache entries. Resources already written stay written.
    pub async fn run_once(&self) -> Result<RefreshReport, RefreshError> {
        let started = Instant::now();
        let mut report = RefreshReport::default();
        tracing::info!("Updating cache...");

        for resource in ResourceKind::ALL {
            match self.refresh(resource).await {
                Ok(()) => report.refreshed.push(resource),
                Err(err) if self.isolate_failures => {
                    tracing::warn!(%resource, error = %err, "resource refresh failed, continuing");
                    report.failed.push(err);
                }
                Err(err) => return Err(err),
            }
        }

        report.elapsed = started.elapsed();
        tracing::info!(
            refreshed = report.refreshed.len(),
            failed = report.failed.len(),
            elapsed_ms = report.elapsed.as_millis() as u64,
            "Cache updated"
        );
        Ok(report)
    }

    async fn refresh(&self, resource: ResourceKind) -> Result<(), RefreshError> {
        let snapshot = self
            .catalog
            .fetch_full(resource.as_str())
            .await
            .map_err(|source| RefreshError::Upstream { resource, source })?;

        tracing::debug!(%resource, items = snapshot.results().len(), "fetched full collection");

        self.cache
            .put(resource.as_str(), &snapshot)
            .await
            .map_err(|source| RefreshError::Cache { resource, source })
    }

    /// Run on every aligned tick until `shutdown_rx` fires.
    ///
    /// A failed run is logged and the loop waits for the next tick.
    pub fn spawn(self, mut shutdown_rx: broadcast::Receiver<()>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let first = delay_until_aligned(Utc::now(), self.interval);
            let mut ticker = tokio::time::interval_at(Instant::now() + first, self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            tracing::info!(
                interval_secs = self.interval.as_secs(),
                first_run_in_secs = first.as_secs(),
                "Started cache refresher"
            );

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(err) = self.run_once().await {
                            tracing::error!(resource = %err.resource(), error = %err, "cache refresh aborted");
                        }
                    }
                    _ = shutdown_rx.recv() => {
                        tracing::info!("Stopping cache refresher");
                        break;
                    }
                }
            }
        })
    }
}

/// Time from `now` to the next wall-clock multiple of `period`.
///
/// Never zero: on an exact boundary this is a full period.
pub fn delay_until_aligned(now: DateTime<Utc>, period: Duration) -> Duration {
    let period_ms = period.as_millis().max(1) as i64;
    let into = now.timestamp_millis().rem_euclid(period_ms);
    Duration::from_millis((period_ms - into) as u64)
}
