use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::models::{ChartPoint, Pool};
use crate::sources::{PoolSource, PriceSource, SourceError};
use super::SnapshotCache;

#[derive(Default)]
pub struct FetchStats {
    pub total_requests: AtomicU64,
    pub successful: AtomicU64,
    pub failed: AtomicU64,
}

/// The external fetch layer: wraps the remote sources with the snapshot
/// cache and the configured retry policy. Everything downstream receives
/// immutable snapshots from here.
pub struct DataFetcher {
    pool_source: Arc<dyn PoolSource>,
    price_source: Arc<dyn PriceSource>,
    cache: Arc<SnapshotCache>,
    retry_count: u32,
    retry_delay: Duration,
    stats: FetchStats,
}

impl DataFetcher {
    pub fn new(
        pool_source: Arc<dyn PoolSource>,
        price_source: Arc<dyn PriceSource>,
        cache: Arc<SnapshotCache>,
        retry_count: u32,
        retry_delay_ms: u64,
    ) -> Self {
        Self {
            pool_source,
            price_source,
            cache,
            retry_count,
            retry_delay: Duration::from_millis(retry_delay_ms),
            stats: FetchStats::default(),
        }
    }

    pub fn cache(&self) -> &SnapshotCache {
        &self.cache
    }

    pub fn stats(&self) -> &FetchStats {
        &self.stats
    }

    /// Current pool listing, served from cache while fresh.
    pub async fn pool_snapshot(&self) -> Result<Arc<Vec<Pool>>, SourceError> {
        if let Some(snapshot) = self.cache.pools() {
            tracing::debug!("pool snapshot served from cache ({} pools)", snapshot.len());
            return Ok(snapshot);
        }
        let pools = self
            .with_retry("pools", || self.pool_source.fetch_pools())
            .await?;
        tracing::info!("fetched {} pools from {}", pools.len(), self.pool_source.name());
        Ok(self.cache.store_pools(pools))
    }

    /// Current BTC reference price in USD, served from cache while fresh.
    pub async fn reference_price(&self) -> Result<f64, SourceError> {
        if let Some(price) = self.cache.price() {
            return Ok(price);
        }
        let price = self
            .with_retry("price", || self.price_source.fetch_price())
            .await?;
        self.cache.store_price(price);
        Ok(price)
    }

    /// Historical chart series for one pool, served from cache while fresh.
    pub async fn chart(&self, pool_id: &str) -> Result<Arc<Vec<ChartPoint>>, SourceError> {
        if let Some(series) = self.cache.chart(pool_id) {
            return Ok(series);
        }
        let points = self
            .with_retry("chart", || self.pool_source.fetch_chart(pool_id))
            .await?;
        Ok(self.cache.store_chart(pool_id, points))
    }

    async fn with_retry<T, F, Fut>(&self, what: &str, op: F) -> Result<T, SourceError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, SourceError>>,
    {
        let mut attempt: u32 = 0;
        loop {
            self.stats.total_requests.fetch_add(1, Ordering::Relaxed);
            match op().await {
                Ok(value) => {
                    self.stats.successful.fetch_add(1, Ordering::Relaxed);
                    return Ok(value);
                }
                Err(e) => {
                    self.stats.failed.fetch_add(1, Ordering::Relaxed);
                    if attempt >= self.retry_count {
                        return Err(e);
                    }
                    attempt += 1;
                    tracing::warn!("{} fetch failed (retry {}/{}): {}", what, attempt, self.retry_count, e);
                    tokio::time::sleep(self.retry_delay).await;
                }
            }
        }
    }
}
