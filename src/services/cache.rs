use dashmap::DashMap;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::models::{ChartPoint, Pool};

struct Timed<T> {
    value: T,
    fetched_at: Instant,
}

impl<T> Timed<T> {
    fn new(value: T) -> Self {
        Self { value, fetched_at: Instant::now() }
    }

    fn fresh(&self, ttl: Duration) -> bool {
        self.fetched_at.elapsed() < ttl
    }
}

/// Holds the last-fetched pool snapshot, reference price and per-pool chart
/// series, each with a stale-time TTL. The derived-metrics core never reads
/// this directly; only the fetch layer does.
pub struct SnapshotCache {
    pools: RwLock<Option<Timed<Arc<Vec<Pool>>>>>,
    price: RwLock<Option<Timed<f64>>>,
    charts: DashMap<String, Timed<Arc<Vec<ChartPoint>>>>,
    stale_time: Duration,
}

impl SnapshotCache {
    pub fn new(stale_time_secs: u64) -> Self {
        Self {
            pools: RwLock::new(None),
            price: RwLock::new(None),
            charts: DashMap::new(),
            stale_time: Duration::from_secs(stale_time_secs),
        }
    }

    /// Zero-copy snapshot retrieval - returns an Arc clone while fresh.
    pub fn pools(&self) -> Option<Arc<Vec<Pool>>> {
        let guard = self.pools.read();
        guard
            .as_ref()
            .filter(|entry| entry.fresh(self.stale_time))
            .map(|entry| entry.value.clone())
    }

    pub fn store_pools(&self, pools: Vec<Pool>) -> Arc<Vec<Pool>> {
        let snapshot = Arc::new(pools);
        *self.pools.write() = Some(Timed::new(snapshot.clone()));
        snapshot
    }

    pub fn price(&self) -> Option<f64> {
        let guard = self.price.read();
        guard
            .as_ref()
            .filter(|entry| entry.fresh(self.stale_time))
            .map(|entry| entry.value)
    }

    pub fn store_price(&self, price: f64) {
        *self.price.write() = Some(Timed::new(price));
    }

    pub fn chart(&self, pool_id: &str) -> Option<Arc<Vec<ChartPoint>>> {
        self.charts
            .get(pool_id)
            .filter(|entry| entry.fresh(self.stale_time))
            .map(|entry| entry.value.clone())
    }

    pub fn store_chart(&self, pool_id: &str, points: Vec<ChartPoint>) -> Arc<Vec<ChartPoint>> {
        let series = Arc::new(points);
        self.charts.insert(pool_id.to_string(), Timed::new(series.clone()));
        series
    }

    /// Drop expired chart entries. Called from the background cycle.
    pub fn purge_stale_charts(&self) {
        // inserts may land concurrently, so count inside retain
        let mut removed = 0usize;
        self.charts.retain(|_, entry| {
            let keep = entry.fresh(self.stale_time);
            if !keep {
                removed += 1;
            }
            keep
        });
        if removed > 0 {
            tracing::debug!("purged {} stale chart series", removed);
        }
    }

    pub fn cached_pool_count(&self) -> usize {
        self.pools
            .read()
            .as_ref()
            .map(|entry| entry.value.len())
            .unwrap_or(0)
    }

    pub fn cached_chart_count(&self) -> usize {
        self.charts.len()
    }
}
