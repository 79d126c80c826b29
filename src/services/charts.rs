use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use futures::stream::{self, StreamExt};
use std::cmp::Ordering;

use crate::models::{ChartPoint, Pool, PoolChartSeries};
use super::DataFetcher;

#[derive(Debug)]
pub enum ChartBatchError {
    /// Every chart fetch in the batch failed.
    AllPoolsFailed,
}

impl std::fmt::Display for ChartBatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChartBatchError::AllPoolsFailed => {
                write!(f, "Failed to fetch chart data for any pools")
            }
        }
    }
}

impl std::error::Error for ChartBatchError {}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Some(instant.with_timezone(&Utc));
    }
    // older snapshots carry bare dates
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|date| date.and_time(NaiveTime::MIN).and_utc())
}

fn compare_timestamps(a: &str, b: &str) -> Ordering {
    match (parse_timestamp(a), parse_timestamp(b)) {
        (Some(a), Some(b)) => a.cmp(&b),
        // unparseable points keep their received order (stable sort)
        _ => Ordering::Equal,
    }
}

/// Build one pool's windowed series with its TVL growth rate.
///
/// The window is the trailing `window` points of the series AS RECEIVED;
/// chronological sorting happens after trimming. Changing this to
/// sort-then-trim would change output on any out-of-order feed, so the
/// order of operations is load-bearing.
pub fn build_series(pool: &Pool, raw: &[ChartPoint], window: usize) -> PoolChartSeries {
    let start = raw.len().saturating_sub(window);
    let mut points = raw[start..].to_vec();
    points.sort_by(|a, b| compare_timestamps(&a.timestamp, &b.timestamp));

    PoolChartSeries {
        pool_id: pool.pool_id.clone(),
        project: pool.project.clone(),
        symbol: pool.symbol.clone(),
        growth_rate: growth_rate(&points),
        points,
    }
}

/// Percent TVL change between the first and last point of a window.
/// A zero or missing starting TVL reads as "no measurable growth".
pub fn growth_rate(points: &[ChartPoint]) -> f64 {
    let first = points.first().map(|p| p.tvl_usd).unwrap_or(0.0);
    let last = points.last().map(|p| p.tvl_usd).unwrap_or(0.0);
    if first > 0.0 {
        (last - first) / first * 100.0
    } else {
        0.0
    }
}

/// Fetch chart history for each selected pool concurrently and build its
/// series. All fetches start together and the batch joins over all of them;
/// a failed fetch drops only that pool. Only a batch with zero successes
/// (for a non-empty selection) is an error.
pub async fn build_chart_dataset(
    fetcher: &DataFetcher,
    pools: &[Pool],
    window: usize,
) -> Result<Vec<PoolChartSeries>, ChartBatchError> {
    // Named async fn instead of an inline async block: works around the
    // compiler's "implementation of `FnOnce` is not general enough" limit on
    // closures returning async blocks that borrow their argument.
    async fn fetch_one(
        fetcher: &DataFetcher,
        pool: &Pool,
        window: usize,
    ) -> Option<PoolChartSeries> {
        match fetcher.chart(&pool.pool_id).await {
            Ok(points) => Some(build_series(pool, &points, window)),
            Err(e) => {
                tracing::warn!("dropping {} ({}) from chart batch: {}", pool.symbol, pool.pool_id, e);
                None
            }
        }
    }

    let tasks: Vec<_> = pools
        .iter()
        .map(|pool| fetch_one(fetcher, pool, window))
        .collect();
    let fetched: Vec<Option<PoolChartSeries>> = stream::iter(tasks)
        .buffer_unordered(pools.len().max(1))
        .collect()
        .await;

    let series: Vec<PoolChartSeries> = fetched.into_iter().flatten().collect();

    if series.is_empty() && !pools.is_empty() {
        return Err(ChartBatchError::AllPoolsFailed);
    }
    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::SnapshotCache;
    use crate::sources::{PoolSource, PriceSource, SourceError};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Arc;

    fn pool(id: &str) -> Pool {
        Pool {
            pool_id: id.to_string(),
            project: "project".to_string(),
            symbol: "BTC-ETH".to_string(),
            chain: "ethereum".to_string(),
            exposure: "multi".to_string(),
            tvl_usd: 1_000_000.0,
            apy: 5.0,
            apy_pct_7d: None,
            apy_pct_30d: None,
            il_risk: "no".to_string(),
        }
    }

    fn point(timestamp: &str, tvl: f64) -> ChartPoint {
        ChartPoint { timestamp: timestamp.to_string(), tvl_usd: tvl, apy: 0.0 }
    }

    #[test]
    fn seven_day_growth_rate() {
        let points = vec![
            point("2023-01-01", 950_000.0),
            point("2023-01-02", 960_000.0),
            point("2023-01-03", 955_000.0),
            point("2023-01-04", 970_000.0),
            point("2023-01-05", 980_000.0),
            point("2023-01-06", 990_000.0),
            point("2023-01-07", 1_000_000.0),
        ];
        let series = build_series(&pool("p"), &points, 7);
        assert!((series.growth_rate - 5.263157894736842).abs() < 1e-9);
        assert_eq!(series.points.len(), 7);
    }

    #[test]
    fn zero_starting_tvl_yields_zero_growth() {
        let points = vec![point("2023-01-01", 0.0), point("2023-01-02", 500_000.0)];
        let series = build_series(&pool("p"), &points, 7);
        assert_eq!(series.growth_rate, 0.0);
        assert!(series.growth_rate.is_finite());
    }

    #[test]
    fn empty_series_yields_empty_window_and_zero_growth() {
        let series = build_series(&pool("p"), &[], 7);
        assert!(series.points.is_empty());
        assert_eq!(series.growth_rate, 0.0);
    }

    #[test]
    fn window_trims_before_sorting() {
        // Received order puts the oldest point LAST, so it survives the
        // trailing-3 trim while "2023-01-02" does not.
        let points = vec![
            point("2023-01-02", 200.0),
            point("2023-01-03", 300.0),
            point("2023-01-04", 400.0),
            point("2023-01-01", 100.0),
        ];
        let series = build_series(&pool("p"), &points, 3);
        let stamps: Vec<&str> = series.points.iter().map(|p| p.timestamp.as_str()).collect();
        assert_eq!(stamps, vec!["2023-01-01", "2023-01-03", "2023-01-04"]);
        // growth runs from the windowed earliest (100) to latest (400)
        assert_eq!(series.growth_rate, 300.0);
    }

    #[test]
    fn rfc3339_timestamps_sort_chronologically() {
        let points = vec![
            point("2023-06-02T00:00:00.000Z", 2.0),
            point("2023-06-01T00:00:00.000Z", 1.0),
            point("2023-06-03T00:00:00.000Z", 3.0),
        ];
        let series = build_series(&pool("p"), &points, 7);
        let tvls: Vec<f64> = series.points.iter().map(|p| p.tvl_usd).collect();
        assert_eq!(tvls, vec![1.0, 2.0, 3.0]);
        assert_eq!(series.growth_rate, 200.0);
    }

    struct MockChartSource {
        charts: HashMap<String, Vec<ChartPoint>>,
    }

    #[async_trait]
    impl PoolSource for MockChartSource {
        fn name(&self) -> &'static str {
            "mock"
        }

        async fn fetch_pools(&self) -> Result<Vec<Pool>, SourceError> {
            Ok(vec![])
        }

        async fn fetch_chart(&self, pool_id: &str) -> Result<Vec<ChartPoint>, SourceError> {
            self.charts
                .get(pool_id)
                .cloned()
                .ok_or_else(|| SourceError::Status(404))
        }
    }

    struct NoPrice;

    #[async_trait]
    impl PriceSource for NoPrice {
        fn name(&self) -> &'static str {
            "none"
        }

        async fn fetch_price(&self) -> Result<f64, SourceError> {
            Err(SourceError::Network("unavailable".to_string()))
        }
    }

    fn fetcher_with(charts: HashMap<String, Vec<ChartPoint>>) -> DataFetcher {
        DataFetcher::new(
            Arc::new(MockChartSource { charts }),
            Arc::new(NoPrice),
            Arc::new(SnapshotCache::new(300)),
            0,
            0,
        )
    }

    #[tokio::test]
    async fn partial_failures_drop_only_their_pools() {
        let mut charts = HashMap::new();
        for id in ["p1", "p3", "p5"] {
            charts.insert(
                id.to_string(),
                vec![point("2023-01-01", 100.0), point("2023-01-02", 110.0)],
            );
        }
        let fetcher = fetcher_with(charts);
        let pools: Vec<Pool> = ["p1", "p2", "p3", "p4", "p5"].iter().map(|id| pool(id)).collect();

        let series = build_chart_dataset(&fetcher, &pools, 7).await.unwrap();
        assert_eq!(series.len(), 3);
        let mut ids: Vec<&str> = series.iter().map(|s| s.pool_id.as_str()).collect();
        ids.sort();
        assert_eq!(ids, vec!["p1", "p3", "p5"]);
    }

    #[tokio::test]
    async fn total_failure_surfaces_aggregate_error() {
        let fetcher = fetcher_with(HashMap::new());
        let pools: Vec<Pool> = (1..=5).map(|i| pool(&format!("p{}", i))).collect();

        let err = build_chart_dataset(&fetcher, &pools, 7).await.unwrap_err();
        assert!(matches!(err, ChartBatchError::AllPoolsFailed));
        assert_eq!(err.to_string(), "Failed to fetch chart data for any pools");
    }

    #[tokio::test]
    async fn empty_selection_is_not_an_error() {
        let fetcher = fetcher_with(HashMap::new());
        let series = build_chart_dataset(&fetcher, &[], 7).await.unwrap();
        assert!(series.is_empty());
    }
}
