use crate::config::DashboardConfig;
use crate::models::{Pool, PoolChartSeries, RankedView};
use super::charts::{build_chart_dataset, ChartBatchError};
use super::filter::{filter_pools, FilterCriteria};
use super::metrics::{average_apy, combined_tvl};
use super::ranking::{rank, RankField, SortDirection};
use super::threshold::ThresholdPolicy;
use super::DataFetcher;

/// Composes filtering, ranking, aggregation and the chart engine into the
/// named dashboard views. Stateless: every view is a pure function of the
/// snapshot, the reference price and the call parameters.
pub struct Dashboard {
    top_pools_count: usize,
    chart_window: usize,
    symbol_tag: String,
    threshold: ThresholdPolicy,
}

impl Dashboard {
    pub fn new(config: &DashboardConfig) -> Self {
        Self {
            top_pools_count: config.top_pools_count,
            chart_window: config.chart_window_days,
            symbol_tag: config.symbol_tag.clone(),
            threshold: ThresholdPolicy::new(config),
        }
    }

    pub fn threshold(&self) -> &ThresholdPolicy {
        &self.threshold
    }

    /// The tracked-asset subset of a snapshot, TVL-descending, with the
    /// caller's extra criteria applied on top.
    pub fn pool_listing(&self, pools: &[Pool], extra: &FilterCriteria) -> Vec<Pool> {
        let mut criteria = extra.clone();
        if criteria.symbol_contains.is_none() {
            criteria.symbol_contains = Some(self.symbol_tag.clone());
        }
        let matched = filter_pools(pools, &criteria);
        rank(&matched, RankField::Tvl, SortDirection::Descending, None)
    }

    /// Largest tracked pools by TVL with their combined aggregates.
    pub fn top_by_tvl(&self, pools: &[Pool], limit: Option<usize>) -> RankedView {
        let btc = filter_pools(pools, &FilterCriteria::with_symbol(&self.symbol_tag));
        let top = rank(
            &btc,
            RankField::Tvl,
            SortDirection::Descending,
            Some(limit.unwrap_or(self.top_pools_count)),
        );
        Self::view(top)
    }

    /// Best-yielding tracked pools among those clearing the significance
    /// threshold at the given reference price.
    pub fn top_by_yield(
        &self,
        pools: &[Pool],
        reference_price: f64,
        field: Option<RankField>,
        direction: Option<SortDirection>,
        limit: Option<usize>,
    ) -> RankedView {
        let criteria = FilterCriteria {
            symbol_contains: Some(self.symbol_tag.clone()),
            min_tvl: Some(self.threshold.minimum_significant_tvl(reference_price)),
            ..FilterCriteria::default()
        };
        let significant = filter_pools(pools, &criteria);
        let top = rank(
            &significant,
            field.unwrap_or(RankField::Apy),
            direction.unwrap_or(SortDirection::Descending),
            Some(limit.unwrap_or(self.top_pools_count)),
        );
        Self::view(top)
    }

    /// Chart series for the current top-by-yield selection, ordered by
    /// descending growth rate for display.
    pub async fn chart_dataset(
        &self,
        fetcher: &DataFetcher,
        pools: &[Pool],
        reference_price: f64,
    ) -> Result<Vec<PoolChartSeries>, ChartBatchError> {
        let selection = self.top_by_yield(pools, reference_price, None, None, None).pools;
        self.charts_for(fetcher, &selection).await
    }

    /// Chart series for an explicit pool-id selection, in the same display
    /// order.
    pub async fn chart_dataset_for_ids(
        &self,
        fetcher: &DataFetcher,
        pools: &[Pool],
        ids: &[String],
    ) -> Result<Vec<PoolChartSeries>, ChartBatchError> {
        let selection: Vec<Pool> = ids
            .iter()
            .filter_map(|id| pools.iter().find(|p| &p.pool_id == id).cloned())
            .collect();
        self.charts_for(fetcher, &selection).await
    }

    async fn charts_for(
        &self,
        fetcher: &DataFetcher,
        selection: &[Pool],
    ) -> Result<Vec<PoolChartSeries>, ChartBatchError> {
        let mut series = build_chart_dataset(fetcher, selection, self.chart_window).await?;
        series.sort_by(|a, b| b.growth_rate.total_cmp(&a.growth_rate));
        Ok(series)
    }

    fn view(pools: Vec<Pool>) -> RankedView {
        RankedView {
            total_tvl: combined_tvl(&pools),
            average_apy: average_apy(&pools),
            pools,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ThresholdMode;
    use crate::models::ChartPoint;
    use crate::services::SnapshotCache;
    use crate::sources::{PoolSource, PriceSource, SourceError};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Arc;

    fn pool(id: &str, symbol: &str, tvl: f64, apy: f64) -> Pool {
        Pool {
            pool_id: id.to_string(),
            project: format!("project-{}", id),
            symbol: symbol.to_string(),
            chain: "ethereum".to_string(),
            exposure: "multi".to_string(),
            tvl_usd: tvl,
            apy,
            apy_pct_7d: None,
            apy_pct_30d: None,
            il_risk: "no".to_string(),
        }
    }

    fn dashboard() -> Dashboard {
        Dashboard::new(&DashboardConfig::default())
    }

    fn snapshot() -> Vec<Pool> {
        vec![
            pool("p1", "BTC-ETH", 1_000_000.0, 5.2),
            pool("p2", "BTC-USDC", 2_000_000.0, 7.8),
            pool("p3", "ETH-USDC", 1_500_000.0, 4.5),
            pool("p4", "BTC-DAI", 3_000_000.0, 9.1),
            pool("p5", "BTC-WBTC", 500_000.0, 12.3),
        ]
    }

    #[test]
    fn top_by_tvl_filters_ranks_and_aggregates() {
        let view = dashboard().top_by_tvl(&snapshot(), None);
        let ids: Vec<&str> = view.pools.iter().map(|p| p.pool_id.as_str()).collect();
        // 4 BTC pools against a default count of 5: all of them, no padding
        assert_eq!(ids, vec!["p4", "p2", "p1", "p5"]);
        assert_eq!(view.total_tvl, 6_500_000.0);
    }

    #[test]
    fn yield_view_applies_significance_threshold() {
        // 50 BTC at 50k puts the cutoff at 2.5M; only p4 clears it
        let view = dashboard().top_by_yield(&snapshot(), 50_000.0, None, None, None);
        let ids: Vec<&str> = view.pools.iter().map(|p| p.pool_id.as_str()).collect();
        assert_eq!(ids, vec!["p4"]);
        assert_eq!(view.total_tvl, 3_000_000.0);
        assert_eq!(view.average_apy, 9.1);
    }

    #[test]
    fn yield_view_orders_by_apy_at_a_lower_cutoff() {
        // cutoff 50 BTC * 10k = 500k keeps every BTC pool
        let view = dashboard().top_by_yield(&snapshot(), 10_000.0, None, None, None);
        let ids: Vec<&str> = view.pools.iter().map(|p| p.pool_id.as_str()).collect();
        assert_eq!(ids, vec!["p5", "p4", "p2", "p1"]);
    }

    #[test]
    fn yield_view_honors_explicit_field_and_direction() {
        let view = dashboard().top_by_yield(
            &snapshot(),
            10_000.0,
            Some(RankField::Tvl),
            Some(SortDirection::Ascending),
            Some(2),
        );
        let ids: Vec<&str> = view.pools.iter().map(|p| p.pool_id.as_str()).collect();
        assert_eq!(ids, vec!["p5", "p1"]);
    }

    #[test]
    fn empty_snapshot_yields_zeroed_view() {
        let view = dashboard().top_by_yield(&[], 50_000.0, None, None, None);
        assert!(view.pools.is_empty());
        assert_eq!(view.total_tvl, 0.0);
        assert_eq!(view.average_apy, 0.0);
    }

    #[test]
    fn pool_listing_merges_caller_criteria_with_symbol_tag() {
        let listing = dashboard().pool_listing(
            &snapshot(),
            &FilterCriteria { min_apy: Some(7.0), ..FilterCriteria::default() },
        );
        let ids: Vec<&str> = listing.iter().map(|p| p.pool_id.as_str()).collect();
        // BTC pools with apy >= 7, TVL-descending
        assert_eq!(ids, vec!["p4", "p2", "p5"]);
    }

    #[test]
    fn static_threshold_mode_is_supported() {
        let dashboard = Dashboard::new(&DashboardConfig {
            threshold: ThresholdMode::Static,
            static_btc_price: 50_000.0,
            ..DashboardConfig::default()
        });
        let price = dashboard.threshold().reference_price(Some(10_000.0));
        assert_eq!(price, 50_000.0);
        let view = dashboard.top_by_yield(&snapshot(), price, None, None, None);
        assert_eq!(view.pools.len(), 1);
    }

    struct MockSource {
        charts: HashMap<String, Vec<ChartPoint>>,
    }

    #[async_trait]
    impl PoolSource for MockSource {
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
            Arc::new(MockSource { charts }),
            Arc::new(NoPrice),
            Arc::new(SnapshotCache::new(300)),
            0,
            0,
        )
    }

    fn flat_series(tvls: &[f64]) -> Vec<ChartPoint> {
        tvls.iter()
            .enumerate()
            .map(|(i, tvl)| ChartPoint {
                timestamp: format!("2023-01-{:02}", i + 1),
                tvl_usd: *tvl,
                apy: 0.0,
            })
            .collect()
    }

    #[tokio::test]
    async fn chart_dataset_is_sorted_by_descending_growth() {
        let mut charts = HashMap::new();
        charts.insert("p2".to_string(), flat_series(&[100.0, 110.0])); // +10%
        charts.insert("p4".to_string(), flat_series(&[100.0, 150.0])); // +50%
        charts.insert("p1".to_string(), flat_series(&[100.0, 95.0])); // -5%
        let fetcher = fetcher_with(charts);

        // cutoff at 10k keeps p1/p2/p4/p5 in the selection; p5 has no chart
        let series = dashboard()
            .chart_dataset(&fetcher, &snapshot(), 10_000.0)
            .await
            .unwrap();
        let ids: Vec<&str> = series.iter().map(|s| s.pool_id.as_str()).collect();
        assert_eq!(ids, vec!["p4", "p2", "p1"]);
        assert_eq!(series[0].growth_rate, 50.0);
    }

    #[tokio::test]
    async fn explicit_id_selection_resolves_against_snapshot() {
        let mut charts = HashMap::new();
        charts.insert("p1".to_string(), flat_series(&[100.0, 120.0]));
        charts.insert("p3".to_string(), flat_series(&[100.0, 101.0]));
        let fetcher = fetcher_with(charts);

        let ids = vec!["p3".to_string(), "p1".to_string(), "missing".to_string()];
        let series = dashboard()
            .chart_dataset_for_ids(&fetcher, &snapshot(), &ids)
            .await
            .unwrap();
        let out: Vec<&str> = series.iter().map(|s| s.pool_id.as_str()).collect();
        assert_eq!(out, vec!["p1", "p3"]);
    }
}
