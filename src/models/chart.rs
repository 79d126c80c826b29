use serde::{Deserialize, Serialize};

use super::Pool;

/// One time-sampled observation of a pool.
///
/// Timestamps arrive as strings (RFC 3339 from the chart endpoint, plain
/// dates in older snapshots); duplicates and out-of-order points are
/// tolerated, ordering happens downstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartPoint {
    pub timestamp: String,
    #[serde(rename = "tvlUsd")]
    pub tvl_usd: f64,
    #[serde(default)]
    pub apy: f64,
}

/// A pool's trailing chart window plus its computed TVL growth rate.
#[derive(Debug, Clone, Serialize)]
pub struct PoolChartSeries {
    pub pool_id: String,
    pub project: String,
    pub symbol: String,
    pub points: Vec<ChartPoint>,
    /// Percent change in TVL between the first and last windowed point.
    pub growth_rate: f64,
}

/// An ordered pool ranking with its aggregate scalars. Recomputed on every
/// request; never mutated in place.
#[derive(Debug, Clone, Serialize)]
pub struct RankedView {
    pub pools: Vec<Pool>,
    pub total_tvl: f64,
    pub average_apy: f64,
}
