pub mod cache;
pub mod charts;
pub mod dashboard;
pub mod fetcher;
pub mod filter;
pub mod metrics;
pub mod ranking;
pub mod threshold;

pub use cache::SnapshotCache;
pub use charts::{build_chart_dataset, build_series, growth_rate, ChartBatchError};
pub use dashboard::Dashboard;
pub use fetcher::{DataFetcher, FetchStats};
pub use filter::{filter_pools, FilterCriteria, RiskFilter};
pub use metrics::{average_apy, combined_tvl, market_share};
pub use ranking::{rank, RankField, SortDirection};
pub use threshold::ThresholdPolicy;
