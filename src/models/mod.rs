pub mod chart;
pub mod pool;

pub use chart::{ChartPoint, PoolChartSeries, RankedView};
pub use pool::Pool;
