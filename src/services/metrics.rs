use crate::models::Pool;

/// Sum of TVL across pools; 0.0 for an empty collection.
pub fn combined_tvl(pools: &[Pool]) -> f64 {
    pools.iter().map(|p| p.tvl_usd).sum()
}

/// Arithmetic mean APY in percentage points; 0.0 for an empty collection,
/// never NaN.
pub fn average_apy(pools: &[Pool]) -> f64 {
    if pools.is_empty() {
        return 0.0;
    }
    pools.iter().map(|p| p.apy).sum::<f64>() / pools.len() as f64
}

/// A pool's share of the collection's combined TVL, in percent.
/// Caller must guard the zero-denominator case.
pub fn market_share(pool: &Pool, pools: &[Pool]) -> f64 {
    pool.tvl_usd / combined_tvl(pools) * 100.0
}
