use crate::config::{DashboardConfig, ThresholdMode};

/// Converts a BTC quantity floor into a USD TVL cutoff.
///
/// A pool is "significant" when its TVL covers at least
/// `min_asset_quantity` BTC at the reference price. The reference price is
/// either the configured approximation (static mode) or live-fetched
/// (dynamic mode, preferred since it tracks market conditions).
#[derive(Debug, Clone, Copy)]
pub struct ThresholdPolicy {
    mode: ThresholdMode,
    min_asset_quantity: f64,
    static_price: f64,
}

impl ThresholdPolicy {
    pub fn new(config: &DashboardConfig) -> Self {
        Self {
            mode: config.threshold,
            min_asset_quantity: config.min_asset_quantity,
            static_price: config.static_btc_price,
        }
    }

    /// Minimum significant TVL in USD. `reference_price` must be positive;
    /// that is the caller's precondition, not a recoverable error here.
    pub fn minimum_significant_tvl(&self, reference_price: f64) -> f64 {
        reference_price * self.min_asset_quantity
    }

    /// Resolve the effective reference price from an optional live quote.
    pub fn reference_price(&self, live_price: Option<f64>) -> f64 {
        match self.mode {
            ThresholdMode::Static => self.static_price,
            ThresholdMode::Dynamic => match live_price {
                Some(price) if price > 0.0 => price,
                _ => self.static_price,
            },
        }
    }
}
