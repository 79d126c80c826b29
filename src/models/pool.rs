use serde::{Deserialize, Serialize};

/// One liquidity pool as reported by the yields API.
///
/// A snapshot record: materialized fresh on every fetch and superseded
/// wholesale by the next one. `apy` is in percentage points and may be
/// negative; `tvl_usd` is never negative in well-formed source data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pool {
    #[serde(rename = "pool")]
    pub pool_id: String,
    pub project: String,
    pub symbol: String,
    pub chain: String,
    #[serde(default)]
    pub exposure: String,
    #[serde(rename = "tvlUsd")]
    pub tvl_usd: f64,
    #[serde(default)]
    pub apy: f64,
    #[serde(rename = "apyPct7D", default)]
    pub apy_pct_7d: Option<f64>,
    #[serde(rename = "apyPct30D", default)]
    pub apy_pct_30d: Option<f64>,
    /// Impermanent-loss risk flag, "yes" or "no" (case varies upstream).
    #[serde(rename = "ilRisk", default)]
    pub il_risk: String,
}

impl Pool {
    pub fn has_il_risk(&self) -> bool {
        self.il_risk.eq_ignore_ascii_case("yes")
    }
}
