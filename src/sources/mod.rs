pub mod coingecko;
pub mod llama;

use async_trait::async_trait;
use crate::models::{ChartPoint, Pool};

/// A remote provider of pool listings and per-pool chart history.
#[async_trait]
pub trait PoolSource: Send + Sync {
    fn name(&self) -> &'static str;
    async fn fetch_pools(&self) -> Result<Vec<Pool>, SourceError>;
    async fn fetch_chart(&self, pool_id: &str) -> Result<Vec<ChartPoint>, SourceError>;
}

/// A remote provider of the current BTC reference price in USD.
#[async_trait]
pub trait PriceSource: Send + Sync {
    fn name(&self) -> &'static str;
    async fn fetch_price(&self) -> Result<f64, SourceError>;
}

#[derive(Debug)]
pub enum SourceError {
    Network(String),
    Parse(String),
    Status(u16),
    RateLimit,
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceError::Network(e) => write!(f, "Network error: {}", e),
            SourceError::Parse(e) => write!(f, "Parse error: {}", e),
            SourceError::Status(code) => write!(f, "Unexpected status: {}", code),
            SourceError::RateLimit => write!(f, "Rate limited"),
        }
    }
}

impl std::error::Error for SourceError {}
