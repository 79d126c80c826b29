use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::config::ApiConfig;
use super::{PriceSource, SourceError};

/// CoinGecko simple-price client for the BTC reference price.
pub struct CoinGecko {
    client: Client,
    url: String,
}

#[derive(Debug, Deserialize)]
struct PriceEnvelope {
    bitcoin: PriceEntry,
}

#[derive(Debug, Deserialize)]
struct PriceEntry {
    usd: f64,
}

impl CoinGecko {
    pub fn new(config: &ApiConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(config.request_timeout_secs))
                .build()
                .unwrap(),
            url: config.price_url.clone(),
        }
    }
}

#[async_trait]
impl PriceSource for CoinGecko {
    fn name(&self) -> &'static str {
        "CoinGecko"
    }

    async fn fetch_price(&self) -> Result<f64, SourceError> {
        let resp = self.client.get(&self.url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;

        if resp.status() == 429 {
            return Err(SourceError::RateLimit);
        }
        if !resp.status().is_success() {
            return Err(SourceError::Status(resp.status().as_u16()));
        }

        let envelope: PriceEnvelope = resp.json()
            .await
            .map_err(|e| SourceError::Parse(e.to_string()))?;

        Ok(envelope.bitcoin.usd)
    }
}
