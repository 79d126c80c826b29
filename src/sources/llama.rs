use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::config::ApiConfig;
use crate::models::{ChartPoint, Pool};
use super::{PoolSource, SourceError};

/// DefiLlama yields API client (yields.llama.fi).
pub struct LlamaYields {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct PoolsEnvelope {
    data: Vec<Pool>,
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    data: Vec<ChartPoint>,
}

impl LlamaYields {
    pub fn new(config: &ApiConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(config.request_timeout_secs))
                .build()
                .unwrap(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, SourceError> {
        let resp = self.client.get(url)
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

        resp.json().await.map_err(|e| SourceError::Parse(e.to_string()))
    }
}

#[async_trait]
impl PoolSource for LlamaYields {
    fn name(&self) -> &'static str {
        "DefiLlama"
    }

    async fn fetch_pools(&self) -> Result<Vec<Pool>, SourceError> {
        let url = format!("{}/pools", self.base_url);
        let envelope: PoolsEnvelope = self.get_json(&url).await?;
        Ok(envelope.data)
    }

    async fn fetch_chart(&self, pool_id: &str) -> Result<Vec<ChartPoint>, SourceError> {
        let url = format!("{}/chart/{}", self.base_url, pool_id);
        let envelope: ChartEnvelope = self.get_json(&url).await?;
        Ok(envelope.data)
    }
}
