use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_price_url")]
    pub price_url: String,
    #[serde(default = "default_stale_time")]
    pub stale_time_secs: u64,
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,
    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    #[serde(default = "default_top_pools_count")]
    pub top_pools_count: usize,
    #[serde(default = "default_chart_window")]
    pub chart_window_days: usize,
    #[serde(default = "default_min_asset_quantity")]
    pub min_asset_quantity: f64,
    #[serde(default)]
    pub threshold: ThresholdMode,
    #[serde(default = "default_static_btc_price")]
    pub static_btc_price: f64,
    #[serde(default = "default_symbol_tag")]
    pub symbol_tag: String,
}

/// How the minimum-TVL cutoff tracks the BTC price.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdMode {
    /// Use the configured approximate price.
    Static,
    /// Use the live-fetched price, falling back to the static one.
    #[default]
    Dynamic,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_base_url() -> String { "https://yields.llama.fi".to_string() }
fn default_price_url() -> String {
    "https://api.coingecko.com/api/v3/simple/price?ids=bitcoin&vs_currencies=usd".to_string()
}
fn default_stale_time() -> u64 { 300 }
fn default_retry_count() -> u32 { 2 }
fn default_retry_delay() -> u64 { 1000 }
fn default_request_timeout() -> u64 { 10 }
fn default_top_pools_count() -> usize { 5 }
fn default_chart_window() -> usize { 7 }
fn default_min_asset_quantity() -> f64 { 50.0 }
fn default_static_btc_price() -> f64 { 65_000.0 }
fn default_symbol_tag() -> String { "BTC".to_string() }
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            price_url: default_price_url(),
            stale_time_secs: default_stale_time(),
            retry_count: default_retry_count(),
            retry_delay_ms: default_retry_delay(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            top_pools_count: default_top_pools_count(),
            chart_window_days: default_chart_window(),
            min_asset_quantity: default_min_asset_quantity(),
            threshold: ThresholdMode::default(),
            static_btc_price: default_static_btc_price(),
            symbol_tag: default_symbol_tag(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Config {
    /// Load config.toml, falling back to defaults when the file is absent.
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        Self::load_from("config.toml")
    }

    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        if !path.as_ref().exists() {
            tracing::info!("no config file found, using defaults");
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}
