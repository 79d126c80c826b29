use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde::Deserialize;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use crate::models::{Pool, PoolChartSeries, RankedView};
use crate::services::{Dashboard, DataFetcher, FilterCriteria, RankField, RiskFilter, SortDirection};
use crate::sources::SourceError;

pub struct AppState {
    pub fetcher: Arc<DataFetcher>,
    pub dashboard: Arc<Dashboard>,
}

type ApiError = (StatusCode, String);

fn upstream_error(e: SourceError) -> ApiError {
    (StatusCode::BAD_GATEWAY, e.to_string())
}

#[derive(Debug, Deserialize, Default)]
struct PoolsQuery {
    symbol: Option<String>,
    search: Option<String>,
    min_tvl: Option<f64>,
    max_tvl: Option<f64>,
    min_apy: Option<f64>,
    max_apy: Option<f64>,
    risk: Option<String>,
}

impl PoolsQuery {
    fn into_criteria(self) -> FilterCriteria {
        FilterCriteria {
            symbol_contains: self.symbol,
            search: self.search,
            min_tvl: self.min_tvl,
            max_tvl: self.max_tvl,
            min_apy: self.min_apy,
            max_apy: self.max_apy,
            il_risk: self
                .risk
                .as_deref()
                .map(RiskFilter::parse)
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
struct TopQuery {
    limit: Option<usize>,
}

#[derive(Debug, Deserialize, Default)]
struct YieldQuery {
    limit: Option<usize>,
    sort: Option<String>,
    direction: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct ChartsQuery {
    /// Comma-separated pool ids; absent means the top-yield selection.
    ids: Option<String>,
}

/// GET /pools - filtered tracked-pool listing, TVL-descending
async fn get_pools(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PoolsQuery>,
) -> Result<Json<Vec<Pool>>, ApiError> {
    let snapshot = state.fetcher.pool_snapshot().await.map_err(upstream_error)?;
    Ok(Json(state.dashboard.pool_listing(&snapshot, &query.into_criteria())))
}

/// GET /pools/top-tvl - largest tracked pools with combined TVL
async fn get_top_tvl(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TopQuery>,
) -> Result<Json<RankedView>, ApiError> {
    let snapshot = state.fetcher.pool_snapshot().await.map_err(upstream_error)?;
    Ok(Json(state.dashboard.top_by_tvl(&snapshot, query.limit)))
}

/// GET /pools/top-yield - best-yielding pools above the TVL cutoff
async fn get_top_yield(
    State(state): State<Arc<AppState>>,
    Query(query): Query<YieldQuery>,
) -> Result<Json<RankedView>, ApiError> {
    let snapshot = state.fetcher.pool_snapshot().await.map_err(upstream_error)?;
    let price = resolve_price(&state).await;
    let view = state.dashboard.top_by_yield(
        &snapshot,
        price,
        query.sort.as_deref().and_then(RankField::parse),
        query.direction.as_deref().and_then(SortDirection::parse),
        query.limit,
    );
    Ok(Json(view))
}

/// GET /charts - windowed chart series, growth-descending
async fn get_charts(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ChartsQuery>,
) -> Result<Json<Vec<PoolChartSeries>>, ApiError> {
    let snapshot = state.fetcher.pool_snapshot().await.map_err(upstream_error)?;
    let result = match query.ids {
        Some(raw) => {
            let ids: Vec<String> = raw
                .split(',')
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(String::from)
                .collect();
            state
                .dashboard
                .chart_dataset_for_ids(&state.fetcher, &snapshot, &ids)
                .await
        }
        None => {
            let price = resolve_price(&state).await;
            state.dashboard.chart_dataset(&state.fetcher, &snapshot, price).await
        }
    };
    result
        .map(Json)
        .map_err(|e| (StatusCode::BAD_GATEWAY, e.to_string()))
}

/// GET /stats
async fn get_stats(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let stats = state.fetcher.stats();
    let cache = state.fetcher.cache();
    Json(serde_json::json!({
        "cached_pools": cache.cached_pool_count(),
        "cached_charts": cache.cached_chart_count(),
        "total_requests": stats.total_requests.load(Ordering::Relaxed),
        "successful": stats.successful.load(Ordering::Relaxed),
        "failed": stats.failed.load(Ordering::Relaxed),
    }))
}

/// GET /health
async fn health() -> &'static str {
    "OK"
}

/// Live price when available; the threshold policy decides the fallback.
async fn resolve_price(state: &AppState) -> f64 {
    let live = match state.fetcher.reference_price().await {
        Ok(price) => Some(price),
        Err(e) => {
            tracing::warn!("reference price unavailable: {}", e);
            None
        }
    };
    state.dashboard.threshold().reference_price(live)
}

pub fn create_rest_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/pools", get(get_pools))
        .route("/pools/top-tvl", get(get_top_tvl))
        .route("/pools/top-yield", get(get_top_yield))
        .route("/charts", get(get_charts))
        .route("/stats", get(get_stats))
        .route("/health", get(health))
        .with_state(state)
}
