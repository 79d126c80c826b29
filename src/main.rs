use std::sync::Arc;
use tokio::time::Duration;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use btc_yield_gatherer::api::{create_rest_router, AppState};
use btc_yield_gatherer::config::Config;
use btc_yield_gatherer::services::{Dashboard, DataFetcher, SnapshotCache};
use btc_yield_gatherer::sources::coingecko::CoinGecko;
use btc_yield_gatherer::sources::llama::LlamaYields;
use btc_yield_gatherer::utils::format::{format_apy, format_growth, format_tvl};

/// One-shot console report: fetch, print the three views, exit.
async fn run_report(
    fetcher: &DataFetcher,
    dashboard: &Dashboard,
) -> Result<(), Box<dyn std::error::Error>> {
    let snapshot = fetcher.pool_snapshot().await?;
    let live = fetcher.reference_price().await.ok();
    let price = dashboard.threshold().reference_price(live);

    let tvl_view = dashboard.top_by_tvl(&snapshot, None);
    println!("\nTop BTC pools by TVL | combined {}", format_tvl(tvl_view.total_tvl));
    println!("   {:>2}  {:<20} {:<14} {:>10} {:>9}", "#", "project", "symbol", "TVL", "APY");
    for (i, pool) in tvl_view.pools.iter().enumerate() {
        println!(
            "   {:>2}  {:<20} {:<14} {:>10} {:>9}",
            i + 1,
            pool.project,
            pool.symbol,
            format_tvl(pool.tvl_usd),
            format_apy(pool.apy),
        );
    }

    let yield_view = dashboard.top_by_yield(&snapshot, price, None, None, None);
    println!(
        "\nTop yield BTC pools (TVL >= {}) | combined {} | average APY {}",
        format_tvl(dashboard.threshold().minimum_significant_tvl(price)),
        format_tvl(yield_view.total_tvl),
        format_apy(yield_view.average_apy),
    );
    println!("   {:>2}  {:<20} {:<14} {:>10} {:>9}", "#", "project", "symbol", "TVL", "APY");
    for (i, pool) in yield_view.pools.iter().enumerate() {
        println!(
            "   {:>2}  {:<20} {:<14} {:>10} {:>9}",
            i + 1,
            pool.project,
            pool.symbol,
            format_tvl(pool.tvl_usd),
            format_apy(pool.apy),
        );
    }

    println!("\n7-day TVL growth");
    match dashboard.chart_dataset(fetcher, &snapshot, price).await {
        Ok(series) => {
            for entry in &series {
                println!(
                    "   {:<20} {:<14} {:>8}",
                    entry.project,
                    entry.symbol,
                    format_growth(entry.growth_rate),
                );
            }
        }
        Err(e) => println!("   {}", e),
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,btc_yield_gatherer=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;
    tracing::info!("configuration loaded");

    let cache = Arc::new(SnapshotCache::new(config.api.stale_time_secs));
    let fetcher = Arc::new(DataFetcher::new(
        Arc::new(LlamaYields::new(&config.api)),
        Arc::new(CoinGecko::new(&config.api)),
        cache.clone(),
        config.api.retry_count,
        config.api.retry_delay_ms,
    ));
    let dashboard = Arc::new(Dashboard::new(&config.dashboard));

    let args: Vec<String> = std::env::args().collect();
    if args.contains(&"--report".to_string()) || args.contains(&"-r".to_string()) {
        return run_report(&fetcher, &dashboard).await;
    }

    // Background: keep the snapshot warm and drop expired chart entries
    let refresh_fetcher = fetcher.clone();
    let refresh_secs = config.api.stale_time_secs.max(1);
    tokio::spawn(async move {
        loop {
            match refresh_fetcher.pool_snapshot().await {
                Ok(snapshot) => tracing::info!("refresh cycle complete: {} pools", snapshot.len()),
                Err(e) => tracing::warn!("refresh cycle failed: {}", e),
            }
            refresh_fetcher.cache().purge_stale_charts();
            tokio::time::sleep(Duration::from_secs(refresh_secs)).await;
        }
    });

    let state = Arc::new(AppState { fetcher, dashboard });
    let app = create_rest_router(state).layer(CorsLayer::permissive());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!("server ready on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
