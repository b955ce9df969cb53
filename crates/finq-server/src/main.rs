//! Financial-query assistant API server
//!
//! # Usage
//!
//! ```bash
//! # Optional environment
//! export HF_API_TOKEN="hf_..."
//! export REDIS_URL="redis://localhost:6379"
//! export BIND_ADDR="0.0.0.0:8000"
//!
//! cargo run --bin finq-server
//! ```

use finq_core::api::{DuckDuckGoSearch, YahooMarketData};
use finq_core::{AssistantConfig, CacheStore, ComparisonFormatter, DataFetcher, Orchestrator};
use finq_llm::{HuggingFaceConfig, HuggingFaceProvider};
use finq_server::{AppState, build_router};
use std::env;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            env::var("RUST_LOG").unwrap_or_else(|_| "info,finq_core=info".to_string()),
        )
        .init();

    let config = Arc::new(AssistantConfig::default().with_env());
    config.validate()?;

    let api_token = env::var("HF_API_TOKEN").unwrap_or_default();
    if api_token.is_empty() {
        tracing::warn!("HF_API_TOKEN not set; synthesis will fall back to raw data formatting");
    }

    let cache = CacheStore::connect(&config).await;
    let durable_cache = cache.is_durable();

    let market = Arc::new(YahooMarketData::new(config.request_timeout));
    let fetcher = Arc::new(DataFetcher::new(market, cache.clone(), Arc::clone(&config)));
    let search = Arc::new(DuckDuckGoSearch::new(config.request_timeout));
    let llm = Arc::new(HuggingFaceProvider::with_config(HuggingFaceConfig::new(
        api_token,
    ))?);

    let orchestrator = Arc::new(Orchestrator::new(
        Arc::clone(&fetcher),
        search,
        llm,
        cache,
        Arc::clone(&config),
    ));
    let comparison = Arc::new(ComparisonFormatter::new(Arc::clone(&fetcher)));

    let app = build_router(AppState {
        orchestrator,
        fetcher,
        comparison,
        durable_cache,
    });

    let addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string());
    tracing::info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
