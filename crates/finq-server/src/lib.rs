//! REST API for the financial-query assistant
//!
//! A thin axum adapter over the core: every handler validates its input,
//! delegates to the orchestrator or formatter, and wraps the textual result
//! with timing metadata. No decision logic lives here.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use finq_core::{ComparisonFormatter, DataFetcher, Orchestrator};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

const SERVICE_NAME: &str = "finq";
const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Minimum accepted query length
const MIN_QUERY_LEN: usize = 3;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    pub fetcher: Arc<DataFetcher>,
    pub comparison: Arc<ComparisonFormatter>,
    /// Whether the cache is backed by the durable store
    pub durable_cache: bool,
}

/// Request body for POST /query
#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Response body for POST /query
#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub response: String,
    pub success: bool,
    pub response_time: f64,
}

/// Error body for rejected requests
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub detail: String,
}

/// Build the API router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/status", get(status))
        .route("/query", post(process_query))
        .route("/stocks/:symbol", get(stock_data))
        .route("/compare-stocks", post(compare_stocks))
        .route("/clear-cache", post(clear_cache))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Financial Query Assistant API",
        "version": SERVICE_VERSION,
        "health": "/health",
    }))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": SERVICE_NAME,
        "version": SERVICE_VERSION,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn status(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "service": SERVICE_NAME,
        "version": SERVICE_VERSION,
        "data_sources": {
            "market_data": "active",
            "web_search": "active",
        },
        "cache": if state.durable_cache { "redis" } else { "in-memory" },
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn process_query(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, (StatusCode, Json<ErrorResponse>)> {
    if request.query.trim().len() < MIN_QUERY_LEN {
        return Err(bad_request("query must be at least 3 characters"));
    }

    info!(user_id = ?request.user_id, "Processing query");
    let start = Instant::now();
    let response = state.orchestrator.query(&request.query).await;

    Ok(Json(QueryResponse {
        response,
        success: true,
        response_time: start.elapsed().as_secs_f64(),
    }))
}

async fn stock_data(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Json<serde_json::Value> {
    let symbol = symbol.to_uppercase();
    let start = Instant::now();
    let data = state.fetcher.report(&symbol).await;

    Json(serde_json::json!({
        "symbol": symbol,
        "data": data,
        "success": true,
        "response_time": start.elapsed().as_secs_f64(),
    }))
}

async fn compare_stocks(
    State(state): State<AppState>,
    Json(symbols): Json<Vec<String>>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<ErrorResponse>)> {
    if symbols.len() < 2 {
        return Err(bad_request("provide at least 2 symbols to compare"));
    }
    if symbols.len() > 5 {
        return Err(bad_request("maximum 5 symbols allowed for comparison"));
    }

    let start = Instant::now();
    let comparison = state.comparison.compare(&symbols).await;

    Ok(Json(serde_json::json!({
        "symbols": symbols.iter().map(|s| s.to_uppercase()).collect::<Vec<_>>(),
        "comparison": comparison,
        "success": true,
        "response_time": start.elapsed().as_secs_f64(),
    })))
}

async fn clear_cache(State(state): State<AppState>) -> Json<serde_json::Value> {
    state.orchestrator.clear_cache().await;
    Json(serde_json::json!({
        "success": true,
        "message": "Cache cleared successfully",
    }))
}

fn bad_request(detail: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            detail: detail.to_string(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use finq_core::market::{AnalystRatings, Fundamentals, NewsItem, StockSnapshot};
    use finq_core::search::SearchHit;
    use finq_core::{AssistantConfig, AssistantError, CacheStore};
    use finq_llm::{CompletionRequest, CompletionResponse, LlmError, LlmProvider};
    use tower::ServiceExt;

    /// Market stub whose categories are all unavailable
    struct DownMarket;

    #[async_trait]
    impl finq_core::MarketDataProvider for DownMarket {
        async fn stock_snapshot(&self, _symbol: &str) -> finq_core::Result<StockSnapshot> {
            Err(AssistantError::MarketData("down".to_string()))
        }

        async fn analyst_ratings(&self, _symbol: &str) -> finq_core::Result<AnalystRatings> {
            Err(AssistantError::MarketData("down".to_string()))
        }

        async fn fundamentals(&self, _symbol: &str) -> finq_core::Result<Fundamentals> {
            Err(AssistantError::MarketData("down".to_string()))
        }

        async fn company_news(
            &self,
            _symbol: &str,
            _limit: usize,
        ) -> finq_core::Result<Vec<NewsItem>> {
            Err(AssistantError::MarketData("down".to_string()))
        }
    }

    /// Search stub returning one fixed hit
    struct OneHitSearch;

    #[async_trait]
    impl finq_core::WebSearchProvider for OneHitSearch {
        async fn search(
            &self,
            _query: &str,
            _max_results: usize,
        ) -> finq_core::Result<Vec<SearchHit>> {
            Ok(vec![SearchHit {
                title: "Market roundup".to_string(),
                snippet: "Daily coverage.".to_string(),
                link: "https://news.example.com".to_string(),
                source: "news.example.com".to_string(),
            }])
        }
    }

    /// LLM stub that always fails, exercising the deterministic fallbacks
    struct DownLlm;

    #[async_trait]
    impl LlmProvider for DownLlm {
        async fn complete(
            &self,
            _request: CompletionRequest,
        ) -> finq_llm::Result<CompletionResponse> {
            Err(LlmError::RequestFailed("unreachable".to_string()))
        }

        fn name(&self) -> &str {
            "down"
        }
    }

    fn test_app() -> Router {
        let config = Arc::new(AssistantConfig::default());
        let cache = CacheStore::in_memory();
        let fetcher = Arc::new(DataFetcher::new(
            Arc::new(DownMarket),
            cache.clone(),
            Arc::clone(&config),
        ));
        let orchestrator = Arc::new(Orchestrator::new(
            Arc::clone(&fetcher),
            Arc::new(OneHitSearch),
            Arc::new(DownLlm),
            cache,
            config,
        ));
        let comparison = Arc::new(ComparisonFormatter::new(Arc::clone(&fetcher)));

        build_router(AppState {
            orchestrator,
            fetcher,
            comparison,
            durable_cache: false,
        })
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = test_app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        assert!(body.contains("healthy"));
    }

    #[tokio::test]
    async fn test_query_too_short_is_rejected() {
        let request = Request::post("/query")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"query": "hi"}"#))
            .unwrap();

        let response = test_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_query_returns_response() {
        let request = Request::post("/query")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"query": "latest market news"}"#))
            .unwrap();

        let response = test_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_string(response).await;
        assert!(body.contains("Market roundup"));
        assert!(body.contains("\"success\":true"));
    }

    #[tokio::test]
    async fn test_compare_requires_two_symbols() {
        let request = Request::post("/compare-stocks")
            .header("content-type", "application/json")
            .body(Body::from(r#"["AAPL"]"#))
            .unwrap();

        let response = test_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_compare_rejects_six_symbols() {
        let request = Request::post("/compare-stocks")
            .header("content-type", "application/json")
            .body(Body::from(r#"["A","B","C","D","E","F"]"#))
            .unwrap();

        let response = test_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_clear_cache() {
        let response = test_app()
            .oneshot(Request::post("/clear-cache").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        assert!(body.contains("Cache cleared successfully"));
    }

    #[tokio::test]
    async fn test_status_reports_cache_backend() {
        let response = test_app()
            .oneshot(Request::get("/status").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let body = body_string(response).await;
        assert!(body.contains("in-memory"));
    }
}
