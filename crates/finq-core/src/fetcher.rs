//! Per-symbol market data fetching and report formatting
//!
//! Data is fetched straight from the provider and formatted verbatim; no
//! LLM sits between the API and the numbers. Each of the four categories is
//! cached independently under its own namespace and TTL, and a failure in
//! one category never takes down the others.

use crate::cache::{self, CacheStore};
use crate::config::AssistantConfig;
use crate::error::Result;
use crate::market::{AnalystRatings, Fundamentals, MarketDataProvider, NewsItem, StockSnapshot};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Outcome of a single data-category fetch
///
/// An upstream failure is captured as a marker, not propagated; partial
/// bundles are the normal case.
#[derive(Debug, Clone)]
pub enum CategoryResult<T> {
    /// The category was fetched (possibly with absent fields)
    Ok(T),
    /// The fetch failed; the marker carries the upstream error text
    Unavailable(String),
}

impl<T> CategoryResult<T> {
    /// The value, if the fetch succeeded
    pub fn ok(&self) -> Option<&T> {
        match self {
            CategoryResult::Ok(value) => Some(value),
            CategoryResult::Unavailable(_) => None,
        }
    }

    /// The error marker, if the fetch failed
    pub fn error(&self) -> Option<&str> {
        match self {
            CategoryResult::Ok(_) => None,
            CategoryResult::Unavailable(reason) => Some(reason),
        }
    }
}

/// All data fetched for one symbol in one request
///
/// Transient: only rendered text is ever cached, never the bundle itself.
#[derive(Debug)]
pub struct DataBundle {
    pub stock: CategoryResult<StockSnapshot>,
    pub analysts: CategoryResult<AnalystRatings>,
    pub fundamentals: CategoryResult<Fundamentals>,
    pub news: CategoryResult<Vec<NewsItem>>,
}

/// Fetches and formats market data for resolved symbols
pub struct DataFetcher {
    provider: Arc<dyn MarketDataProvider>,
    cache: CacheStore,
    config: Arc<AssistantConfig>,
}

impl DataFetcher {
    /// Number of news items included in a report
    const NEWS_LIMIT: usize = 5;

    /// Create a new fetcher
    pub fn new(
        provider: Arc<dyn MarketDataProvider>,
        cache: CacheStore,
        config: Arc<AssistantConfig>,
    ) -> Self {
        Self {
            provider,
            cache,
            config,
        }
    }

    /// Fetch all four data categories for a symbol
    ///
    /// Categories have no ordering dependency and are fetched concurrently,
    /// each consulting its own cache namespace first.
    pub async fn fetch_bundle(&self, symbol: &str) -> DataBundle {
        debug!("Fetching data bundle for {symbol}");

        let symbol_payload = json!(symbol);
        let news_payload = json!({"symbol": symbol, "limit": Self::NEWS_LIMIT});
        let (stock, analysts, fundamentals, news) = tokio::join!(
            self.cached_fetch("stock_data", &symbol_payload, self.config.cache_ttl_quotes, || {
                self.provider.stock_snapshot(symbol)
            }),
            self.cached_fetch(
                "analyst_recs",
                &symbol_payload,
                self.config.cache_ttl_fundamentals,
                || self.provider.analyst_ratings(symbol),
            ),
            self.cached_fetch(
                "fundamentals",
                &symbol_payload,
                self.config.cache_ttl_fundamentals,
                || self.provider.fundamentals(symbol),
            ),
            self.cached_fetch(
                "company_news",
                &news_payload,
                self.config.cache_ttl_news,
                || self.provider.company_news(symbol, Self::NEWS_LIMIT),
            ),
        );

        DataBundle {
            stock,
            analysts,
            fundamentals,
            news,
        }
    }

    /// Fetch a symbol's bundle and render it as a markdown report
    pub async fn report(&self, symbol: &str) -> String {
        let bundle = self.fetch_bundle(symbol).await;
        format_report(symbol, &bundle)
    }

    /// Check the cache, fall through to the fetcher, store on success
    async fn cached_fetch<T, P, F, Fut>(
        &self,
        namespace: &str,
        payload: &P,
        ttl: Duration,
        fetcher: F,
    ) -> CategoryResult<T>
    where
        T: Serialize + DeserializeOwned,
        P: Serialize,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let key = cache::derive_key(namespace, payload);

        if let Some(value) = self.cache.get::<T>(&key).await {
            return CategoryResult::Ok(value);
        }

        match fetcher().await {
            Ok(value) => {
                self.cache.set(&key, &value, ttl).await;
                CategoryResult::Ok(value)
            }
            Err(e) => {
                warn!("{namespace} fetch failed: {e}");
                CategoryResult::Unavailable(e.to_string())
            }
        }
    }
}

/// Render a fetched bundle as a markdown report
pub fn format_report(symbol: &str, bundle: &DataBundle) -> String {
    let mut parts = Vec::new();

    match &bundle.stock {
        CategoryResult::Ok(stock) => {
            parts.push(format!("## Stock Data for {symbol}"));
            parts.push(format!(
                "- Current Price: {} {}",
                fmt_price(stock.current_price),
                stock.currency
            ));
            parts.push(format!(
                "- Day Range: {} - {}",
                fmt_price(stock.low),
                fmt_price(stock.high)
            ));
            parts.push(format!("- Volume: {}", fmt_volume(stock.volume)));
            if let Some(cap) = stock.market_cap {
                parts.push(format!("- Market Cap: {}", fmt_market_cap(cap)));
            }
            parts.push(format!("- P/E Ratio: {}", fmt_ratio(stock.pe_ratio)));
            parts.push(format!(
                "- 52-Week Range: {} - {}",
                fmt_price(stock.fifty_two_week_low),
                fmt_price(stock.fifty_two_week_high)
            ));
            parts.push(format!("- Data Timestamp: {}", stock.timestamp.to_rfc3339()));
        }
        CategoryResult::Unavailable(reason) => {
            parts.push(format!("Could not fetch stock data: {reason}"));
        }
    }

    if let Some(analysts) = bundle.analysts.ok() {
        parts.push(String::new());
        parts.push("## Analyst Recommendations".to_string());
        parts.push(format!(
            "- Recommendation: {}",
            analysts.recommendation.as_deref().unwrap_or("N/A")
        ));
        parts.push(format!(
            "- Number of Analysts: {}",
            analysts
                .num_analysts
                .map_or_else(|| "N/A".to_string(), |n| n.to_string())
        ));
        if analysts.target_mean.is_some() {
            parts.push(format!(
                "- Target Price (Mean): {}",
                fmt_price(analysts.target_mean)
            ));
        }
        if analysts.target_low.is_some() && analysts.target_high.is_some() {
            parts.push(format!(
                "- Target Range: {} - {}",
                fmt_price(analysts.target_low),
                fmt_price(analysts.target_high)
            ));
        }
    }

    if let Some(funds) = bundle.fundamentals.ok() {
        parts.push(String::new());
        parts.push("## Fundamentals".to_string());
        if funds.profit_margins.is_some() {
            parts.push(format!("- Profit Margin: {}", fmt_percent(funds.profit_margins)));
        }
        if funds.revenue_growth.is_some() {
            parts.push(format!("- Revenue Growth: {}", fmt_percent(funds.revenue_growth)));
        }
        if funds.return_on_equity.is_some() {
            parts.push(format!(
                "- Return on Equity: {}",
                fmt_percent(funds.return_on_equity)
            ));
        }
        parts.push(format!("- Debt to Equity: {}", fmt_ratio(funds.debt_to_equity)));
    }

    if let Some(news) = bundle.news.ok() {
        let valid: Vec<&NewsItem> = news
            .iter()
            .filter(|item| {
                // Upstream occasionally emits blank or placeholder titles
                let title = item.title.trim();
                !title.is_empty() && title != "****"
            })
            .collect();

        if !valid.is_empty() {
            parts.push(String::new());
            parts.push("## Recent News".to_string());
            for (i, item) in valid.iter().take(3).enumerate() {
                parts.push(format!("{}. **{}**", i + 1, item.title));
                if !item.publisher.is_empty() {
                    parts.push(format!("   Publisher: {}", item.publisher));
                }
            }
        }
    }

    parts.join("\n")
}

/// Format an optional price as "$123.45" or "N/A"
pub(crate) fn fmt_price(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format!("${v:.2}"))
}

/// Format an optional ratio with two decimals or "N/A"
pub(crate) fn fmt_ratio(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format!("{v:.2}"))
}

/// Format an optional fraction as a percentage or "N/A"
pub(crate) fn fmt_percent(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format!("{:.1}%", v * 100.0))
}

/// Format an optional share volume with thousands separators or "N/A"
pub(crate) fn fmt_volume(value: Option<u64>) -> String {
    value.map_or_else(|| "N/A".to_string(), group_thousands)
}

/// Format a market cap in trillions/billions/millions
pub(crate) fn fmt_market_cap(cap: f64) -> String {
    if cap >= 1e12 {
        format!("${:.2}T", cap / 1e12)
    } else if cap >= 1e9 {
        format!("${:.1}B", cap / 1e9)
    } else if cap >= 1e6 {
        format!("${:.1}M", cap / 1e6)
    } else {
        format!("${cap:.0}")
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}
