//! Market data provider contract and record types
//!
//! The provider is a black box to the rest of the core: given a canonical
//! symbol it returns typed records whose numeric fields may be legitimately
//! absent (rendered as "N/A" downstream, never treated as errors). A failed
//! call is an error for that category only.

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Point-in-time quote and valuation snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockSnapshot {
    pub symbol: String,
    pub current_price: Option<f64>,
    pub currency: String,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<u64>,
    pub market_cap: Option<f64>,
    pub pe_ratio: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub fifty_two_week_high: Option<f64>,
    pub fifty_two_week_low: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

/// Aggregated analyst recommendation data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalystRatings {
    pub symbol: String,
    pub recommendation: Option<String>,
    pub recommendation_mean: Option<f64>,
    pub num_analysts: Option<u32>,
    pub target_mean: Option<f64>,
    pub target_high: Option<f64>,
    pub target_low: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

/// Company fundamentals
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fundamentals {
    pub symbol: String,
    pub market_cap: Option<f64>,
    pub pe_ratio: Option<f64>,
    pub forward_pe: Option<f64>,
    pub peg_ratio: Option<f64>,
    pub price_to_book: Option<f64>,
    pub debt_to_equity: Option<f64>,
    pub return_on_equity: Option<f64>,
    pub profit_margins: Option<f64>,
    pub operating_margins: Option<f64>,
    pub revenue_growth: Option<f64>,
    pub earnings_growth: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

/// A single company news headline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub publisher: String,
    pub link: String,
    pub published: Option<DateTime<Utc>>,
}

/// Data source for stock quotes, ratings, fundamentals, and company news
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Fetch the current quote and valuation snapshot
    async fn stock_snapshot(&self, symbol: &str) -> Result<StockSnapshot>;

    /// Fetch analyst recommendations
    async fn analyst_ratings(&self, symbol: &str) -> Result<AnalystRatings>;

    /// Fetch company fundamentals
    async fn fundamentals(&self, symbol: &str) -> Result<Fundamentals>;

    /// Fetch recent company news, newest first
    async fn company_news(&self, symbol: &str, limit: usize) -> Result<Vec<NewsItem>>;
}
