//! Yahoo Finance market data client
//!
//! Quotes come through the `yahoo_finance_api` crate; valuation, analyst and
//! fundamental figures come from the public quote-summary endpoint, whose
//! modules are individually optional. A missing module or field surfaces as
//! `None`, not as an error.

use crate::error::{AssistantError, Result};
use crate::market::{AnalystRatings, Fundamentals, MarketDataProvider, NewsItem, StockSnapshot};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::time::Duration;
use yahoo_finance_api as yahoo;

const QUOTE_SUMMARY_BASE: &str = "https://query1.finance.yahoo.com/v10/finance/quoteSummary";

/// Yahoo Finance client
pub struct YahooMarketData {
    client: reqwest::Client,
}

impl YahooMarketData {
    /// Create a new client
    pub fn new(request_timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .user_agent("finq/0.1")
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self { client }
    }

    /// Fetch selected quote-summary modules for a symbol
    async fn quote_summary(&self, symbol: &str, modules: &str) -> Result<QuoteSummaryModules> {
        let url = format!("{QUOTE_SUMMARY_BASE}/{symbol}?modules={modules}");

        let envelope: QuoteSummaryEnvelope = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        envelope
            .quote_summary
            .result
            .and_then(|mut results| if results.is_empty() { None } else { Some(results.remove(0)) })
            .ok_or_else(|| AssistantError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: "empty quote summary".to_string(),
            })
    }
}

impl Default for YahooMarketData {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

#[async_trait]
impl MarketDataProvider for YahooMarketData {
    async fn stock_snapshot(&self, symbol: &str) -> Result<StockSnapshot> {
        let provider = yahoo::YahooConnector::new()
            .map_err(|e| AssistantError::MarketData(e.to_string()))?;

        let response = provider
            .get_latest_quotes(symbol, "1d")
            .await
            .map_err(|e| AssistantError::MarketData(e.to_string()))?;

        let quote = response
            .last_quote()
            .map_err(|e| AssistantError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: e.to_string(),
            })?;

        // Valuation fields ride on the quote-summary endpoint; a failure
        // there degrades to absent fields rather than failing the snapshot.
        let summary = self
            .quote_summary(symbol, "price,summaryDetail")
            .await
            .unwrap_or_default();
        let price = summary.price.unwrap_or_default();
        let detail = summary.summary_detail.unwrap_or_default();

        Ok(StockSnapshot {
            symbol: symbol.to_string(),
            current_price: price.regular_market_price.value().or(Some(quote.close)),
            currency: price.currency.unwrap_or_else(|| "USD".to_string()),
            open: Some(quote.open),
            high: Some(quote.high),
            low: Some(quote.low),
            close: Some(quote.close),
            volume: Some(quote.volume),
            market_cap: price.market_cap.value().or(detail.market_cap.value()),
            pe_ratio: detail.trailing_pe.value(),
            dividend_yield: detail.dividend_yield.value(),
            fifty_two_week_high: detail.fifty_two_week_high.value(),
            fifty_two_week_low: detail.fifty_two_week_low.value(),
            timestamp: DateTime::from_timestamp(quote.timestamp as i64, 0)
                .unwrap_or_else(Utc::now),
        })
    }

    async fn analyst_ratings(&self, symbol: &str) -> Result<AnalystRatings> {
        let summary = self.quote_summary(symbol, "financialData").await?;
        let financial = summary.financial_data.unwrap_or_default();

        Ok(AnalystRatings {
            symbol: symbol.to_string(),
            recommendation: financial.recommendation_key,
            recommendation_mean: financial.recommendation_mean.value(),
            num_analysts: financial
                .number_of_analyst_opinions
                .value()
                .map(|n| n as u32),
            target_mean: financial.target_mean_price.value(),
            target_high: financial.target_high_price.value(),
            target_low: financial.target_low_price.value(),
            timestamp: Utc::now(),
        })
    }

    async fn fundamentals(&self, symbol: &str) -> Result<Fundamentals> {
        let summary = self
            .quote_summary(symbol, "summaryDetail,defaultKeyStatistics,financialData")
            .await?;
        let detail = summary.summary_detail.unwrap_or_default();
        let stats = summary.key_statistics.unwrap_or_default();
        let financial = summary.financial_data.unwrap_or_default();

        Ok(Fundamentals {
            symbol: symbol.to_string(),
            market_cap: detail.market_cap.value(),
            pe_ratio: detail.trailing_pe.value(),
            forward_pe: stats.forward_pe.value(),
            peg_ratio: stats.peg_ratio.value(),
            price_to_book: stats.price_to_book.value(),
            debt_to_equity: financial.debt_to_equity.value(),
            return_on_equity: financial.return_on_equity.value(),
            profit_margins: financial.profit_margins.value(),
            operating_margins: financial.operating_margins.value(),
            revenue_growth: financial.revenue_growth.value(),
            earnings_growth: financial.earnings_growth.value(),
            timestamp: Utc::now(),
        })
    }

    async fn company_news(&self, symbol: &str, limit: usize) -> Result<Vec<NewsItem>> {
        let provider = yahoo::YahooConnector::new()
            .map_err(|e| AssistantError::MarketData(e.to_string()))?;

        let result = provider
            .search_ticker(symbol)
            .await
            .map_err(|e| AssistantError::MarketData(e.to_string()))?;

        Ok(result
            .news
            .into_iter()
            .take(limit)
            .map(|item| NewsItem {
                title: item.title,
                publisher: item.publisher,
                link: item.link,
                published: DateTime::from_timestamp(item.provider_publish_time as i64, 0),
            })
            .collect())
    }
}

// Quote-summary response shapes
//
// Every numeric field arrives as a {raw, fmt} pair and any module or field
// can be missing, so everything is optional and defaults apply throughout.

#[derive(Debug, Deserialize)]
struct QuoteSummaryEnvelope {
    #[serde(rename = "quoteSummary")]
    quote_summary: QuoteSummaryBody,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryBody {
    result: Option<Vec<QuoteSummaryModules>>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteSummaryModules {
    price: Option<PriceModule>,
    #[serde(rename = "summaryDetail")]
    summary_detail: Option<SummaryDetailModule>,
    #[serde(rename = "financialData")]
    financial_data: Option<FinancialDataModule>,
    #[serde(rename = "defaultKeyStatistics")]
    key_statistics: Option<KeyStatisticsModule>,
}

#[derive(Debug, Default, Deserialize)]
struct PriceModule {
    #[serde(rename = "regularMarketPrice", default)]
    regular_market_price: RawNum,
    #[serde(default)]
    currency: Option<String>,
    #[serde(rename = "marketCap", default)]
    market_cap: RawNum,
}

#[derive(Debug, Default, Deserialize)]
struct SummaryDetailModule {
    #[serde(rename = "trailingPE", default)]
    trailing_pe: RawNum,
    #[serde(rename = "dividendYield", default)]
    dividend_yield: RawNum,
    #[serde(rename = "fiftyTwoWeekHigh", default)]
    fifty_two_week_high: RawNum,
    #[serde(rename = "fiftyTwoWeekLow", default)]
    fifty_two_week_low: RawNum,
    #[serde(rename = "marketCap", default)]
    market_cap: RawNum,
}

#[derive(Debug, Default, Deserialize)]
struct FinancialDataModule {
    #[serde(rename = "recommendationKey", default)]
    recommendation_key: Option<String>,
    #[serde(rename = "recommendationMean", default)]
    recommendation_mean: RawNum,
    #[serde(rename = "numberOfAnalystOpinions", default)]
    number_of_analyst_opinions: RawNum,
    #[serde(rename = "targetMeanPrice", default)]
    target_mean_price: RawNum,
    #[serde(rename = "targetHighPrice", default)]
    target_high_price: RawNum,
    #[serde(rename = "targetLowPrice", default)]
    target_low_price: RawNum,
    #[serde(rename = "debtToEquity", default)]
    debt_to_equity: RawNum,
    #[serde(rename = "returnOnEquity", default)]
    return_on_equity: RawNum,
    #[serde(rename = "profitMargins", default)]
    profit_margins: RawNum,
    #[serde(rename = "operatingMargins", default)]
    operating_margins: RawNum,
    #[serde(rename = "revenueGrowth", default)]
    revenue_growth: RawNum,
    #[serde(rename = "earningsGrowth", default)]
    earnings_growth: RawNum,
}

#[derive(Debug, Default, Deserialize)]
struct KeyStatisticsModule {
    #[serde(rename = "forwardPE", default)]
    forward_pe: RawNum,
    #[serde(rename = "pegRatio", default)]
    peg_ratio: RawNum,
    #[serde(rename = "priceToBook", default)]
    price_to_book: RawNum,
}

/// Yahoo's {raw, fmt} numeric wrapper
#[derive(Debug, Default, Deserialize)]
struct RawNum {
    raw: Option<f64>,
}

impl RawNum {
    fn value(&self) -> Option<f64> {
        self.raw
    }
}
