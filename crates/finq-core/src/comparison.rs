//! Side-by-side stock comparison reports
//!
//! Builds a fixed multi-section markdown table for 2-5 symbols from the same
//! per-category fetches the single-symbol report uses. Contract violations
//! (too few or too many symbols) are reachable straight from external
//! callers, so they come back as explanatory strings rather than errors, and
//! partial upstream failures degrade to "N/A"/"Error" cells.

use crate::fetcher::{
    CategoryResult, DataBundle, DataFetcher, fmt_market_cap, fmt_price, fmt_percent, fmt_ratio,
    fmt_volume,
};
use futures::future::join_all;
use std::sync::Arc;
use tracing::info;

/// Minimum symbols in a comparison
const MIN_SYMBOLS: usize = 2;

/// Maximum symbols in a comparison
const MAX_SYMBOLS: usize = 5;

/// Formatter for multi-symbol comparisons
pub struct ComparisonFormatter {
    fetcher: Arc<DataFetcher>,
}

impl ComparisonFormatter {
    /// Create a new formatter
    pub fn new(fetcher: Arc<DataFetcher>) -> Self {
        Self { fetcher }
    }

    /// Compare 2-5 symbols and render the comparison report
    pub async fn compare(&self, symbols: &[String]) -> String {
        if symbols.len() < MIN_SYMBOLS {
            return "Please provide at least 2 symbols to compare.".to_string();
        }
        if symbols.len() > MAX_SYMBOLS {
            return "Maximum 5 symbols allowed for comparison.".to_string();
        }

        let symbols: Vec<String> = symbols.iter().map(|s| s.to_uppercase()).collect();
        info!("Comparing stocks: {}", symbols.join(", "));

        let bundles = join_all(symbols.iter().map(|s| self.fetcher.fetch_bundle(s))).await;
        let rows: Vec<(&str, &DataBundle)> = symbols
            .iter()
            .map(String::as_str)
            .zip(bundles.iter())
            .collect();

        format_comparison(&rows)
    }
}

/// Render the five-section comparison report
fn format_comparison(rows: &[(&str, &DataBundle)]) -> String {
    let mut parts = vec!["# Stock Comparison".to_string(), String::new()];

    parts.push("## Current Prices".to_string());
    parts.push("| Symbol | Price | Day Range | Volume |".to_string());
    parts.push("|--------|-------|-----------|--------|".to_string());
    for (symbol, bundle) in rows {
        let price = cell(&bundle.stock, |s| {
            format!("{} {}", fmt_price(s.current_price), s.currency)
        });
        let day_range = cell(&bundle.stock, |s| range(s.low, s.high));
        let volume = cell(&bundle.stock, |s| fmt_volume(s.volume));
        parts.push(format!("| {symbol} | {price} | {day_range} | {volume} |"));
    }

    parts.push(String::new());
    parts.push("## Market Cap & Valuation".to_string());
    parts.push("| Symbol | Market Cap | P/E Ratio | 52-Week Range |".to_string());
    parts.push("|--------|------------|-----------|---------------|".to_string());
    for (symbol, bundle) in rows {
        let cap = cell(&bundle.stock, |s| {
            s.market_cap
                .map_or_else(|| "N/A".to_string(), fmt_market_cap)
        });
        let pe = cell(&bundle.stock, |s| fmt_ratio(s.pe_ratio));
        let week_range = cell(&bundle.stock, |s| {
            range(s.fifty_two_week_low, s.fifty_two_week_high)
        });
        parts.push(format!("| {symbol} | {cap} | {pe} | {week_range} |"));
    }

    parts.push(String::new());
    parts.push("## Fundamentals".to_string());
    parts.push("| Symbol | Profit Margin | Revenue Growth | ROE | Debt/Equity |".to_string());
    parts.push("|--------|---------------|----------------|-----|-------------|".to_string());
    for (symbol, bundle) in rows {
        let margin = cell(&bundle.fundamentals, |f| fmt_percent(f.profit_margins));
        let growth = cell(&bundle.fundamentals, |f| fmt_percent(f.revenue_growth));
        let roe = cell(&bundle.fundamentals, |f| fmt_percent(f.return_on_equity));
        let debt = cell(&bundle.fundamentals, |f| fmt_ratio(f.debt_to_equity));
        parts.push(format!("| {symbol} | {margin} | {growth} | {roe} | {debt} |"));
    }

    parts.push(String::new());
    parts.push("## Analyst Recommendations".to_string());
    parts.push("| Symbol | Recommendation | Target Price | # Analysts |".to_string());
    parts.push("|--------|----------------|--------------|------------|".to_string());
    for (symbol, bundle) in rows {
        let rec = cell(&bundle.analysts, |a| {
            a.recommendation.clone().unwrap_or_else(|| "N/A".to_string())
        });
        let target = cell(&bundle.analysts, |a| fmt_price(a.target_mean));
        let count = cell(&bundle.analysts, |a| {
            a.num_analysts
                .map_or_else(|| "N/A".to_string(), |n| n.to_string())
        });
        parts.push(format!("| {symbol} | {rec} | {target} | {count} |"));
    }

    parts.push(String::new());
    parts.push("---".to_string());
    parts.push("*Data source: market data provider (real-time)*".to_string());

    parts.join("\n")
}

/// Format a cell, collapsing a failed category to "Error"
fn cell<T>(result: &CategoryResult<T>, render: impl Fn(&T) -> String) -> String {
    match result {
        CategoryResult::Ok(value) => render(value),
        CategoryResult::Unavailable(_) => "Error".to_string(),
    }
}

/// Format a low-high range, or "N/A" when either bound is absent
fn range(low: Option<f64>, high: Option<f64>) -> String {
    match (low, high) {
        (Some(low), Some(high)) => format!("${low:.2} - ${high:.2}"),
        _ => "N/A".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheStore;
    use crate::config::AssistantConfig;
    use crate::error::AssistantError;
    use crate::market::{
        AnalystRatings, Fundamentals, MockMarketDataProvider, NewsItem, StockSnapshot,
    };
    use chrono::Utc;

    fn snapshot(symbol: &str, price: f64) -> StockSnapshot {
        StockSnapshot {
            symbol: symbol.to_string(),
            current_price: Some(price),
            currency: "USD".to_string(),
            open: Some(price),
            high: Some(price + 1.0),
            low: Some(price - 1.0),
            close: Some(price),
            volume: Some(1_000_000),
            market_cap: Some(2.0e12),
            pe_ratio: Some(30.0),
            dividend_yield: None,
            fifty_two_week_high: Some(price + 20.0),
            fifty_two_week_low: Some(price - 50.0),
            timestamp: Utc::now(),
        }
    }

    fn working_provider() -> MockMarketDataProvider {
        let mut provider = MockMarketDataProvider::new();
        provider
            .expect_stock_snapshot()
            .returning(|s| Ok(snapshot(s, 180.93)));
        provider.expect_analyst_ratings().returning(|s| {
            Ok(AnalystRatings {
                symbol: s.to_string(),
                recommendation: Some("buy".to_string()),
                recommendation_mean: Some(2.0),
                num_analysts: Some(40),
                target_mean: Some(210.0),
                target_high: None,
                target_low: None,
                timestamp: Utc::now(),
            })
        });
        provider.expect_fundamentals().returning(|s| {
            Ok(Fundamentals {
                symbol: s.to_string(),
                market_cap: Some(2.0e12),
                pe_ratio: Some(30.0),
                forward_pe: None,
                peg_ratio: None,
                price_to_book: None,
                debt_to_equity: Some(40.0),
                return_on_equity: Some(0.5),
                profit_margins: Some(0.25),
                operating_margins: None,
                revenue_growth: Some(0.1),
                earnings_growth: None,
                timestamp: Utc::now(),
            })
        });
        provider
            .expect_company_news()
            .returning(|_, _| Ok(Vec::<NewsItem>::new()));
        provider
    }

    fn formatter(provider: MockMarketDataProvider) -> ComparisonFormatter {
        ComparisonFormatter::new(Arc::new(DataFetcher::new(
            Arc::new(provider),
            CacheStore::in_memory(),
            Arc::new(AssistantConfig::default()),
        )))
    }

    #[tokio::test]
    async fn test_too_few_symbols() {
        let formatter = formatter(MockMarketDataProvider::new());
        let report = formatter.compare(&["AAPL".to_string()]).await;
        assert_eq!(report, "Please provide at least 2 symbols to compare.");
    }

    #[tokio::test]
    async fn test_too_many_symbols() {
        let formatter = formatter(MockMarketDataProvider::new());
        let symbols: Vec<String> = ["A", "B", "C", "D", "E", "F"]
            .iter()
            .map(ToString::to_string)
            .collect();
        let report = formatter.compare(&symbols).await;
        assert_eq!(report, "Maximum 5 symbols allowed for comparison.");
    }

    #[tokio::test]
    async fn test_two_symbol_comparison() {
        let formatter = formatter(working_provider());
        let report = formatter
            .compare(&["aapl".to_string(), "MSFT".to_string()])
            .await;

        // Symbols are uppercased and appear in every section
        assert!(report.contains("| AAPL |"));
        assert!(report.contains("| MSFT |"));
        assert!(report.contains("## Current Prices"));
        assert!(report.contains("## Market Cap & Valuation"));
        assert!(report.contains("## Fundamentals"));
        assert!(report.contains("## Analyst Recommendations"));
        assert!(report.contains("$180.93 USD"));
        assert!(report.contains("buy"));
    }

    #[tokio::test]
    async fn test_failed_category_renders_error_cells() {
        let mut provider = MockMarketDataProvider::new();
        provider
            .expect_stock_snapshot()
            .returning(|s| Ok(snapshot(s, 100.0)));
        provider
            .expect_analyst_ratings()
            .returning(|_| Err(AssistantError::MarketData("provider down".to_string())));
        provider.expect_fundamentals().returning(|s| {
            Ok(Fundamentals {
                symbol: s.to_string(),
                market_cap: None,
                pe_ratio: None,
                forward_pe: None,
                peg_ratio: None,
                price_to_book: None,
                debt_to_equity: None,
                return_on_equity: None,
                profit_margins: None,
                operating_margins: None,
                revenue_growth: None,
                earnings_growth: None,
                timestamp: Utc::now(),
            })
        });
        provider
            .expect_company_news()
            .returning(|_, _| Ok(Vec::<NewsItem>::new()));

        let formatter = formatter(provider);
        let report = formatter
            .compare(&["NVDA".to_string(), "AMD".to_string()])
            .await;

        // Whole analyst category failed, fundamentals merely absent
        assert!(report.contains("| NVDA | Error | Error | Error |"));
        assert!(report.contains("| NVDA | N/A | N/A | N/A | N/A |"));
    }
}
