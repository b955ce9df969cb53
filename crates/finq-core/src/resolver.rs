//! Ticker resolution from free-text company mentions
//!
//! Maps natural-language mentions ("NVIDIA", "apple stock") to canonical
//! market symbols via a fixed alias table, with a pattern fallback for
//! explicit symbol-like tokens.

use regex::Regex;
use std::sync::LazyLock;

/// Alias table mapping lowercased mentions to canonical symbols
///
/// Scanned in order; the FIRST alias found as a substring of the lowercased
/// query wins, so ordering is significant. Short aliases that are substrings
/// of ordinary words ("meta") can shadow later entries; this matches the
/// long-standing lookup behavior and is deliberately left as-is.
const TICKER_ALIASES: &[(&str, &str)] = &[
    ("nvidia", "NVDA"),
    ("nvda", "NVDA"),
    ("tesla", "TSLA"),
    ("tsla", "TSLA"),
    ("apple", "AAPL"),
    ("aapl", "AAPL"),
    ("microsoft", "MSFT"),
    ("msft", "MSFT"),
    ("amazon", "AMZN"),
    ("amzn", "AMZN"),
    ("google", "GOOGL"),
    ("googl", "GOOGL"),
    ("goog", "GOOGL"),
    ("alphabet", "GOOGL"),
    ("meta", "META"),
    ("facebook", "META"),
    ("netflix", "NFLX"),
    ("nflx", "NFLX"),
    ("amd", "AMD"),
    ("intel", "INTC"),
    ("intc", "INTC"),
];

/// Pattern for explicit symbol-like tokens in the original (unlowercased) text
static SYMBOL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Z]{2,5}\b").expect("symbol pattern is valid"));

/// Resolver for company mentions in natural-language queries
#[derive(Debug, Clone, Copy, Default)]
pub struct TickerResolver;

impl TickerResolver {
    /// Create a new resolver
    pub fn new() -> Self {
        Self
    }

    /// Resolve a query to a canonical symbol, if it mentions a known company
    ///
    /// Step 1 scans the alias table against the lowercased text. Step 2, only
    /// when no alias matched, accepts an all-uppercase 2-5 letter token that
    /// is itself a known canonical symbol. No fuzzy matching, no
    /// disambiguation.
    pub fn resolve(&self, text: &str) -> Option<&'static str> {
        let text_lower = text.to_lowercase();
        for &(alias, symbol) in TICKER_ALIASES {
            if text_lower.contains(alias) {
                tracing::debug!("Resolved {symbol} from alias {alias:?}");
                return Some(symbol);
            }
        }

        for token in SYMBOL_PATTERN.find_iter(text) {
            if let Some(&(_, symbol)) = TICKER_ALIASES
                .iter()
                .find(|(_, symbol)| *symbol == token.as_str())
            {
                return Some(symbol);
            }
        }

        None
    }

    /// Build a focused web search query for a recognized company
    ///
    /// Queries that mention a known company are replaced by a fixed
    /// "SYM Name stock news" search string, which retrieves far better than
    /// the raw conversational phrasing; anything else passes through
    /// unchanged.
    pub fn search_hint(&self, query: &str) -> String {
        match self.resolve(query) {
            Some(symbol) => {
                let name = company_name(symbol);
                format!("{symbol} {name} stock news")
            }
            None => query.to_string(),
        }
    }
}

/// Display name for a canonical symbol
fn company_name(symbol: &'static str) -> &'static str {
    match symbol {
        "NVDA" => "NVIDIA",
        "TSLA" => "Tesla",
        "AAPL" => "Apple",
        "MSFT" => "Microsoft",
        "AMZN" => "Amazon",
        "GOOGL" => "Google",
        "META" => "Meta",
        "NFLX" => "Netflix",
        "INTC" => "Intel",
        _ => symbol,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_company_name() {
        let resolver = TickerResolver::new();
        assert_eq!(resolver.resolve("What is NVIDIA's price?"), Some("NVDA"));
        assert_eq!(resolver.resolve("What about Tesla?"), Some("TSLA"));
        assert_eq!(resolver.resolve("alphabet earnings"), Some("GOOGL"));
    }

    #[test]
    fn test_resolve_explicit_symbol() {
        let resolver = TickerResolver::new();
        assert_eq!(resolver.resolve("Check NVDA today"), Some("NVDA"));
        assert_eq!(resolver.resolve("price of MSFT"), Some("MSFT"));
    }

    #[test]
    fn test_resolve_nothing() {
        let resolver = TickerResolver::new();
        assert_eq!(resolver.resolve("general market commentary"), None);
        // Uppercase token that is not a known symbol
        assert_eq!(resolver.resolve("Is XYZ a buy?"), None);
    }

    #[test]
    fn test_first_match_wins() {
        let resolver = TickerResolver::new();
        // Both companies appear; the alias table order decides
        assert_eq!(resolver.resolve("nvidia vs tesla"), Some("NVDA"));
    }

    #[test]
    fn test_search_hint() {
        let resolver = TickerResolver::new();
        assert_eq!(
            resolver.search_hint("latest nvidia rumors"),
            "NVDA NVIDIA stock news"
        );
        assert_eq!(
            resolver.search_hint("interest rate outlook"),
            "interest rate outlook"
        );
    }
}
