//! Query analysis for data-source routing
//!
//! Classifies a question into the data sources it needs by literal substring
//! matching against three fixed keyword sets. No stemming, no tokenization
//! beyond lowercasing; multi-word keywords match as literal substrings.

use serde::{Deserialize, Serialize};

/// Financial vocabulary (English plus French market terms)
const FINANCIAL_KEYWORDS: &[&str] = &[
    "stock",
    "price",
    "share",
    "market",
    "ticker",
    "symbol",
    "earnings",
    "revenue",
    "profit",
    "dividend",
    "pe ratio",
    "analyst",
    "recommendation",
    "target",
    "fundamental",
    "action",
    "bourse",
    "cours",
    "résultats",
    "analyse",
];

/// Known company mentions; any of these implies a financial query
const COMPANY_KEYWORDS: &[&str] = &[
    "nvidia", "nvda", "tesla", "tsla", "apple", "aapl", "microsoft", "msft", "amazon", "amzn",
    "google", "googl", "meta", "facebook", "netflix", "nflx", "amd", "intel", "intc",
];

/// Recency/news vocabulary (English and French)
const NEWS_KEYWORDS: &[&str] = &[
    "news",
    "latest",
    "recent",
    "today",
    "breaking",
    "update",
    "actualité",
    "dernières",
    "récentes",
    "contexte",
    "marché",
];

/// Which data sources a query needs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryClassification {
    /// Market data should be fetched
    pub needs_financial: bool,
    /// Web/news search should be performed
    pub needs_news: bool,
}

impl QueryClassification {
    /// True when neither source was requested explicitly
    ///
    /// The orchestrator treats this as "fall back to web search" so the user
    /// always gets something.
    pub fn is_empty(&self) -> bool {
        !self.needs_financial && !self.needs_news
    }
}

/// Keyword-based query classifier
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryAnalyzer;

impl QueryAnalyzer {
    /// Create a new analyzer
    pub fn new() -> Self {
        Self
    }

    /// Classify a query by its keyword content
    ///
    /// Pure function of the query text: financial terms OR company names set
    /// `needs_financial`; recency terms set `needs_news`.
    pub fn classify(&self, query: &str) -> QueryClassification {
        let query_lower = query.to_lowercase();

        let has_financial = Self::matches_any(&query_lower, FINANCIAL_KEYWORDS);
        let has_company = Self::matches_any(&query_lower, COMPANY_KEYWORDS);
        let has_news = Self::matches_any(&query_lower, NEWS_KEYWORDS);

        QueryClassification {
            needs_financial: has_financial || has_company,
            needs_news: has_news,
        }
    }

    /// Check if the query contains any of the keywords
    fn matches_any(query: &str, keywords: &[&str]) -> bool {
        keywords.iter().any(|kw| query.contains(kw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_financial_only() {
        let analyzer = QueryAnalyzer::new();
        let classification = analyzer.classify("What is the stock price of NVIDIA?");

        assert!(classification.needs_financial);
        assert!(!classification.needs_news);
    }

    #[test]
    fn test_company_plus_news() {
        let analyzer = QueryAnalyzer::new();
        let classification = analyzer.classify("Latest Tesla news");

        // Company keyword AND news keyword both present
        assert!(classification.needs_financial);
        assert!(classification.needs_news);
    }

    #[test]
    fn test_company_keyword_alone_is_financial() {
        let analyzer = QueryAnalyzer::new();
        let classification = analyzer.classify("tell me about nvidia");

        assert!(classification.needs_financial);
        assert!(!classification.needs_news);
    }

    #[test]
    fn test_neither_source() {
        let analyzer = QueryAnalyzer::new();
        let classification = analyzer.classify("how do I cook pasta");

        assert!(!classification.needs_financial);
        assert!(!classification.needs_news);
        assert!(classification.is_empty());
    }

    #[test]
    fn test_french_vocabulary() {
        let analyzer = QueryAnalyzer::new();
        let classification = analyzer.classify("Analyse de l'action Apple, dernières actualités");

        assert!(classification.needs_financial);
        assert!(classification.needs_news);
    }

    #[test]
    fn test_classification_is_pure() {
        let analyzer = QueryAnalyzer::new();
        let query = "NVIDIA earnings update";
        assert_eq!(analyzer.classify(query), analyzer.classify(query));
    }
}
