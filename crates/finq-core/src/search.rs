//! Web search provider contract

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One web search result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub snippet: String,
    pub link: String,
    /// Source domain ("reuters.com"), or "Unknown" when the link is unusable
    pub source: String,
}

/// Free-text web search source
///
/// An empty result list and a transport error both mean "no usable results"
/// to callers; neither is allowed to fail a query.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WebSearchProvider: Send + Sync {
    /// Search the web, returning up to `max_results` ordered hits
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>>;
}
