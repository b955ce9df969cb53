//! DuckDuckGo web search client
//!
//! Uses the Instant Answer API, which needs no key. Related topics are
//! flattened into ordered hits; the abstract, when present, leads.

use crate::error::{AssistantError, Result};
use crate::search::{SearchHit, WebSearchProvider};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use url::Url;

const DEFAULT_API_ENDPOINT: &str = "https://api.duckduckgo.com/";

/// DuckDuckGo search client
pub struct DuckDuckGoSearch {
    client: reqwest::Client,
    api_endpoint: String,
}

impl DuckDuckGoSearch {
    /// Create a new client
    pub fn new(request_timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .user_agent("finq/0.1")
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            api_endpoint: DEFAULT_API_ENDPOINT.to_string(),
        }
    }

    /// Override the API endpoint (tests, proxies)
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.api_endpoint = endpoint.into();
        self
    }
}

impl Default for DuckDuckGoSearch {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

#[async_trait]
impl WebSearchProvider for DuckDuckGoSearch {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>> {
        debug!("Searching DuckDuckGo for: {query}");

        let response = self
            .client
            .get(&self.api_endpoint)
            .query(&[("q", query), ("format", "json"), ("no_html", "1")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AssistantError::Search(format!(
                "search API returned status {}",
                response.status()
            )));
        }

        let ddg: DdgResponse = response
            .json()
            .await
            .map_err(|e| AssistantError::Search(format!("unparseable search response: {e}")))?;

        let mut hits = Vec::new();

        if !ddg.abstract_text.is_empty() {
            hits.push(SearchHit {
                title: if ddg.heading.is_empty() {
                    "Summary".to_string()
                } else {
                    ddg.heading.clone()
                },
                snippet: ddg.abstract_text.clone(),
                source: extract_source(&ddg.abstract_url),
                link: ddg.abstract_url.clone(),
            });
        }

        collect_topics(&ddg.related_topics, &mut hits, max_results);
        hits.truncate(max_results);

        Ok(hits)
    }
}

/// Flatten nested topic groups into hits, preserving order
fn collect_topics(topics: &[RelatedTopic], hits: &mut Vec<SearchHit>, limit: usize) {
    for topic in topics {
        if hits.len() >= limit {
            break;
        }
        match topic {
            RelatedTopic::Result { text, first_url } => {
                if text.is_empty() || first_url.is_empty() {
                    continue;
                }
                // Topic text reads "Title - description"
                let (title, snippet) = match text.split_once(" - ") {
                    Some((title, snippet)) => (title.to_string(), snippet.to_string()),
                    None => (text.clone(), String::new()),
                };
                hits.push(SearchHit {
                    title,
                    snippet,
                    source: extract_source(first_url),
                    link: first_url.clone(),
                });
            }
            RelatedTopic::Group { topics } => {
                collect_topics(topics, hits, limit);
            }
        }
    }
}

/// Extract the source domain from a result link
fn extract_source(link: &str) -> String {
    Url::parse(link)
        .ok()
        .and_then(|url| url.host_str().map(|h| h.trim_start_matches("www.").to_string()))
        .unwrap_or_else(|| "Unknown".to_string())
}

// Instant Answer API response shapes

#[derive(Debug, Deserialize)]
struct DdgResponse {
    #[serde(rename = "Heading", default)]
    heading: String,
    #[serde(rename = "AbstractText", default)]
    abstract_text: String,
    #[serde(rename = "AbstractURL", default)]
    abstract_url: String,
    #[serde(rename = "RelatedTopics", default)]
    related_topics: Vec<RelatedTopic>,
}

// Variant matching is structural: a topic is a Result only when it carries
// both Text and FirstURL, otherwise a Group with nested Topics.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RelatedTopic {
    Result {
        #[serde(rename = "Text")]
        text: String,
        #[serde(rename = "FirstURL")]
        first_url: String,
    },
    Group {
        #[serde(rename = "Topics")]
        topics: Vec<RelatedTopic>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_flattening() {
        let body = r#"{
            "Heading": "Nvidia",
            "AbstractText": "Nvidia Corporation is a technology company.",
            "AbstractURL": "https://en.wikipedia.org/wiki/Nvidia",
            "RelatedTopics": [
                {"Text": "Nvidia stock - share price history", "FirstURL": "https://www.example.com/nvda"},
                {"Topics": [
                    {"Text": "GeForce - graphics cards", "FirstURL": "https://example.org/geforce"}
                ]}
            ]
        }"#;

        let ddg: DdgResponse = serde_json::from_str(body).unwrap();
        let mut hits = Vec::new();

        assert_eq!(ddg.heading, "Nvidia");
        collect_topics(&ddg.related_topics, &mut hits, 5);

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].title, "Nvidia stock");
        assert_eq!(hits[0].snippet, "share price history");
        assert_eq!(hits[0].source, "example.com");
        assert_eq!(hits[1].title, "GeForce");
    }

    #[test]
    fn test_topic_limit() {
        let topics = vec![
            RelatedTopic::Result {
                text: "One - first".to_string(),
                first_url: "https://a.com/1".to_string(),
            },
            RelatedTopic::Result {
                text: "Two - second".to_string(),
                first_url: "https://a.com/2".to_string(),
            },
            RelatedTopic::Result {
                text: "Three - third".to_string(),
                first_url: "https://a.com/3".to_string(),
            },
        ];

        let mut hits = Vec::new();
        collect_topics(&topics, &mut hits, 2);
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn test_extract_source() {
        assert_eq!(extract_source("https://www.reuters.com/article"), "reuters.com");
        assert_eq!(extract_source("https://finance.yahoo.com/news"), "finance.yahoo.com");
        assert_eq!(extract_source("not a url"), "Unknown");
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_live_search() {
        let client = DuckDuckGoSearch::default();
        let hits = client.search("nvidia", 5).await.unwrap();
        assert!(hits.len() <= 5);
    }
}
