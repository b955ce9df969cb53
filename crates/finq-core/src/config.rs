//! Configuration for the financial-query assistant

use crate::error::{AssistantError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the assistant core
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// Redis connection URL; None disables the durable cache backend
    pub redis_url: Option<String>,

    /// Timeout for the initial Redis connection attempt
    pub redis_connect_timeout: Duration,

    /// Default cache TTL for orchestrated responses
    pub cache_ttl_default: Duration,

    /// Cache TTL for stock quotes
    pub cache_ttl_quotes: Duration,

    /// Cache TTL for analyst and fundamental data
    pub cache_ttl_fundamentals: Duration,

    /// Cache TTL for news and web search results
    pub cache_ttl_news: Duration,

    /// Maximum web search results to include in a response
    pub max_search_results: usize,

    /// Maximum conversation turns kept in memory
    pub max_history: usize,

    /// Concurrent LLM synthesis calls allowed
    pub synthesis_workers: usize,

    /// Model identifier used for synthesis
    pub synthesis_model: String,

    /// Maximum tokens generated per synthesis call
    pub synthesis_max_tokens: usize,

    /// Request timeout for provider HTTP calls
    pub request_timeout: Duration,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            redis_url: None,
            redis_connect_timeout: Duration::from_secs(5),
            cache_ttl_default: Duration::from_secs(3600), // 1 hour
            cache_ttl_quotes: Duration::from_secs(300),   // 5 minutes
            cache_ttl_fundamentals: Duration::from_secs(3600), // 1 hour
            cache_ttl_news: Duration::from_secs(300),     // 5 minutes
            max_search_results: 5,
            max_history: 10,
            synthesis_workers: 2,
            synthesis_model: "mistralai/Mixtral-8x7B-Instruct-v0.1".to_string(),
            synthesis_max_tokens: 800,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl AssistantConfig {
    /// Create a new configuration builder
    pub fn builder() -> AssistantConfigBuilder {
        AssistantConfigBuilder::default()
    }

    /// Load overridable settings from the environment
    ///
    /// Recognized variables: `REDIS_URL`, `SYNTHESIS_MODEL`, `CACHE_TTL`
    /// (seconds), `MAX_SEARCH_RESULTS`.
    pub fn with_env(mut self) -> Self {
        if let Ok(url) = std::env::var("REDIS_URL") {
            self.redis_url = Some(url);
        }
        if let Ok(model) = std::env::var("SYNTHESIS_MODEL") {
            self.synthesis_model = model;
        }
        if let Ok(ttl) = std::env::var("CACHE_TTL") {
            if let Ok(secs) = ttl.parse::<u64>() {
                self.cache_ttl_default = Duration::from_secs(secs);
            }
        }
        if let Ok(max) = std::env::var("MAX_SEARCH_RESULTS") {
            if let Ok(n) = max.parse::<usize>() {
                self.max_search_results = n;
            }
        }
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_history == 0 {
            return Err(AssistantError::Config(
                "max_history must be greater than 0".to_string(),
            ));
        }

        if self.synthesis_workers == 0 {
            return Err(AssistantError::Config(
                "synthesis_workers must be greater than 0".to_string(),
            ));
        }

        if self.synthesis_model.is_empty() {
            return Err(AssistantError::Config(
                "synthesis_model must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for AssistantConfig
#[derive(Debug, Default)]
pub struct AssistantConfigBuilder {
    redis_url: Option<String>,
    redis_connect_timeout: Option<Duration>,
    cache_ttl_default: Option<Duration>,
    cache_ttl_quotes: Option<Duration>,
    cache_ttl_fundamentals: Option<Duration>,
    cache_ttl_news: Option<Duration>,
    max_search_results: Option<usize>,
    max_history: Option<usize>,
    synthesis_workers: Option<usize>,
    synthesis_model: Option<String>,
    synthesis_max_tokens: Option<usize>,
    request_timeout: Option<Duration>,
}

impl AssistantConfigBuilder {
    /// Set the Redis connection URL
    pub fn redis_url(mut self, url: impl Into<String>) -> Self {
        self.redis_url = Some(url.into());
        self
    }

    /// Set the Redis connection timeout
    pub fn redis_connect_timeout(mut self, timeout: Duration) -> Self {
        self.redis_connect_timeout = Some(timeout);
        self
    }

    /// Set the default cache TTL
    pub fn cache_ttl_default(mut self, ttl: Duration) -> Self {
        self.cache_ttl_default = Some(ttl);
        self
    }

    /// Set the quote cache TTL
    pub fn cache_ttl_quotes(mut self, ttl: Duration) -> Self {
        self.cache_ttl_quotes = Some(ttl);
        self
    }

    /// Set the fundamentals cache TTL
    pub fn cache_ttl_fundamentals(mut self, ttl: Duration) -> Self {
        self.cache_ttl_fundamentals = Some(ttl);
        self
    }

    /// Set the news cache TTL
    pub fn cache_ttl_news(mut self, ttl: Duration) -> Self {
        self.cache_ttl_news = Some(ttl);
        self
    }

    /// Set the maximum number of web search results
    pub fn max_search_results(mut self, max: usize) -> Self {
        self.max_search_results = Some(max);
        self
    }

    /// Set the conversation history cap
    pub fn max_history(mut self, max: usize) -> Self {
        self.max_history = Some(max);
        self
    }

    /// Set the number of concurrent synthesis workers
    pub fn synthesis_workers(mut self, workers: usize) -> Self {
        self.synthesis_workers = Some(workers);
        self
    }

    /// Set the synthesis model identifier
    pub fn synthesis_model(mut self, model: impl Into<String>) -> Self {
        self.synthesis_model = Some(model.into());
        self
    }

    /// Set the synthesis token budget
    pub fn synthesis_max_tokens(mut self, max_tokens: usize) -> Self {
        self.synthesis_max_tokens = Some(max_tokens);
        self
    }

    /// Set the provider request timeout
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<AssistantConfig> {
        let defaults = AssistantConfig::default();

        let config = AssistantConfig {
            redis_url: self.redis_url,
            redis_connect_timeout: self
                .redis_connect_timeout
                .unwrap_or(defaults.redis_connect_timeout),
            cache_ttl_default: self.cache_ttl_default.unwrap_or(defaults.cache_ttl_default),
            cache_ttl_quotes: self.cache_ttl_quotes.unwrap_or(defaults.cache_ttl_quotes),
            cache_ttl_fundamentals: self
                .cache_ttl_fundamentals
                .unwrap_or(defaults.cache_ttl_fundamentals),
            cache_ttl_news: self.cache_ttl_news.unwrap_or(defaults.cache_ttl_news),
            max_search_results: self.max_search_results.unwrap_or(defaults.max_search_results),
            max_history: self.max_history.unwrap_or(defaults.max_history),
            synthesis_workers: self.synthesis_workers.unwrap_or(defaults.synthesis_workers),
            synthesis_model: self.synthesis_model.unwrap_or(defaults.synthesis_model),
            synthesis_max_tokens: self
                .synthesis_max_tokens
                .unwrap_or(defaults.synthesis_max_tokens),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
        };

        config.validate()?;
        Ok(config)
    }
}
