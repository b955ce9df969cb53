//! Query orchestration
//!
//! One pass per query, terminal at every exit: cache check, classification,
//! data fetches, optional LLM synthesis, cache store. Data is fetched before
//! any model sees the query, and the synthesis step can only reorganize what
//! was fetched; on any synthesis failure the raw blocks go out instead.
//! Nothing in here raises to the caller.

use crate::analyzer::{QueryAnalyzer, QueryClassification};
use crate::cache::{self, CacheStore};
use crate::config::AssistantConfig;
use crate::error::{AssistantError, Result};
use crate::fetcher::DataFetcher;
use crate::language::Language;
use crate::prompts::{self, FINANCIAL_SOURCE, WEB_SOURCE};
use crate::resolver::TickerResolver;
use crate::search::WebSearchProvider;
use finq_llm::{CompletionRequest, LlmProvider};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

/// Fixed reply when neither source produced anything
const NO_RESULTS_MESSAGE: &str = "Could not find relevant information.";

/// Gate for LLM synthesis calls
///
/// Completions are long-running and have no core-level timeout, so they go
/// through a small fixed pool of permits; a slow or hung call occupies one
/// permit instead of starving the runtime.
pub struct Synthesizer {
    provider: Arc<dyn LlmProvider>,
    permits: Arc<Semaphore>,
    model: String,
    max_tokens: usize,
}

impl Synthesizer {
    /// Create a synthesizer over an LLM provider
    pub fn new(provider: Arc<dyn LlmProvider>, config: &AssistantConfig) -> Self {
        Self {
            provider,
            permits: Arc::new(Semaphore::new(config.synthesis_workers)),
            model: config.synthesis_model.clone(),
            max_tokens: config.synthesis_max_tokens,
        }
    }

    /// Run one completion under a worker permit
    async fn invoke(&self, prompt: String) -> Result<String> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|e| AssistantError::Synthesis(e.to_string()))?;

        let request = CompletionRequest::builder(self.model.as_str())
            .prompt(prompt)
            .max_tokens(self.max_tokens)
            .temperature(0.0)
            .repetition_penalty(1.1)
            .build();

        let response = self.provider.complete(request).await?;
        Ok(response.content)
    }
}

/// Routes queries to data sources and assembles the final response
pub struct Orchestrator {
    analyzer: QueryAnalyzer,
    resolver: TickerResolver,
    fetcher: Arc<DataFetcher>,
    search: Arc<dyn WebSearchProvider>,
    synthesizer: Synthesizer,
    cache: CacheStore,
    config: Arc<AssistantConfig>,
}

impl Orchestrator {
    /// Create an orchestrator from its collaborators
    ///
    /// All collaborators are injected; the orchestrator owns no connections
    /// of its own.
    pub fn new(
        fetcher: Arc<DataFetcher>,
        search: Arc<dyn WebSearchProvider>,
        llm: Arc<dyn LlmProvider>,
        cache: CacheStore,
        config: Arc<AssistantConfig>,
    ) -> Self {
        Self {
            analyzer: QueryAnalyzer::new(),
            resolver: TickerResolver::new(),
            fetcher,
            search,
            synthesizer: Synthesizer::new(llm, &config),
            cache,
            config,
        }
    }

    /// Answer a natural-language query
    ///
    /// Never fails: every error path degrades to a textual result.
    pub async fn query(&self, query: &str) -> String {
        let cache_key = cache::derive_key("orchestrator", query);
        if let Some(cached) = self.cache.get::<String>(&cache_key).await {
            info!("Using cached response");
            return cached;
        }

        let classification = self.analyzer.classify(query);

        match self.answer(query, classification).await {
            Ok(response) => {
                self.cache
                    .set(&cache_key, &response, self.config.cache_ttl_default)
                    .await;
                response
            }
            Err(e) => {
                error!("Orchestrator error: {e}");
                format!("Error: {e}")
            }
        }
    }

    /// Fetch, combine, and optionally synthesize
    async fn answer(&self, query: &str, classification: QueryClassification) -> Result<String> {
        let mut financial_data = String::new();
        if classification.needs_financial {
            if let Some(symbol) = self.resolver.resolve(query) {
                info!("Fetching financial data for {symbol}");
                financial_data = self.fetcher.report(symbol).await;
            }
        }

        // Web search runs when asked for, and as the guaranteed fallback
        // when the financial step produced nothing
        let mut web_data = String::new();
        if classification.needs_news || financial_data.is_empty() {
            info!("Fetching web search data");
            web_data = self.fetch_web_block(query).await;
        }

        let response = match (financial_data.is_empty(), web_data.is_empty()) {
            (false, false) => {
                self.synthesize_both(query, &financial_data, &web_data)
                    .await
            }
            (false, true) => self.reformat(query, &financial_data, FINANCIAL_SOURCE).await,
            (true, false) => self.reformat(query, &web_data, WEB_SOURCE).await,
            (true, true) => NO_RESULTS_MESSAGE.to_string(),
        };

        Ok(response)
    }

    /// Fetch and format the web search block; empty on any failure
    async fn fetch_web_block(&self, query: &str) -> String {
        let search_query = self.resolver.search_hint(query);

        let hits = match self
            .search
            .search(&search_query, self.config.max_search_results)
            .await
        {
            Ok(hits) => hits,
            Err(e) => {
                warn!("Web search error: {e}");
                return String::new();
            }
        };

        if hits.is_empty() {
            return String::new();
        }

        let mut parts = Vec::new();
        for (i, hit) in hits.iter().take(self.config.max_search_results).enumerate() {
            let title = if hit.title.is_empty() {
                "No title"
            } else {
                &hit.title
            };
            parts.push(format!("{}. {title}", i + 1));
            parts.push(format!("   {}", hit.snippet));
            parts.push(format!("   Source: {}", hit.source));
        }
        parts.join("\n")
    }

    /// Synthesize both blocks into one answer; concatenation fallback
    async fn synthesize_both(&self, query: &str, financial_data: &str, web_data: &str) -> String {
        let lang = Language::detect(query);
        let prompt = prompts::synthesis_prompt(lang, financial_data, web_data);

        match self.synthesizer.invoke(prompt).await {
            Ok(content) => content,
            Err(e) => {
                warn!("Synthesis failed, returning labeled raw data: {e}");
                fallback_concat(financial_data, web_data)
            }
        }
    }

    /// Reformat a single block; the raw block is the fallback
    async fn reformat(&self, query: &str, data: &str, source: &str) -> String {
        let lang = Language::detect(query);
        let prompt = prompts::reformat_prompt(lang, data, source);

        match self.synthesizer.invoke(prompt).await {
            Ok(content) => content,
            Err(e) => {
                warn!("Reformat failed, returning raw data: {e}");
                data.to_string()
            }
        }
    }

    /// Drop every cached entry (responses and per-category data)
    pub async fn clear_cache(&self) {
        self.cache.clear(None).await;
        info!("Cache cleared");
    }
}

/// Deterministic labeled concatenation used when synthesis fails
fn fallback_concat(financial_data: &str, web_data: &str) -> String {
    let mut parts = Vec::new();

    if !financial_data.is_empty() {
        parts.push(format!("## Financial Data ({FINANCIAL_SOURCE})"));
        parts.push(financial_data.to_string());
    }

    if !web_data.is_empty() {
        parts.push(format!("\n## News ({WEB_SOURCE})"));
        parts.push(web_data.to_string());
    }

    parts.push("\n---".to_string());
    parts.push(format!(
        "*Sources: {FINANCIAL_SOURCE} (real-time data), {WEB_SOURCE} (news)*"
    ));

    parts.join("\n")
}
