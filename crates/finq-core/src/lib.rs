//! Financial-query assistant core
//!
//! This crate implements the decision logic of the assistant: given a
//! natural-language question it decides which data sources to consult,
//! fetches market data and web results through injected providers, and
//! assembles a textual answer, optionally reformatted by an LLM under
//! strict copy-verbatim rules. It includes:
//!
//! - A best-effort cache store with deterministic key derivation and a
//!   Redis-or-local dual backend
//! - Keyword-based query classification and first-match ticker resolution
//! - Per-category cached market data fetching and report formatting
//! - Multi-symbol comparison reports
//! - A bounded conversation memory with keyword-overlap recall
//!
//! # Architecture
//!
//! Data is always fetched before any model is involved. The orchestrator
//! runs one terminal pass per query: cache check, classify, fetch, combine,
//! synthesize (with deterministic fallbacks), cache store. All collaborators
//! (market data, web search, LLM) are trait objects injected at
//! construction; nothing is a process-wide singleton.
//!
//! # Example
//!
//! ```rust,ignore
//! use finq_core::{
//!     AssistantConfig, CacheStore, DataFetcher, Orchestrator,
//!     api::{DuckDuckGoSearch, YahooMarketData},
//! };
//! use finq_llm::HuggingFaceProvider;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Arc::new(AssistantConfig::default().with_env());
//!     let cache = CacheStore::connect(&config).await;
//!
//!     let market = Arc::new(YahooMarketData::new(config.request_timeout));
//!     let fetcher = Arc::new(DataFetcher::new(market, cache.clone(), Arc::clone(&config)));
//!     let search = Arc::new(DuckDuckGoSearch::new(config.request_timeout));
//!     let llm = Arc::new(HuggingFaceProvider::from_env()?);
//!
//!     let orchestrator = Orchestrator::new(fetcher, search, llm, cache, config);
//!     println!("{}", orchestrator.query("NVIDIA stock price and recent news").await);
//!
//!     Ok(())
//! }
//! ```

pub mod analyzer;
pub mod api;
pub mod cache;
pub mod comparison;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod language;
pub mod market;
pub mod memory;
pub mod orchestrator;
pub mod prompts;
pub mod resolver;
pub mod search;

// Re-export main types for convenience
pub use analyzer::{QueryAnalyzer, QueryClassification};
pub use cache::{CacheStore, derive_key};
pub use comparison::ComparisonFormatter;
pub use config::AssistantConfig;
pub use error::{AssistantError, Result};
pub use fetcher::{CategoryResult, DataBundle, DataFetcher};
pub use language::Language;
pub use market::MarketDataProvider;
pub use memory::ConversationMemory;
pub use orchestrator::Orchestrator;
pub use resolver::TickerResolver;
pub use search::WebSearchProvider;
