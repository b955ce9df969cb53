//! Error types for assistant operations

use thiserror::Error;

/// Assistant-specific errors
///
/// Expected absences (unresolved ticker, empty search results, a single
/// failed data category) are not errors; they are modeled as `Option`s or
/// error markers on the affected record. These variants cover conditions
/// that make an operation as a whole unusable.
#[derive(Debug, Error)]
pub enum AssistantError {
    /// Market data provider request failed
    #[error("Market data error: {0}")]
    MarketData(String),

    /// Data not available for the requested symbol
    #[error("Data not available for {symbol}: {reason}")]
    DataUnavailable { symbol: String, reason: String },

    /// Web search provider request failed
    #[error("Web search error: {0}")]
    Search(String),

    /// LLM synthesis failed
    #[error("Synthesis error: {0}")]
    Synthesis(String),

    /// Cache backend error
    #[error("Cache error: {0}")]
    Cache(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network or HTTP error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for assistant operations
pub type Result<T> = std::result::Result<T, AssistantError>;

/// Convert LLM errors into synthesis errors
impl From<finq_llm::LlmError> for AssistantError {
    fn from(err: finq_llm::LlmError) -> Self {
        AssistantError::Synthesis(err.to_string())
    }
}
