//! LLM provider trait definition

use crate::{CompletionRequest, CompletionResponse, Result};
use async_trait::async_trait;

/// Trait for LLM providers
///
/// Implementations of this trait provide access to different LLM hosting
/// services (e.g., Hugging Face Inference, a local OpenAI-compatible server).
/// Callers must treat a completion as a long-running blocking operation;
/// no retries are performed at this layer.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate a completion from the LLM
    ///
    /// # Arguments
    ///
    /// * `request` - The completion request with prompt and decode parameters
    ///
    /// # Returns
    ///
    /// The completion response with the generated text
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    /// Get the provider name (e.g., "huggingface")
    fn name(&self) -> &str;
}
