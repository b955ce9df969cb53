//! Hugging Face Inference API provider implementation
//!
//! This module implements the LlmProvider trait against the hosted text
//! generation endpoint. See: https://huggingface.co/docs/api-inference

use crate::{CompletionRequest, CompletionResponse, LlmError, LlmProvider, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

const DEFAULT_HF_API_BASE: &str = "https://api-inference.huggingface.co/models";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Configuration for the Hugging Face provider
#[derive(Debug, Clone)]
pub struct HuggingFaceConfig {
    /// API token for authentication
    pub api_token: String,

    /// Base URL for the inference API
    /// Can be pointed at a dedicated Inference Endpoint deployment.
    pub api_base: String,

    /// Request timeout in seconds (default: 120)
    pub timeout_secs: u64,

    /// Wait for cold models instead of failing with 503
    pub wait_for_model: bool,
}

impl HuggingFaceConfig {
    /// Create a new config with the given API token and default settings
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            api_token: api_token.into(),
            api_base: DEFAULT_HF_API_BASE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            wait_for_model: true,
        }
    }

    /// Override the API base URL
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Override the request timeout
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// Hugging Face Inference API provider
///
/// Drives hosted text-generation models (Mistral/Mixtral instruct family and
/// similar). Decoding is deterministic unless the request sets a temperature.
pub struct HuggingFaceProvider {
    client: Client,
    config: HuggingFaceConfig,
}

impl HuggingFaceProvider {
    /// Create a new provider with the given configuration
    pub fn with_config(config: HuggingFaceConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    /// Create a provider from environment variable
    ///
    /// Reads the API token from the `HF_API_TOKEN` environment variable.
    pub fn from_env() -> Result<Self> {
        let api_token = std::env::var("HF_API_TOKEN").map_err(|_| {
            LlmError::ConfigurationError("HF_API_TOKEN environment variable not set".to_string())
        })?;
        Self::with_config(HuggingFaceConfig::new(api_token))
    }
}

#[async_trait]
impl LlmProvider for HuggingFaceProvider {
    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        debug!("Sending request to Hugging Face Inference API");

        let hf_request = HfRequest {
            inputs: request.prompt,
            parameters: HfParameters {
                max_new_tokens: request.max_tokens,
                temperature: request.temperature,
                // Sampling is only enabled when a non-zero temperature is requested
                do_sample: request.temperature.is_some_and(|t| t > 0.0),
                repetition_penalty: request.repetition_penalty,
                stop: request.stop_sequences,
                return_full_text: false,
            },
            options: HfOptions {
                wait_for_model: self.config.wait_for_model,
            },
        };

        let response = self
            .client
            .post(format!("{}/{}", self.config.api_base, request.model))
            .bearer_auth(&self.config.api_token)
            .json(&hf_request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;

            return Err(match status.as_u16() {
                401 | 403 => LlmError::AuthenticationFailed,
                429 => LlmError::RateLimitExceeded(error_text),
                400 => LlmError::InvalidRequest(error_text),
                404 | 503 => LlmError::ModelUnavailable(error_text),
                _ => LlmError::RequestFailed(format!("HTTP {status}: {error_text}")),
            });
        }

        let generations: Vec<HfGeneration> = response.json().await.map_err(|e| {
            LlmError::UnexpectedResponse(format!("Failed to parse response: {e}"))
        })?;

        let content = generations
            .into_iter()
            .next()
            .map(|g| g.generated_text)
            .ok_or_else(|| {
                LlmError::UnexpectedResponse("Empty generation list in response".to_string())
            })?;

        debug!("Received {} characters of generated text", content.len());

        Ok(CompletionResponse {
            content,
            // The inference API does not report token counts
            usage: None,
        })
    }

    fn name(&self) -> &'static str {
        "huggingface"
    }
}

// Hugging Face-specific request/response types
// These match the Inference API format exactly

#[derive(Debug, Serialize)]
struct HfRequest {
    inputs: String,
    parameters: HfParameters,
    options: HfOptions,
}

#[derive(Debug, Serialize)]
struct HfParameters {
    max_new_tokens: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    do_sample: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    repetition_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<Vec<String>>,
    return_full_text: bool,
}

#[derive(Debug, Serialize)]
struct HfOptions {
    wait_for_model: bool,
}

#[derive(Debug, Deserialize)]
struct HfGeneration {
    generated_text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = HuggingFaceConfig::new("hf_test");
        assert_eq!(config.api_base, DEFAULT_HF_API_BASE);
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert!(config.wait_for_model);
    }

    #[test]
    fn test_config_overrides() {
        let config = HuggingFaceConfig::new("hf_test")
            .with_api_base("http://localhost:8080/models")
            .with_timeout(30);

        assert_eq!(config.api_base, "http://localhost:8080/models");
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_provider_name() {
        let provider =
            HuggingFaceProvider::with_config(HuggingFaceConfig::new("hf_test")).unwrap();
        assert_eq!(provider.name(), "huggingface");
    }

    #[test]
    fn test_generation_deserialization() {
        let body = r#"[{"generated_text": "NVDA closed at 180.93."}]"#;
        let generations: Vec<HfGeneration> = serde_json::from_str(body).unwrap();
        assert_eq!(generations[0].generated_text, "NVDA closed at 180.93.");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_surfaces_http_error() {
        let config = HuggingFaceConfig::new("hf_test")
            .with_api_base("http://127.0.0.1:1/models")
            .with_timeout(1);
        let provider = HuggingFaceProvider::with_config(config).unwrap();

        let request = CompletionRequest::builder("test-model")
            .prompt("hello")
            .build();

        let result = provider.complete(request).await;
        assert!(matches!(result, Err(LlmError::HttpError(_))));
    }

    #[test]
    fn test_request_serialization_skips_unset_fields() {
        let request = HfRequest {
            inputs: "hello".to_string(),
            parameters: HfParameters {
                max_new_tokens: 10,
                temperature: None,
                do_sample: false,
                repetition_penalty: None,
                stop: None,
                return_full_text: false,
            },
            options: HfOptions {
                wait_for_model: true,
            },
        };

        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("max_new_tokens"));
        assert!(!json.contains("temperature"));
        assert!(!json.contains("repetition_penalty"));
    }
}
