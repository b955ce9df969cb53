//! LLM provider abstraction layer for finq
//!
//! This crate provides a provider-agnostic abstraction for the assistant's
//! single LLM capability: transforming already-fetched factual text into a
//! formatted answer. It includes:
//!
//! - Completion request/response types (single prompt in, text out)
//! - Provider trait for LLM implementations
//! - A Hugging Face Inference API provider

pub mod completion;
pub mod error;
pub mod provider;
pub mod providers;

// Re-export main types
pub use completion::{CompletionRequest, CompletionResponse, TokenUsage};
pub use error::{LlmError, Result};
pub use provider::LlmProvider;
pub use providers::{HuggingFaceConfig, HuggingFaceProvider};
