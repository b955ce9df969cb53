//! Concrete LLM provider implementations

pub mod hugging_face;

pub use hugging_face::{HuggingFaceConfig, HuggingFaceProvider};
