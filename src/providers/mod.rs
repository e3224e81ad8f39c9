//! Provider implementations for different LLM services.

pub mod azure;

// Re-export commonly used provider types
pub use azure::{AzureConfig, AzureOpenAIProvider};
