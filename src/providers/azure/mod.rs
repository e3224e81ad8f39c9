//! Azure-hosted OpenAI chat completions.

mod client;
mod types;

pub use client::{AzureConfig, AzureOpenAIProvider, DEFAULT_API_VERSION};
pub use types::{ChatChoice, ChatMessage, ChatRequest, ChatResponse, ResponseMessage};
