//! Batched prompt completion against hosted LLM services.
//!
//! A [`Dispatcher`] sends every prompt of a batch concurrently through a
//! [`Transport`], retries each prompt independently with a fixed delay, and
//! returns the completions in input order. Prompts that never succeed come
//! back as empty strings.

pub mod error;
pub mod types;
pub mod provider;
pub mod providers;
pub mod dispatcher;
pub mod factory;

// Re-export core types for easy usage
pub use error::Error;
pub use types::*;
pub use provider::{Generator, Transport};
pub use providers::*;
pub use providers::azure::DEFAULT_API_VERSION;
pub use dispatcher::Dispatcher;
pub use factory::{BackendType, GeneratorConfig, GeneratorFactory};
