use crate::{BatchOptions, Error, GenerationRequest};
use std::time::Duration;

/// A single round trip to a completion backend.
///
/// Implementations make exactly one attempt per call and leave retrying to
/// the caller.
#[async_trait::async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Send one prompt and return the completion text.
    async fn complete(&self, request: &GenerationRequest, timeout: Duration) -> Result<String, Error>;
}

/// Anything that can turn a batch of prompts into completions.
///
/// The output always has one entry per prompt, in input order. An empty
/// string means the prompt could not be completed.
#[async_trait::async_trait]
pub trait Generator: Send + Sync {
    async fn generate_batched(&self, prompts: &[String], options: &BatchOptions) -> Vec<String>;

    /// Synchronous entry point: drives [`Generator::generate_batched`] on a
    /// private single-threaded runtime and blocks until every prompt is done.
    ///
    /// Only building the runtime can fail. Must not be called from inside an
    /// async context.
    fn generate_batched_blocking(
        &self,
        prompts: &[String],
        options: &BatchOptions,
    ) -> Result<Vec<String>, Error> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        Ok(runtime.block_on(self.generate_batched(prompts, options)))
    }
}
