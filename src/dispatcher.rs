//! Concurrent batch dispatch with per-prompt retry.

use crate::provider::{Generator, Transport};
use crate::{BatchOptions, GenerationConfig, GenerationOutcome, GenerationRequest, RetryPolicy};
use futures::future::join_all;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU32, Ordering};
use tracing::{debug, error, info, warn};

/// Sends every prompt of a batch concurrently through one [`Transport`] and
/// retries each prompt on its own until it yields text or runs out of
/// attempts.
pub struct Dispatcher<T: Transport> {
    transport: T,
    config: GenerationConfig,
}

impl<T: Transport> Dispatcher<T> {
    pub fn new(transport: T, config: GenerationConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Run a batch and report the attempt count alongside each result.
    ///
    /// Results are positionally bound to `prompts`; completion order does not
    /// matter. A prompt whose unit of work fails in any way, including a
    /// panic inside the transport, ends up with an empty text and never
    /// disturbs its siblings.
    pub async fn generate_batched_detailed(
        &self,
        prompts: &[String],
        options: &BatchOptions,
    ) -> Vec<GenerationOutcome> {
        let (temperature, max_tokens) = options.resolve(&self.config);
        let retry = options.retry;

        let units = prompts.iter().enumerate().map(|(index, prompt)| {
            let request = GenerationRequest::new(prompt.as_str(), temperature, max_tokens);
            async move {
                let attempts = AtomicU32::new(0);
                let unit = self.run_with_retry(index, &request, &retry, &attempts);
                let text = match AssertUnwindSafe(unit).catch_unwind().await {
                    Ok(text) => text,
                    Err(_) => {
                        error!(index, "completion task panicked; treating prompt as exhausted");
                        String::new()
                    }
                };
                GenerationOutcome {
                    text,
                    attempts: attempts.load(Ordering::Relaxed),
                }
            }
        });

        join_all(units).await
    }

    async fn run_with_retry(
        &self,
        index: usize,
        request: &GenerationRequest,
        retry: &RetryPolicy,
        attempts: &AtomicU32,
    ) -> String {
        if self.config.show_prompts {
            info!(index, prompt = request.prompt(), "sending prompt");
        }

        for attempt in 1..=retry.max_attempts {
            attempts.store(attempt, Ordering::Relaxed);
            debug!(index, attempt, "requesting completion");

            match self.transport.complete(request, retry.timeout).await {
                Ok(text) if !text.is_empty() => {
                    if self.config.show_responses {
                        info!(index, attempt, response = %text, "received completion");
                    }
                    return text;
                }
                Ok(_) => warn!(index, attempt, "service returned an empty completion"),
                Err(e) if e.is_service_error() => {
                    warn!(index, attempt, error = %e, "service reported an error")
                }
                Err(e) => warn!(index, attempt, error = %e, "error when calling the service"),
            }

            if attempt < retry.max_attempts {
                tokio::time::sleep(retry.retry_delay).await;
            }
        }

        error!(
            index,
            max_attempts = retry.max_attempts,
            "giving up on prompt after exhausting all attempts"
        );
        String::new()
    }
}

#[async_trait::async_trait]
impl<T: Transport> Generator for Dispatcher<T> {
    async fn generate_batched(&self, prompts: &[String], options: &BatchOptions) -> Vec<String> {
        self.generate_batched_detailed(prompts, options)
            .await
            .into_iter()
            .map(|outcome| outcome.text)
            .collect()
    }
}
