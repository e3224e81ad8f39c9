use std::time::Duration;

pub const DEFAULT_TEMPERATURE: f32 = 0.5;
pub const DEFAULT_MAX_TOKENS: u32 = 2048;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 1000;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(10);

/// Model-level defaults fixed when a generator is constructed.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Log every prompt before it is sent.
    pub show_prompts: bool,
    /// Log every completion as it arrives.
    pub show_responses: bool,
}

impl GenerationConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            show_prompts: false,
            show_responses: false,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_show_prompts(mut self, show: bool) -> Self {
        self.show_prompts = show;
        self
    }

    pub fn with_show_responses(mut self, show: bool) -> Self {
        self.show_responses = show;
        self
    }
}

/// How hard a single prompt is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// Ceiling handed to the transport for each attempt.
    pub timeout: Duration,
    /// Pause between a failed attempt and the next one.
    pub retry_delay: Duration,
}

impl RetryPolicy {
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            timeout: DEFAULT_TIMEOUT,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }
}

/// Per-call overrides for a batch. Unset sampling values fall back to the
/// generator's [`GenerationConfig`].
#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub retry: RetryPolicy,
}

impl BatchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Sampling parameters actually sent, after falling back to `config`.
    pub fn resolve(&self, config: &GenerationConfig) -> (f32, u32) {
        (
            self.temperature.unwrap_or(config.temperature),
            self.max_tokens.unwrap_or(config.max_tokens),
        )
    }
}
