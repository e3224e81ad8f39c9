/// A single prompt together with the sampling parameters it is sent with.
///
/// Requests are built per batch call and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    prompt: String,
    temperature: f32,
    max_tokens: u32,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, temperature: f32, max_tokens: u32) -> Self {
        Self {
            prompt: prompt.into(),
            temperature,
            max_tokens,
        }
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }
}

/// What a batch produced for one prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationOutcome {
    /// The completion, or an empty string once every attempt has failed.
    pub text: String,
    /// Number of attempts actually made.
    pub attempts: u32,
}

impl GenerationOutcome {
    pub fn is_exhausted(&self) -> bool {
        self.text.is_empty()
    }
}
