use super::types::{ChatMessage, ChatRequest, ChatResponse};
use crate::provider::Transport;
use crate::{Error, GenerationRequest};
use reqwest::Client;
use std::time::Duration;

pub const DEFAULT_API_VERSION: &str = "2023-05-15";

const PROVIDER: &str = "AzureOpenAI";

/// Connection settings for an Azure OpenAI deployment.
#[derive(Debug, Clone)]
pub struct AzureConfig {
    /// Resource endpoint, e.g. `https://my-resource.openai.azure.com/`.
    pub endpoint: String,
    pub api_key: String,
    /// Deployment (engine) name that appears in the request path.
    pub deployment: String,
    pub api_version: String,
    /// Model name sent in the request body.
    pub model: String,
}

impl AzureConfig {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        deployment: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            deployment: deployment.into(),
            api_version: DEFAULT_API_VERSION.to_string(),
            model: model.into(),
        }
    }

    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    /// Full chat completions URL for this deployment.
    pub fn completions_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint.trim_end_matches('/'),
            self.deployment,
            self.api_version
        )
    }
}

/// Azure OpenAI chat completions transport.
///
/// Holds one connection pool that is shared by every concurrent request made
/// through it.
pub struct AzureOpenAIProvider {
    client: Client,
    config: AzureConfig,
}

impl AzureOpenAIProvider {
    /// Create a new Azure OpenAI provider.
    pub fn new(config: AzureConfig) -> Result<Self, Error> {
        if config.endpoint.is_empty() {
            return Err(Error::config("Endpoint required for Azure OpenAI provider"));
        }
        if config.deployment.is_empty() {
            return Err(Error::config("Deployment required for Azure OpenAI provider"));
        }

        let client = Client::builder().build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &AzureConfig {
        &self.config
    }

    fn convert_request(&self, request: &GenerationRequest) -> ChatRequest {
        ChatRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage::user(request.prompt())],
        }
    }

    /// Pull the completion text out of a response body.
    fn parse_response(body: &str) -> Result<String, Error> {
        let response: ChatResponse = serde_json::from_str(body)?;

        if let Some(error) = response.error {
            let message = error
                .get("message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| error.to_string());
            return Err(Error::service(PROVIDER, message));
        }

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| Error::malformed("response has no choices[0].message.content"))
    }
}

#[async_trait::async_trait]
impl Transport for AzureOpenAIProvider {
    async fn complete(&self, request: &GenerationRequest, timeout: Duration) -> Result<String, Error> {
        let payload = self.convert_request(request);

        // The deployment reads sampling parameters from headers, not the body.
        let response = self
            .client
            .post(self.config.completions_url())
            .header("Content-Type", "application/json")
            .header("api-key", &self.config.api_key)
            .header("temperature", request.temperature().to_string())
            .header("max_tokens", request.max_tokens().to_string())
            .timeout(timeout)
            .json(&payload)
            .send()
            .await?;

        // Error bodies come back with non-2xx statuses too; the body decides.
        let body = response.text().await?;
        Self::parse_response(&body)
    }
}
