use crate::{
    AzureConfig, AzureOpenAIProvider, Dispatcher, Error, GenerationConfig, Generator,
    DEFAULT_API_VERSION,
};
use std::env;
use std::str::FromStr;

/// Supported generation backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    /// Hosted chat completions behind an Azure OpenAI deployment.
    AzureOpenAI,
    /// A locally loaded model. These are supplied by the caller as their own
    /// [`Generator`] implementation.
    Local,
}

impl FromStr for BackendType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "azure-openai" | "azure" | "openai" => Ok(BackendType::AzureOpenAI),
            "local" => Ok(BackendType::Local),
            other => Err(Error::config(format!(
                "Invalid BACKEND_TYPE '{other}'. Valid values are: azure-openai, local"
            ))),
        }
    }
}

/// Configuration for creating generators.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub backend_type: BackendType,
    pub azure: Option<AzureConfig>,
    pub generation: GenerationConfig,
}

impl GeneratorConfig {
    /// Create configuration for an Azure OpenAI deployment.
    pub fn azure(azure: AzureConfig) -> Self {
        let generation = GenerationConfig::new(azure.model.clone());
        Self {
            backend_type: BackendType::AzureOpenAI,
            azure: Some(azure),
            generation,
        }
    }

    pub fn with_generation(mut self, generation: GenerationConfig) -> Self {
        self.generation = generation;
        self
    }

    /// Create configuration from environment variables.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let backend_type = match lookup("BACKEND_TYPE") {
            Some(value) => value.parse()?,
            None => BackendType::AzureOpenAI,
        };

        if backend_type == BackendType::Local {
            return Err(Error::config(
                "Local models cannot be configured from the environment; construct their Generator directly",
            ));
        }

        let require = |key: &str| {
            lookup(key).ok_or_else(|| {
                Error::config(format!(
                    "{key} environment variable is required for Azure OpenAI backend"
                ))
            })
        };

        let endpoint = require("AZURE_OPENAI_ENDPOINT")?;
        let api_key = require("AZURE_OPENAI_API_KEY")?;
        let deployment = require("AZURE_OPENAI_DEPLOYMENT")?;
        let model = lookup("LLM_MODEL").unwrap_or_else(|| deployment.clone());
        let api_version =
            lookup("AZURE_OPENAI_API_VERSION").unwrap_or_else(|| DEFAULT_API_VERSION.to_string());

        let mut generation = GenerationConfig::new(model.clone());
        if let Some(temperature) = lookup("LLM_TEMPERATURE") {
            generation.temperature = temperature
                .parse()
                .map_err(|_| Error::config(format!("Invalid LLM_TEMPERATURE '{temperature}'")))?;
        }
        if let Some(max_tokens) = lookup("LLM_MAX_TOKENS") {
            generation.max_tokens = max_tokens
                .parse()
                .map_err(|_| Error::config(format!("Invalid LLM_MAX_TOKENS '{max_tokens}'")))?;
        }

        let azure = AzureConfig::new(endpoint, api_key, deployment, model)
            .with_api_version(api_version);

        Ok(Self {
            backend_type,
            azure: Some(azure),
            generation,
        })
    }
}

/// Factory for creating generators.
pub struct GeneratorFactory;

impl GeneratorFactory {
    /// Create a generator from configuration.
    pub fn create(config: &GeneratorConfig) -> Result<Box<dyn Generator>, Error> {
        match config.backend_type {
            BackendType::AzureOpenAI => {
                let azure = config
                    .azure
                    .as_ref()
                    .ok_or_else(|| Error::config("Azure settings required for Azure OpenAI backend"))?;
                let provider = AzureOpenAIProvider::new(azure.clone())?;
                Ok(Box::new(Dispatcher::new(provider, config.generation.clone())))
            }
            BackendType::Local => Err(Error::config(
                "Local backends are not built by the factory; implement Generator for the loaded model",
            )),
        }
    }

    /// Create a generator from environment variables.
    pub fn from_env() -> Result<Box<dyn Generator>, Error> {
        let config = GeneratorConfig::from_env()?;
        Self::create(&config)
    }
}
