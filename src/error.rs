use thiserror::Error;

/// Errors that can occur when using the batch-llm library.
#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Service error: {provider} - {message}")]
    Service { provider: String, message: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Runtime error: {0}")]
    Runtime(#[from] std::io::Error),
}

impl Error {
    pub fn service(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Service {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Error::Config(message.into())
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Error::MalformedResponse(message.into())
    }

    /// Connectivity problems, timeouts and bodies that could not be understood.
    pub fn is_transport_fault(&self) -> bool {
        matches!(
            self,
            Error::Http(_) | Error::Serialization(_) | Error::MalformedResponse(_)
        )
    }

    /// A well-formed response in which the remote service reported an error.
    pub fn is_service_error(&self) -> bool {
        matches!(self, Error::Service { .. })
    }
}
