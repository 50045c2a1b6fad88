//! Streaming clients for hosted text-generation services.
//!
//! Every client turns one request (system instruction + user content) into
//! a [`TextStream`]: a lazy, finite, one-shot sequence of text fragments in
//! emission order.

pub mod gemini;
pub mod lines;
pub mod ollama;

pub use gemini::GeminiClient;
pub use ollama::OllamaClient;

use crate::cli::Provider;
use crate::config::ModelConfig;
use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;
use thiserror::Error;

/// Fragments of a streamed response, consumed at most once.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String, LlmError>> + Send>>;

/// Failures talking to a generation service, at call time or mid-stream.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("request timed out")]
    Timeout,

    #[error("cannot connect to {0}")]
    Connect(String),

    #[error("service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed stream frame: {0}")]
    Malformed(String),

    #[error("no API key configured (set API_KEY or pass --api-key)")]
    MissingApiKey,
}

impl LlmError {
    /// Classify an error from sending the request.
    pub(crate) fn from_send(err: reqwest::Error, endpoint: &str) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else if err.is_connect() {
            LlmError::Connect(endpoint.to_string())
        } else {
            LlmError::Transport(err.to_string())
        }
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Transport(err.to_string())
        }
    }
}

/// A hosted model that answers with a streamed text response.
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Start a generation and return its fragment stream.
    async fn stream(&self, system: &str, content: &str) -> Result<TextStream, LlmError>;

    /// Human-readable provider and model, e.g. `gemini (gemini-2.5-flash)`.
    fn describe(&self) -> String;
}

#[async_trait]
impl<T: GenerationService + ?Sized> GenerationService for Box<T> {
    async fn stream(&self, system: &str, content: &str) -> Result<TextStream, LlmError> {
        (**self).stream(system, content).await
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Settings shared by every client.
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub model: String,
    pub base_url: String,
    pub api_key: Option<String>,
    pub temperature: Option<f32>,
    pub timeout_seconds: u64,
}

impl ClientSettings {
    /// Resolve the settings for the configured provider.
    pub fn from_config(config: &ModelConfig, api_key: Option<String>) -> Self {
        let base_url = match config.provider {
            Provider::Gemini => config.gemini_url.clone(),
            Provider::Ollama => config.ollama_url.clone(),
        };

        Self {
            model: config.effective_model(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            temperature: config.temperature,
            timeout_seconds: config.timeout_seconds,
        }
    }

    pub(crate) fn http_client(&self) -> Result<reqwest::Client, LlmError> {
        reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(self.timeout_seconds))
            .build()
            .map_err(LlmError::from)
    }
}

/// Build the client for `provider`.
pub fn connect(
    provider: Provider,
    settings: ClientSettings,
) -> Result<Box<dyn GenerationService>, LlmError> {
    let service: Box<dyn GenerationService> = match provider {
        Provider::Gemini => Box::new(GeminiClient::new(settings)?),
        Provider::Ollama => Box::new(OllamaClient::new(settings)?),
    };
    Ok(service)
}
