//! Gemini `streamGenerateContent` client (Server-Sent Events).

use super::lines::lines;
use super::{ClientSettings, GenerationService, LlmError, TextStream};
use async_trait::async_trait;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Client for the Gemini generative language API.
pub struct GeminiClient {
    settings: ClientSettings,
    http_client: reqwest::Client,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

/// One SSE `data:` payload.
#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    code: u16,
    #[serde(default)]
    message: String,
}

impl GeminiClient {
    pub fn new(settings: ClientSettings) -> Result<Self, LlmError> {
        info!("Initializing Gemini client with model {}", settings.model);
        let http_client = settings.http_client()?;
        Ok(Self {
            settings,
            http_client,
        })
    }

    /// The credential, read from the flag or the environment at call time.
    fn api_key(&self) -> Option<String> {
        self.settings
            .api_key
            .clone()
            .or_else(|| std::env::var("API_KEY").ok())
            .or_else(|| std::env::var("GEMINI_API_KEY").ok())
            .filter(|key| !key.trim().is_empty())
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:streamGenerateContent?alt=sse",
            self.settings.base_url, self.settings.model
        )
    }
}

#[async_trait]
impl GenerationService for GeminiClient {
    async fn stream(&self, system: &str, content: &str) -> Result<TextStream, LlmError> {
        let api_key = self.api_key().ok_or(LlmError::MissingApiKey)?;
        let url = self.endpoint();

        let request = GenerateRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part { text: system }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part { text: content }],
            }],
            generation_config: self
                .settings
                .temperature
                .map(|temperature| GenerationConfig { temperature }),
        };

        debug!("Sending streaming request to {}", url);

        let response = self
            .http_client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::from_send(e, &self.settings.base_url))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Status { status, body });
        }

        Ok(decode_stream(response.bytes_stream()))
    }

    fn describe(&self) -> String {
        format!("gemini ({})", self.settings.model)
    }
}

/// Map an SSE byte stream to text fragments.
pub(crate) fn decode_stream<S, B, E>(bytes: S) -> TextStream
where
    S: futures::Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Into<LlmError> + Send + 'static,
{
    lines(bytes)
        .filter_map(|line| async move {
            match line {
                Ok(line) => decode_event(&line).transpose(),
                Err(err) => Some(Err(err)),
            }
        })
        .boxed()
}

/// Decode one SSE line. Non-data lines and empty chunks yield `None`.
fn decode_event(line: &str) -> Result<Option<String>, LlmError> {
    let Some(data) = line.strip_prefix("data:") else {
        return Ok(None);
    };
    let data = data.trim();
    if data.is_empty() || data == "[DONE]" {
        return Ok(None);
    }

    let chunk: StreamChunk =
        serde_json::from_str(data).map_err(|e| LlmError::Malformed(e.to_string()))?;

    if let Some(error) = chunk.error {
        return Err(LlmError::Status {
            status: error.code,
            body: error.message,
        });
    }

    let text: String = chunk
        .candidates
        .into_iter()
        .take(1)
        .filter_map(|c| c.content)
        .flat_map(|c| c.parts)
        .filter_map(|p| p.text)
        .collect();

    Ok(if text.is_empty() { None } else { Some(text) })
}
