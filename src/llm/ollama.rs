//! Ollama `/api/chat` client with NDJSON streaming.

use super::lines::lines;
use super::{ClientSettings, GenerationService, LlmError, TextStream};
use async_trait::async_trait;
use futures::{future, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Message in the chat request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// Ollama chat API request.
#[derive(Debug, Serialize)]
struct OllamaChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<OllamaOptions>,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
}

/// One NDJSON line of the streamed chat response.
#[derive(Debug, Deserialize)]
struct OllamaChatChunk {
    #[serde(default)]
    message: Option<ResponseMessage>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    done: bool,
}

/// A decoded NDJSON line.
#[derive(Debug, PartialEq, Eq)]
struct Frame {
    content: String,
    done: bool,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: String,
}

/// Client for a local or remote Ollama server.
pub struct OllamaClient {
    settings: ClientSettings,
    http_client: reqwest::Client,
}

impl OllamaClient {
    pub fn new(settings: ClientSettings) -> Result<Self, LlmError> {
        info!(
            "Initializing Ollama client with model {} at {}",
            settings.model, settings.base_url
        );
        let http_client = settings.http_client()?;
        Ok(Self {
            settings,
            http_client,
        })
    }
}

#[async_trait]
impl GenerationService for OllamaClient {
    async fn stream(&self, system: &str, content: &str) -> Result<TextStream, LlmError> {
        let url = format!("{}/api/chat", self.settings.base_url);

        let request = OllamaChatRequest {
            model: self.settings.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: content.to_string(),
                },
            ],
            stream: true,
            options: self
                .settings
                .temperature
                .map(|temperature| OllamaOptions { temperature }),
        };

        debug!("Sending streaming chat request to {}", url);

        let response = self
            .http_client
            .post(&url)
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
        format!("ollama ({})", self.settings.model)
    }
}

/// Map an NDJSON byte stream to text fragments.
///
/// The stream ends at the first `done: true` line, even if more bytes follow.
pub(crate) fn decode_stream<S, B, E>(bytes: S) -> TextStream
where
    S: futures::Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Into<LlmError> + Send + 'static,
{
    lines(bytes)
        .scan(false, |done, line| {
            if *done {
                return future::ready(None);
            }
            let item = line.and_then(|line| decode_line(&line)).map(|frame| {
                frame.and_then(|frame| {
                    *done = frame.done;
                    Some(frame.content).filter(|content| !content.is_empty())
                })
            });
            future::ready(Some(item.transpose()))
        })
        .filter_map(future::ready)
        .boxed()
}

/// Decode one NDJSON line. Blank lines yield `None`.
fn decode_line(line: &str) -> Result<Option<Frame>, LlmError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let chunk: OllamaChatChunk =
        serde_json::from_str(line).map_err(|e| LlmError::Malformed(e.to_string()))?;

    if let Some(error) = chunk.error {
        return Err(LlmError::Status {
            status: 500,
            body: error,
        });
    }

    Ok(Some(Frame {
        content: chunk.message.map(|m| m.content).unwrap_or_default(),
        done: chunk.done,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use httpmock::prelude::*;

    fn frame(content: &str, done: bool) -> Option<Frame> {
        Some(Frame {
            content: content.to_string(),
            done,
        })
    }

    #[test]
    fn test_decode_line() {
        let line = r#"{"model":"llama3.2","message":{"role":"assistant","content":"Hola"},"done":false}"#;
        assert_eq!(decode_line(line).unwrap(), frame("Hola", false));

        let done = r#"{"model":"llama3.2","message":{"role":"assistant","content":""},"done":true}"#;
        assert_eq!(decode_line(done).unwrap(), frame("", true));
        assert_eq!(decode_line(r#"{"done":true}"#).unwrap(), frame("", true));
        assert_eq!(decode_line("   ").unwrap(), None);
    }

    #[test]
    fn test_decode_line_errors() {
        assert!(matches!(
            decode_line(r#"{"error":"model not found"}"#),
            Err(LlmError::Status { ref body, .. }) if body == "model not found"
        ));
        assert!(matches!(decode_line("{oops"), Err(LlmError::Malformed(_))));
    }

    #[tokio::test]
    async fn test_decode_stream_mid_stream_error() {
        let chunks: Vec<Result<&'static [u8], LlmError>> = vec![
            Ok(b"{\"message\":{\"content\":\"uno\"}}\n"),
            Ok(b"{\"error\":\"boom\"}\n"),
        ];
        let items: Vec<Result<String, LlmError>> =
            decode_stream(stream::iter(chunks)).collect().await;
        assert!(matches!(items[0], Ok(ref t) if t == "uno"));
        assert!(matches!(items[1], Err(LlmError::Status { .. })));
    }

    #[tokio::test]
    async fn test_decode_stream_stops_at_done() {
        let chunks: Vec<Result<&'static [u8], LlmError>> = vec![
            Ok(b"{\"message\":{\"content\":\"uno\"},\"done\":false}\n"),
            Ok(b"{\"message\":{\"content\":\" dos\"},\"done\":true}\n"),
            Ok(b"{\"message\":{\"content\":\"tres\"},\"done\":false}\n"),
            Ok(b"{not json\n"),
        ];
        let fragments: Vec<String> = decode_stream(stream::iter(chunks))
            .map(|f| f.unwrap())
            .collect()
            .await;
        assert_eq!(fragments, vec!["uno", " dos"]);
    }

    #[tokio::test]
    async fn test_stream_against_server() {
        let server = MockServer::start_async().await;
        let body = concat!(
            "{\"message\":{\"role\":\"assistant\",\"content\":\"1. Clasificación:\"},\"done\":false}\n",
            "{\"message\":{\"role\":\"assistant\",\"content\":\" simple\"},\"done\":false}\n",
            "{\"message\":{\"role\":\"assistant\",\"content\":\"\"},\"done\":true}\n"
        );
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/api/chat").json_body(serde_json::json!({
                    "model": "llama3.2:latest",
                    "messages": [
                        {"role": "system", "content": "sistema"},
                        {"role": "user", "content": "El perro corre."}
                    ],
                    "stream": true,
                    "options": {"temperature": 0.25}
                }));
                then.status(200)
                    .header("content-type", "application/x-ndjson")
                    .body(body);
            })
            .await;

        let client = OllamaClient::new(ClientSettings {
            model: "llama3.2:latest".to_string(),
            base_url: server.base_url(),
            api_key: None,
            temperature: Some(0.25),
            timeout_seconds: 5,
        })
        .unwrap();

        let fragments: Vec<String> = client
            .stream("sistema", "El perro corre.")
            .await
            .unwrap()
            .map(|f| f.unwrap())
            .collect()
            .await;

        mock.assert_async().await;
        assert_eq!(fragments, vec!["1. Clasificación:", " simple"]);
    }

    #[tokio::test]
    async fn test_stream_status_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/chat");
                then.status(404).body(r#"{"error":"model 'x' not found"}"#);
            })
            .await;

        let client = OllamaClient::new(ClientSettings {
            model: "x".to_string(),
            base_url: server.base_url(),
            api_key: None,
            temperature: None,
            timeout_seconds: 5,
        })
        .unwrap();
        assert!(matches!(
            client.stream("sistema", "Hola.").await,
            Err(LlmError::Status { status: 404, .. })
        ));
    }
}
