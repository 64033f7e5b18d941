//! Multimodal inference endpoint.

use crate::config::ModelConfig;
use crate::constants::model::{CHAT_COMPLETIONS_PATH, TEMPERATURE};
use crate::constants::preprocess::MIME_TYPE;
use crate::error::{Error, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::runtime::Runtime;
use tracing::debug;

/// One element of the ordered request content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentBlock {
    /// Instruction or label text.
    Text(String),
    /// JPEG-encoded frame.
    Image(Vec<u8>),
}

/// A single annotation request.
#[derive(Debug, Clone, Default)]
pub struct VisionRequest {
    /// Content in presentation order.
    pub content: Vec<ContentBlock>,
}

/// Tokens billed for one call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Prompt tokens, images included.
    pub input_tokens: u64,
    /// Completion tokens.
    pub output_tokens: u64,
}

/// Model reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisionResponse {
    /// Free-form response text.
    pub text: String,
    /// Reported token usage.
    pub usage: TokenUsage,
}

/// A blocking multimodal model.
pub trait VisionModel {
    /// Send one request and wait for the reply. No retries.
    fn complete(&self, request: &VisionRequest) -> Result<VisionResponse>;
}

/// Client for OpenAI-compatible chat completion endpoints.
pub struct OpenAiClient {
    runtime: Runtime,
    client: Client,
    url: String,
    model: String,
    max_tokens: u32,
    api_key: String,
}

impl OpenAiClient {
    /// Create a client from configuration and an API key.
    pub fn new(config: &ModelConfig, api_key: impl Into<String>) -> Result<Self> {
        let runtime = Runtime::new().map_err(|e| Error::Internal {
            message: format!("Failed to create async runtime: {e}"),
        })?;

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| Error::Internal {
                message: format!("Failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            runtime,
            client,
            url: format!(
                "{}{CHAT_COMPLETIONS_PATH}",
                config.base_url.trim_end_matches('/')
            ),
            model: config.name.clone(),
            max_tokens: config.max_tokens,
            api_key: api_key.into(),
        })
    }

    async fn send(&self, body: &ChatRequest<'_>) -> Result<VisionResponse> {
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| Error::ModelRequest {
                reason: e.to_string(),
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| Error::ModelRequest {
            reason: e.to_string(),
        })?;

        if !status.is_success() {
            return Err(status_error(status, text));
        }

        parse_chat_response(&text)
    }
}

impl VisionModel for OpenAiClient {
    fn complete(&self, request: &VisionRequest) -> Result<VisionResponse> {
        let body = ChatRequest::new(&self.model, self.max_tokens, &request.content);
        debug!(
            "Sending {} content block(s) to {}",
            request.content.len(),
            self.url
        );
        self.runtime.block_on(self.send(&body))
    }
}

/// Map a non-success HTTP status to an error.
fn status_error(status: StatusCode, body: String) -> Error {
    if status == StatusCode::UNAUTHORIZED
        || status == StatusCode::FORBIDDEN
        || body.contains("API key")
    {
        Error::Authentication {
            status: status.as_u16(),
            message: body,
        }
    } else {
        Error::ModelRequest {
            reason: format!("HTTP {status}: {body}"),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage; 1],
    temperature: f32,
    max_tokens: u32,
}

impl<'a> ChatRequest<'a> {
    fn new(model: &'a str, max_tokens: u32, content: &[ContentBlock]) -> Self {
        Self {
            model,
            messages: [ChatMessage {
                role: "user",
                content: content.iter().map(ChatContent::from).collect(),
            }],
            temperature: TEMPERATURE,
            max_tokens,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: Vec<ChatContent>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ChatContent {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

impl From<&ContentBlock> for ChatContent {
    fn from(block: &ContentBlock) -> Self {
        match block {
            ContentBlock::Text(text) => Self::Text { text: text.clone() },
            ContentBlock::Image(bytes) => Self::ImageUrl {
                image_url: ImageUrl {
                    url: format!("data:{MIME_TYPE};base64,{}", STANDARD.encode(bytes)),
                },
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

/// Pull the reply text and usage out of a chat completion body.
fn parse_chat_response(body: &str) -> Result<VisionResponse> {
    let parsed: ChatResponse = serde_json::from_str(body).map_err(|e| Error::ModelResponse {
        reason: format!("invalid response body: {e}"),
    })?;

    let text = parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| Error::ModelResponse {
            reason: "response has no message content".to_string(),
        })?;

    let usage = parsed.usage.map_or_else(TokenUsage::default, |u| TokenUsage {
        input_tokens: u.prompt_tokens,
        output_tokens: u.completion_tokens,
    });

    Ok(VisionResponse { text, usage })
}
