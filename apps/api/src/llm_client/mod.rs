/// LLM Client: the single point of entry for all remote model calls in the analyser.
///
/// ARCHITECTURAL RULE: No other module may call the OpenAI API directly.
/// All LLM interactions MUST go through this module.
///
/// Failures are classified here from HTTP status codes and structured error codes
/// so callers can decide policy by matching on `LlmError` variants.
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub mod prompts;

/// OpenAI error code for a model the key cannot access (returned with 404).
const MODEL_NOT_FOUND_CODE: &str = "model_not_found";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Rate limit exceeded: {message}")]
    RateLimited { message: String },

    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Model or permission denied: {message}")]
    Forbidden { message: String },

    #[error("Network failure: {0}")]
    Network(#[source] reqwest::Error),

    #[error("Request redirected to another origin (status {status}, location {location:?})")]
    CrossOrigin { status: u16, location: Option<String> },

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Undecodable response body: {0}")]
    Decode(String),

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// Token usage statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Request for a completion.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// System prompt (persona and framing)
    pub system: String,
    /// User message
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Ask the service to constrain output to a single JSON object.
    pub json_mode: bool,
}

impl CompletionRequest {
    pub fn new(system: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            prompt: prompt.into(),
            temperature: 0.0,
            max_tokens: 1024,
            json_mode: false,
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

    pub fn with_json_mode(mut self) -> Self {
        self.json_mode = true;
        self
    }
}

/// Response from a completion. `text` is never blank.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub text: String,
    pub usage: LlmUsage,
    pub model: String,
}

/// Anything that can answer a `CompletionRequest`. Implemented by `LlmClient`
/// and by test doubles.
#[async_trait]
pub trait CompletionModel: Send + Sync {
    /// Provider name (e.g. "openai")
    fn provider(&self) -> &str;

    fn model(&self) -> &str;

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;
}

// ────────────────────────────────────────────────────────────────────────────
// OpenAI wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
    #[serde(default)]
    model: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct OpenAiError {
    error: OpenAiErrorBody,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorBody {
    message: String,
    #[serde(default)]
    code: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

/// OpenAI chat-completions client. Makes exactly one HTTP request per call;
/// retrying is left to the caller.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    model: String,
    api_base: String,
}

impl LlmClient {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        api_base: impl Into<String>,
    ) -> Result<Self, LlmError> {
        // Redirects are surfaced as CrossOrigin rather than followed.
        let client = Client::builder()
            .redirect(Policy::none())
            .build()
            .map_err(LlmError::Transport)?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            model: model.into(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
        })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.api_base)
    }
}

#[async_trait]
impl CompletionModel for LlmClient {
    fn provider(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.prompt,
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            response_format: request.json_mode.then_some(ResponseFormat {
                format_type: "json_object",
            }),
        };

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();

        if status.is_redirection() {
            let location = response
                .headers()
                .get(reqwest::header::LOCATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            return Err(LlmError::CrossOrigin {
                status: status.as_u16(),
                location,
            });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, &body));
        }

        let raw = response.text().await.map_err(classify_transport_error)?;
        let chat: ChatResponse =
            serde_json::from_str(&raw).map_err(|e| LlmError::Decode(e.to_string()))?;

        let usage = chat
            .usage
            .map(|u| LlmUsage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        debug!(
            "LLM call succeeded: input_tokens={}, output_tokens={}",
            usage.input_tokens, usage.output_tokens
        );

        let text = chat
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|t| !t.trim().is_empty())
            .ok_or(LlmError::EmptyContent)?;

        Ok(CompletionResponse {
            text,
            usage,
            model: chat.model.unwrap_or_else(|| self.model.clone()),
        })
    }
}

/// Maps a non-success, non-redirect status (plus its error body) to an `LlmError`.
fn classify_status(status: StatusCode, body: &str) -> LlmError {
    let parsed = serde_json::from_str::<OpenAiError>(body).ok();
    let code = parsed.as_ref().and_then(|e| e.error.code.clone());
    let message = parsed
        .map(|e| e.error.message)
        .unwrap_or_else(|| body.to_string());

    if code.as_deref() == Some(MODEL_NOT_FOUND_CODE) {
        return LlmError::Forbidden { message };
    }

    match status {
        StatusCode::UNAUTHORIZED => LlmError::Unauthorized { message },
        StatusCode::FORBIDDEN => LlmError::Forbidden { message },
        StatusCode::TOO_MANY_REQUESTS => LlmError::RateLimited { message },
        _ => LlmError::Api {
            status: status.as_u16(),
            message,
        },
    }
}

fn classify_transport_error(e: reqwest::Error) -> LlmError {
    if e.is_connect() || e.is_timeout() || e.is_request() {
        LlmError::Network(e)
    } else if e.is_redirect() {
        LlmError::CrossOrigin {
            status: e.status().map(|s| s.as_u16()).unwrap_or_default(),
            location: e.url().map(|u| u.to_string()),
        }
    } else {
        LlmError::Transport(e)
    }
}
