use std::fmt;
use std::time::{Duration, Instant};

use docdiff_diff::{ChangeBlock, ChangeClassifier, DEFAULT_MODEL_ID, OracleError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, trace, warn};

use crate::codec::parse_change_blocks;
use crate::prompt::build_prompt;

pub const DEFAULT_ENDPOINT: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const DEFAULT_TEMPERATURE: f64 = 0.1;
pub const DEFAULT_MAX_RESPONSE_TOKENS: u32 = 8000;
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

const ERROR_BODY_PREVIEW: usize = 300;

/// Connection and sampling settings for a chat-completions endpoint.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    pub endpoint: String,
    pub api_key: String,
    pub model_id: String,
    pub temperature: f64,
    pub max_response_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: String::new(),
            model_id: DEFAULT_MODEL_ID.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_response_tokens: DEFAULT_MAX_RESPONSE_TOKENS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl fmt::Debug for OracleConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OracleConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .field("model_id", &self.model_id)
            .field("temperature", &self.temperature)
            .field("max_response_tokens", &self.max_response_tokens)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f64,
    max_tokens: u32,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

/// Change classifier backed by an OpenAI-compatible chat-completions API.
///
/// Every call is a single blocking request. Rate limiting and other failures
/// are reported, never retried.
#[derive(Debug)]
pub struct ChatCompletionsOracle {
    config: OracleConfig,
    client: reqwest::blocking::Client,
}

impl ChatCompletionsOracle {
    pub fn new(config: OracleConfig) -> Result<Self, OracleError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("docdiff/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|err| OracleError::Transport(format!("build http client: {err}")))?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &OracleConfig {
        &self.config
    }

    fn request_body<'a>(&'a self, prompt: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.config.model_id,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.config.temperature,
            max_tokens: self.config.max_response_tokens,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        }
    }
}

impl ChangeClassifier for ChatCompletionsOracle {
    fn classify(&self, text_a: &str, text_b: &str) -> Result<Vec<ChangeBlock>, OracleError> {
        let prompt = build_prompt(text_a, text_b);
        trace!(model = %self.config.model_id, %prompt, "classification prompt");
        let started = Instant::now();

        let mut request = self
            .client
            .post(&self.config.endpoint)
            .json(&self.request_body(&prompt));
        if !self.config.api_key.is_empty() {
            request = request.bearer_auth(&self.config.api_key);
        }

        let response = request
            .send()
            .map_err(|err| OracleError::Transport(err.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|err| OracleError::Transport(format!("read response body: {err}")))?;
        debug!(
            status,
            elapsed_ms = started.elapsed().as_millis() as u64,
            model = %self.config.model_id,
            "classification request finished"
        );
        trace!(status, raw_response = %body, "classification response");

        if !(200..300).contains(&status) {
            let err = error_for_status(status, &body);
            warn!(status, error = %err, "classification request failed");
            return Err(err);
        }

        parse_change_blocks(&message_content(&body)?)
    }
}

/// Map a non-success HTTP status and its body to an oracle error.
pub fn error_for_status(status: u16, body: &str) -> OracleError {
    let message = error_message(body);
    match status {
        429 => OracleError::RateLimited(message),
        400 | 413 | 422 => OracleError::BadRequest(message),
        _ => OracleError::Service { status, message },
    }
}

fn error_message(body: &str) -> String {
    let from_json = serde_json::from_str::<Value>(body).ok().and_then(|value| {
        value
            .pointer("/error/message")
            .or_else(|| value.get("message"))
            .and_then(Value::as_str)
            .map(str::to_string)
    });
    from_json.unwrap_or_else(|| {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            "no response body".to_string()
        } else {
            trimmed.chars().take(ERROR_BODY_PREVIEW).collect()
        }
    })
}

/// Pull `choices[0].message.content` out of a chat-completions response.
fn message_content(body: &str) -> Result<String, OracleError> {
    let value: Value =
        serde_json::from_str(body).map_err(|err| OracleError::InvalidJson(err.to_string()))?;
    value
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            OracleError::SchemaViolation("response has no choices[0].message.content".to_string())
        })
}
