//! Client for the Gemini `generateContent` API
//!
//! Every call sends one text prompt and returns the text of the first
//! candidate. The HTTP client carries an explicit timeout so a stalled upstream
//! surfaces as `UpstreamError::Timeout` instead of hanging the request.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::utils::error::{AdvisorError, Result};

/// Default public Gemini endpoint
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default Gemini model
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash-latest";

/// Failures while talking to the language model
#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("Gemini API request timed out after {0:?}")]
    Timeout(Duration),

    #[error("API request failed: {0}")]
    Transport(String),

    #[error("Gemini API returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Unexpected Gemini API response: {0}")]
    MalformedResponse(String),

    #[error("No response from Gemini API")]
    NoCandidates,
}

impl UpstreamError {
    /// Whether another attempt could succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            UpstreamError::Timeout(_) | UpstreamError::Transport(_) => true,
            UpstreamError::Status { status, .. } => *status >= 500,
            UpstreamError::MalformedResponse(_) | UpstreamError::NoCandidates => false,
        }
    }
}

/// Sampling settings sent with chat requests
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
    pub max_output_tokens: u32,
}

impl GenerationConfig {
    /// Settings used for conversational replies
    pub fn chat() -> Self {
        Self {
            temperature: 0.7,
            top_k: 40,
            top_p: 0.95,
            max_output_tokens: 1024,
        }
    }
}

/// A text-in, text-out language model
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        generation: Option<&GenerationConfig>,
    ) -> std::result::Result<String, UpstreamError>;
}

/// Gemini client configuration
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub api_base: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Extra attempts after a retryable failure
    pub max_retries: u32,
    /// Base delay, multiplied by the attempt number
    pub retry_backoff: Duration,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: Duration::from_secs(30),
            max_retries: 0,
            retry_backoff: Duration::from_millis(500),
        }
    }
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(AdvisorError::Config(
                "GEMINI_API_KEY is not set; pass --gemini-api-key or set the environment variable"
                    .to_string(),
            ));
        }
        if self.model.trim().is_empty() {
            return Err(AdvisorError::Config("Gemini model name is empty".to_string()));
        }
        if self.timeout.is_zero() {
            return Err(AdvisorError::Config(
                "Upstream timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// `{api_base}/models/{model}:generateContent`
    pub fn endpoint(&self) -> String {
        let model = self.model.trim();
        let model_path = if model.starts_with("models/") {
            model.to_string()
        } else {
            format!("models/{model}")
        };
        format!(
            "{}/{}:generateContent",
            self.api_base.trim().trim_end_matches('/'),
            model_path
        )
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

fn request_body(prompt: &str, generation: Option<&GenerationConfig>) -> Value {
    let mut body = json!({
        "contents": [{ "parts": [{ "text": prompt }] }]
    });
    if let Some(generation) = generation {
        body["generationConfig"] = json!(generation);
    }
    body
}

/// Pull `candidates[0].content.parts[0].text` out of a response body
fn extract_text(body: &str) -> std::result::Result<String, UpstreamError> {
    let response: GenerateContentResponse = serde_json::from_str(body)
        .map_err(|e| UpstreamError::MalformedResponse(e.to_string()))?;

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or(UpstreamError::NoCandidates)?;

    candidate
        .content
        .and_then(|content| content.parts.into_iter().next())
        .and_then(|part| part.text)
        .ok_or_else(|| {
            UpstreamError::MalformedResponse("first candidate has no text part".to_string())
        })
}

/// HTTP client for Gemini
pub struct GeminiClient {
    config: GeminiConfig,
    http: Client,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self> {
        config.validate()?;
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AdvisorError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { config, http })
    }

    async fn send_once(&self, body: &Value) -> std::result::Result<String, UpstreamError> {
        let response = self
            .http
            .post(self.config.endpoint())
            .query(&[("key", self.config.api_key.as_str())])
            .json(body)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| self.classify(e))?;

        if !status.is_success() {
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        extract_text(&text)
    }

    fn classify(&self, err: reqwest::Error) -> UpstreamError {
        if err.is_timeout() {
            UpstreamError::Timeout(self.config.timeout)
        } else {
            // The URL carries the API key
            UpstreamError::Transport(err.without_url().to_string())
        }
    }
}

#[async_trait]
impl LanguageModel for GeminiClient {
    async fn generate(
        &self,
        prompt: &str,
        generation: Option<&GenerationConfig>,
    ) -> std::result::Result<String, UpstreamError> {
        let body = request_body(prompt, generation);
        let mut attempt: u32 = 0;

        loop {
            debug!(
                model = %self.config.model,
                attempt = attempt + 1,
                "Sending generateContent request"
            );
            match self.send_once(&body).await {
                Ok(text) => return Ok(text),
                Err(err) if err.is_retryable() && attempt < self.config.max_retries => {
                    attempt += 1;
                    let delay = self.config.retry_backoff * attempt;
                    warn!(
                        "Gemini request failed ({}), retrying in {:?} ({}/{})",
                        err, delay, attempt, self.config.max_retries
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
