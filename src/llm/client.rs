//! HTTP client for the configured LLM provider.
//!
//! Ollama uses `/api/generate`, OpenAI-compatible providers use
//! `/v1/chat/completions` and Gemini uses `generateContent`. Rate limited
//! requests (HTTP 429) are retried with backoff, honouring Retry-After.

use std::time::Duration;

use reqwest::header::RETRY_AFTER;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use super::config::{LlmConfig, LlmProvider};
use super::prompts::render_prompt;
use crate::processor::Operation;

/// Maximum retry attempts on rate limit (429) errors.
const MAX_RETRIES: u32 = 5;

/// Errors that can occur during LLM operations.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Failed to create HTTP client: {0}")]
    Client(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("{0}")]
    MissingApiKey(String),

    #[error("Rate limited (retry after {retry_after_secs:?}s)")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("LLM returned an empty response")]
    EmptyResponse,
}

/// LLM client for document operations.
pub struct LlmClient {
    config: LlmConfig,
    client: Client,
}

/// Ollama API request format.
#[derive(Debug, Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
}

/// Ollama API response format.
#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent<'a> {
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Debug, Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GeminiGenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
    error: Option<GeminiError>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiResponseContent,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
}

impl LlmClient {
    /// Create a new LLM client with the given configuration.
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.app.request_timeout_secs))
            .build()
            .map_err(|e| LlmError::Client(e.to_string()))?;

        Ok(Self { config, client })
    }

    /// Get the config.
    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    /// Check if the LLM service is reachable with the current credentials.
    pub async fn is_available(&self) -> bool {
        let request = match self.config.provider() {
            LlmProvider::Ollama => self
                .client
                .get(format!("{}/api/tags", self.config.endpoint())),
            LlmProvider::OpenAI => match self.config.api_key() {
                Some(key) => self
                    .client
                    .get(format!("{}/v1/models", self.config.endpoint()))
                    .bearer_auth(key),
                None => return false,
            },
            LlmProvider::Gemini => match self.config.api_key() {
                Some(key) => self
                    .client
                    .get(format!("{}/v1beta/models", self.config.endpoint()))
                    .query(&[("key", key)]),
                None => return false,
            },
        };

        match request.send().await {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    /// Run one operation: fill its prompt with the (truncated) document and ask the model.
    pub async fn complete(
        &self,
        operation: Operation,
        text: &str,
        question: Option<&str>,
    ) -> Result<String, LlmError> {
        let content = self.truncate_content(text);
        if content.len() < text.len() {
            debug!(
                "Truncated document from {} to {} bytes for {}",
                text.len(),
                content.len(),
                operation
            );
        }

        let prompt = render_prompt(self.config.prompt_for(operation), content, question);
        debug!("Requesting {} from {}", operation, self.config.provider_name());

        let response = self.generate(&prompt).await?;
        let response = response.trim();
        if response.is_empty() {
            return Err(LlmError::EmptyResponse);
        }
        Ok(response.to_string())
    }

    /// Send a raw prompt to the configured provider.
    pub async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        match self.config.provider() {
            LlmProvider::Ollama => self.call_ollama(prompt).await,
            LlmProvider::OpenAI => self.call_openai(prompt).await,
            LlmProvider::Gemini => self.call_gemini(prompt).await,
        }
    }

    /// Truncate content to configured maximum (UTF-8 safe).
    fn truncate_content<'a>(&self, text: &'a str) -> &'a str {
        let max = self.config.app.max_content_chars;
        if text.len() <= max {
            return text;
        }
        let mut end = max;
        while end > 0 && !text.is_char_boundary(end) {
            end -= 1;
        }
        &text[..end]
    }

    /// Call Ollama API with a prompt.
    async fn call_ollama(&self, prompt: &str) -> Result<String, LlmError> {
        let request = OllamaRequest {
            model: self.config.model(),
            prompt,
            stream: false,
            options: OllamaOptions {
                temperature: self.config.app.temperature,
                num_predict: self.config.app.max_tokens,
            },
        };

        let url = format!("{}/api/generate", self.config.endpoint());
        let resp = self
            .send_with_retry(|| self.client.post(&url).json(&request))
            .await?;
        let resp = check_status(resp).await?;

        let ollama_resp: OllamaResponse = resp
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        Ok(ollama_resp.response)
    }

    /// Call an OpenAI-compatible chat completions API.
    async fn call_openai(&self, prompt: &str) -> Result<String, LlmError> {
        let api_key = self.require_api_key()?;
        let request = ChatRequest {
            model: self.config.model(),
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.config.app.temperature,
            max_tokens: self.config.app.max_tokens,
        };

        let url = format!("{}/v1/chat/completions", self.config.endpoint());
        let resp = self
            .send_with_retry(|| self.client.post(&url).bearer_auth(api_key).json(&request))
            .await?;
        let resp = check_status(resp).await?;

        let chat: ChatResponse = resp
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        chat.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(LlmError::EmptyResponse)
    }

    /// Call the Gemini generateContent API.
    async fn call_gemini(&self, prompt: &str) -> Result<String, LlmError> {
        let api_key = self.require_api_key()?;
        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart { text: prompt }],
            }],
            generation_config: GeminiGenerationConfig {
                temperature: self.config.app.temperature,
                max_output_tokens: self.config.app.max_tokens,
            },
        };

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.endpoint(),
            self.config.model()
        );
        let resp = self
            .send_with_retry(|| {
                self.client
                    .post(&url)
                    .query(&[("key", api_key)])
                    .json(&request)
            })
            .await?;
        let resp = check_status(resp).await?;

        let gemini: GeminiResponse = resp
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        gemini_text(gemini)
    }

    fn require_api_key(&self) -> Result<&str, LlmError> {
        self.config
            .api_key()
            .ok_or_else(|| LlmError::MissingApiKey(self.config.availability_hint()))
    }

    /// Retry a request on 429 (rate limited) responses with exponential backoff.
    ///
    /// Returns the first non-429 response.
    async fn send_with_retry<F>(&self, make_request: F) -> Result<Response, LlmError>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut attempt = 0;
        loop {
            let response = make_request()
                .send()
                .await
                .map_err(|e| LlmError::Connection(e.to_string()))?;

            if response.status() != StatusCode::TOO_MANY_REQUESTS {
                return Ok(response);
            }

            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);

            if attempt >= MAX_RETRIES {
                return Err(LlmError::RateLimited {
                    retry_after_secs: retry_after.and_then(|s| s.parse().ok()),
                });
            }

            let wait = parse_retry_after(retry_after.as_deref())
                .unwrap_or_else(|| backoff_delay(attempt, 1000));

            warn!(
                "{} rate limited (attempt {}), waiting {:?}",
                self.config.provider_name(),
                attempt + 1,
                wait
            );
            tokio::time::sleep(wait).await;
            attempt += 1;
        }
    }
}

async fn check_status(resp: Response) -> Result<Response, LlmError> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    Err(LlmError::Api(format!("HTTP {}: {}", status, body)))
}

fn gemini_text(response: GeminiResponse) -> Result<String, LlmError> {
    if let Some(error) = response.error {
        return Err(LlmError::Api(error.message));
    }

    let text: String = response
        .candidates
        .unwrap_or_default()
        .into_iter()
        .next()
        .map(|candidate| {
            candidate
                .content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();

    if text.is_empty() {
        return Err(LlmError::EmptyResponse);
    }
    Ok(text)
}

/// Parse a Retry-After header given in seconds (capped at 60s).
fn parse_retry_after(header_value: Option<&str>) -> Option<Duration> {
    let value = header_value?;
    value
        .trim()
        .parse::<u64>()
        .ok()
        .map(|secs| Duration::from_secs(secs.min(60)))
}

/// Exponential backoff delay for a given attempt (capped at 60s).
fn backoff_delay(attempt: u32, base_ms: u64) -> Duration {
    let delay_ms = base_ms.saturating_mul(2u64.saturating_pow(attempt));
    Duration::from_millis(delay_ms.min(60_000))
}
