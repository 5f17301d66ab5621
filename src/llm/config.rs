//! LLM client configuration.
//!
//! Split into two tiers:
//! - `LlmAppConfig`: from the config file (prompts, generation params)
//! - `LlmDeviceConfig`: from env vars, device-specific (provider, endpoint, model, api_key)
//!
//! Env vars: LEXDOC_LLM_PROVIDER, LEXDOC_LLM_MODEL, LEXDOC_LLM_ENDPOINT, LEXDOC_LLM_API_KEY.
//! Without an explicit provider, the first key found among GEMINI_API_KEY /
//! GOOGLE_API_KEY, GROQ_API_KEY and OPENAI_API_KEY picks one; otherwise a
//! local Ollama is assumed.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::prompts::default_prompt;
use crate::processor::Operation;

/// LLM provider type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// Ollama API (local, default)
    #[default]
    Ollama,
    /// OpenAI-compatible API (OpenAI, Groq, Together.ai, etc.)
    OpenAI,
    /// Google Gemini generateContent API
    Gemini,
}

impl LlmProvider {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "ollama" => Some(Self::Ollama),
            "openai" | "groq" | "together" => Some(Self::OpenAI),
            "gemini" | "google" => Some(Self::Gemini),
            _ => None,
        }
    }
}

/// Application-level LLM config (from the config file).
/// Controls what the LLM does, not how to connect to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmAppConfig {
    /// Maximum tokens in response
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Temperature for generation (0.0 - 1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Maximum characters of document content to send to the LLM
    #[serde(default = "default_max_content_chars")]
    pub max_content_chars: usize,
    /// HTTP timeout for a single generation request
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Prompt overrides keyed by operation identifier (e.g. "summary")
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub prompts: HashMap<String, String>,
}

/// Device-level LLM config (from env vars, varies per device).
/// Controls how to connect to the LLM backend.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmDeviceConfig {
    /// LLM provider
    pub provider: LlmProvider,
    /// API endpoint (provider-specific defaults apply)
    pub endpoint: String,
    /// Model to use
    pub model: String,
    /// API key for hosted providers
    pub api_key: Option<String>,
}

/// Combined LLM configuration (runtime).
///
/// Serde: only the app config is (de)serialized. Device config is populated
/// from environment variables during Default.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(flatten)]
    pub app: LlmAppConfig,
    #[serde(skip)]
    pub device: LlmDeviceConfig,
}

const OLLAMA_ENDPOINT: &str = "http://localhost:11434";
const OLLAMA_MODEL: &str = "llama3.1:8b";
const OPENAI_ENDPOINT: &str = "https://api.openai.com";
const OPENAI_MODEL: &str = "gpt-4o-mini";
const GROQ_ENDPOINT: &str = "https://api.groq.com/openai";
const GROQ_MODEL: &str = "llama-3.3-70b-versatile";
const TOGETHER_ENDPOINT: &str = "https://api.together.xyz";
const TOGETHER_MODEL: &str = "meta-llama/Meta-Llama-3.1-70B-Instruct-Turbo";
const GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com";
const GEMINI_MODEL: &str = "gemini-1.5-flash";

fn default_max_tokens() -> u32 {
    4096
}

fn default_temperature() -> f32 {
    0.3
}

fn default_max_content_chars() -> usize {
    60_000
}

fn default_request_timeout_secs() -> u64 {
    300
}

// === LlmAppConfig implementations ===

impl Default for LlmAppConfig {
    fn default() -> Self {
        Self {
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            max_content_chars: default_max_content_chars(),
            request_timeout_secs: default_request_timeout_secs(),
            prompts: HashMap::new(),
        }
    }
}

impl LlmAppConfig {
    /// Get the prompt for an operation, using the override or the default.
    pub fn prompt_for(&self, operation: Operation) -> &str {
        self.prompts
            .get(operation.as_str())
            .map(String::as_str)
            .unwrap_or_else(|| default_prompt(operation))
    }

    /// Override keys that do not name an operation.
    pub fn unknown_prompt_keys(&self) -> Vec<&str> {
        self.prompts
            .keys()
            .map(String::as_str)
            .filter(|key| key.parse::<Operation>().is_err())
            .collect()
    }
}

// === LlmDeviceConfig implementations ===

impl Default for LlmDeviceConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

impl LlmDeviceConfig {
    /// Create device config from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create device config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let explicit_provider = lookup("LEXDOC_LLM_PROVIDER");
        let explicit_endpoint = lookup("LEXDOC_LLM_ENDPOINT");
        let explicit_model = lookup("LEXDOC_LLM_MODEL");
        let explicit_key = lookup("LEXDOC_LLM_API_KEY");
        let gemini_key = lookup("GEMINI_API_KEY").or_else(|| lookup("GOOGLE_API_KEY"));

        // (provider, flavour) where flavour picks endpoint/model defaults
        let (provider, flavour, detected_key) = match explicit_provider
            .as_deref()
            .map(|p| (LlmProvider::from_str(p), p.to_lowercase()))
        {
            Some((Some(provider), flavour)) => {
                let key = match flavour.as_str() {
                    "groq" => lookup("GROQ_API_KEY"),
                    "openai" => lookup("OPENAI_API_KEY"),
                    "gemini" | "google" => gemini_key.clone(),
                    _ => None,
                };
                (provider, flavour, key)
            }
            _ => {
                if let Some(key) = gemini_key.clone() {
                    (LlmProvider::Gemini, "gemini".to_string(), Some(key))
                } else if let Some(key) = lookup("GROQ_API_KEY") {
                    (LlmProvider::OpenAI, "groq".to_string(), Some(key))
                } else if let Some(key) = lookup("OPENAI_API_KEY") {
                    (LlmProvider::OpenAI, "openai".to_string(), Some(key))
                } else {
                    (LlmProvider::Ollama, "ollama".to_string(), None)
                }
            }
        };

        let (default_endpoint, default_model) = match flavour.as_str() {
            "groq" => (GROQ_ENDPOINT, GROQ_MODEL),
            "together" => (TOGETHER_ENDPOINT, TOGETHER_MODEL),
            "openai" => (OPENAI_ENDPOINT, OPENAI_MODEL),
            "gemini" | "google" => (GEMINI_ENDPOINT, GEMINI_MODEL),
            _ => (OLLAMA_ENDPOINT, OLLAMA_MODEL),
        };

        // Explicit endpoint always wins, then OLLAMA_HOST for Ollama provider
        let endpoint = explicit_endpoint
            .or_else(|| {
                if provider == LlmProvider::Ollama {
                    lookup("OLLAMA_HOST")
                } else {
                    None
                }
            })
            .unwrap_or_else(|| default_endpoint.to_string());

        Self {
            provider,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: explicit_model.unwrap_or_else(|| default_model.to_string()),
            api_key: explicit_key.or(detected_key),
        }
    }

    /// Get the provider name for display.
    pub fn provider_name(&self) -> &'static str {
        match self.provider {
            LlmProvider::Ollama => "Ollama",
            LlmProvider::Gemini => "Gemini",
            LlmProvider::OpenAI => {
                if self.endpoint.contains("groq.com") {
                    "Groq"
                } else if self.endpoint.contains("together.xyz") {
                    "Together.ai"
                } else {
                    "OpenAI"
                }
            }
        }
    }

    /// Get a provider-aware availability hint for error messages.
    pub fn availability_hint(&self) -> String {
        match self.provider {
            LlmProvider::Ollama => format!(
                "Ollama not available at {}. Make sure Ollama is running: ollama serve",
                self.endpoint
            ),
            LlmProvider::OpenAI if self.api_key.is_none() => {
                "API key not set. Set OPENAI_API_KEY, GROQ_API_KEY or LEXDOC_LLM_API_KEY".to_string()
            }
            LlmProvider::Gemini if self.api_key.is_none() => {
                "Gemini API key not set. Set GEMINI_API_KEY or GOOGLE_API_KEY".to_string()
            }
            _ => format!("{} API not available at {}", self.provider_name(), self.endpoint),
        }
    }
}

// === LlmConfig (combined) implementations ===

impl LlmConfig {
    pub fn new(app: LlmAppConfig, device: LlmDeviceConfig) -> Self {
        Self { app, device }
    }

    pub fn provider(&self) -> LlmProvider {
        self.device.provider
    }

    pub fn endpoint(&self) -> &str {
        &self.device.endpoint
    }

    pub fn model(&self) -> &str {
        &self.device.model
    }

    pub fn api_key(&self) -> Option<&str> {
        self.device.api_key.as_deref()
    }

    pub fn prompt_for(&self, operation: Operation) -> &str {
        self.app.prompt_for(operation)
    }

    pub fn provider_name(&self) -> &'static str {
        self.device.provider_name()
    }

    pub fn availability_hint(&self) -> String {
        self.device.availability_hint()
    }
}
