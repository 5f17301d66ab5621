//! LLM-backed document handlers.
//!
//! Supports Ollama (local), OpenAI-compatible APIs and Google Gemini.

mod client;
mod config;
mod handler;
mod prompts;

pub use client::{LlmClient, LlmError};
pub use config::{LlmAppConfig, LlmConfig, LlmDeviceConfig, LlmProvider};
pub use handler::LlmHandler;
pub use prompts::{default_prompt, render_prompt};
