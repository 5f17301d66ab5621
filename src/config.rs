//! Configuration file support.
//!
//! Files are discovered with `prefer` (`lexdoc.toml`, `lexdoc.yaml`, `lexdoc.json`
//! in the usual config locations) and parsed with serde. LLM connection settings
//! come from the environment, see [`crate::llm::LlmDeviceConfig`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::extract::OCR_UNAVAILABLE_PLACEHOLDER;
use crate::llm::LlmConfig;
use crate::ocr::DEFAULT_OCR_LANGUAGE;
use crate::pdf::DEFAULT_RENDER_DPI;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {format} config {}: {message}", path.display())]
    Parse {
        path: PathBuf,
        format: &'static str,
        message: String,
    },
}

/// OCR settings for pages without embedded text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OcrSettings {
    /// Run OCR at all. When false, blank pages get the placeholder.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Tesseract language code(s), e.g. "srp" or "srp+eng".
    #[serde(default = "default_language")]
    pub language: String,
    /// Render resolution for OCR rasters.
    #[serde(default = "default_dpi")]
    pub dpi: u32,
    /// Text used for pages that need OCR when no OCR engine is available.
    #[serde(default = "default_placeholder")]
    pub placeholder: String,
}

fn default_true() -> bool {
    true
}

fn default_language() -> String {
    DEFAULT_OCR_LANGUAGE.to_string()
}

fn default_dpi() -> u32 {
    DEFAULT_RENDER_DPI
}

fn default_placeholder() -> String {
    OCR_UNAVAILABLE_PLACEHOLDER.to_string()
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            language: default_language(),
            dpi: default_dpi(),
            placeholder: default_placeholder(),
        }
    }
}

impl OcrSettings {
    /// Apply LEXDOC_OCR_LANGUAGE from the environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(language) = lookup("LEXDOC_OCR_LANGUAGE").filter(|l| !l.trim().is_empty()) {
            self.language = language.trim().to_string();
        }
        self
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ocr: OcrSettings,
    /// LLM configuration (app portion only, device settings come from env).
    #[serde(default)]
    pub llm: LlmConfig,
    /// Path to the config file this was loaded from (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration using prefer for discovery.
    /// Falls back to defaults (with env overrides) when no usable file is found.
    pub async fn load() -> Self {
        match prefer::load("lexdoc").await {
            Ok(pref_config) => {
                if let Some(path) = pref_config.source_path() {
                    match Self::load_from_path(path).await {
                        Ok(config) => config,
                        Err(e) => {
                            warn!("Ignoring config file: {}", e);
                            Self::default_with_env()
                        }
                    }
                } else {
                    Self::default_with_env()
                }
            }
            Err(e) => {
                debug!("No config file found: {}", e);
                Self::default_with_env()
            }
        }
    }

    /// Load an explicitly requested config file; `~` is expanded.
    pub async fn load_explicit(path_str: &str) -> Result<Self, ConfigError> {
        let expanded = shellexpand::tilde(path_str);
        Self::load_from_path(Path::new(expanded.as_ref())).await
    }

    /// Create a default config with environment variable overrides applied.
    pub fn default_with_env() -> Self {
        let mut config = Self::default();
        config.ocr = config.ocr.with_env_overrides();
        config
    }

    /// Load configuration from a specific file path.
    /// Supports JSON, TOML and YAML based on file extension.
    pub async fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let mut config = Self::parse(path, &contents)?;
        config.source_path = Some(path.to_path_buf());
        config.ocr = config.ocr.with_env_overrides();

        for key in config.llm.app.unknown_prompt_keys() {
            warn!("Config prompt override '{}' does not match any operation", key);
        }

        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    fn parse(path: &Path, contents: &str) -> Result<Self, ConfigError> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
        let parse_error = |format: &'static str, message: String| ConfigError::Parse {
            path: path.to_path_buf(),
            format,
            message,
        };

        match ext {
            "toml" => toml::from_str(contents).map_err(|e| parse_error("TOML", e.to_string())),
            "yaml" | "yml" => {
                serde_yaml::from_str(contents).map_err(|e| parse_error("YAML", e.to_string()))
            }
            _ => serde_json::from_str(contents).map_err(|e| parse_error("JSON", e.to_string())),
        }
    }
}
