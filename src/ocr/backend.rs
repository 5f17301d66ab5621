//! OCR backend abstraction.
//!
//! The extractor only needs one capability from an OCR engine: turn a page
//! image into text. Engines report "not installed" separately from "failed on
//! this image" so callers can degrade differently for each.

use std::path::Path;
use thiserror::Error;

/// Default OCR language (Tesseract traineddata name).
pub const DEFAULT_OCR_LANGUAGE: &str = "srp";

/// Errors from OCR backends.
#[derive(Debug, Error)]
pub enum OcrError {
    /// The engine (or a model it needs) is not installed on this machine.
    #[error("Backend not available: {0}")]
    BackendNotAvailable(String),

    /// The engine ran but could not process this particular image.
    #[error("OCR failed: {0}")]
    OcrFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl OcrError {
    /// Whether this error means the engine is missing rather than the input being bad.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, OcrError::BackendNotAvailable(_))
    }
}

/// Result of OCR processing.
#[derive(Debug, Clone)]
pub struct OcrResult {
    /// Extracted text content.
    pub text: String,
    /// Which backend produced this result.
    pub backend: &'static str,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Trait for OCR backends.
pub trait OcrBackend: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Check if this backend is available (binaries installed, models present).
    fn is_available(&self) -> bool;

    /// Get a description of what's needed to make this backend available.
    fn availability_hint(&self) -> String;

    /// Run OCR on an image file.
    fn ocr_image(&self, image_path: &Path) -> Result<OcrResult, OcrError>;
}

/// Configuration for OCR backends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrConfig {
    /// Language for OCR (e.g., "srp", "eng", "srp+eng").
    pub language: String,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            language: DEFAULT_OCR_LANGUAGE.to_string(),
        }
    }
}

impl OcrConfig {
    pub fn with_language(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
        }
    }
}
