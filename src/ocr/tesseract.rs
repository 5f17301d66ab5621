//! Tesseract OCR backend implementation.
//!
//! Uses Tesseract OCR via command-line for text extraction.

use std::path::Path;
use std::process::Command;
use std::time::Instant;

use super::backend::{OcrBackend, OcrConfig, OcrError, OcrResult};
use super::tools::{check_binary, TESSERACT_NOT_FOUND};

/// Tesseract OCR backend.
pub struct TesseractBackend {
    config: OcrConfig,
}

impl TesseractBackend {
    /// Create a new Tesseract backend with default configuration.
    pub fn new() -> Self {
        Self {
            config: OcrConfig::default(),
        }
    }

    /// Create a new Tesseract backend with custom configuration.
    pub fn with_config(config: OcrConfig) -> Self {
        Self { config }
    }

    pub fn language(&self) -> &str {
        &self.config.language
    }

    /// Run Tesseract on an image file.
    fn run_tesseract(&self, image_path: &Path) -> Result<String, OcrError> {
        let output = Command::new("tesseract")
            .arg(image_path)
            .arg("stdout")
            .args(["-l", &self.config.language])
            .output();

        match output {
            Ok(output) => {
                if output.status.success() {
                    let text = String::from_utf8_lossy(&output.stdout);
                    Ok(strip_page_break(&text).to_string())
                } else {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    Err(classify_failure(&self.config.language, &stderr))
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(
                OcrError::BackendNotAvailable(TESSERACT_NOT_FOUND.to_string()),
            ),
            Err(e) => Err(OcrError::Io(e)),
        }
    }
}

impl Default for TesseractBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl OcrBackend for TesseractBackend {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    fn is_available(&self) -> bool {
        check_binary("tesseract")
    }

    fn availability_hint(&self) -> String {
        if !check_binary("tesseract") {
            TESSERACT_NOT_FOUND.to_string()
        } else {
            format!("Tesseract is available (language: {})", self.config.language)
        }
    }

    fn ocr_image(&self, image_path: &Path) -> Result<OcrResult, OcrError> {
        let start = Instant::now();
        let text = self.run_tesseract(image_path)?;
        let elapsed = start.elapsed();

        Ok(OcrResult {
            text,
            backend: self.name(),
            processing_time_ms: elapsed.as_millis() as u64,
        })
    }
}

/// A missing traineddata file means the engine cannot serve this language at
/// all, which is an availability problem rather than a per-image failure.
fn classify_failure(language: &str, stderr: &str) -> OcrError {
    if stderr.contains("Failed loading language") || stderr.contains("Error opening data file") {
        OcrError::BackendNotAvailable(format!(
            "tesseract language data '{}' not installed (apt install tesseract-ocr-{})",
            language, language
        ))
    } else {
        OcrError::OcrFailed(format!("tesseract failed: {}", stderr.trim()))
    }
}

/// Tesseract ends every page with a form feed.
fn strip_page_break(text: &str) -> &str {
    text.trim_end_matches(['\x0c', '\n'])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_language() {
        assert_eq!(TesseractBackend::new().language(), "srp");
        let backend = TesseractBackend::with_config(OcrConfig::with_language("eng"));
        assert_eq!(backend.language(), "eng");
    }

    #[test]
    fn test_missing_language_is_unavailable() {
        let err = classify_failure(
            "srp",
            "Error opening data file /usr/share/tessdata/srp.traineddata\nFailed loading language 'srp'",
        );
        assert!(err.is_unavailable());
        assert!(err.to_string().contains("tesseract-ocr-srp"));
    }

    #[test]
    fn test_other_failures_are_page_errors() {
        let err = classify_failure("srp", "Error in pixReadStream: Unknown format: no pix returned");
        assert!(!err.is_unavailable());
        assert!(err.to_string().contains("Unknown format"));
    }

    #[test]
    fn test_strip_page_break() {
        assert_eq!(strip_page_break("Ugovor o zakupu\n\x0c"), "Ugovor o zakupu");
        assert_eq!(strip_page_break("no break"), "no break");
    }

    #[test]
    fn test_missing_image_never_panics() {
        let backend = TesseractBackend::new();
        let result = backend.ocr_image(Path::new("/nonexistent/page.png"));
        // Either tesseract is missing or it rejects the path; both are errors.
        assert!(result.is_err());
    }
}
