//! Helpers for locating the external command-line tools we shell out to.

/// Hint shown when tesseract is missing.
pub const TESSERACT_NOT_FOUND: &str =
    "Tesseract not installed. Install with: apt install tesseract-ocr";

/// Hint shown when one of the poppler tools is missing.
pub const POPPLER_NOT_FOUND: &str =
    "poppler-utils not installed (pdfinfo, pdftotext, pdftoppm). Install with: apt install poppler-utils";

/// Tools the extraction pipeline relies on.
pub const REQUIRED_TOOLS: [&str; 4] = ["pdfinfo", "pdftotext", "pdftoppm", "tesseract"];

/// Check if a binary is available in PATH.
pub fn check_binary(name: &str) -> bool {
    which::which(name).is_ok()
}

/// Check every tool in [`REQUIRED_TOOLS`].
pub fn check_tools() -> Vec<(&'static str, bool)> {
    REQUIRED_TOOLS
        .iter()
        .map(|tool| (*tool, check_binary(tool)))
        .collect()
}
