//! OCR for pages that carry no embedded text.
//!
//! Tesseract is the only engine shipped; the [`OcrBackend`] trait is the seam
//! the extractor depends on.

mod backend;
mod tesseract;
pub mod tools;

pub use backend::{OcrBackend, OcrConfig, OcrError, OcrResult, DEFAULT_OCR_LANGUAGE};
pub use tesseract::TesseractBackend;
