//! lexdoc - legal document text extraction and LLM-backed document operations.
//!
//! [`extract::TextExtractor`] turns a PDF into plain text, OCR'ing pages that
//! carry no text layer. [`processor::DocumentProcessor`] runs one of the
//! document operations (summary, appeal, review, ...) on that text.

pub mod config;
pub mod extract;
pub mod llm;
pub mod ocr;
pub mod pdf;
pub mod processor;
