//! PDF access for the extractor.
//!
//! The extractor talks to PDFs through [`PdfOpener`] and [`PdfDocument`]:
//! open a file, ask for the page count, then per page either read the
//! embedded text or render the page to an image for OCR.
//!
//! [`PopplerPdf`] implements both on top of poppler's `pdfinfo`,
//! `pdftotext` and `pdftoppm` command-line tools.

mod poppler;

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use thiserror::Error;

pub use poppler::{PopplerPdf, DEFAULT_RENDER_DPI};

/// Errors from PDF access.
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("not a readable PDF: {0}")]
    Invalid(String),

    #[error("page {page} out of range (document has {page_count} pages)")]
    PageOutOfRange { page: u32, page_count: u32 },

    #[error("external tool not found: {0}")]
    ToolNotFound(String),

    #[error("{tool} failed: {message}")]
    ToolFailed { tool: &'static str, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Opens PDF files.
pub trait PdfOpener: Send + Sync {
    /// Open and validate a PDF. Fails for missing files and invalid containers.
    fn open(&self, path: &Path) -> Result<Box<dyn PdfDocument>, PdfError>;
}

/// An opened PDF. Page indices are 0-based.
pub trait PdfDocument {
    fn page_count(&self) -> u32;

    /// Text from the page's content stream (may be empty for scanned pages).
    fn page_text(&self, index: u32) -> Result<String, PdfError>;

    /// Render the page to an image file for OCR.
    fn render_page(&self, index: u32) -> Result<RenderedPage, PdfError>;
}

/// A page rendered to an image file.
///
/// The image lives in a private temporary directory that is removed when the
/// value is dropped.
#[derive(Debug)]
pub struct RenderedPage {
    image_path: PathBuf,
    _dir: TempDir,
}

impl RenderedPage {
    /// Take ownership of `dir`; `image_path` must point inside it.
    pub fn new(dir: TempDir, image_path: PathBuf) -> Self {
        Self {
            image_path,
            _dir: dir,
        }
    }

    pub fn path(&self) -> &Path {
        &self.image_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rendered_page_cleans_up_on_drop() {
        let dir = TempDir::new().unwrap();
        let image = dir.path().join("page.png");
        std::fs::write(&image, b"fake png").unwrap();
        let dir_path = dir.path().to_path_buf();

        let page = RenderedPage::new(dir, image.clone());
        assert_eq!(page.path(), image.as_path());
        assert!(image.exists());

        drop(page);
        assert!(!dir_path.exists());
    }
}
