//! PDF text extraction with per-page OCR fallback.
//!
//! Pages are read strictly in order. A page with embedded text uses it as-is;
//! a blank page is rendered and OCR'd. A missing OCR engine or an OCR error on
//! one page never fails the document: the page gets a placeholder line or
//! nothing at all (see [`page`] for the full table). Only failing to open the
//! PDF is fatal.

mod page;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::ocr::{OcrBackend, OcrConfig, OcrError, TesseractBackend};
use crate::pdf::{PdfDocument, PdfError, PdfOpener, PopplerPdf};

pub use page::{
    decide_page, OcrAttempt, PageContribution, PageOutcome, OCR_UNAVAILABLE_PLACEHOLDER,
};

/// Errors that abort extraction of a whole document.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Error extracting text from PDF {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: PdfError,
    },

    #[error("Extraction task failed for {}: {message}", path.display())]
    Task { path: PathBuf, message: String },
}

/// Text extracted from one PDF.
#[derive(Debug, Clone)]
pub struct ExtractedDocument {
    /// Path the document was read from.
    pub source: PathBuf,
    /// All pages, each terminated by a newline.
    pub text: String,
    /// How each page's text was obtained, in page order.
    pub pages: Vec<PageOutcome>,
}

impl ExtractedDocument {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Number of pages whose text came from the given row of the decision table.
    pub fn count(&self, outcome: PageOutcome) -> usize {
        self.pages.iter().filter(|p| **p == outcome).count()
    }

    /// File name without extension, for display.
    pub fn name(&self) -> String {
        self.source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.source.display().to_string())
    }
}

/// Extracts text from PDFs, falling back to OCR for pages without text.
#[derive(Clone)]
pub struct TextExtractor {
    pdf: Arc<dyn PdfOpener>,
    ocr: Option<Arc<dyn OcrBackend>>,
    placeholder: String,
}

impl Default for TextExtractor {
    fn default() -> Self {
        Self {
            pdf: Arc::new(PopplerPdf::new()),
            ocr: Some(Arc::new(TesseractBackend::new())),
            placeholder: OCR_UNAVAILABLE_PLACEHOLDER.to_string(),
        }
    }
}

impl TextExtractor {
    /// Poppler for PDF access, Tesseract (Serbian) for OCR.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from the `[ocr]` config section.
    pub fn from_settings(settings: &crate::config::OcrSettings) -> Self {
        let extractor = Self::new()
            .with_pdf(Arc::new(PopplerPdf::new().with_dpi(settings.dpi)))
            .with_placeholder(&settings.placeholder);

        if settings.enabled {
            extractor.with_ocr(Arc::new(TesseractBackend::with_config(
                OcrConfig::with_language(&settings.language),
            )))
        } else {
            extractor.without_ocr()
        }
    }

    pub fn with_pdf(mut self, pdf: Arc<dyn PdfOpener>) -> Self {
        self.pdf = pdf;
        self
    }

    pub fn with_ocr(mut self, ocr: Arc<dyn OcrBackend>) -> Self {
        self.ocr = Some(ocr);
        self
    }

    /// Treat OCR as unavailable; blank pages get the placeholder.
    pub fn without_ocr(mut self) -> Self {
        self.ocr = None;
        self
    }

    pub fn with_placeholder(mut self, placeholder: &str) -> Self {
        self.placeholder = placeholder.to_string();
        self
    }

    /// Extract the text of a PDF.
    pub fn extract(&self, path: &Path) -> Result<String, ExtractionError> {
        self.extract_document(path).map(|doc| doc.text)
    }

    /// Extract a PDF along with per-page outcomes.
    pub fn extract_document(&self, path: &Path) -> Result<ExtractedDocument, ExtractionError> {
        let document = self.pdf.open(path).map_err(|source| ExtractionError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let page_count = document.page_count();
        info!("Extracting text from {} ({} pages)", path.display(), page_count);

        let mut text = String::new();
        let mut pages = Vec::with_capacity(page_count as usize);
        // Probed on the first blank page, then reused for the rest of the document.
        let mut ocr_ready: Option<bool> = None;

        for index in 0..page_count {
            let embedded = document.page_text(index).unwrap_or_else(|e| {
                warn!("Direct text extraction failed on page {}: {}", index + 1, e);
                String::new()
            });

            let contribution = decide_page(
                &embedded,
                || self.ocr_page(document.as_ref(), index, &mut ocr_ready),
                &self.placeholder,
            );

            debug!("Page {}: {}", index + 1, contribution.outcome);
            text.push_str(&contribution.text);
            text.push('\n');
            pages.push(contribution.outcome);
        }

        Ok(ExtractedDocument {
            source: path.to_path_buf(),
            text,
            pages,
        })
    }

    /// Extract on the blocking thread pool.
    pub async fn extract_async(
        &self,
        path: impl Into<PathBuf>,
    ) -> Result<ExtractedDocument, ExtractionError> {
        let extractor = self.clone();
        let path = path.into();
        let task_path = path.clone();

        tokio::task::spawn_blocking(move || extractor.extract_document(&task_path))
            .await
            .map_err(|e| ExtractionError::Task {
                path,
                message: e.to_string(),
            })?
    }

    fn ocr_page(
        &self,
        document: &dyn PdfDocument,
        index: u32,
        ocr_ready: &mut Option<bool>,
    ) -> OcrAttempt {
        let page = index + 1;
        let Some(backend) = self.ocr.as_deref() else {
            warn!("OCR disabled - skipping image-based text extraction on page {}", page);
            return OcrAttempt::Unavailable("OCR disabled".to_string());
        };

        if !*ocr_ready.get_or_insert_with(|| backend.is_available()) {
            let hint = backend.availability_hint();
            warn!(
                "{} OCR not available - skipping image-based text extraction on page {}: {}",
                backend.name(),
                page,
                hint
            );
            return OcrAttempt::Unavailable(hint);
        }

        let rendered = match document.render_page(index) {
            Ok(rendered) => rendered,
            Err(PdfError::ToolNotFound(tool)) => {
                *ocr_ready = Some(false);
                warn!("Cannot render page {} for OCR: {} not found", page, tool);
                return OcrAttempt::Unavailable(tool);
            }
            Err(e) => {
                warn!("Failed to render page {} for OCR: {}", page, e);
                return OcrAttempt::Failed(e.to_string());
            }
        };

        match backend.ocr_image(rendered.path()) {
            Ok(result) => {
                debug!(
                    "OCR'd page {} with {} in {}ms",
                    page, result.backend, result.processing_time_ms
                );
                OcrAttempt::Recognized(result.text)
            }
            Err(OcrError::BackendNotAvailable(hint)) => {
                *ocr_ready = Some(false);
                warn!(
                    "{} OCR not available - skipping image-based text extraction on page {}: {}",
                    backend.name(),
                    page,
                    hint
                );
                OcrAttempt::Unavailable(hint)
            }
            Err(e) => {
                warn!("OCR failed on page {}: {}", page, e);
                OcrAttempt::Failed(e.to_string())
            }
        }
    }
}
