//! End-to-end: PDF extraction feeding operation dispatch, using in-memory fakes.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use tempfile::TempDir;

use lexdoc::extract::{PageOutcome, TextExtractor, OCR_UNAVAILABLE_PLACEHOLDER};
use lexdoc::ocr::{OcrBackend, OcrError, OcrResult};
use lexdoc::pdf::{PdfDocument, PdfError, PdfOpener, RenderedPage};
use lexdoc::processor::{
    DocumentHandler, DocumentProcessor, HandlerRegistry, Operation, ProcessResponse,
};

/// PDFs keyed by file name; an empty string is a scanned page.
struct Library {
    files: HashMap<String, Vec<String>>,
}

impl Library {
    fn new(files: &[(&str, &[&str])]) -> Arc<Self> {
        Arc::new(Self {
            files: files
                .iter()
                .map(|(name, pages)| {
                    (
                        name.to_string(),
                        pages.iter().map(|p| p.to_string()).collect(),
                    )
                })
                .collect(),
        })
    }
}

impl PdfOpener for Library {
    fn open(&self, path: &Path) -> Result<Box<dyn PdfDocument>, PdfError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.files
            .get(&name)
            .map(|pages| Box::new(Pages(pages.clone())) as Box<dyn PdfDocument>)
            .ok_or_else(|| PdfError::NotFound(path.to_path_buf()))
    }
}

struct Pages(Vec<String>);

impl PdfDocument for Pages {
    fn page_count(&self) -> u32 {
        self.0.len() as u32
    }

    fn page_text(&self, index: u32) -> Result<String, PdfError> {
        Ok(self.0[index as usize].clone())
    }

    fn render_page(&self, index: u32) -> Result<RenderedPage, PdfError> {
        let dir = TempDir::new()?;
        let image = dir.path().join(format!("page-{}.png", index + 1));
        std::fs::write(&image, b"png")?;
        Ok(RenderedPage::new(dir, image))
    }
}

/// Recognizes every image as the same line of text.
struct StubOcr(&'static str);

impl OcrBackend for StubOcr {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn availability_hint(&self) -> String {
        String::new()
    }

    fn ocr_image(&self, image_path: &Path) -> Result<OcrResult, OcrError> {
        assert!(image_path.exists());
        Ok(OcrResult {
            text: self.0.to_string(),
            backend: "stub",
            processing_time_ms: 0,
        })
    }
}

/// Echoes what it was given, tagged with the operation.
struct Echo {
    operation: Operation,
    delay: Duration,
}

#[async_trait]
impl DocumentHandler for Echo {
    async fn handle(&self, text: &str, question: Option<&str>) -> anyhow::Result<String> {
        tokio::time::sleep(self.delay).await;
        Ok(match question {
            Some(q) => format!("{}|{}|{}", self.operation, text.trim_end(), q),
            None => format!("{}|{}", self.operation, text.trim_end()),
        })
    }
}

fn echo_processor(delay: Duration) -> DocumentProcessor {
    DocumentProcessor::new(HandlerRegistry::from_fn(|operation| {
        Arc::new(Echo { operation, delay })
    }))
}

fn pdf(name: &str) -> PathBuf {
    PathBuf::from("/cases").join(name)
}

#[tokio::test]
async fn scanned_judgment_is_ocrd_and_summarized() {
    let library = Library::new(&[("presuda.pdf", &["PRESUDA", "", "Sudija"])]);
    let extractor = TextExtractor::new()
        .with_pdf(library)
        .with_ocr(Arc::new(StubOcr("U ime naroda")));

    let document = extractor.extract_async(pdf("presuda.pdf")).await.unwrap();
    assert_eq!(document.text, "PRESUDA\nU ime naroda\nSudija\n");
    assert_eq!(
        document.pages,
        vec![PageOutcome::Embedded, PageOutcome::Ocr, PageOutcome::Embedded]
    );

    let response = echo_processor(Duration::ZERO)
        .process(&document.text, "summary", Some("ignored"))
        .await;
    assert_eq!(
        response,
        ProcessResponse::Result("summary|PRESUDA\nU ime naroda\nSudija".to_string())
    );
}

#[tokio::test]
async fn missing_ocr_still_yields_processable_text() {
    let library = Library::new(&[("ugovor.pdf", &["", "Član 1."])]);
    let extractor = TextExtractor::new().with_pdf(library).without_ocr();

    let text = extractor.extract(&pdf("ugovor.pdf")).unwrap();
    assert_eq!(text, format!("{}\nČlan 1.\n", OCR_UNAVAILABLE_PLACEHOLDER));

    let response = echo_processor(Duration::ZERO)
        .process(&text, "chat", Some("Ko su strane?"))
        .await;
    assert!(response
        .result()
        .unwrap()
        .ends_with("Član 1.|Ko su strane?"));
}

#[tokio::test]
async fn unknown_file_is_an_error_not_empty_text() {
    let extractor = TextExtractor::new()
        .with_pdf(Library::new(&[]))
        .without_ocr();

    let err = extractor.extract_async(pdf("nema.pdf")).await.unwrap_err();
    assert!(err.to_string().contains("nema.pdf"), "{}", err);
}

#[tokio::test]
async fn blank_extraction_is_rejected_by_dispatch() {
    let processor = echo_processor(Duration::ZERO);
    for op in Operation::ALL {
        let response = processor.process("\n\n", op.as_str(), None).await;
        assert_eq!(response.error(), Some("Document cannot be empty"));
    }
}

#[tokio::test]
async fn concurrent_requests_get_their_own_results() {
    let processor = echo_processor(Duration::from_millis(5));
    let docs: Vec<String> = (0..24).map(|i| format!("Predmet {}", i)).collect();

    let responses = join_all(docs.iter().enumerate().map(|(i, doc)| {
        let processor = processor.clone();
        let op = Operation::ALL[i % Operation::ALL.len()];
        async move { (op, processor.process(doc, op.as_str(), Some("?")).await) }
    }))
    .await;

    for (i, (op, response)) in responses.into_iter().enumerate() {
        let expected = if op.takes_question() {
            format!("{}|Predmet {}|?", op, i)
        } else {
            format!("{}|Predmet {}", op, i)
        };
        assert_eq!(response, ProcessResponse::Result(expected));
    }
}

#[tokio::test]
async fn concurrent_requests_on_spawned_tasks() {
    let processor = echo_processor(Duration::from_millis(1));

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let processor = processor.clone();
            tokio::spawn(async move {
                processor
                    .process_operation(&format!("Tužba {}", i), Operation::Lawsuit, None)
                    .await
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let response = handle.await.unwrap();
        assert_eq!(response.result(), Some(format!("lawsuit|Tužba {}", i).as_str()));
    }
}

#[test]
fn response_wire_shape() {
    let json = serde_json::to_value(ProcessResponse::Error("Document cannot be empty".into()))
        .unwrap();
    assert_eq!(json, serde_json::json!({"error": "Document cannot be empty"}));
}
