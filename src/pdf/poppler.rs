//! PDF access via poppler-utils.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;
use tracing::debug;

use super::{PdfDocument, PdfError, PdfOpener, RenderedPage};
use crate::ocr::tools::POPPLER_NOT_FOUND;

/// 72 DPI renders a page at its native point size.
pub const DEFAULT_RENDER_DPI: u32 = 72;

/// Opens PDFs with `pdfinfo` and reads pages with `pdftotext` / `pdftoppm`.
#[derive(Debug, Clone)]
pub struct PopplerPdf {
    dpi: u32,
}

impl Default for PopplerPdf {
    fn default() -> Self {
        Self {
            dpi: DEFAULT_RENDER_DPI,
        }
    }
}

impl PopplerPdf {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the render resolution used for OCR images.
    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi.max(1);
        self
    }

    pub fn dpi(&self) -> u32 {
        self.dpi
    }
}

impl PdfOpener for PopplerPdf {
    fn open(&self, path: &Path) -> Result<Box<dyn PdfDocument>, PdfError> {
        if !path.is_file() {
            return Err(PdfError::NotFound(path.to_path_buf()));
        }

        let output = run_tool("pdfinfo", Command::new("pdfinfo").arg(path))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PdfError::Invalid(stderr.trim().to_string()));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let page_count = parse_page_count(&stdout).ok_or_else(|| {
            PdfError::Invalid("pdfinfo reported no page count".to_string())
        })?;

        debug!("Opened {} ({} pages)", path.display(), page_count);
        Ok(Box::new(PopplerDocument {
            path: path.to_path_buf(),
            page_count,
            dpi: self.dpi,
        }))
    }
}

struct PopplerDocument {
    path: PathBuf,
    page_count: u32,
    dpi: u32,
}

impl PopplerDocument {
    /// Poppler counts pages from 1.
    fn page_number(&self, index: u32) -> Result<String, PdfError> {
        if index >= self.page_count {
            return Err(PdfError::PageOutOfRange {
                page: index,
                page_count: self.page_count,
            });
        }
        Ok((index + 1).to_string())
    }
}

impl PdfDocument for PopplerDocument {
    fn page_count(&self) -> u32 {
        self.page_count
    }

    fn page_text(&self, index: u32) -> Result<String, PdfError> {
        let page = self.page_number(index)?;
        let output = run_tool(
            "pdftotext",
            Command::new("pdftotext")
                .args(["-enc", "UTF-8", "-f", &page, "-l", &page])
                .arg(&self.path)
                .arg("-"),
        )?;

        if !output.status.success() {
            return Err(PdfError::ToolFailed {
                tool: "pdftotext",
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let text = String::from_utf8_lossy(&output.stdout);
        Ok(text.trim_end_matches('\x0c').to_string())
    }

    fn render_page(&self, index: u32) -> Result<RenderedPage, PdfError> {
        let page = self.page_number(index)?;
        let dpi = self.dpi.to_string();
        let dir = TempDir::new()?;
        let prefix = dir.path().join("page");

        let output = run_tool(
            "pdftoppm",
            Command::new("pdftoppm")
                .args(["-png", "-singlefile", "-r", &dpi, "-f", &page, "-l", &page])
                .arg(&self.path)
                .arg(&prefix),
        )?;

        if !output.status.success() {
            return Err(PdfError::ToolFailed {
                tool: "pdftoppm",
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let image_path = prefix.with_extension("png");
        if !image_path.exists() {
            return Err(PdfError::ToolFailed {
                tool: "pdftoppm",
                message: format!("no image generated for page {}", page),
            });
        }

        Ok(RenderedPage::new(dir, image_path))
    }
}

fn run_tool(tool: &str, command: &mut Command) -> Result<Output, PdfError> {
    match command.output() {
        Ok(output) => Ok(output),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(PdfError::ToolNotFound(
            format!("{} ({})", tool, POPPLER_NOT_FOUND),
        )),
        Err(e) => Err(PdfError::Io(e)),
    }
}

fn parse_page_count(pdfinfo: &str) -> Option<u32> {
    pdfinfo
        .lines()
        .find(|line| line.starts_with("Pages:"))
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|n| n.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_page_count() {
        let info = "Title:          Presuda\nProducer:       scanner\nPages:          12\nEncrypted:      no\n";
        assert_eq!(parse_page_count(info), Some(12));
        assert_eq!(parse_page_count("Title: x\n"), None);
        assert_eq!(parse_page_count("Pages: many\n"), None);
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let err = PopplerPdf::new()
            .open(Path::new("/nonexistent/tuzba.pdf"))
            .err()
            .expect("missing file must fail");
        assert!(matches!(err, PdfError::NotFound(_)));
    }

    #[test]
    fn test_corrupt_file_fails_to_open() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("corrupt.pdf");
        std::fs::write(&path, b"this is not a pdf").unwrap();

        // Invalid with poppler installed, ToolNotFound without it.
        assert!(PopplerPdf::new().open(&path).is_err());
    }

    #[test]
    fn test_dpi_is_at_least_one() {
        assert_eq!(PopplerPdf::new().dpi(), DEFAULT_RENDER_DPI);
        assert_eq!(PopplerPdf::new().with_dpi(0).dpi(), 1);
        assert_eq!(PopplerPdf::new().with_dpi(300).dpi(), 300);
    }

    #[test]
    fn test_page_out_of_range() {
        let doc = PopplerDocument {
            path: PathBuf::from("/tmp/x.pdf"),
            page_count: 2,
            dpi: DEFAULT_RENDER_DPI,
        };
        assert_eq!(doc.page_number(0).unwrap(), "1");
        assert_eq!(doc.page_number(1).unwrap(), "2");
        assert!(matches!(
            doc.page_number(2),
            Err(PdfError::PageOutOfRange { page: 2, page_count: 2 })
        ));
    }
}
