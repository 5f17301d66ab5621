//! Per-page decision table.
//!
//! | embedded text? | OCR engine available? | OCR succeeded? | contribution          |
//! |----------------|-----------------------|----------------|-----------------------|
//! | yes            | -                     | -              | embedded text         |
//! | no             | no                    | -              | placeholder line      |
//! | no             | yes                   | yes            | OCR text              |
//! | no             | yes                   | no             | empty line            |

use serde::Serialize;

/// Line appended for a blank page when no OCR engine can be used.
pub const OCR_UNAVAILABLE_PLACEHOLDER: &str = "[Image content - OCR unavailable]";

/// Which row of the decision table produced a page's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageOutcome {
    /// Text came from the page's content stream.
    Embedded,
    /// Text came from OCR of the rendered page.
    Ocr,
    /// No OCR engine; the placeholder line was used.
    OcrUnavailable,
    /// OCR ran but failed on this page; the page contributes nothing.
    OcrFailed,
}

impl PageOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            PageOutcome::Embedded => "embedded",
            PageOutcome::Ocr => "ocr",
            PageOutcome::OcrUnavailable => "ocr_unavailable",
            PageOutcome::OcrFailed => "ocr_failed",
        }
    }
}

impl std::fmt::Display for PageOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of trying to OCR one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OcrAttempt {
    Recognized(String),
    /// The engine is missing; carries a hint for the log.
    Unavailable(String),
    /// The engine errored on this page; carries the error message.
    Failed(String),
}

/// Text a single page adds to the document, without its trailing newline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContribution {
    pub outcome: PageOutcome,
    pub text: String,
}

/// Decide what a page contributes.
///
/// `ocr` is only called when the embedded text is blank.
pub fn decide_page<F>(embedded: &str, ocr: F, placeholder: &str) -> PageContribution
where
    F: FnOnce() -> OcrAttempt,
{
    if !embedded.trim().is_empty() {
        return PageContribution {
            outcome: PageOutcome::Embedded,
            text: embedded.to_string(),
        };
    }

    match ocr() {
        OcrAttempt::Recognized(text) => PageContribution {
            outcome: PageOutcome::Ocr,
            text,
        },
        OcrAttempt::Unavailable(_) => PageContribution {
            outcome: PageOutcome::OcrUnavailable,
            text: placeholder.to_string(),
        },
        OcrAttempt::Failed(_) => PageContribution {
            outcome: PageOutcome::OcrFailed,
            text: String::new(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_text_skips_ocr() {
        let page = decide_page(
            "Član 1.\nUgovorne strane",
            || panic!("OCR must not run when the page has text"),
            OCR_UNAVAILABLE_PLACEHOLDER,
        );
        assert_eq!(page.outcome, PageOutcome::Embedded);
        assert_eq!(page.text, "Član 1.\nUgovorne strane");
    }

    #[test]
    fn test_whitespace_only_counts_as_blank() {
        let page = decide_page(
            "  \n\t \n",
            || OcrAttempt::Recognized("Presuda".to_string()),
            OCR_UNAVAILABLE_PLACEHOLDER,
        );
        assert_eq!(page.outcome, PageOutcome::Ocr);
        assert_eq!(page.text, "Presuda");
    }

    #[test]
    fn test_unavailable_uses_placeholder() {
        let page = decide_page(
            "",
            || OcrAttempt::Unavailable("tesseract not found".to_string()),
            OCR_UNAVAILABLE_PLACEHOLDER,
        );
        assert_eq!(page.outcome, PageOutcome::OcrUnavailable);
        assert_eq!(page.text, OCR_UNAVAILABLE_PLACEHOLDER);
    }

    #[test]
    fn test_failure_contributes_nothing() {
        let page = decide_page(
            "",
            || OcrAttempt::Failed("corrupt image".to_string()),
            OCR_UNAVAILABLE_PLACEHOLDER,
        );
        assert_eq!(page.outcome, PageOutcome::OcrFailed);
        assert!(page.text.is_empty());
    }

    #[test]
    fn test_custom_placeholder() {
        let page = decide_page("", || OcrAttempt::Unavailable(String::new()), "[scan]");
        assert_eq!(page.text, "[scan]");
    }
}
