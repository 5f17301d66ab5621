//! Extract command.

use std::path::Path;

use anyhow::Context;
use console::style;

use lexdoc::config::Config;
use lexdoc::extract::{PageOutcome, TextExtractor};

/// Extract text from a PDF and print it (or write it to `output`).
pub async fn cmd_extract(config: &Config, pdf: &Path, output: Option<&Path>) -> anyhow::Result<()> {
    let extractor = TextExtractor::from_settings(&config.ocr);
    let document = extractor.extract_async(pdf).await?;

    match output {
        Some(path) => {
            tokio::fs::write(path, &document.text)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;

            eprintln!(
                "{} {} pages → {}",
                style("✓").green(),
                document.page_count(),
                path.display()
            );
            let ocr_pages = document.count(PageOutcome::Ocr);
            if ocr_pages > 0 {
                eprintln!("  {} pages recognized with OCR", ocr_pages);
            }
            let unavailable = document.count(PageOutcome::OcrUnavailable);
            if unavailable > 0 {
                eprintln!(
                    "  {} {} pages need OCR but no OCR engine was available",
                    style("!").yellow(),
                    unavailable
                );
            }
            let failed = document.count(PageOutcome::OcrFailed);
            if failed > 0 {
                eprintln!("  {} {} pages failed OCR", style("✗").red(), failed);
            }
        }
        None => print!("{}", document.text),
    }

    Ok(())
}
