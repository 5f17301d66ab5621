//! Check command.

use console::style;

use lexdoc::config::Config;
use lexdoc::llm::LlmClient;
use lexdoc::ocr::tools::{check_tools, POPPLER_NOT_FOUND};
use lexdoc::ocr::{OcrBackend, OcrConfig, TesseractBackend};

/// Report which external tools and services are usable.
pub async fn cmd_check(config: &Config) -> anyhow::Result<()> {
    println!("\n{}", style("Tool Status").bold());
    println!("{}", "-".repeat(50));

    println!("\n{}", style("External Tools:").cyan());
    let mut poppler_ok = true;
    for (tool, available) in check_tools() {
        let status = if available {
            style("✓ found").green()
        } else {
            if tool.starts_with("pdf") {
                poppler_ok = false;
            }
            style("✗ not found").red()
        };
        println!("  {:<15} {}", tool, status);
    }
    if !poppler_ok {
        println!("  {}", style(POPPLER_NOT_FOUND).dim());
    }

    println!("\n{}", style("OCR:").cyan());
    if config.ocr.enabled {
        let tesseract =
            TesseractBackend::with_config(OcrConfig::with_language(&config.ocr.language));
        if tesseract.is_available() {
            println!(
                "  {:<15} {} (language: {})",
                "Tesseract",
                style("✓ available").green(),
                tesseract.language()
            );
        } else {
            println!("  {:<15} {}", "Tesseract", style("✗ not available").red());
            println!("                  {}", style(tesseract.availability_hint()).dim());
        }
    } else {
        println!(
            "  {:<15} {}",
            "Tesseract",
            style("disabled in config").yellow()
        );
    }

    println!("\n{}", style("LLM:").cyan());
    let client = LlmClient::new(config.llm.clone())?;
    let label = format!("{} ({})", config.llm.provider_name(), config.llm.model());
    if client.is_available().await {
        println!("  {} {}", style("✓").green(), label);
    } else {
        println!("  {} {}", style("✗").red(), label);
        println!("    {}", style(config.llm.availability_hint()).dim());
    }

    if let Some(path) = &config.source_path {
        println!("\n{} {}", style("Config:").cyan(), path.display());
    }
    println!();

    Ok(())
}
