//! Process command: extract each PDF and run one operation on its text.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use console::style;
use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{info, warn};

use lexdoc::config::Config;
use lexdoc::extract::TextExtractor;
use lexdoc::llm::{LlmClient, LlmHandler};
use lexdoc::processor::{DispatchError, DocumentProcessor, Operation, ProcessResponse};

pub struct ProcessOptions {
    pub operation: String,
    pub question: Option<String>,
    pub json: bool,
    pub timeout_secs: Option<u64>,
}

/// One line of `--json` output.
#[derive(Serialize)]
struct DocumentOutcome {
    file: String,
    #[serde(flatten)]
    response: ProcessResponse,
}

pub async fn cmd_process(
    config: &Config,
    pdfs: &[std::path::PathBuf],
    options: &ProcessOptions,
) -> anyhow::Result<()> {
    // Fail before extracting anything if the operation is unknown.
    let operation = match options.operation.parse::<Operation>() {
        Ok(op) => op,
        Err(_) => anyhow::bail!(
            "{}",
            DispatchError::InvalidOperation {
                requested: options.operation.clone(),
            }
        ),
    };
    if options.question.is_some() && !operation.takes_question() {
        warn!("--question is only used by the chat operation");
    }

    let extractor = TextExtractor::from_settings(&config.ocr);
    let client = Arc::new(LlmClient::new(config.llm.clone())?);
    info!(
        "Using {} model {} at {}",
        config.llm.provider_name(),
        config.llm.model(),
        config.llm.endpoint()
    );
    let processor = DocumentProcessor::new(LlmHandler::registry(client));

    let pb = if options.json {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new_spinner();
        pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
        pb.enable_steady_tick(Duration::from_millis(120));
        pb
    };
    pb.set_message(format!(
        "Running {} on {} document(s)...",
        operation.display_name(),
        pdfs.len()
    ));

    let outcomes = join_all(
        pdfs.iter()
            .map(|pdf| process_document(&extractor, &processor, pdf, options)),
    )
    .await;
    pb.finish_and_clear();

    for outcome in &outcomes {
        if options.json {
            println!("{}", serde_json::to_string(outcome)?);
        } else {
            print_outcome(outcome, operation);
        }
    }

    let failed = outcomes.iter().filter(|o| o.response.is_error()).count();
    if failed > 0 {
        anyhow::bail!("{} of {} documents failed", failed, outcomes.len());
    }
    Ok(())
}

async fn process_document(
    extractor: &TextExtractor,
    processor: &DocumentProcessor,
    pdf: &Path,
    options: &ProcessOptions,
) -> DocumentOutcome {
    let work = async {
        match extractor.extract_async(pdf).await {
            Ok(document) => {
                processor
                    .process(
                        &document.text,
                        &options.operation,
                        options.question.as_deref(),
                    )
                    .await
            }
            Err(e) => ProcessResponse::Error(e.to_string()),
        }
    };

    let response = match options.timeout_secs {
        Some(secs) => tokio::time::timeout(Duration::from_secs(secs), work)
            .await
            .unwrap_or_else(|_| {
                ProcessResponse::Error(format!("Timed out after {} seconds", secs))
            }),
        None => work.await,
    };

    DocumentOutcome {
        file: pdf.display().to_string(),
        response,
    }
}

fn print_outcome(outcome: &DocumentOutcome, operation: Operation) {
    println!(
        "\n{} {}",
        style(format!("{}:", operation.display_name())).bold(),
        style(&outcome.file).cyan()
    );
    println!("{}", "-".repeat(50));
    match &outcome.response {
        ProcessResponse::Result(text) => println!("{}", text),
        ProcessResponse::Error(message) => println!("{} {}", style("✗").red(), message),
    }
}
