//! CLI commands implementation.

mod check;
mod extract;
mod operations;
mod process;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use lexdoc::config::Config;

#[derive(Parser)]
#[command(name = "lexdoc")]
#[command(about = "Extract text from legal PDFs and draft summaries, appeals, reviews and more")]
#[command(version)]
pub struct Cli {
    /// Config file (TOML, YAML or JSON); discovered automatically when omitted
    #[arg(short, long, global = true, env = "LEXDOC_CONFIG")]
    config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Extract text from a PDF, OCR'ing pages without a text layer
    Extract {
        /// PDF file
        pdf: PathBuf,
        /// Write the text here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run a document operation on one or more PDFs
    Process {
        /// PDF files (processed concurrently)
        #[arg(required = true)]
        pdfs: Vec<PathBuf>,
        /// Operation to run (see `lexdoc operations`)
        #[arg(short, long)]
        operation: String,
        /// Question for the chat operation
        #[arg(short, long)]
        question: Option<String>,
        /// Print one JSON response per document
        #[arg(long)]
        json: bool,
        /// Give up on a document after this many seconds
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// List the available operations
    Operations,

    /// Check external tools and LLM availability
    Check,
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Operations => operations::cmd_operations(),
        Commands::Extract { pdf, output } => {
            let config = load_config(cli.config.as_deref()).await?;
            extract::cmd_extract(&config, &pdf, output.as_deref()).await
        }
        Commands::Process {
            pdfs,
            operation,
            question,
            json,
            timeout,
        } => {
            let config = load_config(cli.config.as_deref()).await?;
            let options = process::ProcessOptions {
                operation,
                question,
                json,
                timeout_secs: timeout,
            };
            process::cmd_process(&config, &pdfs, &options).await
        }
        Commands::Check => {
            let config = load_config(cli.config.as_deref()).await?;
            check::cmd_check(&config).await
        }
    }
}

async fn load_config(explicit: Option<&str>) -> anyhow::Result<Config> {
    match explicit {
        Some(path) => Ok(Config::load_explicit(path).await?),
        None => Ok(Config::load().await),
    }
}
