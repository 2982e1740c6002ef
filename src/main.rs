//! triglot binary — terminal UI by default, one-shot translation via
//! the `translate` subcommand.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use triglot::config::AppConfig;
use triglot::translate::{TranslationRequest, Translator};
use triglot::tui;

#[derive(Parser)]
#[command(name = "triglot", version, about = "Interactive English/Korean/Khmer translator")]
struct Cli {
    /// Path to the YAML settings file.
    #[arg(long, default_value = "triglot.yaml")]
    config: PathBuf,

    /// Override the configured model.
    #[arg(long)]
    model: Option<String>,

    /// Override the initial source language (name or ISO code).
    #[arg(long)]
    source: Option<String>,

    /// Override the initial target language (name or ISO code).
    #[arg(long)]
    target: Option<String>,

    /// Append tracing output to this file (the TUI owns the terminal).
    #[arg(long)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Translate once and print the result to stdout.
    Translate {
        /// Text to translate.
        text: String,

        /// Use the casual register (Korean/Khmer targets only).
        #[arg(long)]
        casual: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_file.as_deref())?;

    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    if let Some(model) = cli.model {
        config.model = model;
    }
    if let Some(source) = cli.source {
        config.source_lang = source;
    }
    if let Some(target) = cli.target {
        config.target_lang = target;
    }

    let translator = Translator::from_env(&config.model);

    match cli.command {
        Some(Command::Translate { text, casual }) => one_shot(&config, &translator, text, casual).await,
        None => tui::runner::run(config, translator).await,
    }
}

/// One attempt, result to stdout, classified failures to stderr.
async fn one_shot(
    config: &AppConfig,
    translator: &Translator,
    text: String,
    casual: bool,
) -> anyhow::Result<()> {
    let source = config.source_language()?;
    let target = config.target_language()?;
    let request = TranslationRequest {
        text,
        source,
        target,
        polite: target.supports_formality().then_some(!casual),
    };

    let result = translator.translate(&request).await;
    match result.error {
        Some(err) => anyhow::bail!("{}", err.message),
        None => {
            println!("{}", result.text);
            Ok(())
        }
    }
}

/// Route tracing to a file when asked; otherwise stay silent — the TUI
/// owns the terminal.
fn init_tracing(log_file: Option<&Path>) -> anyhow::Result<()> {
    let Some(path) = log_file else {
        return Ok(());
    };
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
