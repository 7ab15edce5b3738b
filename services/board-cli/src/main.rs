//! Board analytics command-line client
//!
//! Single binary that:
//! 1. Loads `board.toml` (or `--config` / `CONFIG_PATH`) with env overrides
//! 2. Opens the file-backed token store
//! 3. Runs one command through the resilient API client
//! 4. Prints the JSON result on stdout, logs on stderr

mod cli;
mod commands;
mod config;
mod error;

use std::sync::Arc;

use anyhow::{Context, Result};
use board_http::TracingNavigator;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::Cli;
use crate::config::Config;

#[tokio::main]
async fn main() {
    // JSON logs with LOG_LEVEL / RUST_LOG support, kept off stdout
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("LOG_LEVEL")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr),
        )
        .init();

    // Usage errors exit 64 so they stay apart from the redirect exit codes
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            std::process::exit(if e.use_stderr() { 64 } else { 0 });
        }
    };

    match execute(cli).await {
        Ok(output) => println!("{output}"),
        Err(e) => {
            let (message, code) = commands::exit_report(&e);
            error!(error = %format!("{e:#}"), exit_code = code, "command failed");
            eprintln!("{message}");
            std::process::exit(code);
        }
    }
}

async fn execute(cli: Cli) -> Result<String> {
    let config_path = Config::resolve_path(cli.config.as_deref());
    info!(path = %config_path.display(), "loading configuration");

    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;

    info!(
        base_url = %config.api.base_url,
        timeout_secs = config.api.timeout_secs,
        token_file = %config.storage.token_file.display(),
        "configuration loaded"
    );

    let session = commands::Session::open(&config, Arc::new(TracingNavigator)).await?;
    let output = commands::run(cli.command, &config, &session).await?;
    serde_json::to_string_pretty(&output).context("failed to encode output")
}
