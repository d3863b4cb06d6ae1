use anyhow::{Context, Result};
use clap::Parser;
use composio_sdk::{ComposioClient, ComposioError, CredentialLoader};
use std::path::PathBuf;
use std::process::ExitCode;

mod commands;
mod config;
mod output;

use commands::Command;
use config::CliConfig;
use output::{OutputFormat, Printer};

#[derive(Parser, Debug)]
#[command(name = "composio")]
#[command(about = "Notion, Zoom and connection management through the Composio broker", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, default_value = "composio.toml")]
    config: PathBuf,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Broker root URL, overriding the configuration file
    #[arg(long, global = true, env = "COMPOSIO_BASE_URL")]
    base_url: Option<String>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", error_line(&e));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = CliConfig::load(&cli.config)?;

    let mut loader = CredentialLoader::from_env();
    if let Some(ref name) = config.credentials.secret_name {
        loader = loader.with_secret_name(name.clone());
    }
    let credentials = loader.load().await?;

    let mut builder = ComposioClient::builder().credentials(credentials);
    if let Some(base_url) = cli.base_url.or(config.base_url.clone()) {
        builder = builder.base_url(base_url);
    }
    if let Some(timeout) = config.timeout() {
        builder = builder.timeout(timeout);
    }
    if let Some(ref user_agent) = config.user_agent {
        builder = builder.user_agent(user_agent.clone());
    }
    let client = builder.build().context("Failed to build Composio client")?;

    cli.command.run(&client, Printer::new(cli.format)).await
}

/// `Error [kind]: message` for SDK errors, plain `Error: ...` otherwise.
fn error_line(error: &anyhow::Error) -> String {
    match error.chain().find_map(|e| e.downcast_ref::<ComposioError>()) {
        Some(sdk) => format!("Error [{}]: {}", sdk.kind(), sdk),
        None => format!("Error: {:#}", error),
    }
}
