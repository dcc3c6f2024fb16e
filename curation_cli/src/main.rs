mod commands;
mod notify;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use curation_lib::forms::{CookieDraft, CrawlTaskDraft, StyleDefinitionDraft};
use curation_lib::{Client, ConsoleConfig, Notifier};
use tracing_subscriber::EnvFilter;

use crate::commands::resource::{self, ResourceCommand};
use crate::commands::Context;
use crate::notify::ConsoleNotifier;
use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "curactl")]
#[command(about = "Administer the photo curation backend")]
struct Cli {
    /// TOML config file (base_url, page_size, poll and timeout settings)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// API base URL, e.g. http://localhost:8000/api/v1 (overrides config and CURATION_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Output format: table, json, csv or markdown
    #[arg(long, default_value = "table", global = true)]
    output: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage platform login cookies
    #[command(subcommand)]
    Cookies(ResourceCommand),
    /// Manage crawl tasks
    #[command(subcommand)]
    Tasks(ResourceCommand),
    /// Manage the feature taxonomy
    Features(commands::features::FeaturesArgs),
    /// Manage training sample sets
    SampleSets(commands::sample_sets::SampleSetsArgs),
    /// Manage style definitions
    #[command(subcommand)]
    Styles(ResourceCommand),
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("curactl=info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if !commands::already_reported(&e) {
                eprintln!("Error: {:#}", e);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let format = OutputFormat::parse(&cli.output);

    let mut config = ConsoleConfig::load(cli.config.as_deref())?;
    if let Some(url) = &cli.api_url {
        config.base_url = url.clone();
        config.validate()?;
    }
    tracing::debug!("Using API at {}", config.base_url);

    let client = Client::with_timeout(&config.base_url, config.request_timeout())?;
    let notifier: Arc<dyn Notifier> = Arc::new(ConsoleNotifier);
    let ctx = Context {
        client: Arc::new(client),
        notifier,
        config,
    };

    match &cli.command {
        Commands::Cookies(command) => {
            resource::run_trackable::<CookieDraft>(command, &ctx, &format).await?
        }
        Commands::Tasks(command) => {
            resource::run_trackable::<CrawlTaskDraft>(command, &ctx, &format).await?
        }
        Commands::Features(args) => commands::features::run(args, &ctx, &format).await?,
        Commands::SampleSets(args) => commands::sample_sets::run(args, &ctx, &format).await?,
        Commands::Styles(command) => {
            resource::run_trackable::<StyleDefinitionDraft>(command, &ctx, &format).await?
        }
    }

    Ok(())
}
