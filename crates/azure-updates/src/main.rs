//! Azure updates CLI - daily Japanese digest of Azure update announcements.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use azure_updates::schedule::{parse_lower_bound, previous_day_lower_bound, run_daily};
use azure_updates::{AppConfig, DeliveryOutcome, Pipeline};

/// Azure updates CLI - fetch, translate and mail the daily update digest.
#[derive(Parser)]
#[command(name = "azure-updates")]
#[command(about = "Daily Japanese digest of Azure update announcements")]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a single digest cycle
    Run {
        /// Lower bound for `modified` (default: start of the previous UTC day)
        #[arg(long, value_parser = parse_lower_bound)]
        since: Option<String>,

        /// Render the digest without sending it
        #[arg(long)]
        dry_run: bool,

        /// Write the dry-run digest here instead of stdout
        #[arg(long, requires = "dry_run")]
        output: Option<PathBuf>,
    },

    /// Run the digest every day at 00:00:03 UTC
    Serve,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("azure_updates=debug,info")
        } else {
            EnvFilter::new("azure_updates=info,warn")
        }
    });

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    // Missing translator credentials fail here, before any request is made.
    let config = AppConfig::from_env().context("Failed to load configuration")?;
    tracing::debug!(?config, "Loaded configuration");

    let pipeline = Pipeline::from_config(&config).context("Failed to build pipeline")?;

    match cli.command {
        Commands::Run {
            since,
            dry_run,
            output,
        } => {
            let since = since.unwrap_or_else(|| previous_day_lower_bound(chrono::Utc::now()));
            if dry_run {
                run_dry(&pipeline, &since, output).await
            } else {
                run_once(&pipeline, &since).await
            }
        }
        Commands::Serve => {
            tracing::info!("Starting daily scheduler");
            let pipeline = &pipeline;
            run_daily(move |since| async move { pipeline.run(&since).await }).await;
            Ok(())
        }
    }
}

async fn run_once(pipeline: &Pipeline, since: &str) -> Result<()> {
    let summary = pipeline
        .run(since)
        .await
        .with_context(|| format!("Digest run for updates since {since} failed"))?;

    match summary.delivery {
        None => println!("No updates since {since}; nothing sent."),
        Some(DeliveryOutcome::Sent { operation_id }) => println!(
            "Sent digest of {} updates ({} translation failures), operation {operation_id}",
            summary.fetched, summary.translation_failures
        ),
        // Mail failures are logged and do not fail the run.
        Some(DeliveryOutcome::Failed(reason)) => eprintln!(
            "Digest of {} updates was not delivered: {reason}",
            summary.fetched
        ),
    }

    Ok(())
}

async fn run_dry(pipeline: &Pipeline, since: &str, output: Option<PathBuf>) -> Result<()> {
    let Some(digest) = pipeline
        .build_digest(since)
        .await
        .with_context(|| format!("Failed to build digest for updates since {since}"))?
    else {
        eprintln!("No updates since {since}; nothing to render.");
        return Ok(());
    };

    match output {
        Some(path) => {
            std::fs::write(&path, &digest.html)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!(
                "Wrote digest of {} updates to {}",
                digest.records,
                path.display()
            );
        }
        None => println!("{}", digest.html),
    }

    Ok(())
}
