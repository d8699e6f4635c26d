//! Command-line interface

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::cleaner::CategoryCleaner;
use crate::client::ProductionGmailClient;
use crate::config::Config;
use crate::error::{Result, SweepError};
use crate::metrics::{AtomicMetrics, CleanupMetrics};
use crate::models::{Category, CleanRequest, CleanSummary};
use crate::pacing::FixedDelayPacer;

/// Gmail account the installed-app OAuth flow is always bound to
pub const DEFAULT_USER_ID: &str = "me";

#[derive(Parser, Debug)]
#[command(name = "mailsweep")]
#[command(version = "0.1.0")]
#[command(about = "Bulk cleanup of Gmail category labels", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Path to OAuth2 credentials file
    #[arg(long, default_value = "credentials.json")]
    pub credentials: PathBuf,

    /// Path to token cache file
    #[arg(long, default_value = ".mailsweep/token.json")]
    pub token_cache: PathBuf,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Authenticate with Gmail API
    Auth {
        /// Force re-authentication even if token exists
        #[arg(long)]
        force: bool,
    },

    /// Clean one or more category labels
    Clean {
        /// Categories to clean (social, forums, promotions, updates, trash);
        /// defaults to the configured list
        #[arg(value_name = "CATEGORY")]
        categories: Vec<String>,

        /// Maximum threads removed per category; 0 means no limit
        #[arg(short, long)]
        max_per_category: Option<u64>,

        /// Skip the confirmation prompt for permanent trash deletion
        #[arg(short, long)]
        yes: bool,
    },

    /// Generate example configuration file
    InitConfig {
        /// Path to create config file
        #[arg(short, long, default_value = "config.toml")]
        output: PathBuf,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },
}

/// Build the clean request from command-line arguments, falling back to the
/// configured defaults when no categories were named.
pub fn build_clean_request(
    config: &Config,
    category_args: &[String],
    max_per_category: Option<u64>,
) -> Result<CleanRequest> {
    let categories: Vec<Category> = if category_args.is_empty() {
        config.cleanup.categories()?
    } else {
        category_args
            .iter()
            .map(|name| {
                name.parse().map_err(|_| {
                    SweepError::InvalidRequest(format!("Unknown category: {}", name))
                })
            })
            .collect::<Result<_>>()?
    };

    let request = CleanRequest {
        categories,
        max_per_category: max_per_category.unwrap_or(config.cleanup.max_per_category),
    };
    request.validate()?;
    Ok(request)
}

/// Prompt before permanently deleting trash.
///
/// Only runs when the request includes the trash pseudo-category; everything
/// else is recoverable from the trash folder and needs no confirmation.
pub fn confirm_permanent_deletion(request: &CleanRequest) -> Result<bool> {
    if !request.categories.iter().any(|c| c.is_trash()) {
        return Ok(true);
    }

    println!("This run permanently deletes threads in TRASH. This cannot be undone!");
    print!("Are you sure you want to proceed? [y/N]: ");
    std::io::Write::flush(&mut std::io::stdout())?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;

    Ok(input.trim().eq_ignore_ascii_case("y"))
}

/// Authenticate, then run the cleanup over the requested categories
pub async fn run_clean(
    cli: &Cli,
    config: &Config,
    request: &CleanRequest,
    cancel: &CancellationToken,
) -> Result<CleanSummary> {
    info!(
        categories = ?request.categories,
        max_per_category = request.effective_max(),
        "Preparing cleanup run"
    );

    // Hub init returns already-classified errors; don't re-wrap them
    let hub = crate::auth::initialize_gmail_hub(&cli.credentials, &cli.token_cache).await?;

    let client = ProductionGmailClient::new(hub);
    let pacer = FixedDelayPacer::new(config.cleanup.page_delay());
    let metrics = Arc::new(AtomicMetrics::new());
    let cleaner = CategoryCleaner::with_pacer(client, pacer)
        .with_metrics(Arc::clone(&metrics) as Arc<dyn CleanupMetrics>);

    let summary = cleaner
        .clean_categories(DEFAULT_USER_ID, request, cancel)
        .await?;

    let counters = metrics.snapshot();
    info!(
        categories_processed = counters.categories_processed,
        threads_removed = counters.threads_removed,
        "Cleanup run finished"
    );

    Ok(summary)
}
