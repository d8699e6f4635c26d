use anyhow::Result;
use clap::Parser;
use mailsweep::cli::{self, Cli, Commands};
use mailsweep::config::Config;
use mailsweep::error::SweepError;
use std::process;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Exit with proper code on error
    if let Err(e) = run().await {
        display_error(&e);
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Install default crypto provider for rustls
    // On non-Windows platforms, use aws-lc-rs (better performance, FIPS support)
    // On Windows, use ring (better compatibility, no NASM/CMake required)
    #[cfg(not(windows))]
    rustls::crypto::aws_lc_rs::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install default crypto provider"))?;

    #[cfg(windows)]
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install default crypto provider"))?;

    let cli = Cli::parse();

    // Initialize tracing with level based on verbose flag
    let filter = if cli.verbose {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("mailsweep=debug,info"))
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("mailsweep=info,warn,error"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    // Ctrl-C stops the run at the next thread boundary instead of mid-call
    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping after the current API call");
            signal_token.cancel();
        }
    });

    match cli.command {
        Commands::Auth { force } => {
            tracing::info!("Authenticating with Gmail API...");

            // Ensure token cache directory exists
            if let Some(parent) = cli.token_cache.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }

            // Delete existing token if force flag is set
            if force && cli.token_cache.exists() {
                tokio::fs::remove_file(&cli.token_cache).await?;
                tracing::info!("Removed existing token cache");
            }

            // Initialize Gmail hub (will trigger OAuth flow if needed); this
            // also restricts the persisted token file to owner read/write
            let hub =
                mailsweep::auth::initialize_gmail_hub(&cli.credentials, &cli.token_cache).await?;

            println!("Successfully authenticated with Gmail API");
            println!("Token cached at: {:?}", cli.token_cache);

            // Test the connection - must specify scope to avoid triggering additional OAuth flow
            let (_, profile) = hub
                .users()
                .get_profile("me")
                .add_scope(mailsweep::auth::FULL_MAIL_SCOPE)
                .doit()
                .await?;
            println!(
                "Connected to account: {}",
                profile.email_address.unwrap_or_default()
            );

            Ok(())
        }

        Commands::Clean {
            ref categories,
            max_per_category,
            yes,
        } => {
            let config = Config::load(&cli.config).await?;
            let request = cli::build_clean_request(&config, categories, max_per_category)?;

            if !yes && !cli::confirm_permanent_deletion(&request)? {
                println!("Aborted.");
                return Ok(());
            }

            let summary = cli::run_clean(&cli, &config, &request, &cancel).await?;

            println!("\n========================================");
            println!("Cleanup Summary");
            println!("========================================");
            for category in &request.categories {
                let deleted = summary
                    .per_category_deleted
                    .get(category)
                    .copied()
                    .unwrap_or(0);
                println!("{}: {} threads removed", category, deleted);
            }
            println!("Total removed: {}", summary.total_deleted);
            println!("Completed: {}", summary.completed);
            println!("Reason: {}", summary.reason);
            println!("========================================");

            Ok(())
        }

        Commands::InitConfig { ref output, force } => {
            tracing::info!("Generating example configuration file");

            if output.exists() && !force {
                return Err(SweepError::ConfigError(format!(
                    "Configuration file already exists at {:?}. Use --force to overwrite.",
                    output
                ))
                .into());
            }

            Config::create_example(output).await?;

            println!("Created example configuration file at: {:?}", output);
            println!("\nPlease edit this file to customize your settings.");
            println!("Key settings to review:");
            println!("  - cleanup.default_categories: Categories cleaned when none are given");
            println!("  - cleanup.max_per_category: Per-category removal cap (0 = unlimited)");
            println!("  - cleanup.page_delay_ms: Pause between Gmail API calls");

            Ok(())
        }
    }
}

/// Display error with context
fn display_error(error: &anyhow::Error) {
    eprintln!("Error: {}", error);

    // Display error chain
    let mut cause = error.source();
    while let Some(e) = cause {
        eprintln!("  Caused by: {}", e);
        cause = e.source();
    }

    // Display helpful hints based on error type
    if let Some(sweep_err) = error.downcast_ref::<SweepError>() {
        match sweep_err {
            SweepError::AuthError(_) | SweepError::InsufficientScope(_) => {
                eprintln!("\nHint: Your cached token may be stale or under-scoped.");
                eprintln!("      Try running: mailsweep auth --force");
            }
            SweepError::RateLimitExceeded { .. } => {
                eprintln!("\nHint: You've hit Gmail API rate limits.");
                eprintln!("      Wait a few seconds and try again.");
            }
            SweepError::ConfigError(_) => {
                eprintln!("\nHint: Check your configuration file for errors.");
                eprintln!("      Run: mailsweep init-config --force");
            }
            _ => {}
        }
    }

    eprintln!("\nFor help, run: mailsweep --help");
}
