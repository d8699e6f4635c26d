//! Mailsweep
//!
//! Bulk cleanup of Gmail category labels for a single account: list the
//! threads under a category tab, move them to trash (or permanently delete
//! them for the `TRASH` pseudo-category), and report whether the run cleared
//! everything.
//!
//! # Overview
//!
//! - **Authentication**: OAuth2 installed-app flow with token caching
//! - **Listing**: Paginated thread listing per category, capped per request
//! - **Cleanup**: Sequential per-thread trash / permanent delete with pacing
//! - **Completion tracking**: Post-delete estimates decide whether more
//!   threads remain
//!
//! # Example Usage
//!
//! ```no_run
//! use mailsweep::{auth, CategoryCleaner, CleanRequest, Category, ProductionGmailClient};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let hub = auth::initialize_gmail_hub(
//!         "credentials.json".as_ref(),
//!         ".mailsweep/token.json".as_ref(),
//!     )
//!     .await?;
//!
//!     let cleaner = CategoryCleaner::new(ProductionGmailClient::new(hub));
//!     let request = CleanRequest::new(vec![Category::Promotions], 100);
//!     let summary = cleaner
//!         .clean_categories("me", &request, &CancellationToken::new())
//!         .await?;
//!
//!     println!("removed {} threads", summary.total_deleted);
//!     Ok(())
//! }
//! ```
//!
//! # Module Organization
//!
//! - [`auth`] - OAuth2 authentication and Gmail API initialization
//! - [`cleaner`] - Category cleanup orchestration
//! - [`cli`] - Command-line interface
//! - [`client`] - Gmail API client trait and production implementation
//! - [`config`] - Configuration management
//! - [`error`] - Error types and result aliases
//! - [`lister`] - Paginated thread listing
//! - [`metrics`] - Cleanup run metrics
//! - [`models`] - Core data structures
//! - [`pacing`] - Delay policy between API calls

pub mod auth;
pub mod cleaner;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod lister;
pub mod metrics;
pub mod models;
pub mod pacing;

// Re-export commonly used types for convenience
pub use error::{ErrorKind, Result, SweepError};

// Core data models
pub use models::{Category, CleanRequest, CleanSummary, CompletionReason, UNLIMITED_MAX};

// Client types
pub use client::{GmailClient, ProductionGmailClient, ThreadPage};

// Cleanup pipeline
pub use cleaner::CategoryCleaner;
pub use lister::{ThreadLister, MAX_PAGE_SIZE};

// Pacing policies
pub use pacing::{FixedDelayPacer, NoDelayPacer, Pacer};

// Metrics observers
pub use metrics::{AtomicMetrics, CleanupMetrics, MetricsSnapshot, NoopMetrics};

// Config types
pub use config::{AuthConfig, CleanupConfig, Config};

// CLI types (for binary usage)
pub use cli::{Cli, Commands};
