//! Category cleanup orchestration
//!
//! Processes the requested categories strictly in order: list threads via the
//! [`ThreadLister`], move them to trash (or permanently delete them for the
//! `TRASH` pseudo-category), then decide whether the run cleared everything.
//! The first remote failure aborts the whole run; the caller gets the error
//! and no partial summary, even for categories that already succeeded.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::client::GmailClient;
use crate::error::{Result, SweepError};
use crate::lister::ThreadLister;
use crate::metrics::{CleanupMetrics, NoopMetrics};
use crate::models::{
    Category, CleanRequest, CleanSummary, CompletionReason, INBOX_LABEL, TRASH_LABEL,
};
use crate::pacing::{FixedDelayPacer, Pacer};

/// Drives a full cleanup run over a Gmail account.
///
/// All collaborators are injected: the API client, the pacing policy, and the
/// metrics observer. A cleaner holds no per-run state, so one instance can
/// serve consecutive runs.
pub struct CategoryCleaner<C, P = FixedDelayPacer> {
    client: C,
    pacer: P,
    metrics: Arc<dyn CleanupMetrics>,
}

impl<C: GmailClient> CategoryCleaner<C> {
    /// Create a cleaner with the default 200ms pacing
    pub fn new(client: C) -> Self {
        Self::with_pacer(client, FixedDelayPacer::default())
    }
}

impl<C, P> CategoryCleaner<C, P>
where
    C: GmailClient,
    P: Pacer,
{
    pub fn with_pacer(client: C, pacer: P) -> Self {
        Self {
            client,
            pacer,
            metrics: Arc::new(NoopMetrics),
        }
    }

    /// Attach a metrics observer
    pub fn with_metrics(mut self, metrics: Arc<dyn CleanupMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Get the inner client reference
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Clean the requested categories and report what was removed.
    ///
    /// Regular categories are moved to trash; the `TRASH` category is
    /// permanently deleted. Returns `completed = true` only when no category
    /// hit its cap and every post-delete estimate came back zero.
    pub async fn clean_categories(
        &self,
        user_id: &str,
        request: &CleanRequest,
        cancel: &CancellationToken,
    ) -> Result<CleanSummary> {
        request.validate()?;

        let start = Instant::now();
        info!(
            user_id,
            categories = ?request.categories,
            max_per_category = request.effective_max(),
            "Starting email cleanup operation"
        );

        match self.run(user_id, request, cancel).await {
            Ok(summary) => {
                info!(
                    user_id,
                    total_deleted = summary.total_deleted,
                    completed = summary.completed,
                    reason = %summary.reason,
                    categories_processed = request.categories.len(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Email cleanup operation completed"
                );
                self.metrics.record_run(&summary, start.elapsed());
                Ok(summary)
            }
            Err(e) => {
                error!(user_id, error = %e, "Email cleanup operation failed");
                self.metrics.record_failure();
                Err(e)
            }
        }
    }

    async fn run(
        &self,
        user_id: &str,
        request: &CleanRequest,
        cancel: &CancellationToken,
    ) -> Result<CleanSummary> {
        let max = request.effective_max();
        let lister = ThreadLister::new(&self.client, &self.pacer);

        let mut per_category: HashMap<Category, usize> = HashMap::new();
        let mut total = 0usize;
        let mut completed = true;
        let mut reason = CompletionReason::AllCategoriesProcessed;

        for &category in &request.categories {
            let category_start = Instant::now();
            debug!(category = %category, user_id, "Processing category");

            let thread_ids = lister.list_threads(user_id, category, max, cancel).await?;

            debug!(
                category = %category,
                threads_found = thread_ids.len(),
                query_duration_ms = category_start.elapsed().as_millis() as u64,
                "Category query completed"
            );

            if category.is_trash() {
                self.delete_permanently(user_id, &thread_ids, cancel).await?;
            } else {
                self.move_to_trash(user_id, &thread_ids, cancel).await?;
            }

            let deleted = thread_ids.len();
            info!(
                category = %category,
                deleted_count = deleted,
                permanent_delete = category.is_trash(),
                "Successfully processed threads"
            );

            // Duplicate categories accumulate into one entry, keeping the
            // total equal to the sum of the per-category counts
            *per_category.entry(category).or_default() += deleted;
            total += deleted;
            self.metrics.record_category(category, deleted);

            // Completion tracking: a later category's condition overwrites an
            // earlier reason (last write wins)
            if deleted as u64 >= max {
                completed = false;
                reason = CompletionReason::MaxPerCategoryReached;
            } else {
                match lister.estimate(user_id, category, cancel).await {
                    Ok(estimate) if estimate > 0 => {
                        completed = false;
                        reason = CompletionReason::RemainingEmailsDetected;
                    }
                    Ok(_) => {}
                    // Estimate failures do not fail the run; the deletions
                    // for this category already happened
                    Err(e) => {
                        debug!(
                            category = %category,
                            error = %e,
                            "Ignoring failed remaining-count estimate"
                        );
                    }
                }
            }

            // Quota pause before the next category
            self.pacer.wait_before_next_call().await;
        }

        Ok(CleanSummary {
            per_category_deleted: per_category,
            total_deleted: total,
            completed,
            reason,
        })
    }

    /// Move every listed thread to trash, one modify call per thread
    async fn move_to_trash(
        &self,
        user_id: &str,
        thread_ids: &[String],
        cancel: &CancellationToken,
    ) -> Result<()> {
        if thread_ids.is_empty() {
            debug!("No threads to trash, skipping operation");
            return Ok(());
        }

        info!(
            user_id,
            thread_count = thread_ids.len(),
            "Starting batch trash operation"
        );

        let add_labels = vec![TRASH_LABEL.to_string()];
        let remove_labels = vec![INBOX_LABEL.to_string()];

        for (index, thread_id) in thread_ids.iter().enumerate() {
            if cancel.is_cancelled() {
                return Err(SweepError::OperationCancelled(format!(
                    "trash operation stopped after {} of {} threads",
                    index,
                    thread_ids.len()
                )));
            }

            if let Err(e) = self
                .client
                .modify_thread(user_id, thread_id, &add_labels, &remove_labels)
                .await
            {
                error!(
                    user_id,
                    thread_id,
                    successful_before_error = index,
                    error = %e,
                    "Failed to trash thread"
                );
                return Err(e);
            }

            debug!(
                thread_id,
                progress = index + 1,
                total = thread_ids.len(),
                "Trashed thread"
            );
        }

        info!(
            user_id,
            thread_count = thread_ids.len(),
            "Completed batch trash operation"
        );

        Ok(())
    }

    /// Permanently delete every listed thread, one delete call per thread.
    /// There is no bulk endpoint for permanent deletion.
    async fn delete_permanently(
        &self,
        user_id: &str,
        thread_ids: &[String],
        cancel: &CancellationToken,
    ) -> Result<()> {
        if thread_ids.is_empty() {
            debug!("No threads to permanently delete, skipping operation");
            return Ok(());
        }

        warn!(
            user_id,
            thread_count = thread_ids.len(),
            "Starting permanent delete operation - IRREVERSIBLE"
        );

        for (index, thread_id) in thread_ids.iter().enumerate() {
            if cancel.is_cancelled() {
                return Err(SweepError::OperationCancelled(format!(
                    "permanent delete stopped after {} of {} threads",
                    index,
                    thread_ids.len()
                )));
            }

            if let Err(e) = self.client.delete_thread(user_id, thread_id).await {
                error!(
                    user_id,
                    thread_id,
                    successful_before_error = index,
                    error = %e,
                    "Failed to permanently delete thread"
                );
                return Err(e);
            }

            debug!(
                thread_id,
                progress = index + 1,
                total = thread_ids.len(),
                "Permanently deleted thread"
            );
        }

        warn!(
            user_id,
            thread_count = thread_ids.len(),
            "Completed permanent delete operation - all deletions irreversible"
        );

        Ok(())
    }
}
