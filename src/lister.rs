//! Paginated thread listing
//!
//! Walks the Gmail thread listing for a category label page by page, up to a
//! caller-supplied maximum, pausing between pages to respect API quotas. Any
//! page failure aborts the whole listing; there are no retries and no partial
//! results.

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::client::GmailClient;
use crate::error::{Result, SweepError};
use crate::models::Category;
use crate::pacing::Pacer;

/// Gmail's hard limit on results per listing request
pub const MAX_PAGE_SIZE: u32 = 500;

/// Lists thread ids for a category, handling pagination and pacing.
///
/// Borrows the client and pacer from the cleaner that drives it; holds no
/// state of its own between calls.
pub struct ThreadLister<'a, C: ?Sized, P: ?Sized> {
    client: &'a C,
    pacer: &'a P,
}

impl<'a, C, P> ThreadLister<'a, C, P>
where
    C: GmailClient + ?Sized,
    P: Pacer + ?Sized,
{
    pub fn new(client: &'a C, pacer: &'a P) -> Self {
        Self { client, pacer }
    }

    /// List up to `max` thread ids in `category`, across as many pages as
    /// needed.
    ///
    /// Stops when the provider returns no continuation token, when `max` is
    /// reached, or when a page comes back empty (guards against a provider
    /// bug looping forever on a stale token).
    pub async fn list_threads(
        &self,
        user_id: &str,
        category: Category,
        max: u64,
        cancel: &CancellationToken,
    ) -> Result<Vec<String>> {
        // The cleaner substitutes the unlimited sentinel before calling;
        // a literal zero lists nothing.
        if max == 0 {
            return Ok(Vec::new());
        }

        info!(
            user_id,
            category = %category,
            max_results = max,
            "Listing category threads with pagination"
        );

        let mut all_ids: Vec<String> = Vec::new();
        let mut page_token: Option<String> = None;
        let mut page_count = 0u32;
        let mut total_fetched = 0u64;

        loop {
            if cancel.is_cancelled() {
                return Err(SweepError::OperationCancelled(format!(
                    "listing cancelled after {} pages of {}",
                    page_count, category
                )));
            }

            page_count += 1;
            let remaining = max - total_fetched;
            let page_size = remaining.min(u64::from(MAX_PAGE_SIZE)) as u32;

            debug!(
                page_number = page_count,
                page_size,
                total_fetched,
                "Fetching page"
            );

            let page = match self
                .client
                .list_threads_page(user_id, category.label_id(), page_size, page_token.as_deref())
                .await
            {
                Ok(page) => page,
                Err(e) => {
                    error!(
                        user_id,
                        category = %category,
                        page_number = page_count,
                        error = %e,
                        "Failed to list threads page"
                    );
                    return Err(e);
                }
            };

            let page_thread_count = page.ids.len();
            all_ids.extend(page.ids);
            total_fetched += page_thread_count as u64;

            debug!(
                page_number = page_count,
                page_thread_count,
                total_fetched,
                result_size_estimate = page.result_size_estimate,
                "Fetched page"
            );

            page_token = page.next_page_token;
            if page_token.is_none() || total_fetched >= max || page_thread_count == 0 {
                break;
            }

            // Pause between pages to stay under the per-user quota
            self.pacer.wait_before_next_call().await;
        }

        info!(
            user_id,
            category = %category,
            total_pages = page_count,
            total_threads_fetched = total_fetched,
            requested_max = max,
            "Completed thread listing"
        );

        Ok(all_ids)
    }

    /// Provider-reported estimate of how many threads remain in `category`.
    ///
    /// A single round-trip requesting one item; the cleaner uses it after
    /// deletion to decide whether a category is exhausted.
    pub async fn estimate(
        &self,
        user_id: &str,
        category: Category,
        cancel: &CancellationToken,
    ) -> Result<u64> {
        if cancel.is_cancelled() {
            return Err(SweepError::OperationCancelled(format!(
                "estimate for {} cancelled",
                category
            )));
        }

        let page = self
            .client
            .list_threads_page(user_id, category.label_id(), 1, None)
            .await?;

        Ok(page.result_size_estimate)
    }
}
