//! Gmail API client boundary for thread listing and removal

use async_trait::async_trait;
use google_gmail1::api::{ListThreadsResponse, ModifyThreadRequest};
use tracing::debug;

use crate::auth::{GmailHub, FULL_MAIL_SCOPE};
use crate::error::Result;

/// One page of a thread listing.
#[derive(Debug, Clone, Default)]
pub struct ThreadPage {
    /// Thread ids on this page
    pub ids: Vec<String>,
    /// Continuation token for the next page; `None` when the listing is done
    pub next_page_token: Option<String>,
    /// Provider's estimate of the total number of matching threads
    pub result_size_estimate: u64,
}

/// Capability set the cleanup core needs from the Gmail API.
///
/// Kept narrow so tests can swap in an in-memory fake: one page-level listing
/// call (the trash pseudo-label goes through the same method with the `TRASH`
/// label id) and the two per-thread removal calls.
#[async_trait]
pub trait GmailClient: Send + Sync {
    /// Fetch one page of thread ids carrying the given label
    async fn list_threads_page(
        &self,
        user_id: &str,
        label_id: &str,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<ThreadPage>;

    /// Add/remove labels on a single thread (used to move threads to trash)
    async fn modify_thread(
        &self,
        user_id: &str,
        thread_id: &str,
        add_label_ids: &[String],
        remove_label_ids: &[String],
    ) -> Result<()>;

    /// Permanently delete a single thread. Irreversible; bypasses trash.
    async fn delete_thread(&self, user_id: &str, thread_id: &str) -> Result<()>;
}

/// Convert a raw Gmail listing response into a [`ThreadPage`].
///
/// Threads without an id are skipped; an empty continuation token is
/// normalized to `None` (the provider signals "no more pages" both ways).
fn page_from_response(response: ListThreadsResponse) -> ThreadPage {
    let ids: Vec<String> = response
        .threads
        .unwrap_or_default()
        .into_iter()
        .filter_map(|thread| thread.id)
        .collect();

    let next_page_token = response.next_page_token.filter(|token| !token.is_empty());

    ThreadPage {
        ids,
        next_page_token,
        result_size_estimate: u64::from(response.result_size_estimate.unwrap_or(0)),
    }
}

/// Production Gmail client backed by the authenticated API hub.
///
/// Every call requests the full-mail scope: thread deletion is not permitted
/// under `gmail.modify`, and mixing scopes across calls invalidates the
/// cached token.
pub struct ProductionGmailClient {
    hub: GmailHub,
}

impl ProductionGmailClient {
    pub fn new(hub: GmailHub) -> Self {
        Self { hub }
    }

    /// Get the inner hub reference
    pub fn hub(&self) -> &GmailHub {
        &self.hub
    }
}

#[async_trait]
impl GmailClient for ProductionGmailClient {
    async fn list_threads_page(
        &self,
        user_id: &str,
        label_id: &str,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<ThreadPage> {
        let mut call = self
            .hub
            .users()
            .threads_list(user_id)
            .add_label_ids(label_id)
            .max_results(page_size)
            .add_scope(FULL_MAIL_SCOPE);

        if let Some(token) = page_token {
            call = call.page_token(token);
        }

        let (_, response) = call.doit().await?;
        let page = page_from_response(response);

        debug!(
            label_id,
            page_threads = page.ids.len(),
            result_size_estimate = page.result_size_estimate,
            has_next_page = page.next_page_token.is_some(),
            "Fetched thread listing page"
        );

        Ok(page)
    }

    async fn modify_thread(
        &self,
        user_id: &str,
        thread_id: &str,
        add_label_ids: &[String],
        remove_label_ids: &[String],
    ) -> Result<()> {
        let request = ModifyThreadRequest {
            add_label_ids: Some(add_label_ids.to_vec()),
            remove_label_ids: Some(remove_label_ids.to_vec()),
        };

        self.hub
            .users()
            .threads_modify(request, user_id, thread_id)
            .add_scope(FULL_MAIL_SCOPE)
            .doit()
            .await?;

        Ok(())
    }

    async fn delete_thread(&self, user_id: &str, thread_id: &str) -> Result<()> {
        self.hub
            .users()
            .threads_delete(user_id, thread_id)
            .add_scope(FULL_MAIL_SCOPE)
            .doit()
            .await?;

        Ok(())
    }
}
