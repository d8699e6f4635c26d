//! Shared test helpers: an in-memory Gmail fake
//!
//! The fake keeps per-label thread lists in a mutex, serves them out in pages
//! the way the real API does (offset continuation tokens, estimates equal to
//! the remaining count), and records every call so tests can assert on the
//! exact request sequence. Failures are injected per label or per thread id.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use mailsweep::client::{GmailClient, ThreadPage};
use mailsweep::error::{Result, SweepError};

/// Which error an injected failure produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    Auth,
    Server,
    NotFound,
}

impl Failure {
    fn to_error(self, context: &str) -> SweepError {
        match self {
            Failure::Auth => SweepError::AuthError(format!("token rejected: {}", context)),
            Failure::Server => SweepError::ServerError {
                status: 503,
                message: format!("backend error: {}", context),
            },
            Failure::NotFound => SweepError::NotFound(context.to_string()),
        }
    }
}

/// One recorded API call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List {
        label_id: String,
        page_size: u32,
        page_token: Option<String>,
    },
    Modify {
        thread_id: String,
        add_label_ids: Vec<String>,
        remove_label_ids: Vec<String>,
    },
    Delete {
        thread_id: String,
    },
}

#[derive(Debug, Default)]
struct FakeState {
    /// Thread ids per label, in listing order
    labels: HashMap<String, Vec<String>>,
    calls: Vec<Call>,
    fail_list_for_label: HashMap<String, Failure>,
    /// Listing failures that only start after N successful calls for a label
    fail_list_after: HashMap<String, (usize, Failure)>,
    fail_modify_for_thread: HashMap<String, Failure>,
    fail_delete_for_thread: HashMap<String, Failure>,
    /// Added to every reported estimate for a label; models the lag between
    /// deletions and the provider's `resultSizeEstimate`
    estimate_bias: HashMap<String, u64>,
    /// Labels whose listing returns empty pages that still carry a token
    stale_token_labels: Vec<String>,
}

/// Scripted in-memory stand-in for the Gmail API
#[derive(Debug, Default)]
pub struct FakeGmailClient {
    state: Mutex<FakeState>,
}

impl FakeGmailClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed `count` threads under `label_id`, with ids `<prefix>-1` onward
    pub fn with_threads(self, label_id: &str, prefix: &str, count: usize) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            let threads = state.labels.entry(label_id.to_string()).or_default();
            for i in 1..=count {
                threads.push(format!("{}-{}", prefix, i));
            }
        }
        self
    }

    /// Every listing call for `label_id` fails
    pub fn failing_list(self, label_id: &str, failure: Failure) -> Self {
        self.state
            .lock()
            .unwrap()
            .fail_list_for_label
            .insert(label_id.to_string(), failure);
        self
    }

    /// Listing `label_id` succeeds `calls` times, then fails
    pub fn failing_list_after(self, label_id: &str, calls: usize, failure: Failure) -> Self {
        self.state
            .lock()
            .unwrap()
            .fail_list_after
            .insert(label_id.to_string(), (calls, failure));
        self
    }

    /// The modify call for `thread_id` fails
    pub fn failing_modify(self, thread_id: &str, failure: Failure) -> Self {
        self.state
            .lock()
            .unwrap()
            .fail_modify_for_thread
            .insert(thread_id.to_string(), failure);
        self
    }

    /// The delete call for `thread_id` fails
    pub fn failing_delete(self, thread_id: &str, failure: Failure) -> Self {
        self.state
            .lock()
            .unwrap()
            .fail_delete_for_thread
            .insert(thread_id.to_string(), failure);
        self
    }

    /// Inflate every estimate reported for `label_id` by `bias`
    pub fn with_estimate_bias(self, label_id: &str, bias: u64) -> Self {
        self.state
            .lock()
            .unwrap()
            .estimate_bias
            .insert(label_id.to_string(), bias);
        self
    }

    /// Listing `label_id` yields empty pages that still carry a token
    pub fn with_stale_token(self, label_id: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .stale_token_labels
            .push(label_id.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Thread ids that were moved (modify calls), in order
    pub fn modified_threads(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Modify { thread_id, .. } => Some(thread_id),
                _ => None,
            })
            .collect()
    }

    /// Thread ids that were permanently deleted, in order
    pub fn deleted_threads(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Delete { thread_id } => Some(thread_id),
                _ => None,
            })
            .collect()
    }

    /// Largest page size any listing call asked for
    pub fn max_page_size_requested(&self) -> u32 {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::List { page_size, .. } => Some(page_size),
                _ => None,
            })
            .max()
            .unwrap_or(0)
    }

    /// Number of listing calls made for `label_id`
    pub fn list_calls_for(&self, label_id: &str) -> usize {
        self.calls()
            .into_iter()
            .filter(|call| matches!(call, Call::List { label_id: l, .. } if l == label_id))
            .count()
    }

    /// Threads still present under `label_id`
    pub fn remaining(&self, label_id: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .labels
            .get(label_id)
            .map(Vec::len)
            .unwrap_or(0)
    }

    fn remove_thread(state: &mut FakeState, thread_id: &str) {
        for threads in state.labels.values_mut() {
            threads.retain(|id| id != thread_id);
        }
    }
}

#[async_trait]
impl GmailClient for FakeGmailClient {
    async fn list_threads_page(
        &self,
        _user_id: &str,
        label_id: &str,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<ThreadPage> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::List {
            label_id: label_id.to_string(),
            page_size,
            page_token: page_token.map(str::to_string),
        });

        if let Some(failure) = state.fail_list_for_label.get(label_id) {
            return Err(failure.to_error(label_id));
        }

        if let Some(&(allowed, failure)) = state.fail_list_after.get(label_id) {
            let prior = state
                .calls
                .iter()
                .filter(|call| matches!(call, Call::List { label_id: l, .. } if l == label_id))
                .count();
            // The call being served was already recorded above
            if prior > allowed {
                return Err(failure.to_error(label_id));
            }
        }

        if state.stale_token_labels.iter().any(|l| l == label_id) {
            return Ok(ThreadPage {
                ids: Vec::new(),
                next_page_token: Some("0".to_string()),
                result_size_estimate: 0,
            });
        }

        let threads = state.labels.get(label_id).cloned().unwrap_or_default();
        let offset: usize = match page_token {
            Some(token) => token
                .parse()
                .map_err(|_| SweepError::BadRequest(format!("bad page token '{}'", token)))?,
            None => 0,
        };

        let end = (offset + page_size as usize).min(threads.len());
        let ids = threads[offset.min(threads.len())..end].to_vec();
        let next_page_token = if end < threads.len() {
            Some(end.to_string())
        } else {
            None
        };

        let bias = state.estimate_bias.get(label_id).copied().unwrap_or(0);

        Ok(ThreadPage {
            ids,
            next_page_token,
            result_size_estimate: threads.len() as u64 + bias,
        })
    }

    async fn modify_thread(
        &self,
        _user_id: &str,
        thread_id: &str,
        add_label_ids: &[String],
        remove_label_ids: &[String],
    ) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Modify {
            thread_id: thread_id.to_string(),
            add_label_ids: add_label_ids.to_vec(),
            remove_label_ids: remove_label_ids.to_vec(),
        });

        if let Some(failure) = state.fail_modify_for_thread.get(thread_id) {
            return Err(failure.to_error(thread_id));
        }

        // Moving to trash takes the thread out of its category listing
        Self::remove_thread(&mut state, thread_id);
        Ok(())
    }

    async fn delete_thread(&self, _user_id: &str, thread_id: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Delete {
            thread_id: thread_id.to_string(),
        });

        if let Some(failure) = state.fail_delete_for_thread.get(thread_id) {
            return Err(failure.to_error(thread_id));
        }

        Self::remove_thread(&mut state, thread_id);
        Ok(())
    }
}
