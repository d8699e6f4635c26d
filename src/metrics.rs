//! Cleanup run metrics
//!
//! The cleaner records into an injected observer rather than process-wide
//! collectors, so tests and embedders see exactly the runs they drive.
//! Logging stays on `tracing` and is not routed through this trait.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::models::{Category, CleanSummary};

/// Observer the cleaner reports progress to
pub trait CleanupMetrics: Send + Sync {
    /// One category finished; `deleted` threads were removed from it
    fn record_category(&self, category: Category, deleted: usize);

    /// A full run finished successfully
    fn record_run(&self, summary: &CleanSummary, duration: Duration);

    /// A run aborted with an error
    fn record_failure(&self);
}

/// Observer that ignores everything (the default)
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetrics;

impl CleanupMetrics for NoopMetrics {
    fn record_category(&self, _category: Category, _deleted: usize) {}
    fn record_run(&self, _summary: &CleanSummary, _duration: Duration) {}
    fn record_failure(&self) {}
}

/// Counter-based metrics suitable for sharing across runs
#[derive(Debug, Default)]
pub struct AtomicMetrics {
    runs_completed: AtomicU64,
    runs_failed: AtomicU64,
    categories_processed: AtomicU64,
    threads_removed: AtomicU64,
}

/// Point-in-time copy of the counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub runs_completed: u64,
    pub runs_failed: u64,
    pub categories_processed: u64,
    pub threads_removed: u64,
}

impl AtomicMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            runs_completed: self.runs_completed.load(Ordering::Relaxed),
            runs_failed: self.runs_failed.load(Ordering::Relaxed),
            categories_processed: self.categories_processed.load(Ordering::Relaxed),
            threads_removed: self.threads_removed.load(Ordering::Relaxed),
        }
    }
}

impl CleanupMetrics for AtomicMetrics {
    fn record_category(&self, _category: Category, deleted: usize) {
        self.categories_processed.fetch_add(1, Ordering::Relaxed);
        self.threads_removed
            .fetch_add(deleted as u64, Ordering::Relaxed);
    }

    fn record_run(&self, _summary: &CleanSummary, _duration: Duration) {
        self.runs_completed.fetch_add(1, Ordering::Relaxed);
    }

    fn record_failure(&self) {
        self.runs_failed.fetch_add(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CompletionReason;
    use std::collections::HashMap;

    fn empty_summary() -> CleanSummary {
        CleanSummary {
            per_category_deleted: HashMap::new(),
            total_deleted: 0,
            completed: true,
            reason: CompletionReason::AllCategoriesProcessed,
        }
    }

    #[test]
    fn test_atomic_metrics_counts() {
        let metrics = AtomicMetrics::new();

        metrics.record_category(Category::Social, 7);
        metrics.record_category(Category::Trash, 3);
        metrics.record_run(&empty_summary(), Duration::from_secs(1));
        metrics.record_failure();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.categories_processed, 2);
        assert_eq!(snapshot.threads_removed, 10);
        assert_eq!(snapshot.runs_completed, 1);
        assert_eq!(snapshot.runs_failed, 1);
    }

    #[test]
    fn test_noop_metrics_is_harmless() {
        let metrics = NoopMetrics;
        metrics.record_category(Category::Updates, 100);
        metrics.record_run(&empty_summary(), Duration::ZERO);
        metrics.record_failure();
    }
}
