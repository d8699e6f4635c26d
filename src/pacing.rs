//! Pacing between Gmail API calls
//!
//! The cleanup loop issues strictly sequential requests, so staying under
//! quota is just a fixed pause between calls. The policy is a trait so tests
//! run with zero delay.

use async_trait::async_trait;
use std::time::Duration;

/// Default pause between paginated listing calls and between categories
pub const DEFAULT_PAGE_DELAY: Duration = Duration::from_millis(200);

/// Pacing policy applied between consecutive remote calls
#[async_trait]
pub trait Pacer: Send + Sync {
    async fn wait_before_next_call(&self);
}

/// Fixed-delay pacer used in production
#[derive(Debug, Clone)]
pub struct FixedDelayPacer {
    delay: Duration,
}

impl FixedDelayPacer {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for FixedDelayPacer {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_DELAY)
    }
}

#[async_trait]
impl Pacer for FixedDelayPacer {
    async fn wait_before_next_call(&self) {
        tokio::time::sleep(self.delay).await;
    }
}

/// Zero-delay pacer for tests
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelayPacer;

#[async_trait]
impl Pacer for NoDelayPacer {
    async fn wait_before_next_call(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn test_fixed_delay_pacer_waits() {
        let pacer = FixedDelayPacer::new(Duration::from_millis(50));

        let start = Instant::now();
        pacer.wait_before_next_call().await;
        let elapsed = start.elapsed();

        assert!(elapsed.as_millis() >= 40, "Should have paused ~50ms");
    }

    #[tokio::test]
    async fn test_default_delay_is_200ms() {
        assert_eq!(FixedDelayPacer::default().delay, Duration::from_millis(200));
    }

    #[tokio::test]
    async fn test_no_delay_pacer_returns_immediately() {
        let start = Instant::now();
        NoDelayPacer.wait_before_next_call().await;
        assert!(start.elapsed().as_millis() < 10);
    }
}
