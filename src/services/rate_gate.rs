use std::num::NonZeroU32;
use std::time::Duration;

use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};

/// Spaces consecutive outbound fetches so the source site is hit at most
/// once per interval. Must be awaited once per product check, failures
/// included, so a failing request never speeds up the next attempt.
///
/// Token/interval based rather than a bare sleep, so per-domain quotas or
/// bounded parallelism can slot in later without touching the batch runner.
pub struct RateGate {
    limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
}

impl RateGate {
    pub fn new(interval: Duration) -> Self {
        let quota = Quota::with_period(interval)
            .unwrap_or_else(|| Quota::per_second(NonZeroU32::new(1).expect("1 > 0")))
            .allow_burst(NonZeroU32::new(1).expect("1 > 0"));

        Self {
            limiter: RateLimiter::direct(quota),
        }
    }

    /// Suspends until the next permit is available. The first call after
    /// construction returns immediately.
    pub async fn wait(&self) {
        self.limiter.until_ready().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn spaces_permits_by_at_least_the_interval() {
        let interval = Duration::from_millis(40);
        let gate = RateGate::new(interval);

        let start = Instant::now();
        for _ in 0..3 {
            gate.wait().await;
        }

        // Three permits span at least (3 - 1) intervals.
        assert!(
            start.elapsed() >= interval * 2,
            "elapsed {:?} < {:?}",
            start.elapsed(),
            interval * 2
        );
    }

    #[tokio::test]
    async fn first_permit_is_immediate() {
        let gate = RateGate::new(Duration::from_secs(5));

        let start = Instant::now();
        gate.wait().await;

        assert!(start.elapsed() < Duration::from_millis(500));
    }

    #[test]
    fn zero_interval_does_not_panic() {
        let _ = RateGate::new(Duration::ZERO);
    }
}
