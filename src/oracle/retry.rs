//! Exponential backoff policy for oracle requests.
//!
//! Pure data: the policy answers "retry this failure?" and "how long until
//! the next attempt?", both in logic ticks. The pending-request table in the
//! client counts the delay down, so retry behaviour is exercised in tests
//! with synthetic ticks instead of wall-clock sleeps.

use crate::net::TransportError;
use crate::time::secs_to_ticks;

#[derive(Debug, Clone, Copy)]
pub struct Backoff {
    /// Total attempts, the first one included.
    pub max_attempts: u32,
    /// Delay before the second attempt, in ticks.
    pub base_delay_ticks: u32,
    /// Multiplier applied per further attempt.
    pub factor: u32,
}

impl Backoff {
    /// The oracle default: 3 attempts, 1s/2s/4s spacing, quota errors only.
    pub fn oracle_default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ticks: secs_to_ticks(1),
            factor: 2,
        }
    }

    /// Delay after the failure of attempt `attempt` (0-based).
    pub fn delay_ticks(&self, attempt: u32) -> u32 {
        self.base_delay_ticks.saturating_mul(self.factor.saturating_pow(attempt))
    }

    /// Whether a failed attempt should be retried. Only the rate-limited
    /// condition qualifies; everything else propagates immediately.
    pub fn should_retry(&self, attempt: u32, error: &TransportError) -> bool {
        attempt + 1 < self.max_attempts && matches!(error, TransportError::RateLimited(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rate_limited() -> TransportError {
        TransportError::RateLimited("429".into())
    }

    #[test]
    fn delay_schedule_doubles_from_one_second() {
        let b = Backoff::oracle_default();
        assert_eq!(b.delay_ticks(0), 10);
        assert_eq!(b.delay_ticks(1), 20);
        assert_eq!(b.delay_ticks(2), 40);
    }

    #[test]
    fn retries_stop_at_max_attempts() {
        let b = Backoff::oracle_default();
        assert!(b.should_retry(0, &rate_limited()));
        assert!(b.should_retry(1, &rate_limited()));
        assert!(!b.should_retry(2, &rate_limited()));
    }

    #[test]
    fn non_quota_failures_never_retry() {
        let b = Backoff::oracle_default();
        let err = TransportError::Failed("network unreachable".into());
        assert!(!b.should_retry(0, &err));
    }

    #[test]
    fn delay_saturates_instead_of_overflowing() {
        let b = Backoff {
            max_attempts: 64,
            base_delay_ticks: u32::MAX / 2,
            factor: 2,
        };
        assert_eq!(b.delay_ticks(40), u32::MAX);
    }
}
