//! Retry classification and backoff computation.
//!
//! One shared home for the rate-limit predicate and the exponential delay
//! schedule, used by the model gateway and by the code-generating tools —
//! instead of each caller string-matching on its own.

use std::time::Duration;

/// Whether an error message indicates a rate-limit/quota condition.
///
/// Case-insensitive substring match; these are the only failures worth
/// retrying — everything else is fatal immediately.
pub fn is_rate_limited(message: &str) -> bool {
    let msg = message.to_lowercase();
    msg.contains("429") || msg.contains("quota") || msg.contains("rate limit")
}

/// Exponential backoff: `base * 2^attempt` (attempt is 0-based).
pub fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base * 2u32.saturating_pow(attempt)
}

/// A bounded retry schedule: attempt counter, computed delay, and the
/// classification predicate in one place.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts allowed (default 3).
    pub max_retries: u32,

    /// First delay; doubles per attempt (default 2s → 2s, 4s, 8s).
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// Whether another attempt should follow the given failure.
    /// `attempt` is the 0-based index of the attempt that just failed.
    pub fn should_retry(&self, error_message: &str, attempt: u32) -> bool {
        attempt + 1 < self.max_retries && is_rate_limited(error_message)
    }

    /// The delay to sleep after the given failed attempt.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        backoff_delay(self.base_delay, attempt)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(2),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_rate_limit_messages() {
        assert!(is_rate_limited("HTTP 429 Too Many Requests"));
        assert!(is_rate_limited("Quota exceeded for project"));
        assert!(is_rate_limited("Rate Limit hit, slow down"));
    }

    #[test]
    fn ignores_other_failures() {
        assert!(!is_rate_limited("connection refused"));
        assert!(!is_rate_limited("HTTP 500 Internal Server Error"));
        assert!(!is_rate_limited("invalid API key"));
    }

    #[test]
    fn backoff_schedule_is_exact() {
        let base = Duration::from_secs_f64(2.0);
        assert_eq!(backoff_delay(base, 0), Duration::from_secs_f64(2.0));
        assert_eq!(backoff_delay(base, 1), Duration::from_secs_f64(4.0));
        assert_eq!(backoff_delay(base, 2), Duration::from_secs_f64(8.0));
    }

    #[test]
    fn policy_retries_only_within_budget() {
        let policy = RetryPolicy::default();
        assert!(policy.should_retry("429", 0));
        assert!(policy.should_retry("429", 1));
        // Third failure exhausts the 3-attempt budget.
        assert!(!policy.should_retry("429", 2));
    }

    #[test]
    fn policy_never_retries_fatal_errors() {
        let policy = RetryPolicy::default();
        assert!(!policy.should_retry("bad request", 0));
    }

    #[test]
    fn policy_delay_doubles() {
        let policy = RetryPolicy::new(5, Duration::from_millis(100));
        assert_eq!(policy.delay_for(0), Duration::from_millis(100));
        assert_eq!(policy.delay_for(3), Duration::from_millis(800));
    }
}
