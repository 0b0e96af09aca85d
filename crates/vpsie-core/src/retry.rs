//! Retry policy and the per-call retry state machine.
//!
//! [`RetryPolicy`] is configuration. [`RetryState`] is created fresh for every
//! call and decides, after each transient failure, whether to back off and try
//! again or give up. It performs no I/O so the decisions can be tested directly.

use rand::Rng;
use std::time::Duration;

/// Default total number of attempts per call.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default initial retry delay in milliseconds
pub const DEFAULT_RETRY_DELAY_MS: u64 = 500;

/// Default maximum retry delay in milliseconds (for exponential backoff)
pub const DEFAULT_RETRY_MAX_DELAY_MS: u64 = 5000;

/// Retry policy with exponential backoff and optional jitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per call, including the first one
    pub max_attempts: u32,

    /// Delay before the first retry
    pub initial_delay: Duration,

    /// Maximum delay between retries (cap for exponential backoff)
    pub max_delay: Duration,

    /// Backoff multiplier
    pub backoff_multiplier: u32,

    /// Randomize each delay within its upper half
    pub jitter: bool,
}

impl RetryPolicy {
    /// Create a new retry policy with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
            max_delay: Duration::from_millis(DEFAULT_RETRY_MAX_DELAY_MS),
            backoff_multiplier: 2,
            jitter: true,
        }
    }

    /// Create a retry policy that makes a single attempt.
    #[must_use]
    pub const fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            initial_delay: Duration::from_millis(0),
            max_delay: Duration::from_millis(0),
            backoff_multiplier: 1,
            jitter: false,
        }
    }

    /// Set the total number of attempts.
    #[must_use]
    pub const fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Set the initial delay.
    #[must_use]
    pub const fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Set the maximum delay.
    #[must_use]
    pub const fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Set the backoff multiplier.
    #[must_use]
    pub const fn with_backoff_multiplier(mut self, multiplier: u32) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// Enable or disable jitter.
    #[must_use]
    pub const fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Attempts actually made; a policy of zero still makes one.
    #[must_use]
    pub const fn effective_max_attempts(&self) -> u32 {
        if self.max_attempts == 0 {
            1
        } else {
            self.max_attempts
        }
    }

    /// Un-jittered delay before retry number `retry` (1-based).
    ///
    /// delay = min(initial_delay * multiplier^(retry - 1), max_delay)
    #[must_use]
    pub fn delay_for_retry(&self, retry: u32) -> Duration {
        if retry == 0 {
            return Duration::ZERO;
        }

        let multiplier = self.backoff_multiplier.saturating_pow(retry - 1);
        let delay = self.initial_delay.saturating_mul(multiplier);

        std::cmp::min(delay, self.max_delay)
    }

    /// Delay before retry number `retry`, with jitter applied when enabled.
    ///
    /// Jittered delays fall in `[delay / 2, delay]`.
    #[must_use]
    pub fn backoff(&self, retry: u32) -> Duration {
        let delay = self.delay_for_retry(retry);
        if !self.jitter || delay.is_zero() {
            return delay;
        }

        let millis = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        let half = millis / 2;
        let spread = rand::thread_rng().gen_range(0..=millis - half);
        Duration::from_millis(half + spread)
    }

    /// Check if retries are enabled.
    #[must_use]
    pub const fn has_retries(&self) -> bool {
        self.effective_max_attempts() > 1
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new()
    }
}

/// What to do after a transient failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Sleep for `delay`, then make another attempt.
    Retry {
        /// Backoff before the next attempt
        delay: Duration,
    },
    /// The attempt budget is spent.
    GiveUp,
}

/// Attempt bookkeeping for a single call.
#[derive(Debug, Clone)]
pub struct RetryState {
    policy: RetryPolicy,
    attempts: u32,
}

impl RetryState {
    /// Fresh state; no attempt has been made yet.
    #[must_use]
    pub const fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            attempts: 0,
        }
    }

    /// Record the start of an attempt and return its 1-based number.
    pub fn start_attempt(&mut self) -> u32 {
        self.attempts += 1;
        self.attempts
    }

    /// Attempts started so far.
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Decide what follows a transient failure of the current attempt.
    #[must_use]
    pub fn on_transient_failure(&self) -> RetryDecision {
        if self.attempts >= self.policy.effective_max_attempts() {
            RetryDecision::GiveUp
        } else {
            RetryDecision::Retry {
                delay: self.policy.backoff(self.attempts),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_policy_new() {
        let policy = RetryPolicy::new();
        assert_eq!(policy.max_attempts, DEFAULT_MAX_ATTEMPTS);
        assert_eq!(policy.initial_delay, Duration::from_millis(DEFAULT_RETRY_DELAY_MS));
        assert_eq!(policy.max_delay, Duration::from_millis(DEFAULT_RETRY_MAX_DELAY_MS));
        assert_eq!(policy.backoff_multiplier, 2);
        assert!(policy.jitter);
    }

    #[test]
    fn test_retry_policy_no_retry() {
        let policy = RetryPolicy::no_retry();
        assert_eq!(policy.max_attempts, 1);
        assert!(!policy.has_retries());
        assert!(!RetryPolicy::new().with_max_attempts(0).has_retries());
    }

    #[test]
    fn test_retry_policy_delay_calculation() {
        let policy = RetryPolicy::new().with_jitter(false);

        assert_eq!(policy.delay_for_retry(0), Duration::ZERO);
        assert_eq!(policy.delay_for_retry(1), Duration::from_millis(500));
        assert_eq!(policy.delay_for_retry(2), Duration::from_millis(1000));
        assert_eq!(policy.delay_for_retry(3), Duration::from_millis(2000));
        assert_eq!(policy.delay_for_retry(4), Duration::from_millis(4000));
        // 8000ms capped at max_delay
        assert_eq!(policy.delay_for_retry(5), Duration::from_millis(5000));
        assert_eq!(policy.backoff(2), Duration::from_millis(1000));
    }

    #[test]
    fn test_jittered_backoff_stays_in_upper_half() {
        let policy = RetryPolicy::new();
        for retry in 1..=6 {
            let ceiling = policy.delay_for_retry(retry);
            for _ in 0..50 {
                let delay = policy.backoff(retry);
                assert!(delay <= ceiling, "{delay:?} > {ceiling:?}");
                assert!(delay >= ceiling / 2, "{delay:?} < half of {ceiling:?}");
            }
        }
    }

    #[test]
    fn test_state_allows_exactly_max_attempts() {
        let policy = RetryPolicy::new()
            .with_max_attempts(3)
            .with_jitter(false)
            .with_initial_delay(Duration::from_millis(100));
        let mut state = RetryState::new(policy);

        assert_eq!(state.start_attempt(), 1);
        assert_eq!(
            state.on_transient_failure(),
            RetryDecision::Retry {
                delay: Duration::from_millis(100)
            }
        );

        assert_eq!(state.start_attempt(), 2);
        assert_eq!(
            state.on_transient_failure(),
            RetryDecision::Retry {
                delay: Duration::from_millis(200)
            }
        );

        assert_eq!(state.start_attempt(), 3);
        assert_eq!(state.on_transient_failure(), RetryDecision::GiveUp);
        assert_eq!(state.attempts(), 3);
    }

    #[test]
    fn test_state_single_attempt_gives_up_immediately() {
        let mut state = RetryState::new(RetryPolicy::no_retry());
        state.start_attempt();
        assert_eq!(state.on_transient_failure(), RetryDecision::GiveUp);
    }

    #[test]
    fn test_retry_constants() {
        assert_eq!(DEFAULT_MAX_ATTEMPTS, 3);
        assert_eq!(DEFAULT_RETRY_DELAY_MS, 500);
        assert_eq!(DEFAULT_RETRY_MAX_DELAY_MS, 5000);
    }
}
