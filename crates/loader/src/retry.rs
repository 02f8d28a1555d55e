use std::time::Duration;

pub const BASE_DELAY: Duration = Duration::from_millis(1000);
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Whether a load failure is worth retrying.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorClass {
    /// Likely to succeed on retry: network hiccups, timeouts, a deferred
    /// unit that failed to arrive.
    Transient,
    /// Will not succeed on retry, e.g. a malformed unit. Propagated
    /// immediately.
    Fatal,
}

/// Substrings that mark a failure as transient, matched case-insensitively
/// against the error message. This is the same signature set the viewer
/// sees from failed dynamic loads and dropped fetches.
const TRANSIENT_PATTERNS: &[&str] = &[
    "failed to fetch",
    "networkerror",
    "network error",
    "timed out",
    "timeout",
    "connection reset",
    "connection refused",
    "dynamically imported module",
    "importing a module script failed",
];

pub fn classify(message: &str) -> ErrorClass {
    let message = message.to_ascii_lowercase();
    if TRANSIENT_PATTERNS.iter().any(|p| message.contains(p)) {
        ErrorClass::Transient
    } else {
        ErrorClass::Fatal
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub base_delay: Duration,
    pub max_retries: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            base_delay: BASE_DELAY,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

impl RetryPolicy {
    pub fn new(base_delay: Duration, max_retries: u32) -> Self {
        Self {
            base_delay,
            max_retries,
        }
    }

    pub fn with_max_retries(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    /// Backoff before retry `n` (0-based): `base_delay * 2^n`, saturating.
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 1u32.checked_shl(retry).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }
}

/// What the schedule decided after a failure.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Fatal error: stop now, no retry counts against the budget.
    Abort,
    /// Transient error with retries left: wait, then try again.
    RetryAfter(Duration),
    /// Transient error with the retry budget spent.
    Exhausted,
}

/// One load call's retry state machine:
/// `Attempting -> {Success | Backoff -> Attempting | Failed}`.
///
/// Pure and synchronous; the async driver in [`crate::load`] owns the
/// actual waiting. Each load call gets its own instance, so concurrent
/// loads never share state.
#[derive(Debug)]
pub struct RetrySchedule {
    policy: RetryPolicy,
    failures: u32,
}

impl RetrySchedule {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            failures: 0,
        }
    }

    /// Attempts made so far, counting the failures recorded.
    pub fn attempts_made(&self) -> u32 {
        self.failures
    }

    /// Records a failed attempt and decides what happens next.
    pub fn on_failure(&mut self, message: &str) -> RetryDecision {
        match classify(message) {
            ErrorClass::Fatal => RetryDecision::Abort,
            ErrorClass::Transient => {
                let retry = self.failures;
                self.failures += 1;
                if retry >= self.policy.max_retries {
                    RetryDecision::Exhausted
                } else {
                    RetryDecision::RetryAfter(self.policy.delay_for(retry))
                }
            }
        }
    }
}
