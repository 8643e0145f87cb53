//! Retry policy and failure classification

use std::time::Duration;

use serde::{Deserialize, Serialize};
use soulharness_core_types::{canonical_kind, kinds, DriverError};

/// Error kinds that mean "this locator no longer matches": eligible for healing
pub const LOCATOR_FAILURE_KINDS: [&str; 4] = [
    kinds::STALE_ELEMENT,
    kinds::NO_SUCH_ELEMENT,
    kinds::TIMEOUT,
    kinds::ELEMENT_NOT_INTERACTABLE,
];

/// Default retry count when none is configured
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Fixed delay between retries
pub const DEFAULT_BACKOFF: Duration = Duration::from_millis(300);

/// Whether `error` is a locator-class failure.
///
/// Classification goes through the canonical kind string, so adapters reporting native
/// exception names classify the same way as WebDriver codes.
pub fn is_locator_failure(error: &DriverError) -> bool {
    let kind = canonical_kind(error.kind());
    LOCATOR_FAILURE_KINDS.contains(&kind.as_str())
}

/// Bounded retry policy with a fixed backoff
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,

    /// Delay before each retry
    #[serde(with = "millis")]
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            backoff: DEFAULT_BACKOFF,
        }
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Attempts allowed when no heal happens
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Whether a failure on `attempt` (1-based) may be retried
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt <= self.max_retries
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETRIES)
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locator_failure_classification() {
        assert!(is_locator_failure(&DriverError::stale_element("gone")));
        assert!(is_locator_failure(&DriverError::new(
            "NoSuchElementException",
            "missing"
        )));
        assert!(is_locator_failure(&DriverError::new("ElementNotFoundError", "uia")));
        assert!(is_locator_failure(&DriverError::timeout("slow")));
        assert!(is_locator_failure(&DriverError::not_interactable("hidden")));

        assert!(!is_locator_failure(&DriverError::new("connection refused", "net")));
        assert!(!is_locator_failure(&DriverError::new(
            kinds::INVALID_SESSION,
            "closed"
        )));
    }

    #[test]
    fn test_retry_policy_bounds() {
        let policy = RetryPolicy::new(2);
        assert_eq!(policy.max_attempts(), 3);
        assert!(policy.should_retry(1));
        assert!(policy.should_retry(2));
        assert!(!policy.should_retry(3));

        let none = RetryPolicy::new(0);
        assert_eq!(none.max_attempts(), 1);
        assert!(!none.should_retry(1));
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 2);
        assert_eq!(policy.backoff, Duration::from_millis(300));
    }
}
