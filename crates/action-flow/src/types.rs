//! Records of one action invocation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use soulharness_core_types::{ActionId, DriverError, Locator};

/// Result of one attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptOutcome {
    Success,
    Failure,
}

/// One run of the operation inside an invocation. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptRecord {
    sequence: u32,
    locator_used: Locator,
    outcome: AttemptOutcome,
    error_kind: Option<String>,
    timestamp: DateTime<Utc>,
}

impl AttemptRecord {
    pub fn success(sequence: u32, locator_used: Locator) -> Self {
        Self {
            sequence,
            locator_used,
            outcome: AttemptOutcome::Success,
            error_kind: None,
            timestamp: Utc::now(),
        }
    }

    pub fn failure(sequence: u32, locator_used: Locator, error: &DriverError) -> Self {
        Self {
            sequence,
            locator_used,
            outcome: AttemptOutcome::Failure,
            error_kind: Some(error.kind().to_string()),
            timestamp: Utc::now(),
        }
    }

    /// 1-based, strictly increasing within an invocation
    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    pub fn locator_used(&self) -> &Locator {
        &self.locator_used
    }

    pub fn outcome(&self) -> AttemptOutcome {
        self.outcome
    }

    pub fn error_kind(&self) -> Option<&str> {
        self.error_kind.as_deref()
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Terminal state of an invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinalOutcome {
    Success,
    Failed,
}

/// Everything that happened during one executor call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionInvocation {
    pub id: ActionId,
    pub action_name: String,
    pub original_locator: Locator,
    pub healed_locator: Option<Locator>,
    attempts: Vec<AttemptRecord>,
    pub final_outcome: Option<FinalOutcome>,
}

impl ActionInvocation {
    pub fn new(action_name: impl Into<String>, original_locator: Locator) -> Self {
        Self {
            id: ActionId::new(),
            action_name: action_name.into(),
            original_locator,
            healed_locator: None,
            attempts: Vec::new(),
            final_outcome: None,
        }
    }

    /// Locator the next attempt runs with
    pub fn active_locator(&self) -> &Locator {
        self.healed_locator.as_ref().unwrap_or(&self.original_locator)
    }

    /// Sequence number for the next attempt
    pub fn next_sequence(&self) -> u32 {
        self.attempts.len() as u32 + 1
    }

    pub fn push(&mut self, record: AttemptRecord) {
        self.attempts.push(record);
    }

    pub fn attempts(&self) -> &[AttemptRecord] {
        &self.attempts
    }

    pub fn attempt_count(&self) -> u32 {
        self.attempts.len() as u32
    }

    pub fn succeeded(&self) -> bool {
        self.final_outcome == Some(FinalOutcome::Success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_locator_prefers_healed() {
        let mut invocation = ActionInvocation::new("click", Locator::id("userName"));
        assert_eq!(invocation.active_locator(), &Locator::id("userName"));

        invocation.healed_locator = Some(Locator::id("usernameField"));
        assert_eq!(invocation.active_locator(), &Locator::id("usernameField"));
        assert_eq!(invocation.original_locator, Locator::id("userName"));
    }

    #[test]
    fn test_invocations_get_distinct_ids() {
        let first = ActionInvocation::new("click", Locator::id("a"));
        let second = ActionInvocation::new("click", Locator::id("a"));
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn test_sequence_numbers() {
        let mut invocation = ActionInvocation::new("click", Locator::id("a"));
        assert_eq!(invocation.next_sequence(), 1);
        invocation.push(AttemptRecord::failure(
            1,
            Locator::id("a"),
            &DriverError::stale_element("gone"),
        ));
        assert_eq!(invocation.next_sequence(), 2);
        assert_eq!(
            invocation.attempts()[0].error_kind(),
            Some("stale element reference")
        );
    }
}
