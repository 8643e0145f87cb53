//! Value types produced by the healer and stored by the ledger

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use soulharness_core_types::Locator;

use crate::errors::LocatorError;
use crate::similarity::{exceeds_threshold, HEAL_THRESHOLD};

/// Replacement locator proposed by a healer
#[derive(Debug, Clone, PartialEq)]
pub struct HealProposal {
    /// Locator that failed
    pub original: Locator,

    /// Newly synthesized locator
    pub healed: Locator,

    /// Attribute the match was found on
    pub attribute: &'static str,

    /// Attribute value that matched
    pub matched_value: String,

    /// Similarity score, always above the heal threshold
    pub score: f64,
}

impl HealProposal {
    /// Convert the proposal into a ledger entry stamped with the current time
    pub fn to_entry(&self) -> Result<HealingEntry, LocatorError> {
        HealingEntry::new(self.original.clone(), self.healed.clone(), self.score)
    }
}

/// One heal recorded in the ledger.
///
/// Stored as `{"old": ..., "new": ..., "score": ..., "discovered_at": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StoredEntry")]
pub struct HealingEntry {
    #[serde(rename = "old")]
    original: Locator,

    #[serde(rename = "new")]
    healed: Locator,

    score: f64,

    discovered_at: DateTime<Utc>,
}

/// Ledger form of an entry before its score is validated
#[derive(Deserialize)]
struct StoredEntry {
    old: Locator,
    new: Locator,
    score: f64,
    discovered_at: DateTime<Utc>,
}

impl TryFrom<StoredEntry> for HealingEntry {
    type Error = LocatorError;

    fn try_from(stored: StoredEntry) -> Result<Self, Self::Error> {
        Self::discovered_at(stored.old, stored.new, stored.score, stored.discovered_at)
    }
}

impl HealingEntry {
    /// Create an entry discovered now. Fails when `score` does not exceed the threshold.
    pub fn new(original: Locator, healed: Locator, score: f64) -> Result<Self, LocatorError> {
        Self::discovered_at(original, healed, score, Utc::now())
    }

    pub fn discovered_at(
        original: Locator,
        healed: Locator,
        score: f64,
        discovered_at: DateTime<Utc>,
    ) -> Result<Self, LocatorError> {
        if !exceeds_threshold(score) || score > 1.0 {
            return Err(LocatorError::ScoreBelowThreshold {
                score,
                threshold: HEAL_THRESHOLD,
            });
        }
        Ok(Self {
            original,
            healed,
            score,
            discovered_at,
        })
    }

    pub fn original(&self) -> &Locator {
        &self.original
    }

    pub fn healed(&self) -> &Locator {
        &self.healed
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn discovered(&self) -> DateTime<Utc> {
        self.discovered_at
    }

    /// Ledger key of the original locator
    pub fn key(&self) -> String {
        self.original.key()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_rejects_threshold_score() {
        let err = HealingEntry::new(Locator::id("a"), Locator::id("b"), 0.7).unwrap_err();
        assert!(matches!(err, LocatorError::ScoreBelowThreshold { .. }));
        assert!(HealingEntry::new(Locator::id("a"), Locator::id("b"), 1.2).is_err());
        assert!(HealingEntry::new(Locator::id("a"), Locator::id("b"), 0.71).is_ok());
    }

    #[test]
    fn test_entry_serde_shape() {
        let entry =
            HealingEntry::new(Locator::id("userName"), Locator::id("usernameField"), 0.76)
                .unwrap();
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["old"]["value"], "userName");
        assert_eq!(json["new"]["value"], "usernameField");
        assert!(json["discovered_at"].is_string());
        assert_eq!(entry.key(), "id:userName");
    }

    #[test]
    fn test_deserialize_validates_score() {
        let stored = serde_json::json!({
            "old": {"strategy": "id", "value": "userName"},
            "new": {"strategy": "id", "value": "usernameField"},
            "score": 0.4,
            "discovered_at": "2024-05-01T10:00:00Z"
        });
        assert!(serde_json::from_value::<HealingEntry>(stored.clone()).is_err());

        let mut valid = stored;
        valid["score"] = serde_json::json!(0.76);
        let entry: HealingEntry = serde_json::from_value(valid).unwrap();
        assert_eq!(entry.healed(), &Locator::id("usernameField"));
    }
}
