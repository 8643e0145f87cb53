//! Error types for the locator healer and the healing ledger

use thiserror::Error;

/// Healer error enumeration
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LocatorError {
    /// Healing entries must score strictly above the acceptance threshold
    #[error("Heal score {score:.3} does not exceed threshold {threshold}")]
    ScoreBelowThreshold { score: f64, threshold: f64 },
}

/// Ledger storage errors
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Filesystem failure while reading or replacing the ledger file
    #[error("Ledger I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Ledger contents could not be serialized
    #[error("Ledger serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
