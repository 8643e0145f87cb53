//! Action execution error types

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Terminal failure of one action invocation.
///
/// Raised only after every retry and the single heal attempt are exhausted; carries the
/// last underlying driver error.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("Action '{action_name}' failed after {attempts} attempt(s): {kind}: {message}")]
pub struct ActionFailed {
    /// Name of the action, e.g. `Clicking element id:submit`
    pub action_name: String,

    /// Canonical kind of the last error
    pub kind: String,

    /// Message of the last error
    pub message: String,

    /// Number of times the operation ran
    pub attempts: u32,
}

/// Diagnostics sink errors. Never escalated past the executor.
#[derive(Debug, Error)]
pub enum DiagnosticsError {
    /// Attachment could not be written
    #[error("Diagnostics I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Sink rejected the attachment
    #[error("Diagnostics sink rejected attachment: {0}")]
    Rejected(String),
}
