//! Driver error shared by every backend adapter

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable error kind identifiers (W3C WebDriver error codes).
///
/// Adapters for non-WebDriver backends map their native failures onto the same codes so
/// failure classification works the same way for every backend.
pub mod kinds {
    pub const STALE_ELEMENT: &str = "stale element reference";
    pub const NO_SUCH_ELEMENT: &str = "no such element";
    pub const TIMEOUT: &str = "timeout";
    pub const ELEMENT_NOT_INTERACTABLE: &str = "element not interactable";
    pub const INVALID_SESSION: &str = "invalid session id";
    pub const UNSUPPORTED_OPERATION: &str = "unsupported operation";
    pub const UNKNOWN_ERROR: &str = "unknown error";
}

/// Native exception names some adapters report instead of a code
const KIND_ALIASES: &[(&str, &str)] = &[
    ("staleelementreferenceexception", kinds::STALE_ELEMENT),
    ("stale-element", kinds::STALE_ELEMENT),
    ("nosuchelementexception", kinds::NO_SUCH_ELEMENT),
    ("elementnotfounderror", kinds::NO_SUCH_ELEMENT),
    ("not-found", kinds::NO_SUCH_ELEMENT),
    ("timeoutexception", kinds::TIMEOUT),
    ("elementnotinteractableexception", kinds::ELEMENT_NOT_INTERACTABLE),
    ("not-interactable", kinds::ELEMENT_NOT_INTERACTABLE),
];

/// Error returned by a UI driver operation.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{kind}: {message}")]
pub struct DriverError {
    kind: String,
    message: String,
}

impl DriverError {
    /// Create an error; `kind` is normalized to its canonical identifier
    pub fn new(kind: impl AsRef<str>, message: impl Into<String>) -> Self {
        Self {
            kind: canonical_kind(kind.as_ref()),
            message: message.into(),
        }
    }

    pub fn stale_element(message: impl Into<String>) -> Self {
        Self::new(kinds::STALE_ELEMENT, message)
    }

    pub fn no_such_element(message: impl Into<String>) -> Self {
        Self::new(kinds::NO_SUCH_ELEMENT, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(kinds::TIMEOUT, message)
    }

    pub fn not_interactable(message: impl Into<String>) -> Self {
        Self::new(kinds::ELEMENT_NOT_INTERACTABLE, message)
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::new(kinds::UNSUPPORTED_OPERATION, message)
    }

    /// Canonical kind identifier
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Normalize a raw kind (code or exception name) to its canonical identifier.
pub fn canonical_kind(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return kinds::UNKNOWN_ERROR.to_string();
    }
    let lowered = trimmed.to_ascii_lowercase();
    KIND_ALIASES
        .iter()
        .find(|(alias, _)| *alias == lowered)
        .map(|(_, canonical)| (*canonical).to_string())
        .unwrap_or(lowered)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aliases_normalize() {
        let err = DriverError::new("StaleElementReferenceException", "gone");
        assert_eq!(err.kind(), kinds::STALE_ELEMENT);

        let err = DriverError::new("ElementNotFoundError", "no window child");
        assert_eq!(err.kind(), kinds::NO_SUCH_ELEMENT);

        let err = DriverError::new("  Timeout ", "slow");
        assert_eq!(err.kind(), kinds::TIMEOUT);
    }

    #[test]
    fn test_unknown_kind_kept_lowercase() {
        let err = DriverError::new("Connection Refused", "net down");
        assert_eq!(err.kind(), "connection refused");
        assert_eq!(DriverError::new("", "x").kind(), kinds::UNKNOWN_ERROR);
    }

    #[test]
    fn test_display() {
        let err = DriverError::no_such_element("id:userName");
        assert_eq!(err.to_string(), "no such element: id:userName");
    }
}
