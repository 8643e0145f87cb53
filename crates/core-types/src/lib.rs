//! Shared primitives for the SoulHarness interaction layer
//!
//! Locators, UI tree snapshots and the driver error type used by every backend adapter,
//! the locator healer and the action executor.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod error;
pub mod locator;
pub mod snapshot;

pub use error::{canonical_kind, kinds, DriverError};
pub use locator::{InvalidLocator, Locator, LocatorStrategy, LocatorValue, UnknownStrategy};
pub use snapshot::{DocumentOrder, DocumentTree, ElementNode};

/// Correlation id of one action invocation
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ActionId(pub String);

impl ActionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for ActionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
