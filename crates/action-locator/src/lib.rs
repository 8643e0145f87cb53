//! Locator self-heal - similarity-based re-resolution of failed locators
//!
//! This crate provides:
//! - Ratcliff/Obershelp similarity scoring with a fixed acceptance threshold
//! - XPath predicate extraction and attribute search over UI snapshots
//! - The `LocatorHealer` trait and its default policy
//! - The healing ledger, an audit record of every heal applied

pub mod errors;
pub mod healer;
pub mod ledger;
pub mod similarity;
pub mod strategies;
pub mod types;

pub use errors::*;
pub use healer::*;
pub use ledger::*;
pub use similarity::*;
pub use strategies::*;
pub use types::*;
