//! Resilient action execution
//!
//! Runs UI operations (click, type, read) against a possibly flaky interface:
//! - bounded retries with a fixed backoff
//! - failure classification by stable error kind
//! - one-shot locator healing on locator-class failures, recorded in the ledger
//! - best-effort diagnostics on every failed attempt
//!
//! `ActionFailed` is the only error that leaves the executor.

pub mod errors;
pub mod executor;
pub mod offline;
pub mod page;
pub mod ports;
pub mod strategies;
pub mod types;

pub use errors::{ActionFailed, DiagnosticsError};
pub use executor::ActionExecutor;
pub use offline::{DriverCall, SnapshotDriver};
pub use page::{BasePage, DEFAULT_ELEMENT_WAIT};
pub use ports::{AttachmentKind, DiagnosticsSink, ElementHandle, NullSink, UiDriver};
pub use strategies::{is_locator_failure, RetryPolicy, LOCATOR_FAILURE_KINDS};
pub use types::{ActionInvocation, AttemptOutcome, AttemptRecord, FinalOutcome};
