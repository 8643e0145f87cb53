//! Offline driver backed by a static UI snapshot
//!
//! Resolves locators against a `DocumentTree` instead of a live session. Used by the
//! replay command and by tests, which can script failures for upcoming interactions.

use std::collections::{BTreeMap, VecDeque};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use soulharness_core_types::{DocumentTree, DriverError, Locator};
use tracing::debug;

use crate::ports::{ElementHandle, UiDriver};

/// Interaction performed against a [`SnapshotDriver`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverCall {
    Locate(Locator),
    Click(Locator),
    SendKeys(Locator, String),
    WaitFor(Locator),
    WaitForClickable(Locator),
    WaitForText(Locator, String),
}

/// `UiDriver` over a static snapshot
#[derive(Debug, Default)]
pub struct SnapshotDriver {
    snapshot: Mutex<DocumentTree>,
    scripted: Mutex<VecDeque<DriverError>>,
    calls: Mutex<Vec<DriverCall>>,
    typed: Mutex<BTreeMap<String, String>>,
    screenshot: Option<Vec<u8>>,
    snapshots_fail: bool,
    snapshot_requests: Mutex<u32>,
    closed: Mutex<bool>,
}

impl SnapshotDriver {
    pub fn new(snapshot: DocumentTree) -> Self {
        Self {
            snapshot: Mutex::new(snapshot),
            ..Self::default()
        }
    }

    /// Fail the next interactions with these errors, in order
    pub fn with_failures(self, failures: impl IntoIterator<Item = DriverError>) -> Self {
        self.scripted.lock().extend(failures);
        self
    }

    /// Bytes returned by `screenshot`; without them screenshots are unsupported
    pub fn with_screenshot(mut self, png: Vec<u8>) -> Self {
        self.screenshot = Some(png);
        self
    }

    /// Make `current_snapshot` fail
    pub fn fail_snapshots(mut self) -> Self {
        self.snapshots_fail = true;
        self
    }

    pub fn calls(&self) -> Vec<DriverCall> {
        self.calls.lock().clone()
    }

    /// Text typed into the element selected by `locator`
    pub fn typed_text(&self, locator: &Locator) -> Option<String> {
        self.typed.lock().get(&locator.key()).cloned()
    }

    pub fn snapshot_requests(&self) -> u32 {
        *self.snapshot_requests.lock()
    }

    pub fn is_closed(&self) -> bool {
        *self.closed.lock()
    }

    fn interact(&self, call: DriverCall) -> Result<(), DriverError> {
        debug!(call = ?call, "Snapshot driver interaction");
        self.calls.lock().push(call);
        if *self.closed.lock() {
            return Err(DriverError::new(
                soulharness_core_types::kinds::INVALID_SESSION,
                "Driver session has been closed",
            ));
        }
        match self.scripted.lock().pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn resolve(&self, locator: &Locator) -> Option<ElementHandle> {
        let snapshot = self.snapshot.lock();
        snapshot
            .find(locator)
            .map(|node| ElementHandle::from_node(locator, node))
    }
}

#[async_trait]
impl UiDriver for SnapshotDriver {
    async fn locate(&self, locator: &Locator) -> Result<ElementHandle, DriverError> {
        self.interact(DriverCall::Locate(locator.clone()))?;
        self.resolve(locator).ok_or_else(|| {
            DriverError::no_such_element(format!("Unable to locate element: {}", locator))
        })
    }

    async fn click(&self, locator: &Locator) -> Result<(), DriverError> {
        self.interact(DriverCall::Click(locator.clone()))?;
        self.resolve(locator).map(|_| ()).ok_or_else(|| {
            DriverError::no_such_element(format!("Unable to locate element: {}", locator))
        })
    }

    async fn send_keys(&self, locator: &Locator, text: &str) -> Result<(), DriverError> {
        self.interact(DriverCall::SendKeys(locator.clone(), text.to_string()))?;
        if self.resolve(locator).is_none() {
            return Err(DriverError::no_such_element(format!(
                "Unable to locate element: {}",
                locator
            )));
        }
        self.typed.lock().insert(locator.key(), text.to_string());
        Ok(())
    }

    async fn wait_for(
        &self,
        locator: &Locator,
        timeout: Duration,
    ) -> Result<ElementHandle, DriverError> {
        self.interact(DriverCall::WaitFor(locator.clone()))?;
        self.resolve(locator).ok_or_else(|| {
            DriverError::timeout(format!(
                "Element {} not present after {}ms",
                locator,
                timeout.as_millis()
            ))
        })
    }

    async fn wait_for_clickable(
        &self,
        locator: &Locator,
        timeout: Duration,
    ) -> Result<ElementHandle, DriverError> {
        self.interact(DriverCall::WaitForClickable(locator.clone()))?;
        self.resolve(locator)
            .filter(ElementHandle::is_enabled)
            .ok_or_else(|| {
                DriverError::timeout(format!(
                    "Element {} not clickable after {}ms",
                    locator,
                    timeout.as_millis()
                ))
            })
    }

    async fn wait_for_text(
        &self,
        locator: &Locator,
        text: &str,
        timeout: Duration,
    ) -> Result<ElementHandle, DriverError> {
        self.interact(DriverCall::WaitForText(locator.clone(), text.to_string()))?;
        self.resolve(locator)
            .filter(|handle| handle.has_text(text))
            .ok_or_else(|| {
                DriverError::timeout(format!(
                    "Text '{}' not present in {} after {}ms",
                    text,
                    locator,
                    timeout.as_millis()
                ))
            })
    }

    async fn current_snapshot(&self) -> Result<DocumentTree, DriverError> {
        *self.snapshot_requests.lock() += 1;
        if self.snapshots_fail {
            return Err(DriverError::unsupported("Snapshot capture disabled"));
        }
        Ok(self.snapshot.lock().clone())
    }

    async fn screenshot(&self) -> Result<Vec<u8>, DriverError> {
        self.screenshot
            .clone()
            .ok_or_else(|| DriverError::unsupported("Snapshot driver has no screenshot"))
    }

    async fn quit(&self) -> Result<(), DriverError> {
        *self.closed.lock() = true;
        Ok(())
    }
}
