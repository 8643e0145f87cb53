//! Page-level interaction helpers built on the executor

use std::sync::Arc;
use std::time::Duration;

use soulharness_core_types::{DriverError, Locator};
use tracing::{debug, warn};

use crate::errors::ActionFailed;
use crate::executor::ActionExecutor;
use crate::ports::{AttachmentKind, ElementHandle};

/// Default wait for an element before interacting with it
pub const DEFAULT_ELEMENT_WAIT: Duration = Duration::from_secs(10);

/// Base for page objects. Every interaction goes through the executor.
#[derive(Clone)]
pub struct BasePage {
    executor: Arc<ActionExecutor>,
    element_wait: Duration,
}

impl BasePage {
    pub fn new(executor: Arc<ActionExecutor>) -> Self {
        Self {
            executor,
            element_wait: DEFAULT_ELEMENT_WAIT,
        }
    }

    pub fn with_element_wait(mut self, element_wait: Duration) -> Self {
        self.element_wait = element_wait;
        self
    }

    pub fn executor(&self) -> &Arc<ActionExecutor> {
        &self.executor
    }

    /// Wait for the element, then click it
    pub async fn click(&self, locator: &Locator) -> Result<(), ActionFailed> {
        let name = format!("Clicking element {}", locator);
        self.wait_and_click(&name, locator).await
    }

    /// Wait for the element, then type `text` into it
    pub async fn enter_text(&self, locator: &Locator, text: &str) -> Result<(), ActionFailed> {
        let name = format!("Entering text into {}", locator);
        let driver = self.executor.driver().clone();
        let wait = self.element_wait;
        self.executor
            .execute(&name, locator, |active| {
                let driver = driver.clone();
                let text = text.to_string();
                async move {
                    driver.wait_for(&active, wait).await?;
                    driver.send_keys(&active, &text).await
                }
            })
            .await
    }

    /// Visible text of the element, `None` when it has none
    pub async fn get_text(&self, locator: &Locator) -> Result<Option<String>, ActionFailed> {
        let name = format!("Fetching text from {}", locator);
        let driver = self.executor.driver().clone();
        self.executor
            .execute(&name, locator, |active| {
                let driver = driver.clone();
                async move { driver.locate(&active).await.map(|handle| handle.text) }
            })
            .await
    }

    /// Click an element of a native UI tree selected by attribute values
    pub async fn desktop_click<K, V, I>(&self, attributes: I) -> Result<(), ActionFailed>
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        let locator = Locator::attributes(attributes);
        let name = format!("Desktop click {}", locator);
        self.wait_and_click(&name, &locator).await
    }

    /// Single wait that reports the outcome instead of failing
    pub async fn wait_until_visible(&self, locator: &Locator, timeout: Duration) -> bool {
        match self.executor.driver().wait_for(locator, timeout).await {
            Ok(_) => {
                debug!(locator = %locator, "Element visible");
                true
            }
            Err(err) => {
                warn!(locator = %locator, error = %err, "Element not visible");
                let note = format!(
                    "Element {} not visible after {}ms: {}",
                    locator,
                    timeout.as_millis(),
                    err
                );
                self.attach_note("Wait Timeout", &note).await;
                false
            }
        }
    }

    /// Wait until the element is enabled; the driver error is returned on timeout
    pub async fn wait_until_clickable(
        &self,
        locator: &Locator,
        timeout: Duration,
    ) -> Result<ElementHandle, DriverError> {
        match self.executor.driver().wait_for_clickable(locator, timeout).await {
            Ok(handle) => Ok(handle),
            Err(err) => {
                warn!(locator = %locator, error = %err, "Element not clickable");
                let note = format!(
                    "Element not clickable: {} after {}ms",
                    locator,
                    timeout.as_millis()
                );
                self.attach_note("Wait Failure - Clickable", &note).await;
                Err(err)
            }
        }
    }

    /// Wait until the element's text contains `text`; the driver error is returned on
    /// timeout
    pub async fn wait_until_text_present(
        &self,
        locator: &Locator,
        text: &str,
        timeout: Duration,
    ) -> Result<(), DriverError> {
        match self.executor.driver().wait_for_text(locator, text, timeout).await {
            Ok(_) => Ok(()),
            Err(err) => {
                warn!(locator = %locator, text, error = %err, "Text not present");
                let note = format!(
                    "Text '{}' not found in element: {} after {}ms",
                    text,
                    locator,
                    timeout.as_millis()
                );
                self.attach_note("Wait Failure - Text", &note).await;
                Err(err)
            }
        }
    }

    async fn attach_note(&self, name: &str, note: &str) {
        if let Err(err) = self
            .executor
            .diagnostics()
            .attach(name, note.as_bytes(), AttachmentKind::Text)
            .await
        {
            warn!(attachment = name, error = %err, "Failed to attach diagnostic");
        }
    }

    async fn wait_and_click(&self, name: &str, locator: &Locator) -> Result<(), ActionFailed> {
        let driver = self.executor.driver().clone();
        let wait = self.element_wait;
        self.executor
            .execute(name, locator, |active| {
                let driver = driver.clone();
                async move {
                    driver.wait_for(&active, wait).await?;
                    driver.click(&active).await
                }
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::offline::{DriverCall, SnapshotDriver};
    use crate::ports::NullSink;
    use crate::strategies::RetryPolicy;
    use action_locator::{DefaultLocatorHealer, InMemoryLedger};
    use crate::errors::DiagnosticsError;
    use crate::ports::DiagnosticsSink;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use soulharness_core_types::{kinds, DocumentTree, ElementNode};

    #[derive(Default)]
    struct NoteSink {
        notes: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl DiagnosticsSink for NoteSink {
        async fn attach(
            &self,
            name: &str,
            payload: &[u8],
            _kind: AttachmentKind,
        ) -> Result<(), DiagnosticsError> {
            self.notes.lock().push((
                name.to_string(),
                String::from_utf8_lossy(payload).into_owned(),
            ));
            Ok(())
        }
    }

    fn page(driver: Arc<SnapshotDriver>) -> BasePage {
        page_with_sink(driver, Arc::new(NullSink))
    }

    fn page_with_sink(driver: Arc<SnapshotDriver>, sink: Arc<dyn DiagnosticsSink>) -> BasePage {
        let executor = ActionExecutor::new(
            driver,
            Arc::new(DefaultLocatorHealer::new()),
            Arc::new(InMemoryLedger::new()),
            sink,
            RetryPolicy::new(1).with_backoff(Duration::ZERO),
        );
        BasePage::new(Arc::new(executor)).with_element_wait(Duration::from_millis(100))
    }

    fn tree() -> DocumentTree {
        DocumentTree::new(vec![ElementNode::new("form")
            .with_child(ElementNode::new("input").with_attr("id", "email"))
            .with_child(ElementNode::new("h1").with_attr("id", "title").with_text("Welcome"))
            .with_child(
                ElementNode::new("button")
                    .with_attr("id", "pay")
                    .with_attr("aria-disabled", "true"),
            )
            .with_child(
                ElementNode::new("Button")
                    .with_attr("title", "OK")
                    .with_attr("control_type", "Button"),
            )])
    }

    #[tokio::test]
    async fn test_enter_text_and_read() {
        let driver = Arc::new(SnapshotDriver::new(tree()));
        let page = page(driver.clone());

        page.enter_text(&Locator::id("email"), "user@example.com")
            .await
            .unwrap();
        assert_eq!(
            driver.typed_text(&Locator::id("email")).as_deref(),
            Some("user@example.com")
        );

        let title = page.get_text(&Locator::id("title")).await.unwrap();
        assert_eq!(title.as_deref(), Some("Welcome"));
    }

    #[tokio::test]
    async fn test_click_waits_first() {
        let driver = Arc::new(SnapshotDriver::new(tree()));
        let page = page(driver.clone());

        page.click(&Locator::id("email")).await.unwrap();
        assert_eq!(
            driver.calls(),
            vec![
                DriverCall::WaitFor(Locator::id("email")),
                DriverCall::Click(Locator::id("email")),
            ]
        );
    }

    #[tokio::test]
    async fn test_desktop_click_by_attributes() {
        let driver = Arc::new(SnapshotDriver::new(tree()));
        let page = page(driver);
        page.desktop_click([("title", "OK"), ("control_type", "Button")])
            .await
            .unwrap();

        let err = page.desktop_click([("title", "Cancel")]).await.unwrap_err();
        assert!(err.action_name.starts_with("Desktop click attributes:"));
        assert_eq!(err.attempts, 2);
    }

    #[tokio::test]
    async fn test_wait_until_visible_reports_outcome() {
        let driver = Arc::new(
            SnapshotDriver::new(tree()).with_failures([DriverError::timeout("slow render")]),
        );
        let page = page(driver);
        assert!(!page
            .wait_until_visible(&Locator::id("email"), Duration::from_millis(10))
            .await);
        assert!(page
            .wait_until_visible(&Locator::id("email"), Duration::from_millis(10))
            .await);
    }

    #[tokio::test]
    async fn test_wait_until_clickable() {
        let driver = Arc::new(SnapshotDriver::new(tree()));
        let sink = Arc::new(NoteSink::default());
        let page = page_with_sink(driver, sink.clone());
        let wait = Duration::from_millis(10);

        let handle = page
            .wait_until_clickable(&Locator::id("email"), wait)
            .await
            .unwrap();
        assert_eq!(handle.tag, "input");
        assert!(sink.notes.lock().is_empty());

        let err = page
            .wait_until_clickable(&Locator::id("pay"), wait)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), kinds::TIMEOUT);
        let notes = sink.notes.lock();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].0, "Wait Failure - Clickable");
        assert_eq!(notes[0].1, "Element not clickable: id:pay after 10ms");
    }

    #[tokio::test]
    async fn test_wait_until_text_present() {
        let driver = Arc::new(SnapshotDriver::new(tree()));
        let sink = Arc::new(NoteSink::default());
        let page = page_with_sink(driver, sink.clone());
        let wait = Duration::from_millis(10);

        page.wait_until_text_present(&Locator::id("title"), "Welcome", wait)
            .await
            .unwrap();

        let err = page
            .wait_until_text_present(&Locator::id("title"), "Goodbye", wait)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), kinds::TIMEOUT);
        let notes = sink.notes.lock();
        assert_eq!(
            notes.as_slice(),
            &[(
                "Wait Failure - Text".to_string(),
                "Text 'Goodbye' not found in element: id:title after 10ms".to_string()
            )]
        );
    }
}
