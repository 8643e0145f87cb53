use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use action_flow::{
    ActionExecutor, AttachmentKind, BasePage, DiagnosticsError, DiagnosticsSink, DriverCall,
    FinalOutcome, NullSink, RetryPolicy, SnapshotDriver,
};
use action_locator::{
    DefaultLocatorHealer, HealProposal, HealingLedger, InMemoryLedger, JsonFileLedger,
    LocatorHealer,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use soulharness_core_types::{DocumentTree, DriverError, ElementNode, Locator};

/// Healer that counts invocations
#[derive(Default)]
struct CountingHealer {
    inner: DefaultLocatorHealer,
    calls: AtomicU32,
}

impl CountingHealer {
    fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl LocatorHealer for CountingHealer {
    fn heal(&self, locator: &Locator, snapshot: &DocumentTree) -> Option<HealProposal> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.heal(locator, snapshot)
    }
}

#[derive(Default)]
struct RecordingSink {
    attachments: Mutex<Vec<(String, AttachmentKind)>>,
}

impl RecordingSink {
    fn names(&self) -> Vec<String> {
        self.attachments
            .lock()
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }
}

#[async_trait]
impl DiagnosticsSink for RecordingSink {
    async fn attach(
        &self,
        name: &str,
        _payload: &[u8],
        kind: AttachmentKind,
    ) -> Result<(), DiagnosticsError> {
        self.attachments.lock().push((name.to_string(), kind));
        Ok(())
    }
}

struct BrokenSink;

#[async_trait]
impl DiagnosticsSink for BrokenSink {
    async fn attach(
        &self,
        _name: &str,
        _payload: &[u8],
        _kind: AttachmentKind,
    ) -> Result<(), DiagnosticsError> {
        Err(DiagnosticsError::Rejected("report service offline".to_string()))
    }
}

struct Harness {
    executor: ActionExecutor,
    healer: Arc<CountingHealer>,
    sink: Arc<RecordingSink>,
    ledger: Arc<InMemoryLedger>,
}

fn harness(snapshot: DocumentTree, retries: u32) -> Harness {
    let driver = Arc::new(SnapshotDriver::new(snapshot).with_screenshot(vec![0x89, b'P', b'N', b'G']));
    let healer = Arc::new(CountingHealer::default());
    let sink = Arc::new(RecordingSink::default());
    let ledger = Arc::new(InMemoryLedger::new());
    let executor = ActionExecutor::new(
        driver,
        healer.clone(),
        ledger.clone(),
        sink.clone(),
        RetryPolicy::new(retries).with_backoff(Duration::ZERO),
    );
    Harness {
        executor,
        healer,
        sink,
        ledger,
    }
}

fn empty_page() -> DocumentTree {
    DocumentTree::new(vec![ElementNode::new("div").with_attr("id", "content")])
}

fn login_page() -> DocumentTree {
    DocumentTree::new(vec![ElementNode::new("form")
        .with_child(ElementNode::new("input").with_attr("id", "usernameField"))
        .with_child(ElementNode::new("button").with_attr("id", "submit"))])
}

#[tokio::test]
async fn healing_is_one_shot_without_candidates() {
    let h = harness(empty_page(), 4);

    let (result, invocation) = h
        .executor
        .execute_traced("click", &Locator::id("userName"), |_| async {
            Err::<(), _>(DriverError::stale_element("element is stale"))
        })
        .await;

    assert!(result.is_err());
    assert_eq!(h.healer.calls(), 1);
    assert_eq!(invocation.attempt_count(), 5);
    assert_eq!(invocation.final_outcome, Some(FinalOutcome::Failed));
}

#[tokio::test]
async fn healing_is_one_shot_when_healed_locator_keeps_failing() {
    let h = harness(login_page(), 2);

    let (result, invocation) = h
        .executor
        .execute_traced("click", &Locator::id("userName"), |_| async {
            Err::<(), _>(DriverError::no_such_element("still missing"))
        })
        .await;

    let err = result.unwrap_err();
    assert_eq!(h.healer.calls(), 1);
    // healed retry is free: 1 + (R + 1) runs
    assert_eq!(err.attempts, 4);
    assert_eq!(h.ledger.len(), 1);

    let sequences: Vec<u32> = invocation.attempts().iter().map(|a| a.sequence()).collect();
    assert_eq!(sequences, vec![1, 2, 3, 4]);
    assert!(invocation.attempts()[1..]
        .iter()
        .all(|a| a.locator_used() == &Locator::id("usernameField")));
}

#[tokio::test]
async fn retry_exhaustion_makes_r_plus_one_attempts() {
    for retries in [0, 1, 3] {
        let h = harness(empty_page(), retries);
        let runs = AtomicU32::new(0);

        let err = h
            .executor
            .execute("Clicking element id:missing", &Locator::id("missing"), |_| {
                runs.fetch_add(1, Ordering::SeqCst);
                async { Err::<(), _>(DriverError::timeout("waited too long")) }
            })
            .await
            .unwrap_err();

        assert_eq!(runs.load(Ordering::SeqCst), retries + 1);
        assert_eq!(err.attempts, retries + 1);
        assert_eq!(err.action_name, "Clicking element id:missing");
        assert_eq!(err.kind, "timeout");
        assert_eq!(err.message, "waited too long");

        let names = h.sink.names();
        assert_eq!(names.len() as u32, retries + 2);
        assert_eq!(names.last().map(String::as_str), Some("Failure Reason"));
    }
}

#[tokio::test]
async fn non_locator_failures_never_heal() {
    let h = harness(login_page(), 2);
    let seen = Mutex::new(Vec::new());

    let err = h
        .executor
        .execute("click", &Locator::id("userName"), |active| {
            seen.lock().push(active);
            async { Err::<(), _>(DriverError::new("connection refused", "driver down")) }
        })
        .await
        .unwrap_err();

    assert_eq!(h.healer.calls(), 0);
    assert_eq!(err.attempts, 3);
    assert!(seen.lock().iter().all(|l| l == &Locator::id("userName")));
    assert!(h.ledger.is_empty());
}

#[tokio::test]
async fn success_stops_attempts_and_diagnostics() {
    let h = harness(empty_page(), 5);
    let runs = AtomicU32::new(0);

    let value = h
        .executor
        .execute("read", &Locator::id("content"), |_| {
            let run = runs.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if run < 3 {
                    Err(DriverError::new("javascript error", "render pending"))
                } else {
                    Ok("loaded")
                }
            }
        })
        .await
        .unwrap();

    assert_eq!(value, "loaded");
    assert_eq!(runs.load(Ordering::SeqCst), 3);
    assert_eq!(
        h.sink.names(),
        vec!["read_Attempt_1_Failure", "read_Attempt_2_Failure"]
    );
}

#[tokio::test]
async fn renamed_id_heals_through_page_click() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = Arc::new(JsonFileLedger::new(dir.path().join("healing_log.json")));
    let driver = Arc::new(
        SnapshotDriver::new(login_page())
            .with_failures([DriverError::new("StaleElementReferenceException", "detached")]),
    );
    let sink = Arc::new(RecordingSink::default());
    let executor = ActionExecutor::new(
        driver.clone(),
        Arc::new(DefaultLocatorHealer::new()),
        ledger.clone(),
        sink.clone(),
        RetryPolicy::new(2).with_backoff(Duration::ZERO),
    );
    let page = BasePage::new(Arc::new(executor)).with_element_wait(Duration::from_millis(50));

    page.click(&Locator::id("userName")).await.unwrap();

    let entries = ledger.load();
    assert_eq!(entries.len(), 1);
    assert_eq!(
        entries["id:userName"].healed(),
        &Locator::id("usernameField")
    );
    assert!(sink
        .names()
        .contains(&"Self-Healing Triggered".to_string()));
}

#[tokio::test]
async fn heal_to_value_with_apostrophe_is_clickable() {
    let tree = DocumentTree::new(vec![ElementNode::new("dialog")
        .with_child(ElementNode::new("button").with_attr("aria-label", "Don't save"))
        .with_child(ElementNode::new("button").with_attr("aria-label", "Cancel"))]);
    let driver = Arc::new(SnapshotDriver::new(tree));
    let ledger = Arc::new(InMemoryLedger::new());
    let executor = ActionExecutor::new(
        driver.clone(),
        Arc::new(DefaultLocatorHealer::new()),
        ledger.clone(),
        Arc::new(NullSink),
        RetryPolicy::new(2).with_backoff(Duration::ZERO),
    );
    let page = BasePage::new(Arc::new(executor)).with_element_wait(Duration::from_millis(10));

    page.click(&Locator::name("Dont save")).await.unwrap();

    let healed = Locator::xpath(r#"//*[@aria-label="Don't save"]"#);
    assert_eq!(ledger.load()["name:Dont save"].healed(), &healed);
    assert_eq!(driver.calls().last(), Some(&DriverCall::Click(healed)));
}

#[tokio::test]
async fn diagnostics_failures_are_swallowed() {
    let driver = Arc::new(SnapshotDriver::new(login_page()));
    let executor = ActionExecutor::new(
        driver,
        Arc::new(DefaultLocatorHealer::new()),
        Arc::new(InMemoryLedger::new()),
        Arc::new(BrokenSink),
        RetryPolicy::new(1).with_backoff(Duration::ZERO),
    );

    let err = executor
        .execute("click", &Locator::id("nothingLikeIt"), |_| async {
            Err::<(), _>(DriverError::no_such_element("missing"))
        })
        .await
        .unwrap_err();

    assert_eq!(err.kind, "no such element");
    assert_eq!(err.attempts, 2);
}
