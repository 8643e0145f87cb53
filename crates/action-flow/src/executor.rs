//! Action executor - bounded retries with one-shot locator healing
//!
//! State machine per invocation:
//! `ATTEMPTING -> SUCCESS | RETRYING | HEALING | FAILED`
//!
//! A heal is tried at most once per invocation, on the first locator-class failure. A
//! healed retry does not consume a retry and skips the backoff.

use std::future::Future;
use std::sync::Arc;

use action_locator::{HealingLedger, LocatorHealer};
use soulharness_core_types::{DriverError, Locator};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::errors::ActionFailed;
use crate::ports::{AttachmentKind, DiagnosticsSink, UiDriver};
use crate::strategies::{is_locator_failure, RetryPolicy};
use crate::types::{ActionInvocation, AttemptRecord, FinalOutcome};

/// Runs UI operations with retries, diagnostics and self-healing
pub struct ActionExecutor {
    driver: Arc<dyn UiDriver>,
    healer: Arc<dyn LocatorHealer>,
    ledger: Arc<dyn HealingLedger>,
    diagnostics: Arc<dyn DiagnosticsSink>,
    policy: RetryPolicy,
}

impl ActionExecutor {
    pub fn new(
        driver: Arc<dyn UiDriver>,
        healer: Arc<dyn LocatorHealer>,
        ledger: Arc<dyn HealingLedger>,
        diagnostics: Arc<dyn DiagnosticsSink>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            driver,
            healer,
            ledger,
            diagnostics,
            policy,
        }
    }

    pub fn driver(&self) -> &Arc<dyn UiDriver> {
        &self.driver
    }

    pub fn diagnostics(&self) -> &Arc<dyn DiagnosticsSink> {
        &self.diagnostics
    }

    /// Run `operation` against `locator` until it succeeds or retries are exhausted.
    ///
    /// `operation` receives the locator to use for each attempt: the original one, or the
    /// healed one once a heal has been applied. `ActionFailed` is the only error returned.
    pub async fn execute<T, F, Fut>(
        &self,
        action_name: &str,
        locator: &Locator,
        operation: F,
    ) -> Result<T, ActionFailed>
    where
        F: FnMut(Locator) -> Fut,
        Fut: Future<Output = Result<T, DriverError>>,
    {
        let (result, _) = self.execute_traced(action_name, locator, operation).await;
        result
    }

    /// Same as [`execute`](Self::execute), also returning the invocation record
    pub async fn execute_traced<T, F, Fut>(
        &self,
        action_name: &str,
        locator: &Locator,
        mut operation: F,
    ) -> (Result<T, ActionFailed>, ActionInvocation)
    where
        F: FnMut(Locator) -> Fut,
        Fut: Future<Output = Result<T, DriverError>>,
    {
        let mut invocation = ActionInvocation::new(action_name, locator.clone());
        let mut attempt: u32 = 1;
        let mut heal_attempted = false;

        loop {
            let sequence = invocation.next_sequence();
            let active = invocation.active_locator().clone();
            debug!(
                invocation = %invocation.id,
                action = action_name,
                attempt,
                sequence,
                locator = %active,
                "Attempting action"
            );

            let error = match operation(active.clone()).await {
                Ok(value) => {
                    invocation.push(AttemptRecord::success(sequence, active));
                    invocation.final_outcome = Some(FinalOutcome::Success);
                    info!(
                        invocation = %invocation.id,
                        action = action_name,
                        attempt,
                        healed = invocation.healed_locator.is_some(),
                        "Action succeeded"
                    );
                    return (Ok(value), invocation);
                }
                Err(error) => error,
            };

            invocation.push(AttemptRecord::failure(sequence, active.clone(), &error));
            warn!(
                invocation = %invocation.id,
                action = action_name,
                attempt,
                locator = %active,
                kind = error.kind(),
                message = error.message(),
                "Action attempt failed"
            );
            self.capture_screenshot(action_name, sequence).await;

            if is_locator_failure(&error) && !heal_attempted {
                heal_attempted = true;
                if let Some(healed) = self.try_heal(action_name, locator).await {
                    info!(
                        action = action_name,
                        attempt,
                        healed = %healed,
                        "Retrying with healed locator"
                    );
                    invocation.healed_locator = Some(healed);
                    continue;
                }
            }

            if self.policy.should_retry(attempt) {
                debug!(
                    action = action_name,
                    attempt,
                    backoff_ms = self.policy.backoff.as_millis() as u64,
                    "Backing off before retry"
                );
                sleep(self.policy.backoff).await;
                attempt += 1;
                continue;
            }

            invocation.final_outcome = Some(FinalOutcome::Failed);
            self.attach_text("Failure Reason", &error.to_string()).await;
            let failure = ActionFailed {
                action_name: action_name.to_string(),
                kind: error.kind().to_string(),
                message: error.message().to_string(),
                attempts: invocation.attempt_count(),
            };
            warn!(
                invocation = %invocation.id,
                action = action_name,
                attempts = failure.attempts,
                "Action failed, retries exhausted"
            );
            return (Err(failure), invocation);
        }
    }

    /// Ask the healer for a replacement of `original`; records it in the ledger on success
    async fn try_heal(&self, action_name: &str, original: &Locator) -> Option<Locator> {
        info!(action = action_name, locator = %original, "Locator failure, attempting self-heal");

        let snapshot = match self.driver.current_snapshot().await {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!(action = action_name, error = %err, "Snapshot capture failed, skipping heal");
                return None;
            }
        };

        let proposal = self.healer.heal(original, &snapshot)?;
        match proposal.to_entry() {
            Ok(entry) => {
                if let Err(err) = self.ledger.record(entry) {
                    warn!(error = %err, "Failed to record healing entry");
                }
            }
            Err(err) => warn!(error = %err, "Heal proposal rejected by ledger"),
        }

        self.attach_text(
            "Self-Healing Triggered",
            &format!(
                "{} -> {} (score {:.3})",
                proposal.original, proposal.healed, proposal.score
            ),
        )
        .await;
        Some(proposal.healed)
    }

    async fn capture_screenshot(&self, action_name: &str, sequence: u32) {
        let name = format!("{}_Attempt_{}_Failure", action_name, sequence);
        match self.driver.screenshot().await {
            Ok(png) => {
                if let Err(err) = self
                    .diagnostics
                    .attach(&name, &png, AttachmentKind::Image)
                    .await
                {
                    warn!(attachment = %name, error = %err, "Failed to attach screenshot");
                }
            }
            Err(err) => warn!(attachment = %name, error = %err, "Screenshot capture failed"),
        }
    }

    async fn attach_text(&self, name: &str, text: &str) {
        if let Err(err) = self
            .diagnostics
            .attach(name, text.as_bytes(), AttachmentKind::Text)
            .await
        {
            warn!(attachment = name, error = %err, "Failed to attach diagnostic");
        }
    }
}
