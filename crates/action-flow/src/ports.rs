//! Collaborator interfaces consumed by the executor
//!
//! One `UiDriver` implementation exists per backend (web, mobile, desktop); the executor
//! and the healer only see these traits.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use soulharness_core_types::{DocumentTree, DriverError, ElementNode, Locator};

use crate::errors::DiagnosticsError;

/// Element resolved by a driver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementHandle {
    /// Locator the element was resolved with
    pub locator: Locator,

    /// Tag or control type
    pub tag: String,

    /// Visible text, if any
    pub text: Option<String>,

    pub attributes: BTreeMap<String, String>,
}

impl ElementHandle {
    pub fn from_node(locator: &Locator, node: &ElementNode) -> Self {
        Self {
            locator: locator.clone(),
            tag: node.tag.clone(),
            text: node.text.as_ref().map(|text| text.trim().to_string()),
            attributes: node.attributes.clone(),
        }
    }

    /// Enabled for input: no `disabled` attribute and not `aria-disabled="true"`
    pub fn is_enabled(&self) -> bool {
        !self.attributes.contains_key("disabled")
            && self.attributes.get("aria-disabled").map(String::as_str) != Some("true")
    }

    /// Whether the visible text contains `text`
    pub fn has_text(&self, text: &str) -> bool {
        self.text
            .as_deref()
            .map(|visible| visible.contains(text))
            .unwrap_or(false)
    }
}

/// Driver capability set
#[async_trait]
pub trait UiDriver: Send + Sync {
    /// Resolve an element; fails with `no such element` when nothing matches
    async fn locate(&self, locator: &Locator) -> Result<ElementHandle, DriverError>;

    async fn click(&self, locator: &Locator) -> Result<(), DriverError>;

    async fn send_keys(&self, locator: &Locator, text: &str) -> Result<(), DriverError>;

    /// Wait until the element is present; fails with `timeout`
    async fn wait_for(
        &self,
        locator: &Locator,
        timeout: Duration,
    ) -> Result<ElementHandle, DriverError>;

    /// Wait until the element is present and enabled; fails with `timeout`
    async fn wait_for_clickable(
        &self,
        locator: &Locator,
        timeout: Duration,
    ) -> Result<ElementHandle, DriverError>;

    /// Wait until the element's visible text contains `text`; fails with `timeout`
    async fn wait_for_text(
        &self,
        locator: &Locator,
        text: &str,
        timeout: Duration,
    ) -> Result<ElementHandle, DriverError>;

    /// Snapshot of the current document or native UI tree
    async fn current_snapshot(&self) -> Result<DocumentTree, DriverError>;

    /// PNG screenshot of the current screen
    async fn screenshot(&self) -> Result<Vec<u8>, DriverError>;

    async fn quit(&self) -> Result<(), DriverError>;
}

/// Attachment payload type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    Text,
    Image,
}

impl AttachmentKind {
    /// File extension used when the attachment is written to disk
    pub fn extension(&self) -> &'static str {
        match self {
            AttachmentKind::Text => "txt",
            AttachmentKind::Image => "png",
        }
    }
}

impl fmt::Display for AttachmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttachmentKind::Text => f.write_str("text"),
            AttachmentKind::Image => f.write_str("image"),
        }
    }
}

/// Report attachment sink. Best effort: the executor logs failures and moves on.
#[async_trait]
pub trait DiagnosticsSink: Send + Sync {
    async fn attach(
        &self,
        name: &str,
        payload: &[u8],
        kind: AttachmentKind,
    ) -> Result<(), DiagnosticsError>;
}

/// Sink that drops every attachment
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

#[async_trait]
impl DiagnosticsSink for NullSink {
    async fn attach(
        &self,
        _name: &str,
        _payload: &[u8],
        _kind: AttachmentKind,
    ) -> Result<(), DiagnosticsError> {
        Ok(())
    }
}
