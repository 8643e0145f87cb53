//! Locator values shared by drivers, the healer and the executor

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How a locator finds its element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LocatorStrategy {
    /// Element `id` attribute
    Id,

    /// XPath expression
    Xpath,

    /// Element `name` attribute
    Name,

    /// Native accessibility identifier (mobile/desktop trees)
    AccessibilityId,

    /// CSS selector
    CssSelector,

    /// Single class name
    ClassName,

    /// Attribute map matched against native UI trees
    AttributeMap,
}

impl LocatorStrategy {
    /// Stable strategy name, used in string forms and ledger keys
    pub fn name(&self) -> &'static str {
        match self {
            LocatorStrategy::Id => "id",
            LocatorStrategy::Xpath => "xpath",
            LocatorStrategy::Name => "name",
            LocatorStrategy::AccessibilityId => "accessibility-id",
            LocatorStrategy::CssSelector => "css-selector",
            LocatorStrategy::ClassName => "class-name",
            LocatorStrategy::AttributeMap => "attributes",
        }
    }
}

impl fmt::Display for LocatorStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown locator strategy '{0}'")]
pub struct UnknownStrategy(pub String);

impl FromStr for LocatorStrategy {
    type Err = UnknownStrategy;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        match normalized.as_str() {
            "id" => Ok(LocatorStrategy::Id),
            "xpath" => Ok(LocatorStrategy::Xpath),
            "name" => Ok(LocatorStrategy::Name),
            "accessibility-id" => Ok(LocatorStrategy::AccessibilityId),
            "css" | "css-selector" => Ok(LocatorStrategy::CssSelector),
            "class" | "class-name" => Ok(LocatorStrategy::ClassName),
            "attributes" | "attribute-map" => Ok(LocatorStrategy::AttributeMap),
            _ => Err(UnknownStrategy(raw.to_string())),
        }
    }
}

/// Selector payload of a locator
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocatorValue {
    /// Plain selector string (id, xpath, css, ...)
    Selector(String),

    /// Attribute map for native UI trees
    Attributes(BTreeMap<String, String>),
}

impl fmt::Display for LocatorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocatorValue::Selector(selector) => f.write_str(selector),
            LocatorValue::Attributes(map) => {
                f.write_str("{")?;
                for (idx, (key, value)) in map.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}={}", key, value)?;
                }
                f.write_str("}")
            }
        }
    }
}

/// Deserialized locator whose strategy and value kinds disagree
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("locator strategy '{strategy}' does not accept value {value}")]
pub struct InvalidLocator {
    pub strategy: LocatorStrategy,
    pub value: LocatorValue,
}

/// Immutable element locator.
///
/// Two locators are equal iff strategy and value are structurally equal. Healing never
/// edits a locator; it produces a new one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawLocator")]
pub struct Locator {
    strategy: LocatorStrategy,
    value: LocatorValue,
}

#[derive(Deserialize)]
struct RawLocator {
    strategy: LocatorStrategy,
    value: LocatorValue,
}

impl TryFrom<RawLocator> for Locator {
    type Error = InvalidLocator;

    fn try_from(raw: RawLocator) -> Result<Self, Self::Error> {
        let takes_map = raw.strategy == LocatorStrategy::AttributeMap;
        if takes_map != matches!(raw.value, LocatorValue::Attributes(_)) {
            return Err(InvalidLocator {
                strategy: raw.strategy,
                value: raw.value,
            });
        }
        Ok(Self {
            strategy: raw.strategy,
            value: raw.value,
        })
    }
}

impl Locator {
    /// Create a selector-based locator
    pub fn new(strategy: LocatorStrategy, selector: impl Into<String>) -> Self {
        Self {
            strategy,
            value: LocatorValue::Selector(selector.into()),
        }
    }

    pub fn id(value: impl Into<String>) -> Self {
        Self::new(LocatorStrategy::Id, value)
    }

    pub fn xpath(value: impl Into<String>) -> Self {
        Self::new(LocatorStrategy::Xpath, value)
    }

    pub fn name(value: impl Into<String>) -> Self {
        Self::new(LocatorStrategy::Name, value)
    }

    pub fn accessibility_id(value: impl Into<String>) -> Self {
        Self::new(LocatorStrategy::AccessibilityId, value)
    }

    pub fn css(value: impl Into<String>) -> Self {
        Self::new(LocatorStrategy::CssSelector, value)
    }

    /// Create an attribute-map locator, e.g. `{"title": "OK", "control_type": "Button"}`
    pub fn attributes<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self {
            strategy: LocatorStrategy::AttributeMap,
            value: LocatorValue::Attributes(
                pairs
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    pub fn strategy(&self) -> LocatorStrategy {
        self.strategy
    }

    pub fn value(&self) -> &LocatorValue {
        &self.value
    }

    /// Selector string, if this is not an attribute-map locator
    pub fn selector(&self) -> Option<&str> {
        match &self.value {
            LocatorValue::Selector(selector) => Some(selector),
            LocatorValue::Attributes(_) => None,
        }
    }

    /// Attribute map, if this is an attribute-map locator
    pub fn attribute_map(&self) -> Option<&BTreeMap<String, String>> {
        match &self.value {
            LocatorValue::Attributes(map) => Some(map),
            LocatorValue::Selector(_) => None,
        }
    }

    /// Stable string key (`strategy:value`), used by the healing ledger
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.strategy.name(), self.value)
    }
}
