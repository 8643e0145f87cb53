//! Document/UI tree snapshots captured from a live driver session
//!
//! A snapshot is a plain tree of elements with their attributes. Drivers build it from
//! whatever the backend exposes (DOM page source, accessibility tree, UIA tree); the
//! healer only needs attribute values in document order.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::locator::{Locator, LocatorStrategy, LocatorValue};

static XPATH_STEP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^//(\*|[A-Za-z][\w\-]*)(?:\[(.+)\])?$").expect("xpath step"));
static XPATH_ATTR_EQ: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^@([\w\-]+)\s*=\s*(?:'([^']*)'|"([^"]*)")$"#).expect("xpath attr predicate")
});
static XPATH_TEXT_EQ: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^text\(\)\s*=\s*(?:'([^']*)'|"([^"]*)")$"#).expect("xpath text")
});
static XPATH_CONTAINS_TEXT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^contains\(\s*text\(\)\s*,\s*(?:'([^']*)'|"([^"]*)")\s*\)$"#)
        .expect("xpath contains")
});
static XPATH_CONTAINS_ATTR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^contains\(\s*@([\w\-]+)\s*,\s*(?:'([^']*)'|"([^"]*)")\s*\)$"#)
        .expect("xpath contains attr")
});
static CSS_SIMPLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^([A-Za-z][\w\-]*)?(?:#([\w\-]+))?(?:\.([\w\-]+))?(?:\[([\w\-]+)=(?:'([^']*)'|"([^"]*)"|([^'"\]]*))\])?$"#,
    )
    .expect("css selector")
});

/// Literal captured by whichever quote alternative matched
fn quoted<'t>(caps: &Captures<'t>, groups: &[usize]) -> Option<&'t str> {
    groups
        .iter()
        .find_map(|idx| caps.get(*idx))
        .map(|m| m.as_str())
}

/// One element of a UI tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementNode {
    /// Tag or control type
    pub tag: String,

    /// Element attributes (`id`, `name`, `placeholder`, `aria-label`, ...)
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,

    /// Visible text content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Child elements in document order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ElementNode>,
}

impl ElementNode {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_child(mut self, child: ElementNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Check whether this element is selected by `locator`.
    ///
    /// XPath and CSS support covers single-step selectors only
    /// (`//tag[@attr='v']`, `//*[text()='v']`, `tag#id.class[attr='v']`); anything more
    /// complex never matches.
    pub fn matches(&self, locator: &Locator) -> bool {
        match (locator.strategy(), locator.value()) {
            (_, LocatorValue::Attributes(map)) => map
                .iter()
                .all(|(key, value)| self.attr(key) == Some(value.as_str())),
            (LocatorStrategy::Id, LocatorValue::Selector(v)) => self.attr("id") == Some(v.as_str()),
            (LocatorStrategy::Name, LocatorValue::Selector(v)) => {
                self.attr("name") == Some(v.as_str())
            }
            (LocatorStrategy::AccessibilityId, LocatorValue::Selector(v)) => {
                self.attr("accessibility-id") == Some(v.as_str())
            }
            (LocatorStrategy::ClassName, LocatorValue::Selector(v)) => self.has_class(v),
            (LocatorStrategy::CssSelector, LocatorValue::Selector(v)) => self.matches_css(v),
            (LocatorStrategy::Xpath, LocatorValue::Selector(v)) => self.matches_xpath(v),
            (LocatorStrategy::AttributeMap, LocatorValue::Selector(_)) => false,
        }
    }

    fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .map(|classes| classes.split_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }

    fn text_trimmed(&self) -> &str {
        self.text.as_deref().map(str::trim).unwrap_or("")
    }

    fn matches_xpath(&self, xpath: &str) -> bool {
        let Some(step) = XPATH_STEP.captures(xpath.trim()) else {
            return false;
        };
        let tag = &step[1];
        if tag != "*" && !tag.eq_ignore_ascii_case(&self.tag) {
            return false;
        }
        let Some(predicate) = step.get(2).map(|m| m.as_str().trim()) else {
            return true;
        };

        if let Some(caps) = XPATH_ATTR_EQ.captures(predicate) {
            return self.attr(&caps[1]) == quoted(&caps, &[2, 3]);
        }
        if let Some(caps) = XPATH_TEXT_EQ.captures(predicate) {
            return Some(self.text_trimmed()) == quoted(&caps, &[1, 2]);
        }
        if let Some(caps) = XPATH_CONTAINS_TEXT.captures(predicate) {
            return quoted(&caps, &[1, 2])
                .map(|needle| self.text_trimmed().contains(needle))
                .unwrap_or(false);
        }
        if let Some(caps) = XPATH_CONTAINS_ATTR.captures(predicate) {
            return match (self.attr(&caps[1]), quoted(&caps, &[2, 3])) {
                (Some(value), Some(needle)) => value.contains(needle),
                _ => false,
            };
        }
        false
    }

    fn matches_css(&self, selector: &str) -> bool {
        let selector = selector.trim();
        if selector.is_empty() {
            return false;
        }
        let Some(caps) = CSS_SIMPLE.captures(selector) else {
            return false;
        };
        if let Some(tag) = caps.get(1) {
            if !tag.as_str().eq_ignore_ascii_case(&self.tag) {
                return false;
            }
        }
        if let Some(id) = caps.get(2) {
            if self.attr("id") != Some(id.as_str()) {
                return false;
            }
        }
        if let Some(class) = caps.get(3) {
            if !self.has_class(class.as_str()) {
                return false;
            }
        }
        if let Some(name) = caps.get(4) {
            if self.attr(name.as_str()) != quoted(&caps, &[5, 6, 7]) {
                return false;
            }
        }
        true
    }
}

/// Snapshot of the current document or native UI tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentTree {
    #[serde(default)]
    pub roots: Vec<ElementNode>,
}

impl DocumentTree {
    pub fn new(roots: Vec<ElementNode>) -> Self {
        Self { roots }
    }

    /// Parse a snapshot from its JSON form
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Elements in document order (pre-order, depth first)
    pub fn iter(&self) -> DocumentOrder<'_> {
        DocumentOrder {
            stack: self.roots.iter().rev().collect(),
        }
    }

    /// Values of `attr` across all elements that carry it, in document order
    pub fn attribute_values<'a>(&'a self, attr: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.iter().filter_map(move |element| element.attr(attr))
    }

    /// First element matched by `locator`, in document order
    pub fn find(&self, locator: &Locator) -> Option<&ElementNode> {
        self.iter().find(|element| element.matches(locator))
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

/// Pre-order iterator over a [`DocumentTree`]
pub struct DocumentOrder<'a> {
    stack: Vec<&'a ElementNode>,
}

impl<'a> Iterator for DocumentOrder<'a> {
    type Item = &'a ElementNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}
