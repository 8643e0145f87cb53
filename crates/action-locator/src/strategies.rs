//! Attribute search strategies used by the healer
//!
//! Two building blocks:
//! 1. Predicate extraction - pull `@attr='value'` out of an XPath selector
//! 2. Attribute search - score every value of one attribute in a snapshot

use once_cell::sync::Lazy;
use regex::Regex;
use soulharness_core_types::DocumentTree;
use tracing::debug;

use crate::similarity::{exceeds_threshold, similarity};

/// Attributes whose XPath predicates can be healed, in priority order
pub const PREDICATE_ATTRIBUTES: [&str; 4] = ["id", "name", "placeholder", "aria-label"];

/// Attributes searched with the raw locator value, in order
pub const FALLBACK_ATTRIBUTES: [&str; 3] = ["name", "placeholder", "aria-label"];

static PREDICATE_PATTERNS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    PREDICATE_ATTRIBUTES
        .iter()
        .map(|attr| {
            let pattern = format!(r#"@{}\s*=\s*['"]([^'"]+)['"]"#, regex::escape(attr));
            (*attr, Regex::new(&pattern).expect("valid predicate pattern"))
        })
        .collect()
});

/// `@attribute='value'` predicate found in an XPath selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributePredicate<'a> {
    pub attribute: &'static str,
    pub value: &'a str,
}

/// Extract the highest-priority attribute predicate from `xpath`.
///
/// Only the first attribute in [`PREDICATE_ATTRIBUTES`] order is returned, even when
/// the selector carries several.
pub fn extract_predicate(xpath: &str) -> Option<AttributePredicate<'_>> {
    PREDICATE_PATTERNS.iter().find_map(|(attribute, pattern)| {
        pattern
            .captures(xpath)
            .and_then(|caps| caps.get(1))
            .map(|value| AttributePredicate {
                attribute: *attribute,
                value: value.as_str(),
            })
    })
}

/// Best-scoring attribute value found in a snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeMatch {
    pub attribute: &'static str,
    pub value: String,
    pub score: f64,
}

/// Search every `attribute` value in `snapshot` for the one most similar to `target`.
///
/// Only scores above the heal threshold are considered. The highest score wins; ties go
/// to the element met first in document order.
pub fn best_attribute_match(
    snapshot: &DocumentTree,
    attribute: &'static str,
    target: &str,
) -> Option<AttributeMatch> {
    let mut best: Option<AttributeMatch> = None;

    for candidate in snapshot.attribute_values(attribute) {
        let score = similarity(target, candidate);
        if !exceeds_threshold(score) {
            continue;
        }
        let better = best.as_ref().map(|b| score > b.score).unwrap_or(true);
        if better {
            best = Some(AttributeMatch {
                attribute,
                value: candidate.to_string(),
                score,
            });
        }
    }

    if let Some(found) = &best {
        debug!(
            attribute,
            original = target,
            matched = %found.value,
            score = found.score,
            "Attribute candidate accepted"
        );
    }
    best
}
