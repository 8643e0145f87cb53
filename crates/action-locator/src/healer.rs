//! Locator healer - proposes a replacement for a failed locator

use soulharness_core_types::{DocumentTree, Locator, LocatorStrategy};
use tracing::{debug, info};

use crate::strategies::{
    best_attribute_match, extract_predicate, AttributeMatch, FALLBACK_ATTRIBUTES,
};
use crate::types::HealProposal;

/// Healer trait.
///
/// Implementations are pure with respect to their inputs; recording a heal in the ledger
/// is left to the caller.
pub trait LocatorHealer: Send + Sync {
    /// Propose a replacement for `locator` found in `snapshot`, if any candidate scores
    /// above the heal threshold
    fn heal(&self, locator: &Locator, snapshot: &DocumentTree) -> Option<HealProposal>;
}

/// Default similarity-based healer.
///
/// Policy, first accepted match wins:
/// 1. `id` locators search the `id` attribute and heal to an `id` locator
/// 2. XPath locators search the attribute of their first `@id`/`@name`/`@placeholder`/
///    `@aria-label` predicate; an unmatched predicate ends the search
/// 3. otherwise the raw value is searched against `name`, `placeholder`, `aria-label`
///
/// Attribute-map locators are never healed.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultLocatorHealer;

impl DefaultLocatorHealer {
    pub fn new() -> Self {
        Self
    }

    fn fallback_search(snapshot: &DocumentTree, raw: &str) -> Option<AttributeMatch> {
        FALLBACK_ATTRIBUTES
            .iter()
            .find_map(|attribute| best_attribute_match(snapshot, *attribute, raw))
    }

    fn propose(locator: &Locator, found: AttributeMatch) -> Option<HealProposal> {
        let healed = if found.attribute == "id" {
            Locator::id(found.value.clone())
        } else {
            Locator::xpath(synthesize_xpath(found.attribute, &found.value)?)
        };
        Some(HealProposal {
            original: locator.clone(),
            healed,
            attribute: found.attribute,
            matched_value: found.value,
            score: found.score,
        })
    }
}

impl LocatorHealer for DefaultLocatorHealer {
    fn heal(&self, locator: &Locator, snapshot: &DocumentTree) -> Option<HealProposal> {
        let Some(raw) = locator.selector() else {
            debug!(locator = %locator, "Attribute-map locators are not healed");
            return None;
        };

        let found = match locator.strategy() {
            LocatorStrategy::Id => best_attribute_match(snapshot, "id", raw)
                .or_else(|| Self::fallback_search(snapshot, raw)),
            LocatorStrategy::Xpath => match extract_predicate(raw) {
                Some(predicate) => {
                    let found =
                        best_attribute_match(snapshot, predicate.attribute, predicate.value);
                    if found.is_none() {
                        debug!(
                            locator = %locator,
                            attribute = predicate.attribute,
                            "Predicate unmatched, no fallback search"
                        );
                    }
                    found
                }
                None => Self::fallback_search(snapshot, raw),
            },
            _ => Self::fallback_search(snapshot, raw),
        };

        match found {
            Some(found) => {
                let Some(proposal) = Self::propose(locator, found.clone()) else {
                    info!(
                        locator = %locator,
                        attribute = found.attribute,
                        value = %found.value,
                        "Matched value holds both quote kinds, not expressible as a literal"
                    );
                    return None;
                };
                info!(
                    original = %proposal.original,
                    healed = %proposal.healed,
                    score = proposal.score,
                    "Locator healed"
                );
                Some(proposal)
            }
            None => {
                info!(locator = %locator, "No heal candidate above threshold");
                None
            }
        }
    }
}

/// `//*[@attr='value']`, switching to double quotes when the value holds a single quote.
/// `None` when the value holds both quote kinds.
fn synthesize_xpath(attribute: &str, value: &str) -> Option<String> {
    match (value.contains('\''), value.contains('"')) {
        (false, _) => Some(format!("//*[@{}='{}']", attribute, value)),
        (true, false) => Some(format!("//*[@{}=\"{}\"]", attribute, value)),
        (true, true) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use soulharness_core_types::ElementNode;

    fn input(attr: &str, value: &str) -> ElementNode {
        ElementNode::new("input").with_attr(attr, value)
    }

    #[test]
    fn test_id_heals_to_id_locator() {
        let tree = DocumentTree::new(vec![input("id", "usernameField")]);
        let proposal = DefaultLocatorHealer
            .heal(&Locator::id("userName"), &tree)
            .unwrap();
        assert_eq!(proposal.healed, Locator::id("usernameField"));
        assert_eq!(proposal.attribute, "id");
    }

    #[test]
    fn test_id_miss_falls_back_to_name() {
        let tree = DocumentTree::new(vec![input("name", "userNameInput")]);
        let proposal = DefaultLocatorHealer
            .heal(&Locator::id("userName"), &tree)
            .unwrap();
        assert_eq!(proposal.healed, Locator::xpath("//*[@name='userNameInput']"));
    }

    #[test]
    fn test_xpath_name_predicate_heals_to_xpath() {
        let tree = DocumentTree::new(vec![input("name", "emailAddr")]);
        let proposal = DefaultLocatorHealer
            .heal(&Locator::xpath("//input[@name='emailAddress']"), &tree)
            .unwrap();
        assert_eq!(proposal.healed, Locator::xpath("//*[@name='emailAddr']"));
    }

    #[test]
    fn test_xpath_id_predicate_heals_to_id() {
        let tree = DocumentTree::new(vec![input("id", "btn1x")]);
        let proposal = DefaultLocatorHealer
            .heal(&Locator::xpath("//*[@id='btn1']"), &tree)
            .unwrap();
        assert_eq!(proposal.healed, Locator::id("btn1x"));
    }

    #[test]
    fn test_xpath_without_predicate_uses_raw_value() {
        let tree = DocumentTree::new(vec![input("aria-label", "//button[text()='Submit']")]);
        let proposal = DefaultLocatorHealer
            .heal(&Locator::xpath("//button[text()='Submit ']"), &tree)
            .unwrap();
        assert_eq!(proposal.attribute, "aria-label");
    }

    #[test]
    fn test_quote_in_value_uses_double_quotes() {
        let tree = DocumentTree::new(vec![input("aria-label", "Don't save")]);
        let proposal = DefaultLocatorHealer
            .heal(&Locator::name("Dont save"), &tree)
            .unwrap();
        assert_eq!(
            proposal.healed,
            Locator::xpath("//*[@aria-label=\"Don't save\"]")
        );
    }

    #[test]
    fn test_value_with_both_quote_kinds_is_declined() {
        let tree = DocumentTree::new(vec![input("aria-label", r#"Don't say "no""#)]);
        assert!(DefaultLocatorHealer
            .heal(&Locator::name(r#"Dont say "no""#), &tree)
            .is_none());
    }

    #[test]
    fn test_attribute_map_never_heals() {
        let tree = DocumentTree::new(vec![input("name", "OK")]);
        let locator = Locator::attributes([("name", "OK")]);
        assert!(DefaultLocatorHealer.heal(&locator, &tree).is_none());
    }
}
