use std::path::Path;

use anyhow::{bail, Context, Result};
use soulharness_core_types::{DocumentTree, Locator, LocatorStrategy};

/// Build a locator from CLI arguments.
///
/// Attribute-map values use `key=value` pairs separated by commas, e.g.
/// `title=OK,control_type=Button`.
pub fn parse_locator(strategy: &str, value: &str) -> Result<Locator> {
    let strategy: LocatorStrategy = strategy.parse()?;
    if strategy != LocatorStrategy::AttributeMap {
        return Ok(Locator::new(strategy, value));
    }

    let mut pairs = Vec::new();
    for pair in value.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let Some((key, val)) = pair.split_once('=') else {
            bail!("Invalid attribute pair '{}', expected key=value", pair);
        };
        pairs.push((key.trim().to_string(), val.trim().to_string()));
    }
    if pairs.is_empty() {
        bail!("Attribute locator needs at least one key=value pair");
    }
    Ok(Locator::attributes(pairs))
}

pub async fn load_snapshot(path: &Path) -> Result<DocumentTree> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
    DocumentTree::from_json(&raw)
        .with_context(|| format!("Failed to parse snapshot {}", path.display()))
}
