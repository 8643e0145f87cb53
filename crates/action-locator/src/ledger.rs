//! Healing ledger - audit record of every heal applied
//!
//! Entries are grouped by the key of the original locator. Every write is kept; lookups
//! return the most recent entry per key.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::errors::LedgerError;
use crate::types::HealingEntry;

/// Stored form: original locator key -> entries in recording order
pub type LedgerHistory = BTreeMap<String, Vec<HealingEntry>>;

/// Ledger storage trait
pub trait HealingLedger: Send + Sync {
    /// Append one entry
    fn record(&self, entry: HealingEntry) -> Result<(), LedgerError>;

    /// Latest entry per original locator key
    fn load(&self) -> BTreeMap<String, HealingEntry> {
        latest(self.history())
    }

    /// All entries per original locator key
    fn history(&self) -> LedgerHistory;
}

fn latest(history: LedgerHistory) -> BTreeMap<String, HealingEntry> {
    history
        .into_iter()
        .filter_map(|(key, mut entries)| entries.pop().map(|entry| (key, entry)))
        .collect()
}

/// JSON file ledger.
///
/// Each `record` reads the file, merges the entry and replaces the whole file through a
/// temporary file in the same directory. Writers inside one process are serialized by a
/// mutex. Writers in different processes are not, and may lose updates.
#[derive(Debug)]
pub struct JsonFileLedger {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the file; a missing, unreadable or malformed file counts as empty. Entries
    /// that fail validation are dropped.
    fn read_history(&self) -> LedgerHistory {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return LedgerHistory::new(),
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "Ledger unreadable, treating as empty");
                return LedgerHistory::new();
            }
        };
        if raw.trim().is_empty() {
            return LedgerHistory::new();
        }
        let stored: BTreeMap<String, Vec<serde_json::Value>> = match serde_json::from_str(&raw) {
            Ok(stored) => stored,
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "Ledger malformed, treating as empty");
                return LedgerHistory::new();
            }
        };
        stored
            .into_iter()
            .map(|(key, values)| {
                let entries = values
                    .into_iter()
                    .filter_map(|value| match serde_json::from_value(value) {
                        Ok(entry) => Some(entry),
                        Err(err) => {
                            warn!(key = %key, error = %err, "Dropping invalid ledger entry");
                            None
                        }
                    })
                    .collect::<Vec<HealingEntry>>();
                (key, entries)
            })
            .filter(|(_, entries)| !entries.is_empty())
            .collect()
    }

    fn write_history(&self, history: &LedgerHistory) -> Result<(), LedgerError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let mut tmp = NamedTempFile::new_in(&dir)?;
        serde_json::to_writer_pretty(&mut tmp, history)?;
        tmp.write_all(b"\n")?;
        tmp.flush()?;
        tmp.persist(&self.path).map_err(|err| err.error)?;
        Ok(())
    }
}

impl HealingLedger for JsonFileLedger {
    fn record(&self, entry: HealingEntry) -> Result<(), LedgerError> {
        let _guard = self.write_lock.lock();
        let mut history = self.read_history();
        let key = entry.key();
        history.entry(key.clone()).or_default().push(entry);
        self.write_history(&history)?;
        debug!(path = %self.path.display(), key = %key, "Healing entry recorded");
        Ok(())
    }

    fn history(&self) -> LedgerHistory {
        self.read_history()
    }
}

/// In-memory ledger for tests and dry runs
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    entries: Mutex<LedgerHistory>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries recorded across all keys
    pub fn len(&self) -> usize {
        self.entries.lock().values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl HealingLedger for InMemoryLedger {
    fn record(&self, entry: HealingEntry) -> Result<(), LedgerError> {
        self.entries
            .lock()
            .entry(entry.key())
            .or_default()
            .push(entry);
        Ok(())
    }

    fn history(&self) -> LedgerHistory {
        self.entries.lock().clone()
    }
}
