use super::store::KeyValueStore;
use super::types::{record, HistoryEntry, HISTORY_CAPACITY};
use crate::error::{Error, Result};
use crate::pricing::Estimate;
use crate::vehicle::VehicleSpec;

/// Well-known slot the history lives under.
pub const HISTORY_KEY: &str = "car-value:history";

/// Read the persisted history, reporting why it couldn't be read.
///
/// A missing slot is an empty history. Anything that isn't a JSON array is
/// [`Error::CorruptState`]. Array elements that don't parse as entries are
/// skipped.
pub fn read_history<S: KeyValueStore + ?Sized>(store: &S, key: &str) -> Result<Vec<HistoryEntry>> {
    let bytes = match store.get(key).map_err(Error::Persistence)? {
        Some(bytes) => bytes,
        None => return Ok(Vec::new()),
    };

    let value: serde_json::Value =
        serde_json::from_slice(&bytes).map_err(|e| Error::CorruptState(e.to_string()))?;

    let items = match value {
        serde_json::Value::Array(items) => items,
        other => {
            return Err(Error::CorruptState(format!(
                "expected an array, found {}",
                json_kind(&other)
            )))
        }
    };

    let total = items.len();
    let entries: Vec<HistoryEntry> = items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .take(HISTORY_CAPACITY)
        .collect();

    if entries.len() < total.min(HISTORY_CAPACITY) {
        log::debug!(
            "Skipped {} unreadable history entries",
            total.min(HISTORY_CAPACITY) - entries.len()
        );
    }

    Ok(entries)
}

/// Load the history, treating any failure as an empty history.
pub fn load<S: KeyValueStore + ?Sized>(store: &S, key: &str) -> Vec<HistoryEntry> {
    match read_history(store, key) {
        Ok(entries) => entries,
        Err(e) => {
            log::warn!("Ignoring stored history: {}", e);
            Vec::new()
        }
    }
}

/// Write the full history to the slot.
pub fn write_history<S: KeyValueStore + ?Sized>(
    store: &S,
    key: &str,
    history: &[HistoryEntry],
) -> Result<()> {
    let bounded = &history[..history.len().min(HISTORY_CAPACITY)];
    let json = serde_json::to_vec(bounded).map_err(|e| Error::Persistence(e.into()))?;
    store.set(key, &json).map_err(Error::Persistence)
}

/// Write the history, absorbing failure. Returns whether it was persisted.
pub fn save<S: KeyValueStore + ?Sized>(store: &S, key: &str, history: &[HistoryEntry]) -> bool {
    match write_history(store, key, history) {
        Ok(()) => true,
        Err(e) => {
            log::warn!("History kept in memory only: {}", e);
            false
        }
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

/// Session-scoped history: loaded once, updated in memory, written through.
///
/// The in-memory entries stay authoritative when a write fails.
pub struct HistoryLog<S: KeyValueStore> {
    store: S,
    key: String,
    entries: Vec<HistoryEntry>,
}

impl<S: KeyValueStore> HistoryLog<S> {
    pub fn open(store: S, key: impl Into<String>) -> Self {
        let key = key.into();
        let entries = load(&store, &key);
        log::debug!("Loaded {} history entries from '{}'", entries.len(), key);
        Self { store, key, entries }
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Record an estimate. Returns whether the new history was persisted.
    pub fn record(&mut self, spec: &VehicleSpec, estimate: &Estimate) -> bool {
        self.entries = record(&self.entries, spec, estimate);
        save(&self.store, &self.key, &self.entries)
    }

    /// Drop all entries, in memory and in the store.
    pub fn clear(&mut self) -> bool {
        self.entries.clear();
        match self.store.remove(&self.key) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Failed to clear stored history: {:#}", e);
                false
            }
        }
    }
}
