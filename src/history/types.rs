use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::pricing::Estimate;
use crate::vehicle::VehicleSpec;

/// Number of past estimates kept.
pub const HISTORY_CAPACITY: usize = 10;

/// One past estimate session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub input_spec: VehicleSpec,
    pub output_estimate: Estimate,
}

/// Prepend a new entry stamped with the current time, keeping the newest
/// [`HISTORY_CAPACITY`] entries. Non-finite spec values are stored as 0, the
/// way the model reads them; JSON can't carry them.
pub fn record(history: &[HistoryEntry], spec: &VehicleSpec, estimate: &Estimate) -> Vec<HistoryEntry> {
    record_at(history, spec, estimate, Utc::now())
}

pub fn record_at(
    history: &[HistoryEntry],
    spec: &VehicleSpec,
    estimate: &Estimate,
    timestamp: DateTime<Utc>,
) -> Vec<HistoryEntry> {
    let entry = HistoryEntry {
        timestamp,
        input_spec: spec.sanitized(),
        output_estimate: estimate.clone(),
    };

    std::iter::once(entry)
        .chain(history.iter().cloned())
        .take(HISTORY_CAPACITY)
        .collect()
}
