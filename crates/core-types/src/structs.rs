use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One dated, signed fractional-performance record: a trade outcome or a
/// periodic return.
///
/// The `value` field is always a fractional unit return (0.01 == 1%),
/// regardless of whether the source table called it an ROI or a period
/// return. The optional `label` (e.g. an instrument symbol) is carried
/// through to the per-observation output but never used in a computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnObservation {
    /// Timezone-aware point in time; non-decreasing across a loaded sequence.
    pub timestamp: DateTime<Utc>,
    /// Signed fractional return for this observation.
    pub value: f64,
    /// Optional category label, e.g. the traded symbol.
    pub label: Option<String>,
}

impl ReturnObservation {
    pub fn new(timestamp: DateTime<Utc>, value: f64, label: Option<String>) -> Self {
        Self {
            timestamp,
            value,
            label,
        }
    }
}
