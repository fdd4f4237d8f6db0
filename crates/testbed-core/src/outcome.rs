//! Validation outcomes produced by background work.

use crate::ids::WorkItemId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Marker embedded in every failure outcome's value.
pub const FAILURE_MARKER: &str = "FAILED";

/// The immutable outcome of a WorkItem.
///
/// Produced exactly once per work item, on the worker thread, and delivered
/// exactly once to the event-loop thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    /// Work item this outcome belongs to.
    pub work_item_id: WorkItemId,

    /// Human-readable outcome, e.g. `"IMU_Sensor: OK"`.
    pub value: String,

    /// When the payload finished.
    pub completed_at: DateTime<Utc>,
}

impl Outcome {
    /// Create a successful outcome with the payload's result value.
    pub fn success(work_item_id: WorkItemId, value: impl Into<String>) -> Self {
        Self {
            work_item_id,
            value: value.into(),
            completed_at: Utc::now(),
        }
    }

    /// Create a failure outcome for the given work label.
    ///
    /// The value always carries [`FAILURE_MARKER`] so a status surface can
    /// recognize failures without a separate flag.
    pub fn failure(work_item_id: WorkItemId, label: &str, detail: impl AsRef<str>) -> Self {
        Self {
            work_item_id,
            value: format!("{}: {} ({})", label, FAILURE_MARKER, detail.as_ref()),
            completed_at: Utc::now(),
        }
    }

    /// Returns true if this outcome carries the failure marker.
    pub fn is_failure(&self) -> bool {
        self.value.contains(FAILURE_MARKER)
    }
}
