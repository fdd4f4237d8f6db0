//! Status enum for work items.

use serde::{Deserialize, Serialize};

/// Status of a WorkItem as it moves through the dispatcher.
///
/// Lifecycle: `Submitted -> Running -> (Completed | Failed) -> Delivered`.
/// There is no cancellation; a revision adding it would insert a
/// `Cancelled` state reachable from `Running`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkStatus {
    /// Work item created but its worker has not started yet.
    #[default]
    Submitted,
    /// Worker thread is executing the payload.
    Running,
    /// Payload finished successfully; outcome not yet delivered.
    Completed,
    /// Payload failed or panicked; failure outcome not yet delivered.
    Failed,
    /// Outcome was applied to UI state on the event-loop thread.
    Delivered,
}

impl WorkStatus {
    /// Returns true if the work item has reached its terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered)
    }

    /// Returns true if the work item is still in flight (not terminal).
    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    /// Returns true if the payload has finished executing, whether or not
    /// its outcome has been delivered yet.
    pub fn has_finished_work(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Delivered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_delivered_is_terminal() {
        assert!(WorkStatus::Delivered.is_terminal());
        assert!(!WorkStatus::Submitted.is_terminal());
        assert!(!WorkStatus::Running.is_terminal());
        assert!(!WorkStatus::Completed.is_terminal());
        assert!(!WorkStatus::Failed.is_terminal());
    }

    #[test]
    fn test_finished_work() {
        assert!(!WorkStatus::Running.has_finished_work());
        assert!(WorkStatus::Completed.has_finished_work());
        assert!(WorkStatus::Failed.has_finished_work());
        assert!(WorkStatus::Delivered.has_finished_work());
    }

    #[test]
    fn test_default_is_submitted() {
        assert_eq!(WorkStatus::default(), WorkStatus::Submitted);
        assert!(WorkStatus::default().is_active());
    }
}
