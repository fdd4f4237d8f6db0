//! UI state for rendering.

use std::collections::VecDeque;

use testbed_core::{Morphology, Outcome};

/// How many telemetry samples the live graph keeps.
pub const TELEMETRY_WINDOW: usize = 50;

/// Validation state of one component row.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ComponentStatus {
    /// No validation run yet.
    #[default]
    Idle,
    /// A validation is in flight.
    Validating,
    /// Last delivered outcome was a pass.
    Passed(String),
    /// Last delivered outcome was a failure.
    Failed(String),
}

/// One row in the component panel.
#[derive(Debug, Clone)]
pub struct ComponentRow {
    pub name: String,
    pub status: ComponentStatus,
}

/// Snapshot of data for rendering (no async, no locks).
///
/// Mutated only on the event-loop thread: by key handling and by drained
/// deferred callbacks.
pub struct UiState {
    /// Name of the active morphology.
    pub morphology_name: String,

    /// Component rows, in configuration order.
    pub components: Vec<ComponentRow>,

    /// Index of the selected component row.
    pub selected: usize,

    /// Status line shown in the footer. Overlapping validations race on
    /// this surface; last delivered wins.
    pub status_message: String,

    /// Rolling window of sensor samples for the live graph.
    pub telemetry: VecDeque<f64>,

    /// Set by key handling to leave the event loop.
    pub should_quit: bool,
}

impl UiState {
    /// Build the initial state for a validated morphology.
    pub fn new(morphology: &Morphology) -> Self {
        Self {
            morphology_name: morphology.name.clone(),
            components: morphology
                .components
                .iter()
                .map(|name| ComponentRow {
                    name: name.clone(),
                    status: ComponentStatus::Idle,
                })
                .collect(),
            selected: 0,
            status_message: "System Ready".to_string(),
            telemetry: VecDeque::with_capacity(TELEMETRY_WINDOW),
            should_quit: false,
        }
    }

    /// Select the next component row, wrapping.
    pub fn select_next(&mut self) {
        if !self.components.is_empty() {
            self.selected = (self.selected + 1) % self.components.len();
        }
    }

    /// Select the previous component row, wrapping.
    pub fn select_prev(&mut self) {
        if !self.components.is_empty() {
            self.selected = self
                .selected
                .checked_sub(1)
                .unwrap_or(self.components.len() - 1);
        }
    }

    /// Name of the selected component, if any.
    pub fn selected_component(&self) -> Option<&str> {
        self.components.get(self.selected).map(|row| row.name.as_str())
    }

    /// All component names, in configuration order.
    pub fn component_names(&self) -> Vec<String> {
        self.components.iter().map(|row| row.name.clone()).collect()
    }

    /// Mark a component as having a validation in flight.
    pub fn mark_validating(&mut self, component: &str) {
        if let Some(row) = self.components.iter_mut().find(|row| row.name == component) {
            row.status = ComponentStatus::Validating;
        }
    }

    /// Apply a delivered outcome to the component row and the status line.
    pub fn apply_outcome(&mut self, component: &str, outcome: &Outcome) {
        if let Some(row) = self.components.iter_mut().find(|row| row.name == component) {
            row.status = if outcome.is_failure() {
                ComponentStatus::Failed(outcome.value.clone())
            } else {
                ComponentStatus::Passed(outcome.value.clone())
            };
        }
        self.status_message = format!("Last Result: {}", outcome.value);
    }

    /// Push a sensor sample, keeping only the newest [`TELEMETRY_WINDOW`]
    /// values.
    pub fn push_sample(&mut self, value: f64) {
        if self.telemetry.len() == TELEMETRY_WINDOW {
            self.telemetry.pop_front();
        }
        self.telemetry.push_back(value);
    }

    /// Newest sensor sample, if any.
    pub fn latest_sample(&self) -> Option<f64> {
        self.telemetry.back().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use testbed_core::WorkItemId;

    fn state() -> UiState {
        UiState::new(&Morphology::quadruped_v2_beta())
    }

    #[test]
    fn test_selection_wraps() {
        let mut state = state();
        assert_eq!(state.selected_component(), Some("Front_Left_Servo"));

        state.select_prev();
        assert_eq!(state.selected_component(), Some("Battery_Management"));

        state.select_next();
        assert_eq!(state.selected_component(), Some("Front_Left_Servo"));
    }

    #[test]
    fn test_apply_outcome_updates_row_and_status_line() {
        let mut state = state();
        state.mark_validating("IMU_Sensor");

        let outcome = Outcome::success(WorkItemId::generate(), "IMU_Sensor: OK");
        state.apply_outcome("IMU_Sensor", &outcome);

        let row = state.components.iter().find(|r| r.name == "IMU_Sensor").unwrap();
        assert_eq!(row.status, ComponentStatus::Passed("IMU_Sensor: OK".to_string()));
        assert_eq!(state.status_message, "Last Result: IMU_Sensor: OK");
    }

    #[test]
    fn test_failure_outcome_marks_row_failed() {
        let mut state = state();
        let outcome = Outcome::failure(WorkItemId::generate(), "IMU_Sensor", "bus timeout");
        state.apply_outcome("IMU_Sensor", &outcome);

        let row = state.components.iter().find(|r| r.name == "IMU_Sensor").unwrap();
        assert!(matches!(row.status, ComponentStatus::Failed(_)));
    }

    #[test]
    fn test_telemetry_window_is_capped() {
        let mut state = state();
        for n in 0..(TELEMETRY_WINDOW + 10) {
            state.push_sample(n as f64);
        }

        assert_eq!(state.telemetry.len(), TELEMETRY_WINDOW);
        assert_eq!(state.telemetry.front().copied(), Some(10.0));
        assert_eq!(state.latest_sample(), Some((TELEMETRY_WINDOW + 9) as f64));
    }
}
