//! Typed morphology configuration.
//!
//! A morphology is the named hardware configuration the testbed is
//! currently representing: a name plus an ordered list of component names.
//! The config is validated at load time, before any UI is constructed, so a
//! bad file fails fast with a domain error instead of surfacing as a widget
//! construction failure later.

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// The named hardware configuration the testbed is controlling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Morphology {
    /// Morphology name, e.g. `"Quadruped_v2_Beta"`.
    pub name: String,

    /// Ordered component names. Order determines UI layout.
    pub components: Vec<String>,
}

impl Morphology {
    /// Create a morphology from a name and component list.
    pub fn new(name: impl Into<String>, components: Vec<String>) -> Self {
        Self {
            name: name.into(),
            components,
        }
    }

    /// Load and validate a morphology from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Parse and validate a morphology from a JSON string.
    pub fn from_json(raw: &str) -> Result<Self, CoreError> {
        let morphology: Self = serde_json::from_str(raw)?;
        morphology.validate()?;
        Ok(morphology)
    }

    /// Validate the morphology.
    ///
    /// Rejects empty names, empty component lists, empty component names,
    /// and duplicate components.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.name.trim().is_empty() {
            return Err(CoreError::InvalidMorphology(
                "morphology name must not be empty".to_string(),
            ));
        }
        if self.components.is_empty() {
            return Err(CoreError::InvalidMorphology(format!(
                "morphology '{}' has no components",
                self.name
            )));
        }

        let mut seen = HashSet::new();
        for component in &self.components {
            if component.trim().is_empty() {
                return Err(CoreError::InvalidMorphology(format!(
                    "morphology '{}' has an empty component name",
                    self.name
                )));
            }
            if !seen.insert(component.as_str()) {
                return Err(CoreError::InvalidMorphology(format!(
                    "duplicate component '{}' in morphology '{}'",
                    component, self.name
                )));
            }
        }
        Ok(())
    }

    /// Returns true if the morphology contains the named component.
    pub fn has_component(&self, name: &str) -> bool {
        self.components.iter().any(|c| c == name)
    }

    /// Default quadruped test rig.
    pub fn quadruped_v2_beta() -> Self {
        Self::new(
            "Quadruped_v2_Beta",
            vec![
                "Front_Left_Servo".to_string(),
                "Front_Right_Servo".to_string(),
                "IMU_Sensor".to_string(),
                "Battery_Management".to_string(),
            ],
        )
    }

    /// Bench rig with thermal and torque instrumentation.
    pub fn goat_testing_rig_v0() -> Self {
        Self::new(
            "GOAT_Testing_Rig_v0",
            vec![
                "Motor_Controller_Alpha".to_string(),
                "Torque_Sensor_01".to_string(),
                "Thermal_Probe_A".to_string(),
                "Thermal_Probe_B".to_string(),
                "Emergency_Stop_Circuit".to_string(),
            ],
        )
    }

    /// Propulsion system configuration.
    pub fn propulsion_system_v4() -> Self {
        Self::new(
            "Propulsion_System_v4",
            vec![
                "Thrust_Vector_Servo".to_string(),
                "Fuel_Pressure_Valve".to_string(),
                "Ignition_Module".to_string(),
            ],
        )
    }
}

impl Default for Morphology {
    fn default() -> Self {
        Self::quadruped_v2_beta()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        Morphology::quadruped_v2_beta().validate().unwrap();
        Morphology::goat_testing_rig_v0().validate().unwrap();
        Morphology::propulsion_system_v4().validate().unwrap();
    }

    #[test]
    fn test_from_json() {
        let raw = r#"{"name": "Bench_Rig", "components": ["Servo_A", "Servo_B"]}"#;
        let morphology = Morphology::from_json(raw).unwrap();

        assert_eq!(morphology.name, "Bench_Rig");
        assert_eq!(morphology.components.len(), 2);
        assert!(morphology.has_component("Servo_A"));
        assert!(!morphology.has_component("Servo_C"));
    }

    #[test]
    fn test_rejects_unknown_fields() {
        let raw = r#"{"name": "Rig", "components": ["A"], "padding": 10}"#;
        assert!(matches!(
            Morphology::from_json(raw),
            Err(CoreError::Parse(_))
        ));
    }

    #[test]
    fn test_rejects_empty_components() {
        let morphology = Morphology::new("Rig", vec![]);
        assert!(matches!(
            morphology.validate(),
            Err(CoreError::InvalidMorphology(_))
        ));
    }

    #[test]
    fn test_rejects_duplicate_components() {
        let morphology =
            Morphology::new("Rig", vec!["Servo".to_string(), "Servo".to_string()]);
        let err = morphology.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_rejects_empty_name() {
        let morphology = Morphology::new("  ", vec!["Servo".to_string()]);
        assert!(morphology.validate().is_err());
    }
}
