//! Core domain errors.

use thiserror::Error;

/// Core domain errors for the testbed controller.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Morphology config file could not be read.
    #[error("Failed to read morphology config: {0}")]
    Io(#[from] std::io::Error),

    /// Morphology config file is not valid JSON for the expected shape.
    #[error("Malformed morphology config: {0}")]
    Parse(#[from] serde_json::Error),

    /// Morphology config parsed but failed validation.
    #[error("Invalid morphology: {0}")]
    InvalidMorphology(String),

    /// Component name not present in the active morphology.
    #[error("Unknown component: {0}")]
    UnknownComponent(String),
}
