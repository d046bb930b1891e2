use crate::domain::training::TrainingState;
use thiserror::Error;

/// Errors raised when a request carries parameters the core refuses to act on.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid intensity: {value}. Must be one of light, medium, heavy, extreme")]
    InvalidIntensity { value: String },

    #[error("Invalid duration: {value}. Must be a positive number of seconds")]
    NonPositiveDuration { value: i64 },

    #[error("Invalid duration: {value}. Must be at most {max} seconds")]
    DurationTooLong { value: i64, max: u64 },

    #[error("Unknown creative mode: {value}")]
    UnknownCreativeMode { value: String },
}

/// Errors related to training loop sequencing
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TrainingError {
    #[error("Training already running (state: {state})")]
    AlreadyRunning { state: TrainingState },
}

/// Errors surfaced by the scenario collaborators
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("Scenario not found: {id}")]
    NotFound { id: String },

    #[error("Scenario execution failed for {id}: {reason}")]
    ExecutionFailed { id: String, reason: String },
}
