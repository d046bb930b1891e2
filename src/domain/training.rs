use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of the continuous training loop.
///
/// `Idle -> Running -> Stopping -> Idle`. `Running` is only entered from `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrainingState {
    Idle,
    Running,
    Stopping,
}

impl TrainingState {
    pub fn is_active(&self) -> bool {
        !matches!(self, TrainingState::Idle)
    }
}

impl fmt::Display for TrainingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TrainingState::Idle => "idle",
            TrainingState::Running => "running",
            TrainingState::Stopping => "stopping",
        };
        write!(f, "{}", s)
    }
}

/// Point-in-time view of the training controller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingStatus {
    pub state: TrainingState,
    pub is_running: bool,
    pub scenarios_completed: u64,
    pub scenarios_failed: u64,
    pub runs_started: u64,
    pub current_run_started_at: Option<DateTime<Utc>>,
    pub last_iteration_at: Option<DateTime<Utc>>,
    pub iteration_pause_ms: u64,
}

/// Result of a `stop` request. Stopping an idle controller is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopOutcome {
    Stopping,
    AlreadyStopping,
    AlreadyIdle,
}
