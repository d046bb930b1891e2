//! Training loop configuration parsing from environment variables.

use super::parse_env;
use crate::application::training::TrainingConfig;
use crate::infrastructure::simulation::generator::DEFAULT_HISTORY_LIMIT;
use anyhow::Result;
use std::time::Duration;

/// Training environment configuration
#[derive(Debug, Clone)]
pub struct TrainingEnvConfig {
    pub iteration_pause_ms: u64,
    /// Generated scenarios kept for lookup and `/api/problems/recent`
    pub scenario_history_limit: usize,
}

impl Default for TrainingEnvConfig {
    fn default() -> Self {
        Self {
            iteration_pause_ms: 2000,
            scenario_history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

impl TrainingEnvConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            iteration_pause_ms: parse_env("TRAINING_ITERATION_PAUSE_MS", 2000)?,
            scenario_history_limit: parse_env("SCENARIO_HISTORY_LIMIT", DEFAULT_HISTORY_LIMIT)?,
        })
    }

    pub fn to_training_config(&self) -> TrainingConfig {
        TrainingConfig {
            iteration_pause: Duration::from_millis(self.iteration_pause_ms),
        }
    }
}
