use crate::domain::creative::CreativeMode;
use crate::domain::errors::ScenarioError;
use crate::domain::scenario::{ExecutionResult, MetricsSummary, Scenario, ScenarioId};
use anyhow::Result;
use async_trait::async_trait;

/// Produces new scenarios for the training loop and the request surface
#[async_trait]
pub trait ScenarioGenerator: Send + Sync {
    async fn generate(&self) -> Result<Scenario, ScenarioError>;
    /// Most recent scenarios first
    async fn recent(&self, limit: usize) -> Vec<Scenario>;
}

/// Runs a previously generated scenario
#[async_trait]
pub trait ScenarioExecutor: Send + Sync {
    async fn execute(&self, id: &ScenarioId) -> Result<ExecutionResult, ScenarioError>;
}

/// Append-only sink for execution results
#[async_trait]
pub trait MetricsStore: Send + Sync {
    async fn append(&self, result: &ExecutionResult) -> Result<()>;
    /// Most recent results first
    async fn latest(&self, limit: usize) -> Result<Vec<ExecutionResult>>;
    async fn all(&self) -> Result<Vec<ExecutionResult>>;
    async fn summary(&self) -> Result<MetricsSummary> {
        let results = self.all().await?;
        Ok(MetricsSummary::from_results(&results))
    }
}

/// Chooses a creative mode when the caller does not name one
pub trait ModeSelector: Send + Sync {
    fn select(&self, modes: &[CreativeMode]) -> CreativeMode;
}
