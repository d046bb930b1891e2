use crate::domain::errors::ScenarioError;
use crate::domain::ports::{MetricsStore, ScenarioExecutor};
use crate::domain::scenario::{ExecutionResult, Scenario, ScenarioId};
use crate::infrastructure::simulation::generator::InProcessScenarioGenerator;
use crate::infrastructure::simulation::latency_model::{DifficultyLatency, LatencyModel};
use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;
use std::sync::Arc;
use tracing::{debug, warn};

/// Executes generated scenarios against a simulated system and records every
/// result in the metrics store.
pub struct SimulatedExecutor {
    scenarios: Arc<InProcessScenarioGenerator>,
    store: Arc<dyn MetricsStore>,
    latency: Box<dyn LatencyModel>,
}

impl SimulatedExecutor {
    pub fn new(scenarios: Arc<InProcessScenarioGenerator>, store: Arc<dyn MetricsStore>) -> Self {
        Self::with_latency(scenarios, store, Box::new(DifficultyLatency::default()))
    }

    pub fn with_latency(
        scenarios: Arc<InProcessScenarioGenerator>,
        store: Arc<dyn MetricsStore>,
        latency: Box<dyn LatencyModel>,
    ) -> Self {
        Self {
            scenarios,
            store,
            latency,
        }
    }

    fn simulate(&self, scenario: &Scenario) -> ExecutionResult {
        let mut rng = rand::rng();
        let difficulty = scenario.difficulty.clamp(1, 10);
        let pressure = difficulty as f64 / 10.0;

        // Harder scenarios are slower and fail more often
        let success_rate = (1.0 - pressure * rng.random_range(0.0..0.4)).clamp(0.0, 1.0);
        let success = success_rate >= 0.8;
        let errors = if success {
            0
        } else {
            rng.random_range(1..=difficulty as u32 * 2)
        };
        let response_time_ms = self.latency.response_time_ms(difficulty);
        let throughput = if response_time_ms > 0.0 {
            1000.0 / response_time_ms * rng.random_range(50.0..150.0)
        } else {
            0.0
        };

        ExecutionResult {
            scenario_id: scenario.id.clone(),
            problem_type: scenario.problem_type,
            difficulty,
            success,
            response_time_ms,
            throughput,
            success_rate,
            errors,
            executed_at: Utc::now(),
        }
    }
}

#[async_trait]
impl ScenarioExecutor for SimulatedExecutor {
    async fn execute(&self, id: &ScenarioId) -> Result<ExecutionResult, ScenarioError> {
        let scenario = self
            .scenarios
            .find(id)
            .await
            .ok_or_else(|| ScenarioError::NotFound { id: id.to_string() })?;

        let result = self.simulate(&scenario);
        if let Err(e) = self.store.append(&result).await {
            warn!("SimulatedExecutor: failed to record result for {}: {}", id, e);
        }
        debug!(
            "SimulatedExecutor: {} finished, success={} in {:.1}ms",
            id, result.success, result.response_time_ms
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::ScenarioGenerator;
    use crate::infrastructure::repositories::InMemoryMetricsStore;
    use crate::infrastructure::simulation::latency_model::FixedLatency;

    #[tokio::test]
    async fn test_execute_records_result() {
        let generator = Arc::new(InProcessScenarioGenerator::new(10));
        let store = Arc::new(InMemoryMetricsStore::new());
        let executor =
            SimulatedExecutor::with_latency(generator.clone(), store.clone(), Box::new(FixedLatency(25.0)));

        let scenario = generator.generate().await.unwrap();
        let result = executor.execute(&scenario.id).await.unwrap();

        assert_eq!(result.scenario_id, scenario.id);
        assert_eq!(result.response_time_ms, 25.0);
        assert!((0.0..=1.0).contains(&result.success_rate));
        assert_eq!(result.success, result.errors == 0);
        assert_eq!(store.latest(10).await.unwrap(), vec![result]);
    }

    #[tokio::test]
    async fn test_unknown_scenario_is_not_found() {
        let generator = Arc::new(InProcessScenarioGenerator::new(10));
        let store = Arc::new(InMemoryMetricsStore::new());
        let executor = SimulatedExecutor::new(generator, store.clone());

        let err = executor
            .execute(&ScenarioId::from("does-not-exist"))
            .await
            .unwrap_err();
        assert!(matches!(err, ScenarioError::NotFound { .. }));
        assert!(store.all().await.unwrap().is_empty());
    }
}
