use crate::domain::errors::ScenarioError;
use crate::domain::ports::ScenarioGenerator;
use crate::domain::scenario::{ProblemType, Scenario, ScenarioId};
use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;
use serde_json::{Value, json};
use std::collections::VecDeque;
use tokio::sync::RwLock;
use tracing::debug;

pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Generates randomized scenarios and remembers the most recent ones
pub struct InProcessScenarioGenerator {
    history: RwLock<VecDeque<Scenario>>,
    limit: usize,
}

impl InProcessScenarioGenerator {
    pub fn new(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            history: RwLock::new(VecDeque::with_capacity(limit)),
            limit,
        }
    }

    /// Look up a scenario still held in the recent history
    pub async fn find(&self, id: &ScenarioId) -> Option<Scenario> {
        self.history
            .read()
            .await
            .iter()
            .find(|s| &s.id == id)
            .cloned()
    }
}

impl Default for InProcessScenarioGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

fn describe(problem_type: ProblemType, difficulty: u8) -> String {
    let subject = match problem_type {
        ProblemType::LoadBalancing => "Distribute incoming traffic across backend nodes",
        ProblemType::ResourceAllocation => "Allocate constrained CPU and memory between jobs",
        ProblemType::FaultTolerance => "Keep the service available while nodes fail",
        ProblemType::DataProcessing => "Process a batch of records within the deadline",
        ProblemType::ConcurrentRequests => "Serve a burst of concurrent client requests",
        ProblemType::NetworkLatency => "Meet response targets over a degraded network",
    };
    format!("{} (difficulty {}/10)", subject, difficulty)
}

fn parameters(problem_type: ProblemType, difficulty: u8, rng: &mut impl Rng) -> Value {
    let d = difficulty as u32;
    match problem_type {
        ProblemType::LoadBalancing => json!({
            "nodes": rng.random_range(2..=4 + d),
            "requests_per_second": 100 * d * rng.random_range(1..=10u32),
        }),
        ProblemType::ResourceAllocation => json!({
            "jobs": rng.random_range(5..=5 + 3 * d),
            "cpu_cores": rng.random_range(1..=8u32),
            "memory_mb": rng.random_range(256..=4096u32),
        }),
        ProblemType::FaultTolerance => json!({
            "replicas": rng.random_range(2..=5u32),
            "failure_rate": d as f64 * 0.03,
        }),
        ProblemType::DataProcessing => json!({
            "records": 1000 * d * rng.random_range(1..=20u32),
            "deadline_ms": rng.random_range(100..=2000u32),
        }),
        ProblemType::ConcurrentRequests => json!({
            "clients": rng.random_range(10..=50 * d),
            "burst_seconds": rng.random_range(1..=10u32),
        }),
        ProblemType::NetworkLatency => json!({
            "base_latency_ms": rng.random_range(10..=40 * d),
            "packet_loss": d as f64 * 0.005,
        }),
    }
}

#[async_trait]
impl ScenarioGenerator for InProcessScenarioGenerator {
    async fn generate(&self) -> Result<Scenario, ScenarioError> {
        let scenario = {
            let mut rng = rand::rng();
            let problem_type = ProblemType::ALL[rng.random_range(0..ProblemType::ALL.len())];
            let difficulty = rng.random_range(1..=10u8);
            Scenario {
                id: ScenarioId::generate(),
                problem_type,
                difficulty,
                description: describe(problem_type, difficulty),
                parameters: parameters(problem_type, difficulty, &mut rng),
                created_at: Utc::now(),
            }
        };

        let mut history = self.history.write().await;
        if history.len() == self.limit {
            history.pop_front();
        }
        history.push_back(scenario.clone());
        debug!(
            "ScenarioGenerator: generated {} ({})",
            scenario.id, scenario.problem_type
        );

        Ok(scenario)
    }

    async fn recent(&self, limit: usize) -> Vec<Scenario> {
        self.history
            .read()
            .await
            .iter()
            .rev()
            .take(limit)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_generated_scenarios_are_findable() {
        let generator = InProcessScenarioGenerator::new(10);
        let scenario = generator.generate().await.unwrap();

        assert!((1..=10).contains(&scenario.difficulty));
        assert!(scenario.parameters.is_object());
        assert_eq!(generator.find(&scenario.id).await, Some(scenario));
        assert_eq!(generator.find(&ScenarioId::from("missing")).await, None);
    }

    #[tokio::test]
    async fn test_history_is_bounded_and_newest_first() {
        let generator = InProcessScenarioGenerator::new(3);
        let mut ids = Vec::new();
        for _ in 0..5 {
            ids.push(generator.generate().await.unwrap().id);
        }

        let recent: Vec<ScenarioId> = generator.recent(10).await.into_iter().map(|s| s.id).collect();
        assert_eq!(recent, vec![ids[4].clone(), ids[3].clone(), ids[2].clone()]);
        assert_eq!(generator.recent(1).await.len(), 1);
        assert_eq!(generator.find(&ids[0]).await, None);
    }
}
