//! In-Memory Metrics Store
//!
//! Thread-safe, append-only storage of execution results behind
//! `Arc<RwLock>`. Data is lost on restart; use the SQLite store when
//! `DATABASE_URL` is set.

use crate::domain::ports::MetricsStore;
use crate::domain::scenario::ExecutionResult;
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

pub struct InMemoryMetricsStore {
    results: Arc<RwLock<Vec<ExecutionResult>>>,
}

impl InMemoryMetricsStore {
    pub fn new() -> Self {
        Self {
            results: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

impl Default for InMemoryMetricsStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MetricsStore for InMemoryMetricsStore {
    async fn append(&self, result: &ExecutionResult) -> Result<()> {
        self.results.write().await.push(result.clone());
        Ok(())
    }

    async fn latest(&self, limit: usize) -> Result<Vec<ExecutionResult>> {
        let results = self.results.read().await;
        Ok(results.iter().rev().take(limit).cloned().collect())
    }

    async fn all(&self) -> Result<Vec<ExecutionResult>> {
        Ok(self.results.read().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::scenario::{ProblemType, ScenarioId};
    use chrono::Utc;

    fn create_test_result(success: bool) -> ExecutionResult {
        ExecutionResult {
            scenario_id: ScenarioId::generate(),
            problem_type: ProblemType::FaultTolerance,
            difficulty: 5,
            success,
            response_time_ms: 12.5,
            throughput: 800.0,
            success_rate: if success { 0.98 } else { 0.4 },
            errors: if success { 0 } else { 7 },
            executed_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_append_and_latest() {
        let store = InMemoryMetricsStore::new();
        let first = create_test_result(true);
        let second = create_test_result(false);

        store.append(&first).await.unwrap();
        store.append(&second).await.unwrap();

        let latest = store.latest(1).await.unwrap();
        assert_eq!(latest, vec![second.clone()]);
        assert_eq!(store.latest(10).await.unwrap(), vec![second, first]);
    }

    #[tokio::test]
    async fn test_summary_over_all_results() {
        let store = InMemoryMetricsStore::new();
        assert_eq!(store.summary().await.unwrap().total_executions, 0);

        store.append(&create_test_result(true)).await.unwrap();
        store.append(&create_test_result(false)).await.unwrap();

        let summary = store.summary().await.unwrap();
        assert_eq!(summary.total_executions, 2);
        assert_eq!(summary.successful_executions, 1);
        assert_eq!(summary.total_errors, 7);
    }
}
