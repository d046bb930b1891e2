use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScenarioId(String);

impl ScenarioId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ScenarioId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for ScenarioId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Family of generated problems
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProblemType {
    LoadBalancing,
    ResourceAllocation,
    FaultTolerance,
    DataProcessing,
    ConcurrentRequests,
    NetworkLatency,
}

impl ProblemType {
    pub const ALL: [ProblemType; 6] = [
        ProblemType::LoadBalancing,
        ProblemType::ResourceAllocation,
        ProblemType::FaultTolerance,
        ProblemType::DataProcessing,
        ProblemType::ConcurrentRequests,
        ProblemType::NetworkLatency,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProblemType::LoadBalancing => "load_balancing",
            ProblemType::ResourceAllocation => "resource_allocation",
            ProblemType::FaultTolerance => "fault_tolerance",
            ProblemType::DataProcessing => "data_processing",
            ProblemType::ConcurrentRequests => "concurrent_requests",
            ProblemType::NetworkLatency => "network_latency",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == name)
    }
}

impl fmt::Display for ProblemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A generated unit of work. Contents are opaque to the training loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub id: ScenarioId,
    pub problem_type: ProblemType,
    /// 1 (trivial) to 10 (hardest)
    pub difficulty: u8,
    pub description: String,
    pub parameters: Value,
    pub created_at: DateTime<Utc>,
}

/// Outcome of executing one scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub scenario_id: ScenarioId,
    pub problem_type: ProblemType,
    pub difficulty: u8,
    pub success: bool,
    pub response_time_ms: f64,
    pub throughput: f64,
    pub success_rate: f64,
    pub errors: u32,
    pub executed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub total_executions: usize,
    pub successful_executions: usize,
    pub success_rate: f64,
    pub average_response_time_ms: f64,
    pub average_throughput: f64,
    pub total_errors: u64,
}

impl MetricsSummary {
    pub fn from_results(results: &[ExecutionResult]) -> Self {
        if results.is_empty() {
            return Self::default();
        }
        let n = results.len() as f64;
        let successful = results.iter().filter(|r| r.success).count();
        Self {
            total_executions: results.len(),
            successful_executions: successful,
            success_rate: successful as f64 / n,
            average_response_time_ms: results.iter().map(|r| r.response_time_ms).sum::<f64>()
                / n,
            average_throughput: results.iter().map(|r| r.throughput).sum::<f64>() / n,
            total_errors: results.iter().map(|r| r.errors as u64).sum(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemTypeStats {
    pub executions: usize,
    pub success_rate: f64,
    pub average_response_time_ms: f64,
    pub average_difficulty: f64,
}

/// Per-problem-type breakdown of execution history
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceAnalytics {
    pub total_executions: usize,
    pub by_problem_type: BTreeMap<ProblemType, ProblemTypeStats>,
}

impl PerformanceAnalytics {
    pub fn from_results(results: &[ExecutionResult]) -> Self {
        let mut grouped: BTreeMap<ProblemType, Vec<&ExecutionResult>> = BTreeMap::new();
        for result in results {
            grouped.entry(result.problem_type).or_default().push(result);
        }

        let by_problem_type = grouped
            .into_iter()
            .map(|(problem_type, group)| {
                let n = group.len() as f64;
                let stats = ProblemTypeStats {
                    executions: group.len(),
                    success_rate: group.iter().filter(|r| r.success).count() as f64 / n,
                    average_response_time_ms: group.iter().map(|r| r.response_time_ms).sum::<f64>()
                        / n,
                    average_difficulty: group.iter().map(|r| r.difficulty as f64).sum::<f64>() / n,
                };
                (problem_type, stats)
            })
            .collect();

        Self {
            total_executions: results.len(),
            by_problem_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(problem_type: ProblemType, success: bool, response_time_ms: f64) -> ExecutionResult {
        ExecutionResult {
            scenario_id: ScenarioId::generate(),
            problem_type,
            difficulty: 4,
            success,
            response_time_ms,
            throughput: 100.0,
            success_rate: if success { 1.0 } else { 0.0 },
            errors: if success { 0 } else { 3 },
            executed_at: Utc::now(),
        }
    }

    #[test]
    fn test_summary_of_empty_history() {
        let summary = MetricsSummary::from_results(&[]);
        assert_eq!(summary.total_executions, 0);
        assert_eq!(summary.success_rate, 0.0);
    }

    #[test]
    fn test_summary_aggregates() {
        let results = vec![
            result(ProblemType::LoadBalancing, true, 10.0),
            result(ProblemType::LoadBalancing, false, 30.0),
        ];
        let summary = MetricsSummary::from_results(&results);
        assert_eq!(summary.total_executions, 2);
        assert_eq!(summary.successful_executions, 1);
        assert!((summary.success_rate - 0.5).abs() < f64::EPSILON);
        assert!((summary.average_response_time_ms - 20.0).abs() < f64::EPSILON);
        assert_eq!(summary.total_errors, 3);
    }

    #[test]
    fn test_analytics_groups_by_problem_type() {
        let results = vec![
            result(ProblemType::LoadBalancing, true, 10.0),
            result(ProblemType::FaultTolerance, false, 30.0),
            result(ProblemType::FaultTolerance, true, 50.0),
        ];
        let analytics = PerformanceAnalytics::from_results(&results);
        assert_eq!(analytics.total_executions, 3);
        let ft = &analytics.by_problem_type[&ProblemType::FaultTolerance];
        assert_eq!(ft.executions, 2);
        assert!((ft.average_response_time_ms - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_problem_type_round_trips_by_name() {
        for p in ProblemType::ALL {
            assert_eq!(ProblemType::from_name(p.as_str()), Some(p));
        }
        assert_eq!(ProblemType::from_name("nope"), None);
    }
}
