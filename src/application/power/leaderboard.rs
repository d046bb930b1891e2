use crate::domain::power::{Grade, Intensity, StressTestResult};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Ordering;

pub const LEADERBOARD_SIZE: usize = 10;
pub const NO_RESULTS_MESSAGE: &str = "No stress tests completed yet";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardEntry {
    pub timestamp: DateTime<Utc>,
    pub id: u64,
    pub ops_per_second: f64,
    pub grade: Grade,
    pub intensity: Intensity,
    pub error_rate: f64,
}

impl From<&StressTestResult> for LeaderboardEntry {
    fn from(result: &StressTestResult) -> Self {
        Self {
            timestamp: result.timestamp,
            id: result.id,
            ops_per_second: result.operations_per_second,
            grade: result.grade,
            intensity: result.intensity,
            error_rate: result.error_rate,
        }
    }
}

/// Ranked view of the stress history. Serializes to one of two shapes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LeaderboardView {
    NoData {
        message: String,
    },
    Ranked {
        leaderboard: Vec<LeaderboardEntry>,
        total_tests: usize,
    },
}

impl LeaderboardView {
    pub fn entries(&self) -> &[LeaderboardEntry] {
        match self {
            LeaderboardView::NoData { .. } => &[],
            LeaderboardView::Ranked { leaderboard, .. } => leaderboard,
        }
    }
}

/// Rank by throughput, fastest first. Ties go to the earlier run.
pub fn rank(history: &[StressTestResult]) -> LeaderboardView {
    if history.is_empty() {
        return LeaderboardView::NoData {
            message: NO_RESULTS_MESSAGE.to_string(),
        };
    }

    let mut sorted: Vec<&StressTestResult> = history.iter().collect();
    sorted.sort_by(|a, b| {
        b.operations_per_second
            .partial_cmp(&a.operations_per_second)
            .unwrap_or(Ordering::Equal)
            .then(a.id.cmp(&b.id))
    });

    LeaderboardView::Ranked {
        leaderboard: sorted
            .into_iter()
            .take(LEADERBOARD_SIZE)
            .map(LeaderboardEntry::from)
            .collect(),
        total_tests: history.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn result(id: u64, ops: f64) -> StressTestResult {
        StressTestResult {
            id,
            timestamp: Utc::now(),
            intensity: Intensity::Medium,
            duration_secs: 1,
            elapsed_secs: 1.0,
            operations_completed: ops as u64,
            operations_failed: 0,
            operations_per_second: ops,
            error_rate: 0.0,
            grade: Grade::from_metrics(ops, 0.0),
        }
    }

    #[test]
    fn test_empty_history_has_explicit_message() {
        let view = rank(&[]);
        assert_eq!(
            serde_json::to_value(&view).unwrap(),
            json!({ "message": "No stress tests completed yet" })
        );
        assert!(view.entries().is_empty());
    }

    #[test]
    fn test_fastest_result_ranks_first() {
        let history = vec![result(1, 10.0), result(2, 50.0), result(3, 30.0)];
        let view = rank(&history);

        let ranked: Vec<u64> = view.entries().iter().map(|e| e.id).collect();
        assert_eq!(ranked, vec![2, 3, 1]);
        assert!((view.entries()[0].ops_per_second - 50.0).abs() < f64::EPSILON);

        let value = serde_json::to_value(&view).unwrap();
        assert_eq!(value["total_tests"], 3);
        assert_eq!(value["leaderboard"][0]["intensity"], "medium");
    }

    #[test]
    fn test_ties_keep_earlier_result_first() {
        let history = vec![result(1, 20.0), result(2, 40.0), result(3, 20.0)];
        let ranked: Vec<u64> = rank(&history).entries().iter().map(|e| e.id).collect();
        assert_eq!(ranked, vec![2, 1, 3]);
    }

    #[test]
    fn test_only_top_ten_are_listed() {
        let history: Vec<_> = (1..=15).map(|i| result(i, i as f64 * 100.0)).collect();
        match rank(&history) {
            LeaderboardView::Ranked {
                leaderboard,
                total_tests,
            } => {
                assert_eq!(leaderboard.len(), LEADERBOARD_SIZE);
                assert_eq!(total_tests, 15);
                assert_eq!(leaderboard[0].id, 15);
            }
            other => panic!("unexpected view: {:?}", other),
        }
    }
}
