use crate::domain::errors::ValidationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Workload magnitude of a stress test
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Intensity {
    Light,
    #[default]
    Medium,
    Heavy,
    Extreme,
}

impl Intensity {
    pub const ALL: [Intensity; 4] = [
        Intensity::Light,
        Intensity::Medium,
        Intensity::Heavy,
        Intensity::Extreme,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Intensity::Light => "light",
            Intensity::Medium => "medium",
            Intensity::Heavy => "heavy",
            Intensity::Extreme => "extreme",
        }
    }
}

impl fmt::Display for Intensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Intensity {
    type Err = ValidationError;

    /// Only the exact lowercase names are accepted
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Intensity::Light),
            "medium" => Ok(Intensity::Medium),
            "heavy" => Ok(Intensity::Heavy),
            "extreme" => Ok(Intensity::Extreme),
            _ => Err(ValidationError::InvalidIntensity {
                value: s.to_string(),
            }),
        }
    }
}

/// Qualitative rating of a stress-test result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Grade {
    S,
    A,
    B,
    C,
    D,
    F,
}

/// Error rate above which a run fails outright.
pub const FAILING_ERROR_RATE: f64 = 0.10;
/// Error rate above which a run loses one grade step.
pub const DEGRADED_ERROR_RATE: f64 = 0.01;

/// Minimum ops/sec per throughput tier, best first.
const THROUGHPUT_TIERS: [(f64, Grade); 4] = [
    (100_000.0, Grade::S),
    (50_000.0, Grade::A),
    (10_000.0, Grade::B),
    (1_000.0, Grade::C),
];

impl Grade {
    pub const ALL: [Grade; 6] = [Grade::S, Grade::A, Grade::B, Grade::C, Grade::D, Grade::F];

    /// Grade a run from its throughput and error rate.
    ///
    /// Monotonic: more throughput or fewer errors never produce a worse grade.
    pub fn from_metrics(operations_per_second: f64, error_rate: f64) -> Self {
        if error_rate > FAILING_ERROR_RATE {
            return Grade::F;
        }

        let tier = THROUGHPUT_TIERS
            .iter()
            .find(|(min_ops, _)| operations_per_second >= *min_ops)
            .map(|(_, grade)| *grade)
            .unwrap_or(Grade::D);

        if error_rate > DEGRADED_ERROR_RATE {
            tier.step_down()
        } else {
            tier
        }
    }

    fn step_down(self) -> Self {
        match self {
            Grade::S => Grade::A,
            Grade::A => Grade::B,
            Grade::B => Grade::C,
            Grade::C | Grade::D => Grade::D,
            Grade::F => Grade::F,
        }
    }

    /// Higher is better.
    pub fn rank(&self) -> u8 {
        match self {
            Grade::S => 5,
            Grade::A => 4,
            Grade::B => 3,
            Grade::C => 2,
            Grade::D => 1,
            Grade::F => 0,
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Grade::S => "S",
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        };
        f.write_str(s)
    }
}

/// Raw counters produced by one workload run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkloadOutcome {
    pub intensity: Intensity,
    pub duration_secs: u64,
    pub elapsed_secs: f64,
    pub operations_completed: u64,
    pub operations_failed: u64,
}

impl WorkloadOutcome {
    pub fn operations_per_second(&self) -> f64 {
        if self.elapsed_secs > 0.0 {
            self.operations_completed as f64 / self.elapsed_secs
        } else {
            0.0
        }
    }

    pub fn error_rate(&self) -> f64 {
        let total = self.operations_completed + self.operations_failed;
        if total == 0 {
            0.0
        } else {
            self.operations_failed as f64 / total as f64
        }
    }
}

/// One recorded stress test. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressTestResult {
    /// Monotonic sequence id, unique per process
    pub id: u64,
    pub timestamp: DateTime<Utc>,
    pub intensity: Intensity,
    pub duration_secs: u64,
    pub elapsed_secs: f64,
    pub operations_completed: u64,
    pub operations_failed: u64,
    pub operations_per_second: f64,
    pub error_rate: f64,
    pub grade: Grade,
}

impl StressTestResult {
    pub fn from_outcome(id: u64, timestamp: DateTime<Utc>, outcome: WorkloadOutcome) -> Self {
        let operations_per_second = outcome.operations_per_second();
        let error_rate = outcome.error_rate();
        Self {
            id,
            timestamp,
            intensity: outcome.intensity,
            duration_secs: outcome.duration_secs,
            elapsed_secs: outcome.elapsed_secs,
            operations_completed: outcome.operations_completed,
            operations_failed: outcome.operations_failed,
            operations_per_second,
            error_rate,
            grade: Grade::from_metrics(operations_per_second, error_rate),
        }
    }
}

/// Quick capability snapshot, not recorded in the stress history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerMeasurement {
    pub timestamp: DateTime<Utc>,
    pub cpu_cores: usize,
    pub probe_ms: u64,
    pub operations: u64,
    pub operations_per_second: f64,
    pub per_core_ops_per_second: f64,
    /// Throughput normalized to thousands of ops/sec
    pub power_score: f64,
}

/// Aggregate of one benchmark suite run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkSuiteResult {
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub results: Vec<StressTestResult>,
    pub total_operations: u64,
    pub average_ops_per_second: f64,
    pub peak_ops_per_second: f64,
    pub overall_grade: Grade,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntensityStats {
    pub tests: usize,
    pub mean_ops_per_second: f64,
    pub std_dev_ops_per_second: f64,
    pub best_grade: Grade,
}

/// Aggregate statistics over the recorded history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerReport {
    pub total_tests: usize,
    pub average_ops_per_second: f64,
    pub peak_ops_per_second: f64,
    pub average_error_rate: f64,
    pub best_grade: Option<Grade>,
    pub by_intensity: BTreeMap<Intensity, IntensityStats>,
    pub last_measurement: Option<PowerMeasurement>,
    pub generated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(completed: u64, failed: u64, elapsed: f64) -> WorkloadOutcome {
        WorkloadOutcome {
            intensity: Intensity::Heavy,
            duration_secs: 5,
            elapsed_secs: elapsed,
            operations_completed: completed,
            operations_failed: failed,
        }
    }

    #[test]
    fn test_intensity_parsing() {
        assert_eq!("light".parse::<Intensity>(), Ok(Intensity::Light));
        assert_eq!("extreme".parse::<Intensity>(), Ok(Intensity::Extreme));
        for near_miss in ["EXTREME", " heavy ", "Light", ""] {
            assert!(matches!(
                near_miss.parse::<Intensity>(),
                Err(ValidationError::InvalidIntensity { .. })
            ));
        }
        assert!(matches!(
            "bogus".parse::<Intensity>(),
            Err(ValidationError::InvalidIntensity { .. })
        ));
        assert_eq!(Intensity::default(), Intensity::Medium);
    }

    #[test]
    fn test_error_rate_zero_when_nothing_ran() {
        let o = outcome(0, 0, 0.0);
        assert_eq!(o.error_rate(), 0.0);
        assert_eq!(o.operations_per_second(), 0.0);
    }

    #[test]
    fn test_grade_thresholds() {
        assert_eq!(Grade::from_metrics(150_000.0, 0.0), Grade::S);
        assert_eq!(Grade::from_metrics(60_000.0, 0.0), Grade::A);
        assert_eq!(Grade::from_metrics(20_000.0, 0.0), Grade::B);
        assert_eq!(Grade::from_metrics(2_000.0, 0.0), Grade::C);
        assert_eq!(Grade::from_metrics(10.0, 0.0), Grade::D);
        assert_eq!(Grade::from_metrics(150_000.0, 0.05), Grade::A);
        assert_eq!(Grade::from_metrics(150_000.0, 0.5), Grade::F);
    }

    #[test]
    fn test_grade_is_monotonic() {
        let ops_grid = [0.0, 500.0, 1_000.0, 9_999.0, 10_000.0, 50_000.0, 100_000.0, 1e6];
        let err_grid = [0.0, 0.005, 0.01, 0.011, 0.05, 0.1, 0.11, 1.0];

        for (i, ops) in ops_grid.iter().enumerate() {
            for (j, err) in err_grid.iter().enumerate() {
                let grade = Grade::from_metrics(*ops, *err).rank();
                if let Some(higher_ops) = ops_grid.get(i + 1) {
                    assert!(Grade::from_metrics(*higher_ops, *err).rank() >= grade);
                }
                if j > 0 {
                    let lower_err = err_grid[j - 1];
                    assert!(Grade::from_metrics(*ops, lower_err).rank() >= grade);
                }
            }
        }
    }

    #[test]
    fn test_result_derives_metrics_from_outcome() {
        let result = StressTestResult::from_outcome(7, Utc::now(), outcome(9_000, 1_000, 2.0));
        assert_eq!(result.id, 7);
        assert!((result.operations_per_second - 4_500.0).abs() < f64::EPSILON);
        assert!((result.error_rate - 0.1).abs() < 1e-12);
        assert_eq!(result.grade, Grade::D);
    }
}
