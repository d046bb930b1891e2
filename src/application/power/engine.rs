use crate::application::power::leaderboard::{self, LeaderboardView};
use crate::application::power::workload::{self, available_cores};
use crate::domain::errors::ValidationError;
use crate::domain::power::{
    BenchmarkSuiteResult, Grade, Intensity, IntensityStats, PowerMeasurement, PowerReport,
    StressTestResult,
};
use crate::infrastructure::observability::Metrics;
use chrono::Utc;
use statrs::statistics::{Data, Distribution};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::info;

#[derive(Debug, Clone)]
pub struct PowerConfig {
    /// Wall-clock length of one requested duration unit
    pub time_unit: Duration,
    /// Window of the quick `measure` probe
    pub probe: Duration,
    /// Duration, in units, of each stage of the benchmark suite
    pub suite_duration_secs: u64,
}

impl Default for PowerConfig {
    fn default() -> Self {
        Self {
            time_unit: Duration::from_secs(1),
            probe: Duration::from_millis(200),
            suite_duration_secs: 3,
        }
    }
}

/// Longest stress test a single request may ask for, in duration units
pub const MAX_DURATION_SECS: u64 = 3600;

/// A validated stress-test request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StressTestRequest {
    pub duration_secs: u64,
    pub intensity: Intensity,
}

impl StressTestRequest {
    pub fn new(duration_secs: i64, intensity: &str) -> Result<Self, ValidationError> {
        if duration_secs <= 0 {
            return Err(ValidationError::NonPositiveDuration {
                value: duration_secs,
            });
        }
        if duration_secs as u64 > MAX_DURATION_SECS {
            return Err(ValidationError::DurationTooLong {
                value: duration_secs,
                max: MAX_DURATION_SECS,
            });
        }
        Ok(Self {
            duration_secs: duration_secs as u64,
            intensity: intensity.parse()?,
        })
    }
}

/// Synthetic power measurement and stress-test engine.
///
/// Keeps an append-only history of stress results for the process lifetime.
pub struct PowerMeter {
    config: PowerConfig,
    metrics: Metrics,
    history: RwLock<Vec<StressTestResult>>,
    last_measurement: RwLock<Option<PowerMeasurement>>,
}

impl PowerMeter {
    pub fn new(config: PowerConfig, metrics: Metrics) -> Self {
        Self {
            config,
            metrics,
            history: RwLock::new(Vec::new()),
            last_measurement: RwLock::new(None),
        }
    }

    /// Quick multi-core capability probe. Not recorded in the stress history.
    pub async fn measure(&self) -> anyhow::Result<PowerMeasurement> {
        let cores = available_cores();
        let window = self.config.probe;

        let start = Instant::now();
        let operations = tokio::task::spawn_blocking(move || workload::probe(cores, window)).await?;
        let elapsed = start.elapsed().as_secs_f64();

        let operations_per_second = if elapsed > 0.0 {
            operations as f64 / elapsed
        } else {
            0.0
        };
        let measurement = PowerMeasurement {
            timestamp: Utc::now(),
            cpu_cores: cores,
            probe_ms: window.as_millis() as u64,
            operations,
            operations_per_second,
            per_core_ops_per_second: operations_per_second / cores as f64,
            power_score: (operations_per_second / 1000.0 * 100.0).round() / 100.0,
        };

        self.metrics
            .power_ops_per_second
            .set(measurement.operations_per_second);
        *self.last_measurement.write().await = Some(measurement.clone());
        info!(
            "PowerMeter: measured {:.0} ops/s on {} core(s)",
            measurement.operations_per_second, cores
        );

        Ok(measurement)
    }

    /// Run one graded stress test and record it
    pub async fn run_stress_test(&self, request: StressTestRequest) -> StressTestResult {
        let budget = self
            .config
            .time_unit
            .saturating_mul(u32::try_from(request.duration_secs).unwrap_or(u32::MAX));

        info!(
            "PowerMeter: stress test started ({}, {} unit(s))",
            request.intensity, request.duration_secs
        );
        let outcome =
            workload::run_workload(request.intensity, request.duration_secs, budget).await;

        let result = {
            let mut history = self.history.write().await;
            let id = history.len() as u64 + 1;
            let result = StressTestResult::from_outcome(id, Utc::now(), outcome);
            history.push(result.clone());
            result
        };

        self.metrics
            .record_stress_test(result.intensity.as_str(), result.operations_per_second);
        info!(
            "PowerMeter: stress test #{} finished: {:.0} ops/s, error rate {:.4}, grade {}",
            result.id, result.operations_per_second, result.error_rate, result.grade
        );

        result
    }

    /// Light, medium, heavy, then extreme. Every stage is recorded.
    pub async fn run_benchmark_suite(&self) -> BenchmarkSuiteResult {
        let started_at = Utc::now();
        let mut results = Vec::with_capacity(Intensity::ALL.len());

        for intensity in Intensity::ALL {
            let request = StressTestRequest {
                duration_secs: self.config.suite_duration_secs.max(1),
                intensity,
            };
            results.push(self.run_stress_test(request).await);
        }

        let total_operations = results.iter().map(|r| r.operations_completed).sum();
        let count = results.len() as f64;
        let average_ops_per_second =
            results.iter().map(|r| r.operations_per_second).sum::<f64>() / count;
        let average_error_rate = results.iter().map(|r| r.error_rate).sum::<f64>() / count;
        let peak_ops_per_second = results
            .iter()
            .map(|r| r.operations_per_second)
            .fold(0.0, f64::max);

        let suite = BenchmarkSuiteResult {
            started_at,
            completed_at: Utc::now(),
            results,
            total_operations,
            average_ops_per_second,
            peak_ops_per_second,
            overall_grade: Grade::from_metrics(average_ops_per_second, average_error_rate),
        };
        info!(
            "PowerMeter: benchmark suite finished, overall grade {}",
            suite.overall_grade
        );
        suite
    }

    pub async fn history(&self) -> Vec<StressTestResult> {
        self.history.read().await.clone()
    }

    pub async fn leaderboard(&self) -> LeaderboardView {
        leaderboard::rank(&self.history.read().await)
    }

    /// Aggregate statistics over the recorded history
    pub async fn report(&self) -> PowerReport {
        let history = self.history().await;
        let last_measurement = self.last_measurement.read().await.clone();
        build_report(&history, last_measurement)
    }
}

fn best_grade<'a>(results: impl Iterator<Item = &'a StressTestResult>) -> Option<Grade> {
    results.map(|r| r.grade).max_by_key(|g| g.rank())
}

fn mean_and_std_dev(samples: Vec<f64>) -> (f64, f64) {
    if samples.len() < 2 {
        return (samples.first().copied().unwrap_or(0.0), 0.0);
    }
    let data = Data::new(samples);
    let mean = data.mean().unwrap_or(0.0);
    let std_dev = data.std_dev().filter(|s| s.is_finite()).unwrap_or(0.0);
    (mean, std_dev)
}

fn build_report(
    history: &[StressTestResult],
    last_measurement: Option<PowerMeasurement>,
) -> PowerReport {
    let total_tests = history.len();
    let (average_ops_per_second, average_error_rate) = if total_tests == 0 {
        (0.0, 0.0)
    } else {
        let n = total_tests as f64;
        (
            history.iter().map(|r| r.operations_per_second).sum::<f64>() / n,
            history.iter().map(|r| r.error_rate).sum::<f64>() / n,
        )
    };

    let mut by_intensity = BTreeMap::new();
    for intensity in Intensity::ALL {
        let runs: Vec<&StressTestResult> =
            history.iter().filter(|r| r.intensity == intensity).collect();
        let Some(best) = best_grade(runs.iter().copied()) else {
            continue;
        };
        let (mean, std_dev) =
            mean_and_std_dev(runs.iter().map(|r| r.operations_per_second).collect());
        by_intensity.insert(
            intensity,
            IntensityStats {
                tests: runs.len(),
                mean_ops_per_second: mean,
                std_dev_ops_per_second: std_dev,
                best_grade: best,
            },
        );
    }

    PowerReport {
        total_tests,
        average_ops_per_second,
        peak_ops_per_second: history
            .iter()
            .map(|r| r.operations_per_second)
            .fold(0.0, f64::max),
        average_error_rate,
        best_grade: best_grade(history.iter()),
        by_intensity,
        last_measurement,
        generated_at: Utc::now(),
    }
}
