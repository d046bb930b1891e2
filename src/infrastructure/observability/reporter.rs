//! Push-based metrics reporter for Queztl Core
//!
//! Periodically outputs a structured JSON snapshot to stdout.

use crate::application::broadcasting::ObserverRegistry;
use crate::application::power::PowerMeter;
use crate::application::training::TrainingController;
use crate::domain::power::Grade;
use crate::domain::training::TrainingState;
use crate::infrastructure::observability::metrics::Metrics;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Metrics snapshot for JSON output
#[derive(Debug, Serialize)]
pub struct MetricsSnapshot {
    pub timestamp: String,
    pub uptime_seconds: u64,
    pub version: String,
    pub observers: ObserversSnapshot,
    pub training: TrainingSnapshot,
    pub power: PowerSnapshot,
}

#[derive(Debug, Serialize)]
pub struct ObserversSnapshot {
    pub connected: usize,
}

#[derive(Debug, Serialize)]
pub struct TrainingSnapshot {
    pub state: TrainingState,
    pub scenarios_completed: u64,
    pub scenarios_failed: u64,
}

#[derive(Debug, Serialize)]
pub struct PowerSnapshot {
    pub stress_tests: usize,
    pub peak_ops_per_second: f64,
    pub best_grade: Option<Grade>,
}

/// Outputs snapshots as JSON log lines on a fixed interval
pub struct MetricsReporter {
    registry: ObserverRegistry,
    training: TrainingController,
    power: Arc<PowerMeter>,
    metrics: Metrics,
    start_time: Instant,
    interval: Duration,
}

impl MetricsReporter {
    pub fn new(
        registry: ObserverRegistry,
        training: TrainingController,
        power: Arc<PowerMeter>,
        metrics: Metrics,
        interval_seconds: u64,
    ) -> Self {
        Self {
            registry,
            training,
            power,
            metrics,
            start_time: Instant::now(),
            interval: Duration::from_secs(interval_seconds.max(1)),
        }
    }

    pub async fn run(self) {
        info!(
            "MetricsReporter: Starting push-based metrics (interval: {:?})",
            self.interval
        );

        loop {
            tokio::time::sleep(self.interval).await;

            let snapshot = self.collect_snapshot().await;
            match serde_json::to_string(&snapshot) {
                Ok(json) => {
                    println!("METRICS_JSON:{}", json);
                    info!(
                        "Observers: {} | Training: {} | Stress tests: {} | Uptime: {}s",
                        snapshot.observers.connected,
                        snapshot.training.state,
                        snapshot.power.stress_tests,
                        snapshot.uptime_seconds
                    );
                }
                Err(e) => warn!("Failed to serialize metrics: {}", e),
            }
        }
    }

    async fn collect_snapshot(&self) -> MetricsSnapshot {
        let uptime = self.start_time.elapsed().as_secs();
        let connected = self.registry.len().await;
        let status = self.training.status().await;
        let report = self.power.report().await;

        self.metrics.uptime_seconds.set(uptime as f64);
        self.metrics.observers_connected.set(connected as i64);

        MetricsSnapshot {
            timestamp: chrono::Utc::now().to_rfc3339(),
            uptime_seconds: uptime,
            version: env!("CARGO_PKG_VERSION").to_string(),
            observers: ObserversSnapshot { connected },
            training: TrainingSnapshot {
                state: status.state,
                scenarios_completed: status.scenarios_completed,
                scenarios_failed: status.scenarios_failed,
            },
            power: PowerSnapshot {
                stress_tests: report.total_tests,
                peak_ops_per_second: report.peak_ops_per_second,
                best_grade: report.best_grade,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::broadcasting::Broadcaster;
    use crate::application::power::PowerConfig;
    use crate::application::training::TrainingConfig;
    use crate::infrastructure::repositories::InMemoryMetricsStore;
    use crate::infrastructure::simulation::{InProcessScenarioGenerator, SimulatedExecutor};

    #[tokio::test]
    async fn test_metrics_snapshot_collection() {
        let metrics = Metrics::new().expect("Failed to create metrics");
        let registry = ObserverRegistry::new();
        let broadcaster = Broadcaster::new(registry.clone(), metrics.clone());
        let generator = Arc::new(InProcessScenarioGenerator::new(10));
        let executor = Arc::new(SimulatedExecutor::new(
            generator.clone(),
            Arc::new(InMemoryMetricsStore::new()),
        ));
        let training = TrainingController::new(
            generator,
            executor,
            broadcaster,
            metrics.clone(),
            TrainingConfig::default(),
        );
        let power = Arc::new(PowerMeter::new(PowerConfig::default(), metrics.clone()));
        let _observer = registry.register().await;

        let reporter = MetricsReporter::new(registry, training, power, metrics, 60);
        let snapshot = reporter.collect_snapshot().await;

        assert_eq!(snapshot.observers.connected, 1);
        assert_eq!(snapshot.training.state, TrainingState::Idle);
        assert_eq!(snapshot.power.stress_tests, 0);
        assert!(!snapshot.timestamp.is_empty());

        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("\"state\":\"idle\""));
    }
}
