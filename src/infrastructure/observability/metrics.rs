//! Prometheus metrics definitions for Queztl Core
//!
//! All metrics use the `queztl_` prefix.

use prometheus::{
    CounterVec, Gauge, GaugeVec, HistogramOpts, HistogramVec, IntCounter, IntGauge, Opts,
    Registry, TextEncoder,
    core::{AtomicF64, GenericGauge},
};
use std::sync::Arc;

/// Prometheus metrics for the monitoring service
#[derive(Clone)]
pub struct Metrics {
    registry: Arc<Registry>,
    /// Currently connected observers
    pub observers_connected: IntGauge,
    /// Broadcast messages by type
    pub broadcasts_total: CounterVec,
    /// Deliveries that failed and evicted an observer
    pub delivery_failures_total: IntCounter,
    /// Executed scenarios by outcome (completed/failed)
    pub scenarios_total: CounterVec,
    /// Training loop status (0=idle, 1=running, 0.5=stopping)
    pub training_running: GenericGauge<AtomicF64>,
    /// Stress tests by intensity
    pub stress_tests_total: CounterVec,
    /// Last measured ops/sec per intensity
    pub stress_ops_per_second: GaugeVec,
    /// Last power measurement ops/sec
    pub power_ops_per_second: GenericGauge<AtomicF64>,
    /// Uptime in seconds
    pub uptime_seconds: GenericGauge<AtomicF64>,
    /// API handler latency in seconds
    pub api_latency_seconds: HistogramVec,
}

impl Metrics {
    /// Create a new Metrics instance with all gauges and counters registered
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let observers_connected = IntGauge::with_opts(Opts::new(
            "queztl_observers_connected",
            "Number of connected stream observers",
        ))?;
        registry.register(Box::new(observers_connected.clone()))?;

        let broadcasts_total = CounterVec::new(
            Opts::new("queztl_broadcasts_total", "Broadcast messages by type"),
            &["type"],
        )?;
        registry.register(Box::new(broadcasts_total.clone()))?;

        let delivery_failures_total = IntCounter::with_opts(Opts::new(
            "queztl_delivery_failures_total",
            "Failed deliveries that evicted an observer",
        ))?;
        registry.register(Box::new(delivery_failures_total.clone()))?;

        let scenarios_total = CounterVec::new(
            Opts::new("queztl_scenarios_total", "Executed scenarios by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(scenarios_total.clone()))?;

        let training_running = Gauge::with_opts(Opts::new(
            "queztl_training_running",
            "Training loop status (0=idle, 0.5=stopping, 1=running)",
        ))?;
        registry.register(Box::new(training_running.clone()))?;

        let stress_tests_total = CounterVec::new(
            Opts::new("queztl_stress_tests_total", "Stress tests by intensity"),
            &["intensity"],
        )?;
        registry.register(Box::new(stress_tests_total.clone()))?;

        let stress_ops_per_second = GaugeVec::new(
            Opts::new(
                "queztl_stress_ops_per_second",
                "Last stress test throughput per intensity",
            ),
            &["intensity"],
        )?;
        registry.register(Box::new(stress_ops_per_second.clone()))?;

        let power_ops_per_second = Gauge::with_opts(Opts::new(
            "queztl_power_ops_per_second",
            "Throughput of the last power measurement",
        ))?;
        registry.register(Box::new(power_ops_per_second.clone()))?;

        let uptime_seconds = Gauge::with_opts(Opts::new(
            "queztl_uptime_seconds",
            "Server uptime in seconds",
        ))?;
        registry.register(Box::new(uptime_seconds.clone()))?;

        let api_latency_seconds = HistogramVec::new(
            HistogramOpts::new(
                "queztl_api_latency_seconds",
                "API request latency in seconds",
            )
            .buckets(vec![
                0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0,
            ]),
            &["endpoint"],
        )?;
        registry.register(Box::new(api_latency_seconds.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            observers_connected,
            broadcasts_total,
            delivery_failures_total,
            scenarios_total,
            training_running,
            stress_tests_total,
            stress_ops_per_second,
            power_ops_per_second,
            uptime_seconds,
            api_latency_seconds,
        })
    }

    /// Render all metrics in Prometheus text format
    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        encoder
            .encode_to_string(&metric_families)
            .unwrap_or_default()
    }

    pub fn inc_broadcast(&self, kind: &str) {
        self.broadcasts_total.with_label_values(&[kind]).inc();
    }

    pub fn inc_scenarios(&self, outcome: &str) {
        self.scenarios_total.with_label_values(&[outcome]).inc();
    }

    pub fn record_stress_test(&self, intensity: &str, ops_per_second: f64) {
        self.stress_tests_total.with_label_values(&[intensity]).inc();
        self.stress_ops_per_second
            .with_label_values(&[intensity])
            .set(ops_per_second);
    }

    /// Histogram used by [`super::LatencyGuard`] for one endpoint
    pub fn api_latency(&self, endpoint: &str) -> prometheus::Histogram {
        self.api_latency_seconds.with_label_values(&[endpoint])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new().expect("Failed to create metrics");
        metrics.observers_connected.set(0);
        assert!(metrics.render().contains("queztl_"));
    }

    #[test]
    fn test_broadcast_counter_by_type() {
        let metrics = Metrics::new().expect("Failed to create metrics");
        metrics.inc_broadcast("stress_test_complete");
        metrics.inc_broadcast("stress_test_complete");
        let output = metrics.render();
        assert!(output.contains("queztl_broadcasts_total"));
        assert!(output.contains("stress_test_complete"));
    }

    #[test]
    fn test_stress_gauge_per_intensity() {
        let metrics = Metrics::new().expect("Failed to create metrics");
        metrics.record_stress_test("heavy", 1234.0);
        let output = metrics.render();
        assert!(output.contains("queztl_stress_ops_per_second{intensity=\"heavy\"} 1234"));
    }
}
