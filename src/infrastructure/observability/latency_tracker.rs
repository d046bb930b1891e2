use crate::infrastructure::observability::Metrics;
use prometheus::Histogram;
use std::time::Instant;
use tracing::debug;

/// RAII timer recording how long an API handler took
pub struct LatencyGuard {
    endpoint: &'static str,
    start: Instant,
    histogram: Histogram,
}

impl LatencyGuard {
    pub fn start(metrics: &Metrics, endpoint: &'static str) -> Self {
        Self {
            endpoint,
            start: Instant::now(),
            histogram: metrics.api_latency(endpoint),
        }
    }
}

impl Drop for LatencyGuard {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed().as_secs_f64();
        debug!("{} handled in {:.3}s", self.endpoint, elapsed);
        self.histogram.observe(elapsed);
    }
}
