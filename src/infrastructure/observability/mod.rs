//! Push-based observability for Queztl Core
//!
//! Metrics leave the process two ways:
//!
//! 1. **Structured JSON Logs**: periodic `METRICS_JSON:` lines on stdout
//! 2. **Prometheus text exposition**: rendered from the shared registry on `/metrics`

pub mod latency_tracker;
pub mod metrics;
pub mod reporter;

pub use latency_tracker::LatencyGuard;
pub use metrics::Metrics;
pub use reporter::MetricsReporter;
