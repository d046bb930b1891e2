use crate::application::broadcasting::ObserverRegistry;
use crate::application::training::TrainingController;
use crate::domain::training::StopOutcome;
use crate::infrastructure::observability::Metrics;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy)]
pub struct ShutdownConfig {
    /// How long to wait for the training loop to exit
    pub training_timeout_ms: u64,
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            training_timeout_ms: 10_000,
        }
    }
}

/// Orderly teardown: stop the training loop, then drop every observer
pub struct ShutdownService {
    training: TrainingController,
    registry: ObserverRegistry,
    metrics: Metrics,
    config: ShutdownConfig,
}

impl ShutdownService {
    pub fn new(
        training: TrainingController,
        registry: ObserverRegistry,
        metrics: Metrics,
        config: ShutdownConfig,
    ) -> Self {
        Self {
            training,
            registry,
            metrics,
            config,
        }
    }

    /// Returns whether the training loop exited within the timeout
    pub async fn shutdown(&self) -> bool {
        info!("Initiating Graceful Shutdown Sequence...");

        info!("Step 1: Stopping training loop...");
        let idle = match self.training.stop().await {
            StopOutcome::AlreadyIdle => true,
            _ => {
                let timeout = Duration::from_millis(self.config.training_timeout_ms);
                let idle = self.training.wait_until_idle(timeout).await;
                if idle {
                    info!("Training loop stopped.");
                } else {
                    warn!(
                        "Training loop did not exit within {}ms, continuing shutdown",
                        self.config.training_timeout_ms
                    );
                }
                idle
            }
        };

        info!("Step 2: Disconnecting observers...");
        let dropped = self.registry.clear().await;
        self.metrics.observers_connected.set(0);
        info!("Disconnected {} observer(s).", dropped);

        info!("Graceful Shutdown Complete.");
        idle
    }
}
