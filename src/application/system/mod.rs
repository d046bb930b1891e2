use anyhow::Result;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

pub mod shutdown_service;

use crate::application::broadcasting::{Broadcaster, ObserverRegistry};
use crate::application::creative::{CreativeTrainer, RandomModeSelector};
use crate::application::power::PowerMeter;
use crate::application::system::shutdown_service::{ShutdownConfig, ShutdownService};
use crate::application::training::TrainingController;
use crate::config::Config;
use crate::domain::ports::{MetricsStore, ScenarioExecutor, ScenarioGenerator};
use crate::infrastructure::observability::{Metrics, MetricsReporter};
use crate::infrastructure::persistence::{Database, SqliteMetricsStore};
use crate::infrastructure::repositories::InMemoryMetricsStore;
use crate::infrastructure::simulation::{InProcessScenarioGenerator, SimulatedExecutor};

/// Every piece of shared state, built once at process start and handed to the
/// request surface.
pub struct Application {
    pub config: Config,
    pub metrics: Metrics,
    pub registry: ObserverRegistry,
    pub broadcaster: Broadcaster,
    pub store: Arc<dyn MetricsStore>,
    pub generator: Arc<dyn ScenarioGenerator>,
    pub executor: Arc<dyn ScenarioExecutor>,
    pub training: TrainingController,
    pub power: Arc<PowerMeter>,
    pub creative: Arc<CreativeTrainer>,
    pub started_at: Instant,
}

impl Application {
    pub async fn build(config: Config) -> Result<Self> {
        info!("Building Queztl Core Application...");

        // 1. Observability
        let metrics = Metrics::new()?;

        // 2. Observer registry and broadcaster
        let registry = ObserverRegistry::with_capacity(config.broadcast.queue_capacity);
        let broadcaster = Broadcaster::new(registry.clone(), metrics.clone());

        // 3. Metrics store
        let store: Arc<dyn MetricsStore> = match &config.persistence.database_url {
            Some(url) => {
                info!("Using SQLite metrics store");
                let db = Database::new(url).await?;
                Arc::new(SqliteMetricsStore::new(db.pool.clone()))
            }
            None => {
                info!("Using in-memory metrics store");
                Arc::new(InMemoryMetricsStore::new())
            }
        };

        // 4. Scenario collaborators
        let scenarios = Arc::new(InProcessScenarioGenerator::new(
            config.training.scenario_history_limit,
        ));
        let generator: Arc<dyn ScenarioGenerator> = scenarios.clone();
        let executor: Arc<dyn ScenarioExecutor> =
            Arc::new(SimulatedExecutor::new(scenarios, store.clone()));

        // 5. Controllers and engines
        let training = TrainingController::new(
            generator.clone(),
            executor.clone(),
            broadcaster.clone(),
            metrics.clone(),
            config.training.to_training_config(),
        );
        let power = Arc::new(PowerMeter::new(
            config.power.to_power_config(),
            metrics.clone(),
        ));
        let creative = Arc::new(CreativeTrainer::new(Arc::new(RandomModeSelector)));

        info!("Application built");
        Ok(Self {
            config,
            metrics,
            registry,
            broadcaster,
            store,
            generator,
            executor,
            training,
            power,
            creative,
            started_at: Instant::now(),
        })
    }

    /// Reporter pushing `METRICS_JSON` snapshots, when enabled
    pub fn metrics_reporter(&self) -> Option<MetricsReporter> {
        if !self.config.observability.enabled {
            return None;
        }
        Some(MetricsReporter::new(
            self.registry.clone(),
            self.training.clone(),
            self.power.clone(),
            self.metrics.clone(),
            self.config.observability.interval_seconds,
        ))
    }

    pub fn shutdown_service(&self) -> ShutdownService {
        ShutdownService::new(
            self.training.clone(),
            self.registry.clone(),
            self.metrics.clone(),
            ShutdownConfig::default(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::training::TrainingState;

    fn fast_config() -> Config {
        let mut config = Config::default();
        config.training.iteration_pause_ms = 5;
        config
    }

    #[tokio::test]
    async fn test_build_with_in_memory_store() {
        let app = Application::build(fast_config()).await.unwrap();
        assert_eq!(app.training.state(), TrainingState::Idle);
        assert!(app.registry.is_empty().await);
        assert!(app.metrics_reporter().is_some());
    }

    #[tokio::test]
    async fn test_shutdown_stops_training_and_drops_observers() {
        let app = Application::build(fast_config()).await.unwrap();
        let sub = app.registry.register().await;
        app.training.start().await.unwrap();

        assert!(app.shutdown_service().shutdown().await);
        assert_eq!(app.training.state(), TrainingState::Idle);
        assert!(app.registry.is_empty().await);
        assert!(!sub.observer.is_alive());
    }
}
