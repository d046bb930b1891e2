use crate::application::broadcasting::Broadcaster;
use crate::domain::errors::{ScenarioError, TrainingError};
use crate::domain::messages::MessageKind;
use crate::domain::ports::{ScenarioExecutor, ScenarioGenerator};
use crate::domain::scenario::ExecutionResult;
use crate::domain::training::{StopOutcome, TrainingState, TrainingStatus};
use crate::infrastructure::observability::Metrics;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, RwLock, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone)]
pub struct TrainingConfig {
    /// Pause between two iterations of the loop
    pub iteration_pause: Duration,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            iteration_pause: Duration::from_secs(2),
        }
    }
}

#[derive(Debug, Serialize)]
struct ScenarioFailure {
    iteration: u64,
    error: String,
    timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
struct StateChange {
    state: TrainingState,
    timestamp: DateTime<Utc>,
}

struct ControlState {
    phase: TrainingState,
    cancel: Option<CancellationToken>,
    run_started_at: Option<DateTime<Utc>>,
}

struct Inner {
    generator: Arc<dyn ScenarioGenerator>,
    executor: Arc<dyn ScenarioExecutor>,
    broadcaster: Broadcaster,
    metrics: Metrics,
    config: TrainingConfig,
    control: Mutex<ControlState>,
    state_tx: watch::Sender<TrainingState>,
    completed: AtomicU64,
    failed: AtomicU64,
    runs: AtomicU64,
    last_iteration_at: RwLock<Option<DateTime<Utc>>>,
}

/// Single-flight controller of the continuous training loop.
///
/// At most one loop task exists at a time. `stop` only signals the loop; the
/// controller returns to `Idle` once that task has actually exited.
#[derive(Clone)]
pub struct TrainingController {
    inner: Arc<Inner>,
}

impl TrainingController {
    pub fn new(
        generator: Arc<dyn ScenarioGenerator>,
        executor: Arc<dyn ScenarioExecutor>,
        broadcaster: Broadcaster,
        metrics: Metrics,
        config: TrainingConfig,
    ) -> Self {
        let (state_tx, _) = watch::channel(TrainingState::Idle);
        Self {
            inner: Arc::new(Inner {
                generator,
                executor,
                broadcaster,
                metrics,
                config,
                control: Mutex::new(ControlState {
                    phase: TrainingState::Idle,
                    cancel: None,
                    run_started_at: None,
                }),
                state_tx,
                completed: AtomicU64::new(0),
                failed: AtomicU64::new(0),
                runs: AtomicU64::new(0),
                last_iteration_at: RwLock::new(None),
            }),
        }
    }

    /// Launch the loop. Rejected unless the controller is `Idle`.
    ///
    /// State announcements are made while holding the control lock so
    /// observers see transitions in the order they happened.
    pub async fn start(&self) -> Result<TrainingStatus, TrainingError> {
        {
            let mut control = self.inner.control.lock().await;
            if control.phase != TrainingState::Idle {
                warn!(
                    "TrainingController: start rejected, loop is {}",
                    control.phase
                );
                return Err(TrainingError::AlreadyRunning {
                    state: control.phase,
                });
            }

            let token = CancellationToken::new();
            control.phase = TrainingState::Running;
            control.cancel = Some(token.clone());
            control.run_started_at = Some(Utc::now());
            let run = self.inner.runs.fetch_add(1, Ordering::SeqCst) + 1;
            self.inner.publish_state(TrainingState::Running);
            self.inner.announce(TrainingState::Running).await;

            let inner = self.inner.clone();
            let worker = tokio::spawn(Inner::run_loop(inner.clone(), token));
            tokio::spawn(async move {
                if let Err(e) = worker.await {
                    error!("TrainingController: loop task aborted: {}", e);
                }
                inner.finish_run().await;
            });

            info!("TrainingController: run #{} started", run);
        }

        Ok(self.status().await)
    }

    /// Ask the loop to exit at its next iteration boundary. Never waits.
    pub async fn stop(&self) -> StopOutcome {
        let mut control = self.inner.control.lock().await;
        match control.phase {
            TrainingState::Idle => {
                debug!("TrainingController: stop ignored, already idle");
                StopOutcome::AlreadyIdle
            }
            TrainingState::Stopping => {
                debug!("TrainingController: stop ignored, already stopping");
                StopOutcome::AlreadyStopping
            }
            TrainingState::Running => {
                if let Some(token) = control.cancel.as_ref() {
                    token.cancel();
                }
                control.phase = TrainingState::Stopping;
                self.inner.publish_state(TrainingState::Stopping);
                self.inner.announce(TrainingState::Stopping).await;
                info!("TrainingController: stop requested");
                StopOutcome::Stopping
            }
        }
    }

    pub fn state(&self) -> TrainingState {
        *self.inner.state_tx.borrow()
    }

    /// Receiver that observes every state transition
    pub fn subscribe_state(&self) -> watch::Receiver<TrainingState> {
        self.inner.state_tx.subscribe()
    }

    /// Resolve once the loop has exited, or after `timeout`. Returns whether idle.
    pub async fn wait_until_idle(&self, timeout: Duration) -> bool {
        let mut rx = self.subscribe_state();
        let idle = rx.wait_for(|state| *state == TrainingState::Idle);
        matches!(tokio::time::timeout(timeout, idle).await, Ok(Ok(_)))
    }

    pub async fn status(&self) -> TrainingStatus {
        let (state, run_started_at) = {
            let control = self.inner.control.lock().await;
            (control.phase, control.run_started_at)
        };
        TrainingStatus {
            state,
            is_running: state == TrainingState::Running,
            scenarios_completed: self.inner.completed.load(Ordering::SeqCst),
            scenarios_failed: self.inner.failed.load(Ordering::SeqCst),
            runs_started: self.inner.runs.load(Ordering::SeqCst),
            current_run_started_at: run_started_at,
            last_iteration_at: *self.inner.last_iteration_at.read().await,
            iteration_pause_ms: self.inner.config.iteration_pause.as_millis() as u64,
        }
    }
}

impl Inner {
    async fn run_loop(self: Arc<Self>, token: CancellationToken) {
        let mut iteration = 0u64;

        while !token.is_cancelled() {
            iteration += 1;
            self.run_iteration(iteration).await;

            tokio::select! {
                _ = token.cancelled() => break,
                _ = tokio::time::sleep(self.config.iteration_pause) => {}
            }
        }

        info!(
            "TrainingController: loop exited after {} iteration(s)",
            iteration
        );
    }

    async fn run_iteration(&self, iteration: u64) {
        match self.execute_next().await {
            Ok(result) => {
                self.completed.fetch_add(1, Ordering::SeqCst);
                self.metrics.inc_scenarios("completed");
                debug!(
                    "TrainingController: iteration {} completed {} ({}ms)",
                    iteration, result.scenario_id, result.response_time_ms
                );
                self.broadcaster
                    .publish(MessageKind::ScenarioCompleted, &result)
                    .await;
            }
            Err(e) => {
                self.failed.fetch_add(1, Ordering::SeqCst);
                self.metrics.inc_scenarios("failed");
                warn!("TrainingController: iteration {} failed: {}", iteration, e);
                let failure = ScenarioFailure {
                    iteration,
                    error: e.to_string(),
                    timestamp: Utc::now(),
                };
                self.broadcaster
                    .publish(MessageKind::ScenarioFailed, &failure)
                    .await;
            }
        }

        *self.last_iteration_at.write().await = Some(Utc::now());
    }

    async fn execute_next(&self) -> Result<ExecutionResult, ScenarioError> {
        let scenario = self.generator.generate().await?;
        self.executor.execute(&scenario.id).await
    }

    async fn finish_run(&self) {
        let mut control = self.control.lock().await;
        control.phase = TrainingState::Idle;
        control.cancel = None;
        control.run_started_at = None;
        self.publish_state(TrainingState::Idle);
        self.announce(TrainingState::Idle).await;
        info!("TrainingController: idle");
    }

    fn publish_state(&self, state: TrainingState) {
        self.state_tx.send_replace(state);
        let gauge = match state {
            TrainingState::Idle => 0.0,
            TrainingState::Stopping => 0.5,
            TrainingState::Running => 1.0,
        };
        self.metrics.training_running.set(gauge);
    }

    async fn announce(&self, state: TrainingState) {
        let change = StateChange {
            state,
            timestamp: Utc::now(),
        };
        self.broadcaster
            .publish(MessageKind::TrainingStateChanged, &change)
            .await;
    }
}
