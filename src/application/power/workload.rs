use crate::domain::power::{Intensity, WorkloadOutcome};
use rand::Rng;
use rayon::prelude::*;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// How hard a stress run pushes the machine at a given intensity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkloadProfile {
    pub workers: usize,
    pub payload_bytes: usize,
    /// Probability that one operation is counted as failed
    pub failure_probability: f64,
}

impl WorkloadProfile {
    pub fn for_intensity(intensity: Intensity, cores: usize) -> Self {
        let cores = cores.max(1);
        match intensity {
            Intensity::Light => Self {
                workers: 1,
                payload_bytes: 256,
                failure_probability: 0.0,
            },
            Intensity::Medium => Self {
                workers: cores.min(2),
                payload_bytes: 1024,
                failure_probability: 0.001,
            },
            Intensity::Heavy => Self {
                workers: cores.min(4),
                payload_bytes: 4096,
                failure_probability: 0.005,
            },
            Intensity::Extreme => Self {
                workers: cores,
                payload_bytes: 16 * 1024,
                failure_probability: 0.02,
            },
        }
    }
}

pub fn available_cores() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// One synthetic operation: hash the payload and fold the digest back into it
fn hash_once(payload: &mut [u8], counter: u64) {
    let mut hasher = Sha256::new();
    hasher.update(&*payload);
    hasher.update(counter.to_le_bytes());
    let digest = hasher.finalize();
    if let Some(first) = payload.first_mut() {
        *first ^= digest[0];
    }
}

fn hash_until(
    deadline: Instant,
    profile: WorkloadProfile,
    completed: &AtomicU64,
    failed: &AtomicU64,
) {
    let mut rng = rand::rng();
    let mut payload = vec![0u8; profile.payload_bytes.max(1)];
    let mut counter = 0u64;

    while Instant::now() < deadline {
        hash_once(&mut payload, counter);
        counter += 1;
        if profile.failure_probability > 0.0 && rng.random_bool(profile.failure_probability) {
            failed.fetch_add(1, Ordering::Relaxed);
        } else {
            completed.fetch_add(1, Ordering::Relaxed);
        }
    }
}

/// Run the intensity's workers on the blocking pool until `budget` elapses.
///
/// The deadline is soft: each worker finishes its current operation first.
pub async fn run_workload(
    intensity: Intensity,
    duration_secs: u64,
    budget: Duration,
) -> WorkloadOutcome {
    let profile = WorkloadProfile::for_intensity(intensity, available_cores());
    let completed = Arc::new(AtomicU64::new(0));
    let failed = Arc::new(AtomicU64::new(0));

    debug!(
        "Workload: {} with {} worker(s), {} byte payload, budget {:?}",
        intensity, profile.workers, profile.payload_bytes, budget
    );

    let start = Instant::now();
    let deadline = start + budget;
    let workers: Vec<_> = (0..profile.workers)
        .map(|_| {
            let completed = completed.clone();
            let failed = failed.clone();
            tokio::task::spawn_blocking(move || hash_until(deadline, profile, &completed, &failed))
        })
        .collect();

    for worker in workers {
        if let Err(e) = worker.await {
            warn!("Workload: worker for {} aborted: {}", intensity, e);
        }
    }

    WorkloadOutcome {
        intensity,
        duration_secs,
        elapsed_secs: start.elapsed().as_secs_f64(),
        operations_completed: completed.load(Ordering::SeqCst),
        operations_failed: failed.load(Ordering::SeqCst),
    }
}

/// Hash on every core through rayon for `window`; returns operations done.
///
/// Blocks the calling thread, run it from `spawn_blocking`.
pub fn probe(cores: usize, window: Duration) -> u64 {
    let deadline = Instant::now() + window;
    (0..cores.max(1))
        .into_par_iter()
        .map(|core| {
            let mut payload = vec![core as u8; 512];
            let mut ops = 0u64;
            while Instant::now() < deadline {
                hash_once(&mut payload, ops);
                ops += 1;
            }
            ops
        })
        .sum()
}
