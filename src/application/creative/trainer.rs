use crate::domain::creative::{CreativeMode, CreativeScenario};
use crate::domain::ports::ModeSelector;
use chrono::Utc;
use rand::Rng;
use serde::Serialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Picks uniformly among the offered modes
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomModeSelector;

impl ModeSelector for RandomModeSelector {
    fn select(&self, modes: &[CreativeMode]) -> CreativeMode {
        if modes.is_empty() {
            return CreativeMode::ChaosMonkey;
        }
        let mut rng = rand::rng();
        modes[rng.random_range(0..modes.len())]
    }
}

/// Always returns the same mode
#[derive(Debug, Clone, Copy)]
pub struct FixedModeSelector(pub CreativeMode);

impl ModeSelector for FixedModeSelector {
    fn select(&self, _modes: &[CreativeMode]) -> CreativeMode {
        self.0
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ModeInfo {
    pub mode: CreativeMode,
    pub description: &'static str,
}

/// Builds adversarial training scenarios for the creativity modes
pub struct CreativeTrainer {
    selector: Arc<dyn ModeSelector>,
}

impl CreativeTrainer {
    pub fn new(selector: Arc<dyn ModeSelector>) -> Self {
        Self { selector }
    }

    pub fn modes(&self) -> Vec<ModeInfo> {
        CreativeMode::ALL
            .into_iter()
            .map(|mode| ModeInfo {
                mode,
                description: mode.description(),
            })
            .collect()
    }

    /// Generate a scenario for `mode`, or for a selector-chosen mode when `None`
    pub fn generate(&self, mode: Option<CreativeMode>) -> CreativeScenario {
        let mode = mode.unwrap_or_else(|| self.selector.select(&CreativeMode::ALL));
        let mut rng = rand::rng();
        let difficulty = rng.random_range(5..=10u8);

        let scenario = CreativeScenario {
            id: Uuid::new_v4().to_string(),
            mode,
            description: mode.description().to_string(),
            difficulty,
            challenges: challenges(mode).iter().map(|c| c.to_string()).collect(),
            parameters: parameters(mode, difficulty, &mut rng),
            created_at: Utc::now(),
        };
        info!(
            "CreativeTrainer: generated {} scenario {} (difficulty {})",
            mode, scenario.id, difficulty
        );
        scenario
    }
}

fn challenges(mode: CreativeMode) -> &'static [&'static str] {
    match mode {
        CreativeMode::ChaosMonkey => &[
            "Random service termination",
            "Unannounced node restarts",
            "Intermittent network partitions",
        ],
        CreativeMode::ResourceStarving => &[
            "Memory ceiling below working set",
            "CPU quota throttling",
            "Connection pool exhaustion",
        ],
        CreativeMode::CascadeFailure => &[
            "Upstream dependency outage",
            "Retry storms",
            "Circuit breakers tripping in sequence",
        ],
        CreativeMode::TrafficSpike => &[
            "Sudden request surge",
            "Hot-key contention",
            "Queue backlog growth",
        ],
        CreativeMode::DataCorruption => &[
            "Malformed payloads",
            "Checksum mismatches",
            "Schema drift",
        ],
        CreativeMode::TimePressure => &[
            "Tight latency deadlines",
            "Clock skew between nodes",
            "Timeout budget shrinking per hop",
        ],
        CreativeMode::MultiAttack => &[
            "Traffic surge during node loss",
            "Corrupted input under memory pressure",
            "Concurrent dependency failures",
        ],
        CreativeMode::AdaptiveAdversary => &[
            "Attack pattern shifts after each mitigation",
            "Probing for weakest endpoint",
            "Load shaped to evade rate limits",
        ],
    }
}

fn parameters(mode: CreativeMode, difficulty: u8, rng: &mut impl Rng) -> Value {
    let scale = difficulty as f64 / 10.0;
    match mode {
        CreativeMode::ChaosMonkey => json!({
            "failure_probability": (0.1 + 0.4 * scale),
            "affected_services": rng.random_range(1..=5u32),
        }),
        CreativeMode::ResourceStarving => json!({
            "memory_limit_mb": rng.random_range(64..=512u32),
            "cpu_quota": (1.0 - 0.8 * scale),
        }),
        CreativeMode::CascadeFailure => json!({
            "initial_failures": 1,
            "propagation_depth": rng.random_range(2..=6u32),
        }),
        CreativeMode::TrafficSpike => json!({
            "multiplier": rng.random_range(5..=50u32),
            "ramp_seconds": rng.random_range(1..=10u32),
        }),
        CreativeMode::DataCorruption => json!({
            "corruption_rate": (0.05 + 0.25 * scale),
        }),
        CreativeMode::TimePressure => json!({
            "deadline_ms": rng.random_range(10..=200u32),
        }),
        CreativeMode::MultiAttack => json!({
            "simultaneous_challenges": rng.random_range(2..=4u32),
        }),
        CreativeMode::AdaptiveAdversary => json!({
            "adaptation_rate": (0.2 + 0.6 * scale),
            "rounds": rng.random_range(3..=10u32),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_mode_is_used() {
        let trainer = CreativeTrainer::new(Arc::new(FixedModeSelector(CreativeMode::ChaosMonkey)));
        let scenario = trainer.generate(Some(CreativeMode::TrafficSpike));
        assert_eq!(scenario.mode, CreativeMode::TrafficSpike);
        assert_eq!(scenario.description, "Sudden massive traffic increase");
        assert!((5..=10).contains(&scenario.difficulty));
        assert_eq!(scenario.challenges.len(), 3);
    }

    #[test]
    fn test_selector_chooses_when_mode_is_absent() {
        let trainer = CreativeTrainer::new(Arc::new(FixedModeSelector(CreativeMode::DataCorruption)));
        let scenario = trainer.generate(None);
        assert_eq!(scenario.mode, CreativeMode::DataCorruption);
        assert!(scenario.parameters["corruption_rate"].is_f64());
    }

    #[test]
    fn test_random_selector_stays_within_offered_modes() {
        let offered = [CreativeMode::TimePressure, CreativeMode::MultiAttack];
        for _ in 0..50 {
            assert!(offered.contains(&RandomModeSelector.select(&offered)));
        }
        assert_eq!(RandomModeSelector.select(&[]), CreativeMode::ChaosMonkey);
    }

    #[test]
    fn test_modes_lists_all_eight() {
        let trainer = CreativeTrainer::new(Arc::new(RandomModeSelector));
        let modes = trainer.modes();
        assert_eq!(modes.len(), 8);
        assert!(modes.iter().all(|m| !m.description.is_empty()));
    }
}
