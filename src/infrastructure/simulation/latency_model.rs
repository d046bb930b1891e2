use rand::Rng;

/// Simulated response time of a scenario execution.
pub trait LatencyModel: Send + Sync {
    /// Response time in milliseconds for a scenario of `difficulty` (1-10).
    fn response_time_ms(&self, difficulty: u8) -> f64;
}

/// Base latency growing linearly with difficulty, plus symmetric jitter.
#[derive(Debug, Clone)]
pub struct DifficultyLatency {
    base_ms: f64,
    per_level_ms: f64,
    jitter_ms: f64,
}

impl DifficultyLatency {
    pub fn new(base_ms: f64, per_level_ms: f64, jitter_ms: f64) -> Self {
        Self {
            base_ms,
            per_level_ms,
            jitter_ms: jitter_ms.abs(),
        }
    }
}

impl Default for DifficultyLatency {
    fn default() -> Self {
        Self::new(20.0, 15.0, 10.0)
    }
}

impl LatencyModel for DifficultyLatency {
    fn response_time_ms(&self, difficulty: u8) -> f64 {
        let jitter = if self.jitter_ms > 0.0 {
            rand::rng().random_range(-self.jitter_ms..=self.jitter_ms)
        } else {
            0.0
        };
        (self.base_ms + self.per_level_ms * difficulty as f64 + jitter).max(0.0)
    }
}

/// Constant latency for deterministic tests.
pub struct FixedLatency(pub f64);

impl LatencyModel for FixedLatency {
    fn response_time_ms(&self, _difficulty: u8) -> f64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_latency_range() {
        let model = DifficultyLatency::new(50.0, 10.0, 5.0);
        for _ in 0..100 {
            let latency = model.response_time_ms(3);
            assert!(
                (75.0..=85.0).contains(&latency),
                "Latency {} out of bounds [75, 85]",
                latency
            );
        }
    }

    #[test]
    fn test_latency_never_negative() {
        let model = DifficultyLatency::new(0.0, 0.0, 50.0);
        assert!((0..100).all(|_| model.response_time_ms(1) >= 0.0));
        assert_eq!(FixedLatency(12.0).response_time_ms(9), 12.0);
    }
}
