//! Power engine configuration parsing from environment variables.

use super::parse_env;
use crate::application::power::PowerConfig;
use anyhow::Result;
use std::time::Duration;

/// Power/benchmark environment configuration
#[derive(Debug, Clone)]
pub struct PowerEnvConfig {
    /// Milliseconds per requested duration unit
    pub time_unit_ms: u64,
    pub probe_ms: u64,
    pub suite_duration: u64,
}

impl Default for PowerEnvConfig {
    fn default() -> Self {
        Self {
            time_unit_ms: 1000,
            probe_ms: 200,
            suite_duration: 3,
        }
    }
}

impl PowerEnvConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            time_unit_ms: parse_env("POWER_TIME_UNIT_MS", 1000)?,
            probe_ms: parse_env("POWER_PROBE_MS", 200)?,
            suite_duration: parse_env("POWER_SUITE_DURATION", 3)?,
        })
    }

    pub fn to_power_config(&self) -> PowerConfig {
        PowerConfig {
            time_unit: Duration::from_millis(self.time_unit_ms.max(1)),
            probe: Duration::from_millis(self.probe_ms.max(1)),
            suite_duration_secs: self.suite_duration.max(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_power_config_defaults() {
        let config = PowerEnvConfig::default().to_power_config();
        assert_eq!(config.time_unit, Duration::from_secs(1));
        assert_eq!(config.probe, Duration::from_millis(200));
        assert_eq!(config.suite_duration_secs, 3);
    }

    #[test]
    fn test_zero_values_are_clamped() {
        let config = PowerEnvConfig {
            time_unit_ms: 0,
            probe_ms: 0,
            suite_duration: 0,
        }
        .to_power_config();
        assert_eq!(config.time_unit, Duration::from_millis(1));
        assert_eq!(config.suite_duration_secs, 1);
    }
}
