use crate::domain::errors::ValidationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Creativity modes for adversarial training scenarios
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreativeMode {
    ChaosMonkey,
    ResourceStarving,
    CascadeFailure,
    TrafficSpike,
    DataCorruption,
    TimePressure,
    MultiAttack,
    AdaptiveAdversary,
}

impl CreativeMode {
    pub const ALL: [CreativeMode; 8] = [
        CreativeMode::ChaosMonkey,
        CreativeMode::ResourceStarving,
        CreativeMode::CascadeFailure,
        CreativeMode::TrafficSpike,
        CreativeMode::DataCorruption,
        CreativeMode::TimePressure,
        CreativeMode::MultiAttack,
        CreativeMode::AdaptiveAdversary,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CreativeMode::ChaosMonkey => "chaos_monkey",
            CreativeMode::ResourceStarving => "resource_starving",
            CreativeMode::CascadeFailure => "cascade_failure",
            CreativeMode::TrafficSpike => "traffic_spike",
            CreativeMode::DataCorruption => "data_corruption",
            CreativeMode::TimePressure => "time_pressure",
            CreativeMode::MultiAttack => "multi_attack",
            CreativeMode::AdaptiveAdversary => "adaptive_adversary",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            CreativeMode::ChaosMonkey => "Random failures and disruptions",
            CreativeMode::ResourceStarving => "Limited resources challenge",
            CreativeMode::CascadeFailure => "One failure triggers others",
            CreativeMode::TrafficSpike => "Sudden massive traffic increase",
            CreativeMode::DataCorruption => "Handle corrupted or invalid data",
            CreativeMode::TimePressure => "Critical time-constrained scenarios",
            CreativeMode::MultiAttack => "Multiple simultaneous challenges",
            CreativeMode::AdaptiveAdversary => "Intelligent opponent that learns",
        }
    }
}

impl fmt::Display for CreativeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CreativeMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == normalized)
            .ok_or_else(|| ValidationError::UnknownCreativeMode {
                value: s.to_string(),
            })
    }
}

/// A generated creative scenario announced to observers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreativeScenario {
    pub id: String,
    pub mode: CreativeMode,
    pub description: String,
    /// 1 (trivial) to 10 (hardest)
    pub difficulty: u8,
    pub challenges: Vec<String>,
    pub parameters: Value,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parsing() {
        assert_eq!(
            "chaos_monkey".parse::<CreativeMode>(),
            Ok(CreativeMode::ChaosMonkey)
        );
        assert_eq!(
            "Traffic_Spike".parse::<CreativeMode>(),
            Ok(CreativeMode::TrafficSpike)
        );
        assert!(matches!(
            "gremlins".parse::<CreativeMode>(),
            Err(ValidationError::UnknownCreativeMode { .. })
        ));
    }

    #[test]
    fn test_every_mode_has_a_description() {
        for mode in CreativeMode::ALL {
            assert!(!mode.description().is_empty());
            assert_eq!(mode.as_str().parse::<CreativeMode>(), Ok(mode));
        }
    }
}
