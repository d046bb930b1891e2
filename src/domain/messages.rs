use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Discriminator of a message pushed to observers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    ScenarioCompleted,
    ScenarioFailed,
    PowerMeasurement,
    StressTestComplete,
    BenchmarkComplete,
    CreativeScenarioStarted,
    TrainingStateChanged,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::ScenarioCompleted => "scenario_completed",
            MessageKind::ScenarioFailed => "scenario_failed",
            MessageKind::PowerMeasurement => "power_measurement",
            MessageKind::StressTestComplete => "stress_test_complete",
            MessageKind::BenchmarkComplete => "benchmark_complete",
            MessageKind::CreativeScenarioStarted => "creative_scenario_started",
            MessageKind::TrainingStateChanged => "training_state_changed",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tagged payload fanned out to every observer.
///
/// Wire form is `{"type": "<kind>", "data": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BroadcastMessage {
    #[serde(rename = "type")]
    kind: MessageKind,
    data: Value,
}

impl BroadcastMessage {
    pub fn new(kind: MessageKind, data: Value) -> Self {
        Self { kind, data }
    }

    /// Build a message from any serializable payload.
    ///
    /// Serialization failures degrade to a `null` body so producers never fail.
    pub fn from_payload<T: Serialize>(kind: MessageKind, payload: &T) -> Self {
        let data = serde_json::to_value(payload).unwrap_or(Value::Null);
        Self { kind, data }
    }

    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    pub fn data(&self) -> &Value {
        &self.data
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!("{{\"type\":\"{}\",\"data\":null}}", self.kind.as_str())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_format_uses_type_tag() {
        let msg = BroadcastMessage::new(MessageKind::StressTestComplete, json!({"grade": "A"}));
        let value: Value = serde_json::from_str(&msg.to_json()).unwrap();
        assert_eq!(value["type"], "stress_test_complete");
        assert_eq!(value["data"]["grade"], "A");
    }

    #[test]
    fn test_kind_display_matches_serde() {
        let json = serde_json::to_string(&MessageKind::CreativeScenarioStarted).unwrap();
        assert_eq!(json, format!("\"{}\"", MessageKind::CreativeScenarioStarted));
    }
}
