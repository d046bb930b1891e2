use super::parse_env;
use crate::application::broadcasting::registry::DEFAULT_QUEUE_CAPACITY;
use anyhow::Result;

/// Broadcast environment configuration
#[derive(Debug, Clone)]
pub struct BroadcastEnvConfig {
    /// Per-observer queue depth; an observer whose queue fills up is evicted
    pub queue_capacity: usize,
}

impl Default for BroadcastEnvConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl BroadcastEnvConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            queue_capacity: parse_env("BROADCAST_QUEUE_CAPACITY", DEFAULT_QUEUE_CAPACITY)?,
        })
    }
}
