//! Configuration module for Queztl Core.
//!
//! Structured configuration loaded from environment variables (after `.env`),
//! organized by concern: Server, Training, Power, Broadcast, Observability and
//! Persistence.

mod broadcast_config;
mod observability_config;
mod persistence_config;
mod power_config;
mod server_config;
mod training_config;

pub use broadcast_config::BroadcastEnvConfig;
pub use observability_config::ObservabilityEnvConfig;
pub use persistence_config::PersistenceEnvConfig;
pub use power_config::PowerEnvConfig;
pub use server_config::ServerEnvConfig;
pub use training_config::TrainingEnvConfig;

use anyhow::{Context, Result};
use std::env;
use std::fmt::Display;
use std::str::FromStr;

/// Main application configuration
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub server: ServerEnvConfig,
    pub training: TrainingEnvConfig,
    pub power: PowerEnvConfig,
    pub broadcast: BroadcastEnvConfig,
    pub observability: ObservabilityEnvConfig,
    pub persistence: PersistenceEnvConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            server: ServerEnvConfig::from_env().context("Failed to load server config")?,
            training: TrainingEnvConfig::from_env().context("Failed to load training config")?,
            power: PowerEnvConfig::from_env().context("Failed to load power config")?,
            broadcast: BroadcastEnvConfig::from_env()
                .context("Failed to load broadcast config")?,
            observability: ObservabilityEnvConfig::from_env()
                .context("Failed to load observability config")?,
            persistence: PersistenceEnvConfig::from_env(),
        })
    }
}

/// Read `key`, falling back to `default` when unset. Malformed values are errors.
pub(crate) fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr + Display,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .context(format!("Failed to parse {}", key)),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, OnceLock};

    // Tests that touch process environment variables run one at a time
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn env_lock() -> std::sync::MutexGuard<'static, ()> {
        ENV_LOCK
            .get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn with_env<F: FnOnce()>(key: &str, value: &str, f: F) {
        let _guard = env_lock();
        // SAFETY: serialized by ENV_LOCK; no other test reads these keys
        unsafe { env::set_var(key, value) };
        f();
        unsafe { env::remove_var(key) };
    }

    #[test]
    fn test_malformed_observability_interval_is_an_error() {
        with_env("OBSERVABILITY_INTERVAL", "not-a-number", || {
            let err = Config::from_env().unwrap_err();
            assert!(format!("{:#}", err).contains("OBSERVABILITY_INTERVAL"));
        });
    }

    #[test]
    fn test_malformed_observability_flag_is_an_error() {
        with_env("OBSERVABILITY_ENABLED", "yes", || {
            assert!(ObservabilityEnvConfig::from_env().is_err());
        });
        with_env("OBSERVABILITY_ENABLED", "false", || {
            assert!(!ObservabilityEnvConfig::from_env().unwrap().enabled);
        });
    }

    #[test]
    fn test_parse_env_uses_default_when_unset() {
        let value: u64 = parse_env("QUEZTL_TEST_SURELY_UNSET_VARIABLE", 42).unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn test_default_config_is_consistent() {
        let config = Config::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.broadcast.queue_capacity, 256);
        assert!(config.persistence.database_url.is_none());
    }
}
