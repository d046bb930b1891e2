use std::env;

/// Persistence environment configuration
#[derive(Debug, Clone, Default)]
pub struct PersistenceEnvConfig {
    /// SQLite URL for execution results. Unset keeps results in memory.
    pub database_url: Option<String>,
}

impl PersistenceEnvConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL")
                .ok()
                .map(|url| url.trim().to_string())
                .filter(|url| !url.is_empty()),
        }
    }
}
