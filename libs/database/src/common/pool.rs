use std::time::Duration;

#[cfg(feature = "config")]
use core_config::{ConfigError, FromEnv, env_parse};

/// Connection pool limits shared by every backend.
///
/// The pool is the only thing that serializes reuse of physical connections, so
/// all three bounds (size, idle count, lifetime) are always set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoolSettings {
    /// Maximum number of open connections
    pub max_connections: u32,
    /// Connections kept open while idle
    pub min_connections: u32,
    /// Timeout for opening a connection and for acquiring one from the pool
    pub connect_timeout: Duration,
    /// Idle connections above `min_connections` are closed after this long
    pub idle_timeout: Duration,
    /// Connections are recycled after this long regardless of use
    pub max_lifetime: Duration,
}

impl PoolSettings {
    pub fn with_size(mut self, max_connections: u32, min_connections: u32) -> Self {
        self.max_connections = max_connections;
        self.min_connections = min_connections.min(max_connections);
        self
    }

    pub fn with_max_lifetime(mut self, max_lifetime: Duration) -> Self {
        self.max_lifetime = max_lifetime;
        self
    }
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 25,
            min_connections: 5,
            connect_timeout: Duration::from_secs(8),
            idle_timeout: Duration::from_secs(300),
            max_lifetime: Duration::from_secs(300),
        }
    }
}

/// Environment variables (all optional):
/// - `DB_MAX_CONNECTIONS` (default: 25)
/// - `DB_MIN_CONNECTIONS` (default: 5)
/// - `DB_CONNECT_TIMEOUT_SECS` (default: 8)
/// - `DB_IDLE_TIMEOUT_SECS` (default: 300)
/// - `DB_MAX_LIFETIME_SECS` (default: 300)
#[cfg(feature = "config")]
impl FromEnv for PoolSettings {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let max_connections = env_parse("DB_MAX_CONNECTIONS", defaults.max_connections)?;
        let min_connections = env_parse("DB_MIN_CONNECTIONS", defaults.min_connections)?;
        if min_connections > max_connections {
            return Err(ConfigError::ParseError {
                key: "DB_MIN_CONNECTIONS".to_string(),
                details: format!("{min_connections} exceeds DB_MAX_CONNECTIONS ({max_connections})"),
            });
        }

        Ok(Self {
            max_connections,
            min_connections,
            connect_timeout: Duration::from_secs(env_parse(
                "DB_CONNECT_TIMEOUT_SECS",
                defaults.connect_timeout.as_secs(),
            )?),
            idle_timeout: Duration::from_secs(env_parse(
                "DB_IDLE_TIMEOUT_SECS",
                defaults.idle_timeout.as_secs(),
            )?),
            max_lifetime: Duration::from_secs(env_parse(
                "DB_MAX_LIFETIME_SECS",
                defaults.max_lifetime.as_secs(),
            )?),
        })
    }
}
