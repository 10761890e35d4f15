use tiberius::Config;

use crate::common::{DatabaseError, PoolSettings, mask_password};

#[cfg(feature = "config")]
use core_config::{ConfigError, Environment, FromEnv, env_parse, env_required};

/// SQL Server connection settings.
///
/// The connection string uses the ADO.NET format understood by tiberius:
///
/// ```ignore
/// let config = MssqlConfig::new(
///     "server=tcp:localhost,1433;user=sa;password=secret;database=catalog",
/// )
/// .with_trust_cert(true);
/// ```
#[derive(Clone, Debug)]
pub struct MssqlConfig {
    /// ADO.NET connection string (required)
    pub connection_string: String,
    pub pool: PoolSettings,
    /// Accept the server certificate without validation (self-signed dev servers)
    pub trust_cert: bool,
}

impl MssqlConfig {
    pub fn new(connection_string: impl Into<String>) -> Self {
        Self {
            connection_string: connection_string.into(),
            pool: PoolSettings::default(),
            trust_cert: false,
        }
    }

    pub fn with_pool(mut self, pool: PoolSettings) -> Self {
        self.pool = pool;
        self
    }

    pub fn with_trust_cert(mut self, trust_cert: bool) -> Self {
        self.trust_cert = trust_cert;
        self
    }

    /// Connection string with the password masked, for logging
    pub fn redacted_connection_string(&self) -> String {
        mask_password(&self.connection_string)
    }

    /// Parse the connection string into a tiberius client config.
    pub fn to_tiberius_config(&self) -> Result<Config, DatabaseError> {
        let mut config = Config::from_ado_string(&self.connection_string).map_err(|e| {
            DatabaseError::ConfigError(format!("invalid SQL Server connection string: {}", e))
        })?;
        if self.trust_cert {
            config.trust_cert();
        }
        Ok(config)
    }
}

/// Environment variables:
/// - `DATABASE_URL` (required) - ADO.NET connection string
/// - `DB_TRUST_CERT` (optional, default: true in development, false in production)
/// - the pool knobs read by [`PoolSettings`]
#[cfg(feature = "config")]
impl FromEnv for MssqlConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let connection_string = env_required("DATABASE_URL")?;
        let pool = PoolSettings::from_env()?;
        let trust_cert = env_parse("DB_TRUST_CERT", Environment::from_env().is_development())?;

        Ok(Self::new(connection_string)
            .with_pool(pool)
            .with_trust_cert(trust_cert))
    }
}
