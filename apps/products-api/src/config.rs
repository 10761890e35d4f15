//! Configuration for Products API

use core_config::{env_or_default, server::ServerConfig, ConfigError, FromEnv};
use database::mssql::MssqlConfig;
use database::postgres::PostgresConfig;

pub use core_config::Environment;

/// Which SQL dialect backs the catalog, read from `DATABASE_DIALECT`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::EnumString, strum::Display)]
#[strum(ascii_case_insensitive)]
pub enum DatabaseDialect {
    #[strum(to_string = "postgres", serialize = "postgresql")]
    Postgres,
    #[strum(to_string = "mssql", serialize = "sqlserver")]
    Mssql,
}

/// Connection settings for the selected dialect
#[derive(Clone, Debug)]
pub enum DatabaseConfig {
    Postgres(PostgresConfig),
    Mssql(MssqlConfig),
}

impl DatabaseConfig {
    pub fn dialect(&self) -> DatabaseDialect {
        match self {
            Self::Postgres(_) => DatabaseDialect::Postgres,
            Self::Mssql(_) => DatabaseDialect::Mssql,
        }
    }

    /// Connection string with the password masked
    pub fn redacted(&self) -> String {
        match self {
            Self::Postgres(config) => config.redacted_url(),
            Self::Mssql(config) => config.redacted_connection_string(),
        }
    }
}

impl FromEnv for DatabaseConfig {
    /// - DATABASE_DIALECT: `postgres` (default) or `mssql`
    /// - DATABASE_URL and the pool knobs are read by the dialect's config
    fn from_env() -> Result<Self, ConfigError> {
        let raw = env_or_default("DATABASE_DIALECT", "postgres");
        let dialect: DatabaseDialect =
            raw.trim().parse().map_err(|_| ConfigError::ParseError {
                key: "DATABASE_DIALECT".to_string(),
                details: format!("unknown dialect '{}', expected postgres or mssql", raw),
            })?;

        Ok(match dialect {
            DatabaseDialect::Postgres => Self::Postgres(PostgresConfig::from_env()?),
            DatabaseDialect::Mssql => Self::Mssql(MssqlConfig::from_env()?),
        })
    }
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    /// `*` allows any origin
    pub cors_allowed_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let server = ServerConfig::from_env()?;
        let database = DatabaseConfig::from_env()?;

        let cors_allowed_origins = env_or_default("CORS_ALLOWED_ORIGINS", "*")
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect();

        Ok(Self {
            environment,
            server,
            database,
            cors_allowed_origins,
        })
    }

    pub fn allows_any_origin(&self) -> bool {
        self.cors_allowed_origins.is_empty() || self.cors_allowed_origins.iter().any(|o| o == "*")
    }
}
