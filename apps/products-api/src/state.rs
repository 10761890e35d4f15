//! Shared application state

use database::common::RetryConfig;
use database::mssql::MssqlPool;
use database::postgres::DatabaseConnection;
use database::HealthStatus;
use tracing::info;

use crate::config::{Config, DatabaseConfig};

/// Open connection pool for whichever dialect was configured
#[derive(Clone)]
pub enum Backend {
    Postgres(DatabaseConnection),
    Mssql(MssqlPool),
}

impl Backend {
    /// Connect with startup retries; nothing retries once requests are served.
    pub async fn connect(config: &DatabaseConfig) -> eyre::Result<Self> {
        info!(
            dialect = %config.dialect(),
            connection = %config.redacted(),
            "connecting to database"
        );

        let retry = RetryConfig::default();
        let backend = match config {
            DatabaseConfig::Postgres(pg) => Self::Postgres(
                database::postgres::connect_with_retry(pg.clone(), retry).await?,
            ),
            DatabaseConfig::Mssql(ms) => {
                Self::Mssql(database::mssql::connect_with_retry(ms.clone(), retry).await?)
            }
        };
        Ok(backend)
    }

    /// `SELECT 1` against the pool, timed
    pub async fn health(&self) -> HealthStatus {
        match self {
            Self::Postgres(db) => database::postgres::check_health_detailed(db).await,
            Self::Mssql(pool) => database::mssql::check_health_detailed(pool).await,
        }
    }

    /// Release pooled connections during shutdown
    pub async fn close(self) {
        match self {
            Self::Postgres(db) => {
                if let Err(e) = db.close().await {
                    tracing::warn!(error = %e, "error closing PostgreSQL pool");
                }
            }
            // bb8 closes idle connections when the last pool handle drops
            Self::Mssql(pool) => drop(pool),
        }
        info!("database connections closed");
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub backend: Backend,
}
