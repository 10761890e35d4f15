use sea_orm::{Database, DatabaseConnection, DbErr};
use tracing::info;

use super::PostgresConfig;
use crate::common::{RetryConfig, retry_with_backoff};

/// Open a pooled PostgreSQL connection.
pub async fn connect_from_config(config: PostgresConfig) -> Result<DatabaseConnection, DbErr> {
    let target = config.redacted_url();
    let max_connections = config.pool.max_connections;

    let db = Database::connect(config.into_connect_options()).await?;
    info!(url = %target, max_connections, "connected to PostgreSQL");
    Ok(db)
}

/// Open a pooled PostgreSQL connection, retrying with backoff on failure.
///
/// ```ignore
/// let db = connect_with_retry(PostgresConfig::from_env()?, RetryConfig::new().with_max_retries(5)).await?;
/// ```
pub async fn connect_with_retry(
    config: PostgresConfig,
    retry_config: RetryConfig,
) -> Result<DatabaseConnection, DbErr> {
    retry_with_backoff(|| connect_from_config(config.clone()), retry_config).await
}
