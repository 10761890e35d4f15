use tracing::info;

use super::{MssqlConfig, MssqlPool, TiberiusConnectionManager};
use crate::common::{DatabaseError, RetryConfig, retry_with_backoff};

/// Build a SQL Server pool and open its first connections.
///
/// Fails if the server cannot be reached, so callers learn about a bad
/// connection string at startup rather than on the first request.
pub async fn connect_from_config(config: MssqlConfig) -> Result<MssqlPool, DatabaseError> {
    let manager = TiberiusConnectionManager::new(config.to_tiberius_config()?);
    let pool = &config.pool;

    let pool = bb8::Pool::builder()
        .max_size(pool.max_connections)
        .min_idle(Some(pool.min_connections))
        .connection_timeout(pool.connect_timeout)
        .idle_timeout(Some(pool.idle_timeout))
        .max_lifetime(Some(pool.max_lifetime))
        .test_on_check_out(true)
        .build(manager)
        .await?;

    // surface an unreachable server here even if min_idle is configured as zero
    pool.get()
        .await
        .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

    info!(
        connection = %config.redacted_connection_string(),
        max_connections = config.pool.max_connections,
        "connected to SQL Server"
    );
    Ok(pool)
}

/// Build a SQL Server pool, retrying with backoff on failure.
pub async fn connect_with_retry(
    config: MssqlConfig,
    retry_config: RetryConfig,
) -> Result<MssqlPool, DatabaseError> {
    retry_with_backoff(|| connect_from_config(config.clone()), retry_config).await
}
