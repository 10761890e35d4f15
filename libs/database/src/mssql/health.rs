use tracing::debug;

use super::MssqlPool;
use crate::common::{DatabaseError, HealthStatus};

/// Check a client out of the pool and run `SELECT 1` on it.
pub async fn check_health(pool: &MssqlPool) -> Result<(), DatabaseError> {
    let mut conn = pool
        .get()
        .await
        .map_err(|e| DatabaseError::Pool(e.to_string()))?;

    conn.simple_query("SELECT 1")
        .await
        .map_err(|e| DatabaseError::HealthCheckFailed(format!("SQL Server health check failed: {}", e)))?
        .into_row()
        .await
        .map_err(|e| DatabaseError::HealthCheckFailed(format!("SQL Server health check failed: {}", e)))?;

    debug!("SQL Server health check passed");
    Ok(())
}

/// [`check_health`] with timing, for readiness endpoints.
pub async fn check_health_detailed(pool: &MssqlPool) -> HealthStatus {
    HealthStatus::measure(check_health(pool)).await
}
