use std::future::Future;
use std::time::Instant;

use super::DatabaseResult;

/// Outcome of a timed health probe, suitable for a readiness endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthStatus {
    pub healthy: bool,
    /// Failure reason when unhealthy
    pub message: Option<String>,
    pub response_time_ms: u64,
}

impl HealthStatus {
    pub fn healthy(response_time_ms: u64) -> Self {
        Self {
            healthy: true,
            message: None,
            response_time_ms,
        }
    }

    pub fn unhealthy(message: String, response_time_ms: u64) -> Self {
        Self {
            healthy: false,
            message: Some(message),
            response_time_ms,
        }
    }

    /// Run `probe` and record how long it took.
    pub async fn measure<F>(probe: F) -> Self
    where
        F: Future<Output = DatabaseResult<()>>,
    {
        let start = Instant::now();
        let outcome = probe.await;
        let elapsed = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        match outcome {
            Ok(()) => Self::healthy(elapsed),
            Err(e) => Self::unhealthy(e.to_string(), elapsed),
        }
    }
}
