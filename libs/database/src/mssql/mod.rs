//! SQL Server connection pool bootstrap and health probes
//!
//! Connections are tiberius clients over tokio TCP streams, pooled with bb8.

mod config;
mod connector;
mod health;
mod manager;

pub use config::MssqlConfig;
pub use connector::{connect_from_config, connect_with_retry};
pub use health::{check_health, check_health_detailed};
pub use manager::{MssqlClient, TiberiusConnectionManager};

/// Pool of SQL Server clients
pub type MssqlPool = bb8::Pool<TiberiusConnectionManager>;

/// A client checked out of [`MssqlPool`]
pub type MssqlConnection<'a> = bb8::PooledConnection<'a, TiberiusConnectionManager>;
