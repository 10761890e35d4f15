//! SQL Server test infrastructure
//!
//! `TestMssql` starts a SQL Server container, builds a bb8 pool of tiberius
//! clients through the `database` crate and applies the products schema.

use database::PoolSettings;
use database::common::RetryConfig;
use database::mssql::{MssqlConfig, MssqlPool, connect_with_retry};
use std::time::Duration;
use testcontainers::ContainerAsync;
use testcontainers::runners::AsyncRunner;
use testcontainers_modules::mssql_server::MssqlServer;

const SCHEMA: &str = include_str!("../sql/mssql.sql");
const SA_PASSWORD: &str = "Catalog(!)Passw0rd";

/// SQL Server container plus a ready pool.
///
/// The container is stopped and removed when this struct is dropped.
pub struct TestMssql {
    #[allow(dead_code)]
    container: ContainerAsync<MssqlServer>,
    pub pool: MssqlPool,
    pub connection_string: String,
}

impl TestMssql {
    pub async fn new() -> Self {
        let container = MssqlServer::default()
            .with_sa_password(SA_PASSWORD)
            .with_accept_eula()
            .start()
            .await
            .expect("Failed to start SQL Server container");

        let host_port = container
            .get_host_port_ipv4(1433)
            .await
            .expect("Failed to get host port");

        let connection_string = format!(
            "server=tcp:127.0.0.1,{};user id=sa;password={};TrustServerCertificate=true",
            host_port, SA_PASSWORD
        );

        // the server accepts TCP a while before it accepts logins
        let config = MssqlConfig::new(connection_string.clone())
            .with_trust_cert(true)
            .with_pool(PoolSettings::default().with_size(5, 1));
        let retry = RetryConfig::default()
            .with_max_retries(10)
            .with_initial_delay(Duration::from_millis(500))
            .with_max_delay(Duration::from_secs(5));

        let pool = connect_with_retry(config, retry)
            .await
            .expect("Failed to connect to test SQL Server");

        Self::apply_schema(&pool).await;

        tracing::info!(port = host_port, "Test database ready (SQL Server)");

        Self {
            container,
            pool,
            connection_string,
        }
    }

    async fn apply_schema(pool: &MssqlPool) {
        let mut conn = pool.get().await.expect("Failed to check out connection");
        conn.execute(SCHEMA, &[])
            .await
            .expect("Failed to apply SQL Server schema");
        tracing::debug!("Products schema applied");
    }

    /// Get a cloned pool handle (useful for passing to repositories)
    pub fn pool(&self) -> MssqlPool {
        self.pool.clone()
    }

    /// Remove every product row, for tests that share a container
    pub async fn truncate(&self) {
        let mut conn = self.pool.get().await.expect("Failed to check out connection");
        conn.execute("TRUNCATE TABLE dbo.products", &[])
            .await
            .expect("Failed to truncate products");
    }
}

impl Drop for TestMssql {
    fn drop(&mut self) {
        tracing::debug!("Cleaning up SQL Server container");
    }
}
