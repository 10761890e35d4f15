use tiberius::{Client, Config, error::Error};
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};
use tracing::debug;

/// A tiberius client over a tokio TCP stream
pub type MssqlClient = Client<Compat<TcpStream>>;

/// bb8 connection manager that opens tiberius clients.
#[derive(Clone, Debug)]
pub struct TiberiusConnectionManager {
    config: Config,
}

impl TiberiusConnectionManager {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    async fn open(config: Config) -> Result<MssqlClient, Error> {
        let tcp = TcpStream::connect(config.get_addr()).await?;
        tcp.set_nodelay(true)?;
        Client::connect(config, tcp.compat_write()).await
    }
}

impl bb8::ManageConnection for TiberiusConnectionManager {
    type Connection = MssqlClient;
    type Error = Error;

    async fn connect(&self) -> Result<Self::Connection, Self::Error> {
        match Self::open(self.config.clone()).await {
            // Azure SQL gateways answer the login with a redirect to the real node
            Err(Error::Routing { host, port }) => {
                debug!(%host, port, "following SQL Server routing redirect");
                let mut redirected = self.config.clone();
                redirected.host(&host);
                redirected.port(port);
                Self::open(redirected).await
            }
            other => other,
        }
    }

    async fn is_valid(&self, conn: &mut Self::Connection) -> Result<(), Self::Error> {
        conn.simple_query("SELECT 1").await?.into_row().await?;
        Ok(())
    }

    fn has_broken(&self, _conn: &mut Self::Connection) -> bool {
        false
    }
}
