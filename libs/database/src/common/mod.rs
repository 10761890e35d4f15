//! Pieces shared by every backend

pub mod dsn;
pub mod error;
pub mod health;
pub mod pool;
pub mod retry;

pub use dsn::mask_password;
pub use error::{DatabaseError, DatabaseResult};
pub use health::HealthStatus;
pub use pool::PoolSettings;
pub use retry::{RetryConfig, retry_with_backoff};
