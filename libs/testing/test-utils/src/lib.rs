//! Shared test utilities for domain testing
//!
//! This crate provides reusable test infrastructure for the products domain:
//! - `TestDatabase`: PostgreSQL container with the products schema (feature: "postgres")
//! - `TestMssql`: SQL Server container with the products schema (feature: "mssql")
//! - `TestDataBuilder`: Deterministic test data generation (always available)
//! - `assertions`: Custom assertion helpers (always available)
//!
//! # Features
//!
//! - `postgres` (default): Enables PostgreSQL test infrastructure
//! - `mssql`: Enables SQL Server test infrastructure
//! - `all`: Enables both
//!
//! # Usage
//!
//! ```rust,no_run
//! use test_utils::{TestDatabase, TestDataBuilder};
//!
//! #[tokio::test]
//! async fn my_postgres_test() {
//!     let db = TestDatabase::new().await;
//!     let builder = TestDataBuilder::from_test_name("my_test");
//!
//!     let name = builder.name("product", "main");
//!     let category = builder.category();
//! }
//! ```
//!
//! SQL Server needs `features = ["mssql"]` in your dev-dependencies:
//!
//! ```rust,ignore
//! use test_utils::TestMssql;
//!
//! #[tokio::test]
//! async fn my_mssql_test() {
//!     let db = TestMssql::new().await;
//!     let pool = db.pool();
//! }
//! ```

#[cfg(feature = "postgres")]
mod postgres;

#[cfg(feature = "mssql")]
mod mssql;

#[cfg(feature = "postgres")]
pub use postgres::TestDatabase;

#[cfg(feature = "mssql")]
pub use mssql::TestMssql;

/// Builder for test data with deterministic randomization
///
/// Names derive from a seed so reruns produce the same rows, while different
/// tests sharing a container never collide on product names.
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    /// Create a new builder with a seed (for deterministic tests)
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Create from test name (generates seed from test name hash)
    ///
    /// # Example
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::from_test_name("test_create_product");
    /// ```
    pub fn from_test_name(name: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// Generate a unique product name
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::new(7);
    /// assert_eq!(builder.name("product", "main"), "test-product-7-main");
    /// ```
    pub fn name(&self, prefix: &str, suffix: &str) -> String {
        format!("test-{}-{}-{}", prefix, self.seed, suffix)
    }

    /// A category no other test uses, short enough for the 50-character limit
    pub fn category(&self) -> String {
        format!("cat-{:x}", self.seed)
    }
}

/// Split a SQL script on `;`, skipping blank and comment-only chunks.
///
/// Fixtures are plain DDL; quoted semicolons are not supported.
pub fn split_sql_statements(sql: &str) -> Vec<String> {
    sql.split(';')
        .map(str::trim)
        .filter(|stmt| {
            stmt.lines().any(|line| {
                let line = line.trim();
                !line.is_empty() && !line.starts_with("--")
            })
        })
        .map(str::to_string)
        .collect()
}

/// Test assertion helpers
pub mod assertions {
    use uuid::Uuid;

    /// Assert that two UUIDs are equal with a nice error message
    pub fn assert_uuid_eq(actual: Uuid, expected: Uuid, context: &str) {
        assert_eq!(
            actual, expected,
            "{}: expected UUID {}, got {}",
            context, expected, actual
        );
    }

    /// Assert that an optional value is Some
    pub fn assert_some<T>(value: Option<T>, context: &str) -> T {
        value.unwrap_or_else(|| panic!("{}: expected Some, got None", context))
    }
}
