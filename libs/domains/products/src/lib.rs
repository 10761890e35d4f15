//! Products Domain
//!
//! Product catalog with interchangeable PostgreSQL and SQL Server storage.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Validation, uniqueness, error mapping
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Trait + PostgreSQL / SQL Server / in-memory adapters
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Product entity, Price, DTOs
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use database::postgres::{connect_from_config, PostgresConfig};
//! use domain_products::{handlers, PgProductRepository, ProductService};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = connect_from_config(PostgresConfig::new("postgres://localhost/catalog")).await?;
//!
//! let service = ProductService::new(PgProductRepository::new(db));
//! let router = handlers::router(service);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod handlers;
pub mod models;
pub mod mssql;
pub mod postgres;
pub mod price;
pub mod repository;
pub mod service;
mod sql;

// Re-export commonly used types
pub use error::{ErrorCode, ErrorResponse, ProductError, ProductResult};
pub use handlers::ApiDoc;
pub use models::{
    CreateProduct, DataResponse, DomainError, ListResponse, Product, ProductFilters,
    ProductListQuery, ProductResponse, ProductState, StockAdjustment, UpdateProduct,
};
pub use mssql::MssqlProductRepository;
pub use postgres::PgProductRepository;
pub use price::Price;
pub use repository::{
    InMemoryProductRepository, ProductRepository, RepositoryError, RepositoryResult, WriteOutcome,
};
pub use service::ProductService;
