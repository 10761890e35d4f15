//! API routes module

pub mod health;

use axum::Router;
use domain_products::{handlers, MssqlProductRepository, PgProductRepository, ProductService};

use crate::state::{AppState, Backend};

/// Product routes backed by the configured dialect
pub fn products(backend: &Backend) -> Router {
    match backend {
        Backend::Postgres(db) => {
            handlers::router(ProductService::new(PgProductRepository::new(db.clone())))
        }
        Backend::Mssql(pool) => {
            handlers::router(ProductService::new(MssqlProductRepository::new(pool.clone())))
        }
    }
}

/// Create all API routes
pub fn routes(state: &AppState) -> Router {
    Router::new()
        .nest("/api/products", products(&state.backend))
        .merge(health::router(state.clone()))
}
