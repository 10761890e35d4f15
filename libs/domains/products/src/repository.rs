use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{Product, ProductFilters};

/// Storage failure reported by a repository.
#[derive(Debug, Clone, Error)]
pub enum RepositoryError {
    /// The backend rejected or failed the statement
    #[error("Database error: {0}")]
    Database(String),

    /// A stored row could not be turned back into a valid product
    #[error("Corrupt product row: {0}")]
    CorruptRow(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Result of a keyed write, derived from the affected-row count.
///
/// `NotFound` is an expected outcome (the row is absent, possibly deleted
/// between a read and this write), not a storage failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum WriteOutcome {
    Applied,
    NotFound,
}

impl WriteOutcome {
    pub fn from_rows_affected(rows: u64) -> Self {
        if rows == 0 {
            Self::NotFound
        } else {
            Self::Applied
        }
    }
}

/// Dialect-agnostic product persistence.
///
/// Implementations must agree on observable behaviour: listing is newest first,
/// filters are exact-match and AND-combined, and an empty description
/// round-trips as an empty string.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Insert a new row. Name uniqueness is not checked here.
    async fn create(&self, product: &Product) -> RepositoryResult<()>;

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Product>>;

    /// Newest first, windowed by `filters.limit` / `filters.offset`.
    async fn find_all(&self, filters: &ProductFilters) -> RepositoryResult<Vec<Product>>;

    /// Replace every mutable column of the row keyed by `product.id()`.
    async fn update(&self, product: &Product) -> RepositoryResult<WriteOutcome>;

    async fn delete(&self, id: Uuid) -> RepositoryResult<WriteOutcome>;

    /// Exact match; case sensitivity follows the backend collation.
    async fn exists_by_name(&self, name: &str) -> RepositoryResult<bool>;
}

/// In-memory implementation of ProductRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryProductRepository {
    products: Arc<RwLock<HashMap<Uuid, Product>>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn create(&self, product: &Product) -> RepositoryResult<()> {
        let mut products = self.products.write().await;

        if products.contains_key(&product.id()) {
            return Err(RepositoryError::Database(format!(
                "duplicate key value violates primary key: {}",
                product.id()
            )));
        }

        products.insert(product.id(), product.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Product>> {
        let products = self.products.read().await;
        Ok(products.get(&id).cloned())
    }

    async fn find_all(&self, filters: &ProductFilters) -> RepositoryResult<Vec<Product>> {
        let products = self.products.read().await;

        let mut matching: Vec<&Product> = products
            .values()
            .filter(|p| {
                filters
                    .category
                    .as_deref()
                    .is_none_or(|category| p.category() == category)
            })
            .filter(|p| filters.active.is_none_or(|active| p.is_active() == active))
            .collect();

        matching.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| b.id().cmp(&a.id()))
        });

        let offset = usize::try_from(filters.offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(filters.limit).unwrap_or(usize::MAX);

        Ok(matching
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn update(&self, product: &Product) -> RepositoryResult<WriteOutcome> {
        let mut products = self.products.write().await;

        match products.get_mut(&product.id()) {
            Some(stored) => {
                *stored = product.clone();
                Ok(WriteOutcome::Applied)
            }
            None => Ok(WriteOutcome::NotFound),
        }
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<WriteOutcome> {
        let mut products = self.products.write().await;

        Ok(match products.remove(&id) {
            Some(_) => WriteOutcome::Applied,
            None => WriteOutcome::NotFound,
        })
    }

    async fn exists_by_name(&self, name: &str) -> RepositoryResult<bool> {
        let products = self.products.read().await;
        Ok(products.values().any(|p| p.name() == name))
    }
}
