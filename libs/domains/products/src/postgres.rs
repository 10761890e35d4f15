//! PostgreSQL adapter: raw statements over a SeaORM connection pool.

use async_trait::async_trait;
use sea_orm::{
    ConnectionTrait, DatabaseConnection, DbBackend, DbErr, FromQueryResult, Statement,
};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::models::{Product, ProductFilters};
use crate::repository::{ProductRepository, RepositoryError, RepositoryResult, WriteOutcome};
use crate::sql::{self, Placeholders, ProductRow, SqlParam, SqlStatement};

const PLACEHOLDERS: Placeholders = Placeholders::Numbered;

/// PostgreSQL implementation of ProductRepository
#[derive(Clone)]
pub struct PgProductRepository {
    db: DatabaseConnection,
}

impl PgProductRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[derive(Debug, FromQueryResult)]
struct NameTaken {
    name_taken: bool,
}

fn statement(stmt: SqlStatement) -> Statement {
    Statement::from_sql_and_values(
        DbBackend::Postgres,
        stmt.sql,
        stmt.params.into_iter().map(sea_orm::Value::from),
    )
}

fn db_error(e: DbErr) -> RepositoryError {
    RepositoryError::Database(format!("Database error: {}", e))
}

/// Descriptions are stored verbatim; an empty one stays an empty string.
fn description(product: &Product) -> SqlParam {
    SqlParam::Text(product.description().to_string())
}

fn to_i64(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

/// Filters first, then `LIMIT $n OFFSET $n+1`.
fn list_statement(filters: &ProductFilters) -> SqlStatement {
    let mut qb = sql::select_products_filtered(
        PLACEHOLDERS,
        filters.category.as_deref(),
        filters.active,
    );
    qb.push(" LIMIT ").push_bind(to_i64(filters.limit));
    qb.push(" OFFSET ").push_bind(to_i64(filters.offset));
    qb.build()
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    #[instrument(skip(self, product), fields(product_id = %product.id()))]
    async fn create(&self, product: &Product) -> RepositoryResult<()> {
        let stmt = sql::insert_product(PLACEHOLDERS, product, description(product));
        self.db.execute_raw(statement(stmt)).await.map_err(db_error)?;
        debug!("inserted product");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Product>> {
        let stmt = sql::select_product_by_id(PLACEHOLDERS, id);

        ProductRow::find_by_statement(statement(stmt))
            .one(&self.db)
            .await
            .map_err(db_error)?
            .map(Product::try_from)
            .transpose()
    }

    #[instrument(skip(self))]
    async fn find_all(&self, filters: &ProductFilters) -> RepositoryResult<Vec<Product>> {
        ProductRow::find_by_statement(statement(list_statement(filters)))
            .all(&self.db)
            .await
            .map_err(db_error)?
            .into_iter()
            .map(Product::try_from)
            .collect()
    }

    #[instrument(skip(self, product), fields(product_id = %product.id()))]
    async fn update(&self, product: &Product) -> RepositoryResult<WriteOutcome> {
        let stmt = sql::update_product(PLACEHOLDERS, product, description(product));
        let result = self.db.execute_raw(statement(stmt)).await.map_err(db_error)?;
        Ok(WriteOutcome::from_rows_affected(result.rows_affected()))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> RepositoryResult<WriteOutcome> {
        let stmt = sql::delete_product(PLACEHOLDERS, id);
        let result = self.db.execute_raw(statement(stmt)).await.map_err(db_error)?;
        Ok(WriteOutcome::from_rows_affected(result.rows_affected()))
    }

    #[instrument(skip(self))]
    async fn exists_by_name(&self, name: &str) -> RepositoryResult<bool> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "SELECT EXISTS(SELECT 1 FROM products WHERE name = $1) AS name_taken",
            [name.into()],
        );

        let result = NameTaken::find_by_statement(stmt)
            .one(&self.db)
            .await
            .map_err(db_error)?;

        Ok(result.is_some_and(|r| r.name_taken))
    }
}
