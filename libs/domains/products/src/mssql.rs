//! SQL Server adapter: tiberius clients checked out of a bb8 pool.
//!
//! Statements are assembled with anonymous `?` markers and rebound to tiberius'
//! `@P1..@Pn` just before execution.

use async_trait::async_trait;
use database::mssql::{MssqlConnection, MssqlPool};
use rust_decimal::Decimal;
use tiberius::numeric::Numeric;
use tiberius::{FromSql, Query, Row};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::models::{Product, ProductFilters};
use crate::repository::{ProductRepository, RepositoryError, RepositoryResult, WriteOutcome};
use crate::sql::{self, Placeholders, ProductRow, SqlParam, SqlStatement};

const PLACEHOLDERS: Placeholders = Placeholders::Anonymous;
const MARKER_PREFIX: &str = "@P";

/// `CASE` returns this when the name is taken.
const NAME_TAKEN: i32 = 1;

/// SQL Server implementation of ProductRepository
#[derive(Clone)]
pub struct MssqlProductRepository {
    pool: MssqlPool,
}

impl MssqlProductRepository {
    pub fn new(pool: MssqlPool) -> Self {
        Self { pool }
    }

    async fn conn(&self) -> RepositoryResult<MssqlConnection<'_>> {
        self.pool
            .get()
            .await
            .map_err(|e| RepositoryError::Database(format!("SQL Server pool: {}", e)))
    }

    async fn execute(&self, stmt: SqlStatement) -> RepositoryResult<u64> {
        let mut conn = self.conn().await?;
        let result = query(stmt).execute(&mut *conn).await.map_err(db_error)?;
        // one statement per batch; its count decides WriteOutcome
        Ok(result.rows_affected().first().copied().unwrap_or(0))
    }

    async fn fetch_all(&self, stmt: SqlStatement) -> RepositoryResult<Vec<Row>> {
        let mut conn = self.conn().await?;
        let stream = query(stmt).query(&mut *conn).await.map_err(db_error)?;
        let rows = stream.into_first_result().await.map_err(db_error)?;
        Ok(rows)
    }

    async fn fetch_one(&self, stmt: SqlStatement) -> RepositoryResult<Option<Row>> {
        let mut conn = self.conn().await?;
        let stream = query(stmt).query(&mut *conn).await.map_err(db_error)?;
        let row = stream.into_row().await.map_err(db_error)?;
        Ok(row)
    }
}

fn db_error(e: tiberius::error::Error) -> RepositoryError {
    RepositoryError::Database(format!("Database error: {}", e))
}

/// Rebind markers and attach params in order.
fn query(stmt: SqlStatement) -> Query<'static> {
    let mut query = Query::new(sql::rebind(&stmt.sql, MARKER_PREFIX));
    for param in stmt.params {
        match param {
            SqlParam::Text(v) => query.bind(v),
            SqlParam::NullableText(v) => query.bind(v),
            SqlParam::Int(v) => query.bind(v),
            SqlParam::BigInt(v) => query.bind(v),
            SqlParam::Bool(v) => query.bind(v),
            SqlParam::Decimal(v) => query.bind(to_numeric(v)),
            SqlParam::Timestamp(v) => query.bind(v),
        }
    }
    query
}

/// tiberius binds decimals as `Numeric`; a `Decimal` scale never exceeds 28.
fn to_numeric(value: Decimal) -> Numeric {
    Numeric::new_with_scale(value.mantissa(), value.scale() as u8)
}

/// Values beyond 96 bits of mantissa become `CorruptRow`.
fn to_decimal(value: Numeric, column: &str) -> RepositoryResult<Decimal> {
    Decimal::try_from_i128_with_scale(value.value(), u32::from(value.scale())).map_err(|e| {
        RepositoryError::CorruptRow(format!("column '{}': {} ({})", column, e, value))
    })
}

/// Empty descriptions are stored as NULL.
fn description(product: &Product) -> SqlParam {
    let description = product.description();
    SqlParam::NullableText((!description.is_empty()).then(|| description.to_string()))
}

fn to_i64(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

/// Filters first, then `OFFSET ? ROWS FETCH NEXT ? ROWS ONLY`; offset binds before limit.
fn list_statement(filters: &ProductFilters) -> SqlStatement {
    let mut qb = sql::select_products_filtered(
        PLACEHOLDERS,
        filters.category.as_deref(),
        filters.active,
    );
    qb.push(" OFFSET ").push_bind(to_i64(filters.offset));
    qb.push(" ROWS FETCH NEXT ").push_bind(to_i64(filters.limit));
    qb.push(" ROWS ONLY");
    qb.build()
}

fn exists_statement(name: &str) -> SqlStatement {
    let mut qb = sql::QueryBuilder::new(
        PLACEHOLDERS,
        "SELECT CASE WHEN EXISTS(SELECT 1 FROM products WHERE name = ",
    );
    qb.push_bind(name).push(") THEN 1 ELSE 0 END AS name_taken");
    qb.build()
}

fn column<'a, T>(row: &'a Row, name: &str) -> RepositoryResult<Option<T>>
where
    T: FromSql<'a>,
{
    row.try_get::<T, _>(name)
        .map_err(|e| RepositoryError::CorruptRow(format!("column '{}': {}", name, e)))
}

fn required<'a, T>(row: &'a Row, name: &str) -> RepositoryResult<T>
where
    T: FromSql<'a>,
{
    column(row, name)?
        .ok_or_else(|| RepositoryError::CorruptRow(format!("column '{}' is NULL", name)))
}

fn product_row(row: &Row) -> RepositoryResult<ProductRow> {
    Ok(ProductRow {
        id: required::<&str>(row, "id")?.to_string(),
        name: required::<&str>(row, "name")?.to_string(),
        description: column::<&str>(row, "description")?.map(str::to_string),
        price: to_decimal(required::<Numeric>(row, "price")?, "price")?,
        stock: required(row, "stock")?,
        category: required::<&str>(row, "category")?.to_string(),
        active: required(row, "active")?,
        created_at: required(row, "created_at")?,
        updated_at: required(row, "updated_at")?,
    })
}

fn to_product(row: &Row) -> RepositoryResult<Product> {
    Product::try_from(product_row(row)?)
}

#[async_trait]
impl ProductRepository for MssqlProductRepository {
    #[instrument(skip(self, product), fields(product_id = %product.id()))]
    async fn create(&self, product: &Product) -> RepositoryResult<()> {
        self.execute(sql::insert_product(PLACEHOLDERS, product, description(product)))
            .await?;
        debug!("inserted product");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Product>> {
        self.fetch_one(sql::select_product_by_id(PLACEHOLDERS, id))
            .await?
            .as_ref()
            .map(to_product)
            .transpose()
    }

    #[instrument(skip(self))]
    async fn find_all(&self, filters: &ProductFilters) -> RepositoryResult<Vec<Product>> {
        // FETCH NEXT 0 ROWS is a syntax error in T-SQL
        if filters.limit == 0 {
            return Ok(Vec::new());
        }

        self.fetch_all(list_statement(filters))
            .await?
            .iter()
            .map(to_product)
            .collect()
    }

    #[instrument(skip(self, product), fields(product_id = %product.id()))]
    async fn update(&self, product: &Product) -> RepositoryResult<WriteOutcome> {
        let rows = self
            .execute(sql::update_product(PLACEHOLDERS, product, description(product)))
            .await?;
        Ok(WriteOutcome::from_rows_affected(rows))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> RepositoryResult<WriteOutcome> {
        let rows = self.execute(sql::delete_product(PLACEHOLDERS, id)).await?;
        Ok(WriteOutcome::from_rows_affected(rows))
    }

    #[instrument(skip(self))]
    async fn exists_by_name(&self, name: &str) -> RepositoryResult<bool> {
        let row = self.fetch_one(exists_statement(name)).await?;
        match row {
            Some(row) => Ok(required::<i32>(&row, "name_taken")? == NAME_TAKEN),
            None => Ok(false),
        }
    }
}
