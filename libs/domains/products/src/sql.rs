//! Dialect-neutral statement building and row mapping shared by the SQL adapters.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::FromQueryResult;
use uuid::Uuid;

use crate::models::{Product, ProductState};
use crate::repository::RepositoryError;

/// Column list in the order every adapter selects and inserts it.
pub const PRODUCT_COLUMNS: &str =
    "id, name, description, price, stock, category, active, created_at, updated_at";

/// A bind value, independent of any driver.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Text(String),
    NullableText(Option<String>),
    Int(i32),
    BigInt(i64),
    Bool(bool),
    Decimal(Decimal),
    Timestamp(DateTime<Utc>),
}

impl From<String> for SqlParam {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for SqlParam {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<Option<String>> for SqlParam {
    fn from(value: Option<String>) -> Self {
        Self::NullableText(value)
    }
}

impl From<i32> for SqlParam {
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

impl From<i64> for SqlParam {
    fn from(value: i64) -> Self {
        Self::BigInt(value)
    }
}

impl From<bool> for SqlParam {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Decimal> for SqlParam {
    fn from(value: Decimal) -> Self {
        Self::Decimal(value)
    }
}

impl From<DateTime<Utc>> for SqlParam {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Timestamp(value)
    }
}

impl From<Uuid> for SqlParam {
    /// Identifiers are stored as their 36-character hyphenated form.
    fn from(value: Uuid) -> Self {
        Self::Text(value.hyphenated().to_string())
    }
}

impl From<SqlParam> for sea_orm::Value {
    fn from(param: SqlParam) -> Self {
        match param {
            SqlParam::Text(v) => v.into(),
            SqlParam::NullableText(v) => v.into(),
            SqlParam::Int(v) => v.into(),
            SqlParam::BigInt(v) => v.into(),
            SqlParam::Bool(v) => v.into(),
            SqlParam::Decimal(v) => v.into(),
            SqlParam::Timestamp(v) => v.into(),
        }
    }
}

/// How bind markers are written into the SQL text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholders {
    /// `$1`, `$2`, ...
    Numbered,
    /// `?` for every bind; see [`rebind`]
    Anonymous,
}

/// SQL text plus its binds, in marker order.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlStatement {
    pub sql: String,
    pub params: Vec<SqlParam>,
}

/// Appends SQL fragments and binds, numbering markers from the bind count.
///
/// ```ignore
/// let mut qb = QueryBuilder::new(Placeholders::Numbered, "SELECT * FROM products WHERE 1=1");
/// qb.push(" AND category = ").push_bind("tools");
/// qb.push(" LIMIT ").push_bind(20i64);
/// assert_eq!(qb.build().sql, "SELECT * FROM products WHERE 1=1 AND category = $1 LIMIT $2");
/// ```
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    placeholders: Placeholders,
    sql: String,
    params: Vec<SqlParam>,
}

impl QueryBuilder {
    pub fn new(placeholders: Placeholders, sql: impl Into<String>) -> Self {
        Self {
            placeholders,
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    pub fn push(&mut self, fragment: &str) -> &mut Self {
        self.sql.push_str(fragment);
        self
    }

    pub fn push_bind(&mut self, param: impl Into<SqlParam>) -> &mut Self {
        self.params.push(param.into());
        match self.placeholders {
            Placeholders::Numbered => {
                self.sql.push('$');
                self.sql.push_str(&self.params.len().to_string());
            }
            Placeholders::Anonymous => self.sql.push('?'),
        }
        self
    }

    /// Push `values` as a comma-separated list of binds.
    pub fn push_binds<I, P>(&mut self, values: I) -> &mut Self
    where
        I: IntoIterator<Item = P>,
        P: Into<SqlParam>,
    {
        for (i, value) in values.into_iter().enumerate() {
            if i > 0 {
                self.sql.push_str(", ");
            }
            self.push_bind(value);
        }
        self
    }

    pub fn build(self) -> SqlStatement {
        SqlStatement {
            sql: self.sql,
            params: self.params,
        }
    }
}

/// Rewrite anonymous `?` markers as `{prefix}1`, `{prefix}2`, ...
///
/// Question marks inside single-quoted literals are left alone.
pub fn rebind(sql: &str, prefix: &str) -> String {
    let mut out = String::with_capacity(sql.len() + 8);
    let mut in_literal = false;
    let mut n = 0usize;

    for ch in sql.chars() {
        match ch {
            '\'' => {
                in_literal = !in_literal;
                out.push(ch);
            }
            '?' if !in_literal => {
                n += 1;
                out.push_str(prefix);
                out.push_str(&n.to_string());
            }
            _ => out.push(ch),
        }
    }
    out
}

/// Full-row insert of a new product.
pub fn insert_product(
    placeholders: Placeholders,
    product: &Product,
    description: SqlParam,
) -> SqlStatement {
    let mut qb = QueryBuilder::new(
        placeholders,
        format!("INSERT INTO products ({PRODUCT_COLUMNS}) VALUES ("),
    );
    qb.push_binds([
        SqlParam::from(product.id()),
        product.name().into(),
        description,
        product.price().value().into(),
        product.stock().into(),
        product.category().into(),
        product.is_active().into(),
        product.created_at().into(),
        product.updated_at().into(),
    ]);
    qb.push(")");
    qb.build()
}

/// Full replace of the mutable columns, keyed by id.
pub fn update_product(
    placeholders: Placeholders,
    product: &Product,
    description: SqlParam,
) -> SqlStatement {
    let mut qb = QueryBuilder::new(placeholders, "UPDATE products SET name = ");
    qb.push_bind(product.name());
    qb.push(", description = ").push_bind(description);
    qb.push(", price = ").push_bind(product.price().value());
    qb.push(", stock = ").push_bind(product.stock());
    qb.push(", category = ").push_bind(product.category());
    qb.push(", active = ").push_bind(product.is_active());
    qb.push(", updated_at = ").push_bind(product.updated_at());
    qb.push(" WHERE id = ").push_bind(product.id());
    qb.build()
}

pub fn delete_product(placeholders: Placeholders, id: Uuid) -> SqlStatement {
    let mut qb = QueryBuilder::new(placeholders, "DELETE FROM products WHERE id = ");
    qb.push_bind(id);
    qb.build()
}

pub fn select_product_by_id(placeholders: Placeholders, id: Uuid) -> SqlStatement {
    let mut qb = QueryBuilder::new(
        placeholders,
        format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = "),
    );
    qb.push_bind(id);
    qb.build()
}

/// `SELECT ... WHERE 1=1 [AND category = ?] [AND active = ?]`, ready for an
/// ORDER BY and the dialect's pagination clause.
pub fn select_products_filtered(
    placeholders: Placeholders,
    category: Option<&str>,
    active: Option<bool>,
) -> QueryBuilder {
    let mut qb = QueryBuilder::new(
        placeholders,
        format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE 1=1"),
    );
    if let Some(category) = category {
        qb.push(" AND category = ").push_bind(category);
    }
    if let Some(active) = active {
        qb.push(" AND active = ").push_bind(active);
    }
    qb.push(" ORDER BY created_at DESC, id DESC");
    qb
}

/// A stored product row as both adapters read it.
#[derive(Debug, Clone, FromQueryResult)]
pub struct ProductRow {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock: i32,
    pub category: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(row.id.trim())
            .map_err(|e| RepositoryError::CorruptRow(format!("id '{}': {}", row.id, e)))?;

        Product::restore(ProductState {
            id,
            name: row.name,
            description: row.description.unwrap_or_default(),
            price: row.price.normalize(),
            stock: row.stock,
            category: row.category,
            active: row.active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
        .map_err(|e| RepositoryError::CorruptRow(format!("product {}: {}", id, e)))
    }
}
