use chrono::{DateTime, SubsecRound, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::price::Price;

pub const NAME_MIN_CHARS: usize = 3;
pub const NAME_MAX_CHARS: usize = 100;
pub const DEFAULT_PAGE_SIZE: u64 = 20;
pub const MAX_PAGE_SIZE: u64 = 100;

/// Invariant violations raised by [`Product`] and [`Price`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("name must be between 3 and 100 characters")]
    InvalidName,

    #[error("price must be positive with at most 15 integer and 4 fractional digits")]
    InvalidPrice,

    #[error("stock cannot be negative")]
    InvalidStock,

    #[error("insufficient stock: available {available}, requested {requested}")]
    InsufficientStock { available: i32, requested: i32 },

    #[error("quantity must be a non-negative amount that keeps stock in range")]
    InvalidQuantity,
}

/// Timestamps are kept at microsecond precision, the finest both backends store.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

fn check_name(name: &str) -> Result<(), DomainError> {
    let chars = name.chars().count();
    if (NAME_MIN_CHARS..=NAME_MAX_CHARS).contains(&chars) {
        Ok(())
    } else {
        Err(DomainError::InvalidName)
    }
}

fn check_stock(stock: i32) -> Result<(), DomainError> {
    if stock < 0 {
        return Err(DomainError::InvalidStock);
    }
    Ok(())
}

/// Name, then price, then stock. The first failure wins.
fn check_fields(name: &str, price: Decimal, stock: i32) -> Result<Price, DomainError> {
    check_name(name)?;
    let price = Price::new(price)?;
    check_stock(stock)?;
    Ok(price)
}

/// A sellable catalog item; the aggregate root of this crate.
///
/// Fields are private so every mutation goes through a method that re-checks the
/// invariants and advances `updated_at`. `id` and `created_at` never change after
/// construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    id: Uuid,
    name: String,
    description: String,
    price: Price,
    stock: i32,
    category: String,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Persisted field values, used to rehydrate a [`Product`].
#[derive(Debug, Clone)]
pub struct ProductState {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub stock: i32,
    pub category: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Build a new, active product with a fresh identifier.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        price: Decimal,
        stock: i32,
        category: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let name = name.into();
        let price = check_fields(&name, price, stock)?;
        let created_at = now();

        Ok(Self {
            id: Uuid::now_v7(),
            name,
            description: description.into(),
            price,
            stock,
            category: category.into(),
            active: true,
            created_at,
            updated_at: created_at,
        })
    }

    /// Rehydrate a product from storage, re-checking the same invariants as
    /// [`Product::new`].
    pub fn restore(state: ProductState) -> Result<Self, DomainError> {
        let price = check_fields(&state.name, state.price, state.stock)?;

        Ok(Self {
            id: state.id,
            name: state.name,
            description: state.description,
            price,
            stock: state.stock,
            category: state.category,
            active: state.active,
            created_at: state.created_at.trunc_subsecs(6),
            updated_at: state.updated_at.trunc_subsecs(6),
        })
    }

    /// Replace every mutable field. On error the product is left untouched.
    pub fn update(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        price: Decimal,
        stock: i32,
        category: impl Into<String>,
    ) -> Result<(), DomainError> {
        let name = name.into();
        let price = check_fields(&name, price, stock)?;

        self.name = name;
        self.description = description.into();
        self.price = price;
        self.stock = stock;
        self.category = category.into();
        self.touch();
        Ok(())
    }

    pub fn reduce_stock(&mut self, quantity: i32) -> Result<(), DomainError> {
        if quantity < 0 {
            return Err(DomainError::InvalidQuantity);
        }
        if quantity > self.stock {
            return Err(DomainError::InsufficientStock {
                available: self.stock,
                requested: quantity,
            });
        }
        self.stock -= quantity;
        self.touch();
        Ok(())
    }

    pub fn increase_stock(&mut self, quantity: i32) -> Result<(), DomainError> {
        if quantity < 0 {
            return Err(DomainError::InvalidQuantity);
        }
        self.stock = self
            .stock
            .checked_add(quantity)
            .ok_or(DomainError::InvalidQuantity)?;
        self.touch();
        Ok(())
    }

    pub fn activate(&mut self) {
        self.active = true;
        self.touch();
    }

    pub fn deactivate(&mut self) {
        self.active = false;
        self.touch();
    }

    fn touch(&mut self) {
        // never move backwards, even if the wall clock does
        self.updated_at = now().max(self.updated_at);
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn price(&self) -> Price {
        self.price
    }

    pub fn stock(&self) -> i32 {
        self.stock
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

/// Repository-level listing window and filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductFilters {
    /// Exact match
    pub category: Option<String>,
    /// Exact match
    pub active: Option<bool>,
    pub limit: u64,
    pub offset: u64,
}

impl ProductFilters {
    pub fn page(limit: u64, offset: u64) -> Self {
        Self {
            limit,
            offset,
            ..Self::default()
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.active = Some(active);
        self
    }
}

impl Default for ProductFilters {
    fn default() -> Self {
        Self {
            category: None,
            active: None,
            limit: DEFAULT_PAGE_SIZE,
            offset: 0,
        }
    }
}

fn validate_price(price: &Decimal) -> Result<(), ValidationError> {
    Price::new(*price).map(|_| ()).map_err(|e| {
        let mut err = ValidationError::new("price");
        err.message = Some(e.to_string().into());
        err
    })
}

/// Request body for creating a product
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateProduct {
    #[validate(length(min = 3, max = 100))]
    #[schema(example = "Widget")]
    pub name: String,

    #[serde(default)]
    #[validate(length(max = 500))]
    pub description: String,

    #[serde(with = "rust_decimal::serde::float")]
    #[validate(custom(function = "validate_price"))]
    #[schema(value_type = f64, example = 9.99)]
    pub price: Decimal,

    #[validate(required, range(min = 0))]
    #[schema(value_type = i32, example = 10)]
    pub stock: Option<i32>,

    #[validate(length(min = 3, max = 50))]
    #[schema(example = "tools")]
    pub category: String,
}

/// Request body for replacing a product's mutable fields
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateProduct {
    #[validate(length(min = 3, max = 100))]
    pub name: String,

    #[serde(default)]
    #[validate(length(max = 500))]
    pub description: String,

    #[serde(with = "rust_decimal::serde::float")]
    #[validate(custom(function = "validate_price"))]
    #[schema(value_type = f64)]
    pub price: Decimal,

    #[validate(required, range(min = 0))]
    #[schema(value_type = i32)]
    pub stock: Option<i32>,

    #[validate(length(min = 3, max = 50))]
    pub category: String,
}

/// Query string accepted by the list endpoint
#[derive(Debug, Clone, Default, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductListQuery {
    /// Exact category match
    pub category: Option<String>,
    /// Only active (true) or inactive (false) products
    pub active: Option<bool>,
    /// Page size, at most 100; unset or 0 means 20
    #[validate(range(max = 100))]
    pub limit: Option<u32>,
    /// Rows to skip
    pub offset: Option<u32>,
}

impl ProductListQuery {
    pub fn into_filters(self) -> ProductFilters {
        let limit = match self.limit {
            None | Some(0) => DEFAULT_PAGE_SIZE,
            Some(limit) => u64::from(limit).min(MAX_PAGE_SIZE),
        };

        ProductFilters {
            category: self.category,
            active: self.active,
            limit,
            offset: self.offset.map(u64::from).unwrap_or(0),
        }
    }
}

/// Stock change request. Positive quantities add stock, negative ones remove it.
#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
pub struct StockAdjustment {
    #[schema(example = -3)]
    pub quantity: i32,
}

/// Product as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub price: Decimal,
    pub stock: i32,
    pub category: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Product> for ProductResponse {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id(),
            name: product.name().to_string(),
            description: product.description().to_string(),
            price: product.price().value(),
            stock: product.stock(),
            category: product.category().to_string(),
            active: product.is_active(),
            created_at: product.created_at(),
            updated_at: product.updated_at(),
        }
    }
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self::from(&product)
    }
}

/// `{"data": ...}` envelope for single-resource responses
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DataResponse<T> {
    pub data: T,
}

/// `{"data": [...], "count": n}` envelope for list responses
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ListResponse<T> {
    pub data: Vec<T>,
    pub count: usize,
}
