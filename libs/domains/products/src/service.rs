//! Product Service - Business logic layer

use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::error::{ProductError, ProductResult};
use crate::models::{
    CreateProduct, DomainError, Product, ProductListQuery, ProductResponse, StockAdjustment,
    UpdateProduct,
};
use crate::repository::{ProductRepository, WriteOutcome};

/// Sequences validation, uniqueness checks, domain rules and persistence for
/// every product operation.
///
/// The service never knows which backend it talks to; the dialect is chosen
/// when the repository is constructed.
pub struct ProductService<R: ProductRepository> {
    repository: Arc<R>,
}

impl<R: ProductRepository> Clone for ProductService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

fn required_stock(stock: Option<i32>) -> ProductResult<i32> {
    stock.ok_or_else(|| ProductError::validation("stock is required"))
}

impl<R: ProductRepository> ProductService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    #[instrument(skip(self, input), fields(product_name = %input.name))]
    pub async fn create_product(&self, input: CreateProduct) -> ProductResult<ProductResponse> {
        input.validate()?;

        let taken = self
            .repository
            .exists_by_name(&input.name)
            .await
            .map_err(|e| ProductError::internal("failed to check product name", e))?;
        if taken {
            return Err(ProductError::Conflict(input.name));
        }

        let product = Product::new(
            input.name,
            input.description,
            input.price,
            required_stock(input.stock)?,
            input.category,
        )?;

        self.repository
            .create(&product)
            .await
            .map_err(|e| ProductError::internal("failed to create product", e))?;

        info!(product_id = %product.id(), "created product");
        Ok(product.into())
    }

    #[instrument(skip(self))]
    pub async fn get_product(&self, id: Uuid) -> ProductResult<ProductResponse> {
        self.load(id).await.map(ProductResponse::from)
    }

    #[instrument(skip(self))]
    pub async fn list_products(&self, query: ProductListQuery) -> ProductResult<Vec<ProductResponse>> {
        query.validate()?;
        let filters = query.into_filters();

        let products = self
            .repository
            .find_all(&filters)
            .await
            .map_err(|e| ProductError::internal("failed to list products", e))?;

        Ok(products.iter().map(ProductResponse::from).collect())
    }

    #[instrument(skip(self, input))]
    pub async fn update_product(
        &self,
        id: Uuid,
        input: UpdateProduct,
    ) -> ProductResult<ProductResponse> {
        input.validate()?;
        let stock = required_stock(input.stock)?;

        let mut product = self.load(id).await?;
        product.update(
            input.name,
            input.description,
            input.price,
            stock,
            input.category,
        )?;
        self.persist(&product).await?;

        info!(product_id = %id, "updated product");
        Ok(product.into())
    }

    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: Uuid) -> ProductResult<()> {
        self.load(id).await?;

        let outcome = self
            .repository
            .delete(id)
            .await
            .map_err(|e| ProductError::internal("failed to delete product", e))?;

        match outcome {
            WriteOutcome::Applied => {
                info!(product_id = %id, "deleted product");
                Ok(())
            }
            WriteOutcome::NotFound => {
                warn!(product_id = %id, "product deleted concurrently");
                Err(ProductError::NotFound(id))
            }
        }
    }

    /// Positive quantities add stock, negative quantities remove it.
    #[instrument(skip(self))]
    pub async fn adjust_stock(
        &self,
        id: Uuid,
        adjustment: StockAdjustment,
    ) -> ProductResult<ProductResponse> {
        let mut product = self.load(id).await?;

        if adjustment.quantity >= 0 {
            product.increase_stock(adjustment.quantity)?;
        } else {
            let quantity = adjustment
                .quantity
                .checked_neg()
                .ok_or(DomainError::InvalidQuantity)?;
            product.reduce_stock(quantity)?;
        }
        self.persist(&product).await?;

        info!(product_id = %id, stock = product.stock(), "adjusted stock");
        Ok(product.into())
    }

    #[instrument(skip(self))]
    pub async fn activate_product(&self, id: Uuid) -> ProductResult<ProductResponse> {
        let mut product = self.load(id).await?;
        product.activate();
        self.persist(&product).await?;
        Ok(product.into())
    }

    #[instrument(skip(self))]
    pub async fn deactivate_product(&self, id: Uuid) -> ProductResult<ProductResponse> {
        let mut product = self.load(id).await?;
        product.deactivate();
        self.persist(&product).await?;
        Ok(product.into())
    }

    async fn load(&self, id: Uuid) -> ProductResult<Product> {
        self.repository
            .find_by_id(id)
            .await
            .map_err(|e| ProductError::internal("failed to load product", e))?
            .ok_or(ProductError::NotFound(id))
    }

    /// A row that vanished between read and write is reported as not found.
    async fn persist(&self, product: &Product) -> ProductResult<()> {
        let outcome = self
            .repository
            .update(product)
            .await
            .map_err(|e| ProductError::internal("failed to update product", e))?;

        match outcome {
            WriteOutcome::Applied => Ok(()),
            WriteOutcome::NotFound => {
                warn!(product_id = %product.id(), "product deleted concurrently");
                Err(ProductError::NotFound(product.id()))
            }
        }
    }
}
