//! HTTP handlers for Products API

use axum::{
    extract::{FromRequest, FromRequestParts, Json, Path, Query, Request, State},
    http::{request::Parts, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use utoipa::OpenApi;
use uuid::Uuid;

use crate::error::{ErrorResponse, ProductError, ProductResult};
use crate::models::{
    CreateProduct, DataResponse, ListResponse, ProductListQuery, ProductResponse, StockAdjustment,
    UpdateProduct,
};
use crate::repository::ProductRepository;
use crate::service::ProductService;

/// OpenAPI documentation for Products API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_products,
        create_product,
        get_product,
        update_product,
        delete_product,
        adjust_stock,
        activate_product,
        deactivate_product,
    ),
    components(schemas(
        ProductResponse,
        CreateProduct,
        UpdateProduct,
        StockAdjustment,
        ErrorResponse,
        DataResponse<ProductResponse>,
        ListResponse<ProductResponse>,
    )),
    tags(
        (name = "Products", description = "Product catalog endpoints")
    )
)]
pub struct ApiDoc;

/// UUID path parameter; malformed ids are a validation failure, not a 404.
pub struct ProductId(pub Uuid);

impl<S> FromRequestParts<S> for ProductId
where
    S: Send + Sync,
{
    type Rejection = ProductError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| ProductError::validation(e.body_text()))?;

        Uuid::parse_str(&id)
            .map(ProductId)
            .map_err(|_| ProductError::validation(format!("Invalid UUID: {}", id)))
    }
}

/// JSON body whose parse failures use the product error envelope.
///
/// Field validation is left to the service so every entry point checks input
/// the same way.
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ProductError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(body) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| ProductError::validation(e.body_text()))?;
        Ok(JsonBody(body))
    }
}

/// Query string with the same rejection handling as [`JsonBody`].
pub struct QueryParams<T>(pub T);

impl<T, S> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ProductError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| ProductError::validation(e.body_text()))?;
        Ok(QueryParams(params))
    }
}

/// Create the products router with all HTTP endpoints
pub fn router<R: ProductRepository + 'static>(service: ProductService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_products).post(create_product))
        .route(
            "/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/{id}/stock", post(adjust_stock))
        .route("/{id}/activate", post(activate_product))
        .route("/{id}/deactivate", post(deactivate_product))
        .with_state(shared_service)
}

/// List products, newest first
#[utoipa::path(
    get,
    path = "",
    tag = "Products",
    params(ProductListQuery),
    responses(
        (status = 200, description = "Page of products", body = ListResponse<ProductResponse>),
        (status = 400, description = "Invalid query", body = ErrorResponse),
        (status = 500, description = "Internal error", body = ErrorResponse)
    )
)]
async fn list_products<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    QueryParams(query): QueryParams<ProductListQuery>,
) -> ProductResult<Json<ListResponse<ProductResponse>>> {
    let data = service.list_products(query).await?;
    let count = data.len();
    Ok(Json(ListResponse { data, count }))
}

/// Create a new product
#[utoipa::path(
    post,
    path = "",
    tag = "Products",
    request_body = CreateProduct,
    responses(
        (status = 201, description = "Product created", body = DataResponse<ProductResponse>),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 409, description = "Name already taken", body = ErrorResponse),
        (status = 500, description = "Internal error", body = ErrorResponse)
    )
)]
async fn create_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    JsonBody(input): JsonBody<CreateProduct>,
) -> ProductResult<impl IntoResponse> {
    let data = service.create_product(input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data })))
}

/// Get a product by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Products",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product found", body = DataResponse<ProductResponse>),
        (status = 400, description = "Malformed ID", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse),
        (status = 500, description = "Internal error", body = ErrorResponse)
    )
)]
async fn get_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    ProductId(id): ProductId,
) -> ProductResult<Json<DataResponse<ProductResponse>>> {
    let data = service.get_product(id).await?;
    Ok(Json(DataResponse { data }))
}

/// Replace a product's mutable fields
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Products",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    request_body = UpdateProduct,
    responses(
        (status = 200, description = "Product updated", body = DataResponse<ProductResponse>),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse),
        (status = 500, description = "Internal error", body = ErrorResponse)
    )
)]
async fn update_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    ProductId(id): ProductId,
    JsonBody(input): JsonBody<UpdateProduct>,
) -> ProductResult<Json<DataResponse<ProductResponse>>> {
    let data = service.update_product(id, input).await?;
    Ok(Json(DataResponse { data }))
}

/// Delete a product
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Products",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 400, description = "Malformed ID", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse),
        (status = 500, description = "Internal error", body = ErrorResponse)
    )
)]
async fn delete_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    ProductId(id): ProductId,
) -> ProductResult<impl IntoResponse> {
    service.delete_product(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Add (positive quantity) or remove (negative quantity) stock
#[utoipa::path(
    post,
    path = "/{id}/stock",
    tag = "Products",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    request_body = StockAdjustment,
    responses(
        (status = 200, description = "Stock adjusted", body = DataResponse<ProductResponse>),
        (status = 400, description = "Insufficient stock or bad quantity", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse),
        (status = 500, description = "Internal error", body = ErrorResponse)
    )
)]
async fn adjust_stock<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    ProductId(id): ProductId,
    JsonBody(adjustment): JsonBody<StockAdjustment>,
) -> ProductResult<Json<DataResponse<ProductResponse>>> {
    let data = service.adjust_stock(id, adjustment).await?;
    Ok(Json(DataResponse { data }))
}

/// Activate a product
#[utoipa::path(
    post,
    path = "/{id}/activate",
    tag = "Products",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product activated", body = DataResponse<ProductResponse>),
        (status = 400, description = "Malformed ID", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse),
        (status = 500, description = "Internal error", body = ErrorResponse)
    )
)]
async fn activate_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    ProductId(id): ProductId,
) -> ProductResult<Json<DataResponse<ProductResponse>>> {
    let data = service.activate_product(id).await?;
    Ok(Json(DataResponse { data }))
}

/// Deactivate a product
#[utoipa::path(
    post,
    path = "/{id}/deactivate",
    tag = "Products",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product deactivated", body = DataResponse<ProductResponse>),
        (status = 400, description = "Malformed ID", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse),
        (status = 500, description = "Internal error", body = ErrorResponse)
    )
)]
async fn deactivate_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    ProductId(id): ProductId,
) -> ProductResult<Json<DataResponse<ProductResponse>>> {
    let data = service.deactivate_product(id).await?;
    Ok(Json(DataResponse { data }))
}
