use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::ValidationErrors;

use crate::models::DomainError;
use crate::repository::RepositoryError;

/// Caller-facing failure of a product operation.
///
/// Every repository and domain failure is folded into exactly one of these four
/// classes before it leaves [`crate::service::ProductService`].
#[derive(Debug, Error)]
pub enum ProductError {
    /// Bad input shape or a domain invariant violation
    #[error("{message}")]
    Validation {
        message: String,
        details: Option<serde_json::Value>,
    },

    /// The product does not exist (or vanished mid-request)
    #[error("Product not found: {0}")]
    NotFound(Uuid),

    /// A product with this name already exists
    #[error("Product with name '{0}' already exists")]
    Conflict(String),

    /// Storage failure; `source` is logged, never returned to the caller
    #[error("{message}")]
    Internal {
        message: String,
        #[source]
        source: RepositoryError,
    },
}

pub type ProductResult<T> = Result<T, ProductError>;

impl ProductError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            details: None,
        }
    }

    pub fn internal(message: impl Into<String>, source: RepositoryError) -> Self {
        Self::Internal {
            message: message.into(),
            source,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation { .. } => ErrorCode::ValidationError,
            Self::NotFound(_) => ErrorCode::NotFound,
            Self::Conflict(_) => ErrorCode::Conflict,
            Self::Internal { .. } => ErrorCode::InternalError,
        }
    }
}

impl From<DomainError> for ProductError {
    fn from(err: DomainError) -> Self {
        Self::validation(err.to_string())
    }
}

impl From<ValidationErrors> for ProductError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation {
            message: "Request validation failed".to_string(),
            details: Some(field_errors_json(&errors)),
        }
    }
}

/// `{"field": [{"code", "message", "params"}]}` for each failing field
fn field_errors_json(errors: &ValidationErrors) -> serde_json::Value {
    errors
        .field_errors()
        .iter()
        .map(|(field, errs)| {
            let entries = errs
                .iter()
                .map(|err| {
                    serde_json::json!({
                        "code": err.code,
                        "message": err.message,
                        "params": err.params,
                    })
                })
                .collect::<Vec<_>>();
            (field.to_string(), serde_json::Value::Array(entries))
        })
        .collect::<serde_json::Map<_, _>>()
        .into()
}

/// Machine-readable error identifiers and their numeric codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::AsRefStr, strum::Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ValidationError,
    NotFound,
    InternalError,
    Conflict,
}

impl ErrorCode {
    pub fn code(self) -> i32 {
        match self {
            Self::ValidationError => 1001,
            Self::NotFound => 1004,
            Self::InternalError => 1005,
            Self::Conflict => 1008,
        }
    }
}

/// Body of every error response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Numeric code for logging and monitoring
    pub code: i32,
    /// Machine-readable identifier, e.g. `NOT_FOUND`
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for ProductError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let (message, details) = match self {
            Self::Validation { message, details } => {
                tracing::info!(error_code = code.code(), %message, "validation failed");
                (message, details)
            }
            Self::Internal { message, source } => {
                tracing::error!(error_code = code.code(), error = %source, "{}", message);
                ("An internal error occurred".to_string(), None)
            }
            other => (other.to_string(), None),
        };

        let body = ErrorResponse {
            code: code.code(),
            error: code.to_string(),
            message,
            details,
        };
        (status, Json(body)).into_response()
    }
}
