//! HTTP server assembly and graceful shutdown

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    Json, Router,
};
use core_config::server::ServerConfig;
use domain_products::{ErrorCode, ErrorResponse};
use std::future::Future;
use std::time::Duration;
use tokio::signal;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{info, warn, Level};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::Config;
use crate::openapi::ApiDoc;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

async fn not_found() -> impl IntoResponse {
    let code = ErrorCode::NotFound;
    let body = ErrorResponse {
        code: code.code(),
        error: code.to_string(),
        message: "The requested resource was not found".to_string(),
        details: None,
    };
    (StatusCode::NOT_FOUND, Json(body))
}

fn cors_layer(config: &Config) -> eyre::Result<CorsLayer> {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(3600));

    if config.allows_any_origin() {
        return Ok(layer.allow_origin(Any));
    }

    let origins = config
        .cors_allowed_origins
        .iter()
        .map(|origin| origin.parse::<HeaderValue>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| eyre::eyre!("Invalid CORS_ALLOWED_ORIGINS value: {}", e))?;

    info!(origins = ?config.cors_allowed_origins, "CORS restricted to configured origins");
    Ok(layer.allow_origin(AllowOrigin::list(origins)))
}

/// Wrap the API routes with docs, fallback and cross-cutting middleware.
pub fn create_router(routes: Router, config: &Config) -> eyre::Result<Router> {
    let router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(routes)
        .fallback(not_found)
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(config)?);

    Ok(router)
}

/// Resolves on SIGINT or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C), initiating graceful shutdown");
        },
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        },
    }
}

/// Serve until a shutdown signal, then run `cleanup` bounded by the
/// configured shutdown timeout.
pub async fn serve<F>(router: Router, server_config: &ServerConfig, cleanup: F) -> eyre::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(server_config.address()).await?;
    info!("Server starting on {}", listener.local_addr()?);

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .inspect_err(|e| tracing::error!("Server encountered an error: {:?}", e))?;

    let timeout = server_config.shutdown_timeout;
    info!("Starting cleanup tasks (timeout: {:?})", timeout);
    match tokio::time::timeout(timeout, cleanup).await {
        Ok(()) => info!("Cleanup completed successfully"),
        Err(_) => warn!("Cleanup exceeded timeout of {:?}, forcing shutdown", timeout),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use core_config::Environment;
    use database::postgres::PostgresConfig;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::config::DatabaseConfig;

    fn config(origins: &[&str]) -> Config {
        Config {
            environment: Environment::Development,
            server: ServerConfig::default(),
            database: DatabaseConfig::Postgres(PostgresConfig::new("postgres://localhost/catalog")),
            cors_allowed_origins: origins.iter().map(|o| o.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn unknown_route_uses_error_envelope() {
        let app = create_router(Router::new(), &config(&["*"])).unwrap();

        let response = app
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.error, "NOT_FOUND");
    }

    #[tokio::test]
    async fn openapi_document_is_served() {
        let app = create_router(Router::new(), &config(&["*"])).unwrap();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api-docs/openapi.json")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let doc: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(doc["paths"]["/api/products/{id}"].is_object());
    }

    #[test]
    fn invalid_origin_is_rejected() {
        assert!(create_router(Router::new(), &config(&["bad\norigin"])).is_err());
        assert!(create_router(Router::new(), &config(&["https://shop.example"])).is_ok());
    }
}
