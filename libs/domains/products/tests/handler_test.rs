//! Handler tests for Products domain
//!
//! These tests drive the router with `oneshot` over the in-memory repository:
//! - Request deserialization and rejection handling
//! - Response envelopes and status codes
//! - Error bodies

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use domain_products::*;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt; // For oneshot()

fn app() -> (Router, InMemoryProductRepository) {
    let repo = InMemoryProductRepository::new();
    let service = ProductService::new(repo.clone());
    (handlers::router(service), repo)
}

// Helper to parse JSON response body
async fn json_body(body: Body) -> Value {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn widget_body(name: &str) -> Value {
    json!({
        "name": name,
        "description": "Handler test",
        "price": 9.99,
        "stock": 10,
        "category": "tools"
    })
}

async fn seed(repo: &InMemoryProductRepository, name: &str) -> Product {
    let product = Product::new(name, "", "4.50".parse().unwrap(), 3, "tools").unwrap();
    repo.create(&product).await.unwrap();
    product
}

#[tokio::test]
async fn test_create_product_returns_201_with_envelope() {
    let (app, repo) = app();

    let response = app
        .oneshot(json_request("POST", "/", widget_body("Widget")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);

    let body = json_body(response.into_body()).await;
    assert_eq!(body["data"]["name"], "Widget");
    assert_eq!(body["data"]["price"], json!(9.99));
    assert_eq!(body["data"]["active"], json!(true));

    let id: uuid::Uuid = body["data"]["id"].as_str().unwrap().parse().unwrap();
    assert!(repo.find_by_id(id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_create_product_validates_input() {
    let (app, _repo) = app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/",
            json!({ "name": "ab", "price": 0, "category": "tools" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_body(response.into_body()).await;
    assert_eq!(body["error"], "VALIDATION_ERROR");
    assert_eq!(body["code"], 1001);
    for field in ["name", "price", "stock"] {
        assert!(body["details"][field].is_array(), "missing details for {field}");
    }
}

#[tokio::test]
async fn test_malformed_json_uses_error_envelope() {
    let (app, _repo) = app();

    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response.into_body()).await;
    assert_eq!(body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_create_duplicate_name_returns_409() {
    let (app, repo) = app();
    seed(&repo, "Widget").await;

    let response = app
        .oneshot(json_request("POST", "/", widget_body("Widget")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = json_body(response.into_body()).await;
    assert_eq!(body["error"], "CONFLICT");
}

#[tokio::test]
async fn test_get_product() {
    let (app, repo) = app();
    let product = seed(&repo, "Widget").await;

    let response = app
        .oneshot(empty_request("GET", &format!("/{}", product.id())))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response.into_body()).await;
    assert_eq!(body["data"]["id"], product.id().to_string());
    assert_eq!(body["data"]["price"], json!(4.5));
}

#[tokio::test]
async fn test_get_unknown_product_returns_404() {
    let (app, _repo) = app();

    let response = app
        .oneshot(empty_request("GET", &format!("/{}", uuid::Uuid::now_v7())))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response.into_body()).await;
    assert_eq!(body["error"], "NOT_FOUND");
    assert_eq!(body["code"], 1004);
}

#[tokio::test]
async fn test_malformed_id_returns_400() {
    let (app, _repo) = app();

    let response = app
        .oneshot(empty_request("GET", "/not-a-uuid"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response.into_body()).await;
    assert_eq!(body["error"], "VALIDATION_ERROR");
    assert!(body["message"].as_str().unwrap().contains("not-a-uuid"));
}

#[tokio::test]
async fn test_list_products_envelope_and_window() {
    let (app, repo) = app();
    for name in ["Alpha", "Bravo", "Charlie"] {
        seed(&repo, name).await;
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    }

    let response = app
        .oneshot(empty_request("GET", "/?limit=2&category=tools"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response.into_body()).await;
    assert_eq!(body["count"], 2);
    assert_eq!(body["data"][0]["name"], "Charlie");
    assert_eq!(body["data"][1]["name"], "Bravo");
}

#[tokio::test]
async fn test_list_rejects_oversized_limit() {
    let (app, _repo) = app();

    let response = app
        .oneshot(empty_request("GET", "/?limit=101"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_rejects_unparsable_query() {
    let (app, _repo) = app();

    let response = app
        .oneshot(empty_request("GET", "/?active=maybe"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response.into_body()).await;
    assert_eq!(body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_update_product() {
    let (app, repo) = app();
    let product = seed(&repo, "Widget").await;

    let response = app
        .oneshot(json_request(
            "PUT",
            &format!("/{}", product.id()),
            json!({
                "name": "Widget Pro",
                "price": 12.0,
                "stock": 1,
                "category": "tools"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response.into_body()).await;
    assert_eq!(body["data"]["name"], "Widget Pro");
    assert_eq!(body["data"]["description"], "");

    let stored = repo.find_by_id(product.id()).await.unwrap().unwrap();
    assert_eq!(stored.name(), "Widget Pro");
    assert_eq!(stored.created_at(), product.created_at());
}

#[tokio::test]
async fn test_delete_product_returns_204_then_404() {
    let (app, repo) = app();
    let product = seed(&repo, "Widget").await;
    let uri = format!("/{}", product.id());

    let response = app
        .clone()
        .oneshot(empty_request("DELETE", &uri))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.oneshot(empty_request("DELETE", &uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_adjust_stock() {
    let (app, repo) = app();
    let product = seed(&repo, "Widget").await;
    let uri = format!("/{}/stock", product.id());

    let response = app
        .clone()
        .oneshot(json_request("POST", &uri, json!({ "quantity": -2 })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response.into_body()).await;
    assert_eq!(body["data"]["stock"], 1);

    let response = app
        .oneshot(json_request("POST", &uri, json!({ "quantity": -5 })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response.into_body()).await;
    assert!(body["message"].as_str().unwrap().contains("insufficient stock"));

    let stored = repo.find_by_id(product.id()).await.unwrap().unwrap();
    assert_eq!(stored.stock(), 1);
}

#[tokio::test]
async fn test_deactivate_and_activate() {
    let (app, repo) = app();
    let product = seed(&repo, "Widget").await;

    let response = app
        .clone()
        .oneshot(empty_request("POST", &format!("/{}/deactivate", product.id())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response.into_body()).await;
    assert_eq!(body["data"]["active"], json!(false));

    let response = app
        .oneshot(empty_request("POST", &format!("/{}/activate", product.id())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(repo.find_by_id(product.id()).await.unwrap().unwrap().is_active());
}
