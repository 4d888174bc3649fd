// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Product catalog tests, including the optional admin gate on creation.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use discord_shop::config::Config;
use serde_json::json;

mod common;
use common::{body_json, create_test_app, create_test_app_with_config, seed_user, TestApp};

fn create_request(body: &str, cookie: Option<&str>) -> Request<Body> {
    let mut request = Request::builder()
        .method("POST")
        .uri("/products")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        request = request.header(header::COOKIE, cookie);
    }
    request.body(Body::from(body.to_string())).unwrap()
}

async fn list(app: &TestApp) -> Vec<serde_json::Value> {
    let response = app
        .send(
            Request::builder()
                .uri("/products")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await.as_array().unwrap().clone()
}

#[tokio::test]
async fn test_empty_catalog() {
    let app = create_test_app();
    assert!(list(&app).await.is_empty());
}

#[tokio::test]
async fn test_list_after_n_creates() {
    let app = create_test_app();

    for i in 0..5 {
        let body = json!({ "name": format!("Item {}", i), "price": i }).to_string();
        let response = app.send(create_request(&body, None)).await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let products = list(&app).await;
    assert_eq!(products.len(), 5);
    for i in 0..5 {
        let name = format!("Item {}", i);
        assert!(products.iter().any(|p| p["name"] == name.as_str()));
    }
}

#[tokio::test]
async fn test_create_returns_full_product() {
    let app = create_test_app();
    let body = json!({
        "name": "Cronus Zen",
        "description": "Controller adapter",
        "price": 99.99,
        "image": "/images/cronus.png",
    })
    .to_string();

    let response = app.send(create_request(&body, None)).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let product = body_json(response).await;
    assert!(!product["id"].as_str().unwrap().is_empty());
    assert_eq!(product["name"], "Cronus Zen");
    assert_eq!(product["description"], "Controller adapter");
    assert_eq!(product["price"], 99.99);
    assert_eq!(product["image"], "/images/cronus.png");
}

#[tokio::test]
async fn test_malformed_payload_is_bad_request() {
    let app = create_test_app();

    for body in [
        "{not json",
        r#"{"name":"Widget","price":"ten"}"#,
        r#"{"name":"Widget","price":[10]}"#,
        r#"{"name":{"first":"Widget"}}"#,
        r#""Widget""#,
    ] {
        let response = app.send(create_request(body, None)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {}", body);
        assert_eq!(body_json(response).await["error"], "bad_request");
    }

    assert!(list(&app).await.is_empty());
}

#[tokio::test]
async fn test_loose_payloads_are_stored_as_coerced() {
    let app = create_test_app();

    let cases = [
        (r#"{"name":"Widget","price":"10"}"#, json!("Widget"), json!(10.0)),
        (r#"{"name":"Widget"}"#, json!("Widget"), json!(null)),
        (r#"{"price":10}"#, json!(null), json!(10.0)),
        (r#"{"name":"Widget","price":-1}"#, json!("Widget"), json!(-1.0)),
        ("{}", json!(null), json!(null)),
    ];

    for (body, name, price) in &cases {
        let response = app.send(create_request(body, None)).await;
        assert_eq!(response.status(), StatusCode::CREATED, "body: {}", body);

        let product = body_json(response).await;
        assert!(!product["id"].as_str().unwrap().is_empty());
        assert_eq!(&product["name"], name, "body: {}", body);
        assert_eq!(&product["price"], price, "body: {}", body);
    }

    assert_eq!(list(&app).await.len(), cases.len());
}

#[tokio::test]
async fn test_missing_content_type_is_bad_request() {
    let app = create_test_app();

    let response = app
        .send(
            Request::builder()
                .method("POST")
                .uri("/products")
                .body(Body::from(r#"{"name":"Widget","price":10}"#))
                .unwrap(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

fn admin_config(admin_discord_id: &str) -> Config {
    let mut config = Config::test_default();
    config.product_admin_ids = vec![admin_discord_id.to_string()];
    config
}

#[tokio::test]
async fn test_restricted_creation_requires_session() {
    let app = create_test_app_with_config(admin_config("1"));

    let response = app
        .send(create_request(r#"{"name":"Widget","price":10}"#, None))
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(list(&app).await.is_empty());
}

#[tokio::test]
async fn test_restricted_creation_rejects_non_admin() {
    let app = create_test_app_with_config(admin_config("1"));
    let user = seed_user(&app.db, "2").await;

    let response = app
        .send(create_request(
            r#"{"name":"Widget","price":10}"#,
            Some(&app.session_for(&user)),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(list(&app).await.is_empty());
}

#[tokio::test]
async fn test_restricted_creation_allows_admin() {
    let app = create_test_app_with_config(admin_config("1"));
    let admin = seed_user(&app.db, "1").await;

    let response = app
        .send(create_request(
            r#"{"name":"Widget","price":10}"#,
            Some(&app.session_for(&admin)),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(list(&app).await.len(), 1);
}
