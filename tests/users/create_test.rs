use axum::http::StatusCode;
use serde_json::json;

use crate::common::{test_password, test_username, TestContext};

async fn user_count(ctx: &TestContext) -> i64 {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
        .fetch_one(&ctx.db)
        .await
        .unwrap();
    row.0
}

#[tokio::test]
async fn create_user_returns_created_and_lowercases_identity() {
    let ctx = TestContext::new().await;

    let response = ctx
        .server
        .post("/users")
        .json(&json!({
            "username": "Mixed_Case_User",
            "email": "Mixed.Case@Example.COM",
            "password": test_password(),
            "full_name": "Mixed Case",
            "phone_number": "+15551234567"
        }))
        .await;

    response.assert_status(StatusCode::CREATED);

    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "User created successfully");
    assert_eq!(body["data"]["username"], "mixed_case_user");
    assert_eq!(body["data"]["email"], "mixed.case@example.com");
    assert_eq!(body["data"]["full_name"], "Mixed Case");
    assert_eq!(body["data"]["role"], "user");
    assert_eq!(body["data"]["is_active"], true);
    assert_eq!(body["data"]["is_verified"], false);
    assert!(body["data"]["id"].is_i64());
    assert!(body["data"].get("password").is_none());
    assert!(body["data"].get("password_hash").is_none());
}

#[tokio::test]
async fn create_user_stores_a_hash_not_the_password() {
    let ctx = TestContext::new().await;
    let id = ctx.register(&test_username()).await;

    let (hash,): (String,) = sqlx::query_as("SELECT password_hash FROM users WHERE id = ?")
        .bind(id)
        .fetch_one(&ctx.db)
        .await
        .unwrap();

    assert_ne!(hash, test_password());
    assert!(hash.starts_with("$argon2id$"));
}

#[tokio::test]
async fn create_user_ignores_role_in_payload() {
    let ctx = TestContext::new().await;

    let response = ctx
        .server
        .post("/users")
        .json(&json!({
            "username": test_username(),
            "email": "sneaky@example.com",
            "password": test_password(),
            "role": "admin"
        }))
        .await;

    response.assert_status(StatusCode::CREATED);

    let body: serde_json::Value = response.json();
    assert_eq!(body["data"]["role"], "user");
}

#[tokio::test]
async fn create_user_with_duplicate_username_returns_conflict() {
    let ctx = TestContext::new().await;
    let username = test_username();
    ctx.register(&username).await;
    let before = user_count(&ctx).await;

    let response = ctx
        .server
        .post("/users")
        .json(&json!({
            "username": username.to_uppercase(),
            "email": "someone.else@example.com",
            "password": test_password()
        }))
        .await;

    response.assert_status(StatusCode::CONFLICT);

    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Username already registered");
    assert_eq!(user_count(&ctx).await, before);
}

#[tokio::test]
async fn create_user_with_duplicate_email_returns_conflict() {
    let ctx = TestContext::new().await;
    let username = test_username();
    ctx.register(&username).await;
    let before = user_count(&ctx).await;

    let response = ctx
        .server
        .post("/users")
        .json(&json!({
            "username": test_username(),
            "email": format!("{}@EXAMPLE.com", username),
            "password": test_password()
        }))
        .await;

    response.assert_status(StatusCode::CONFLICT);

    let body: serde_json::Value = response.json();
    assert_eq!(body["message"], "Email already registered");
    assert_eq!(user_count(&ctx).await, before);
}

#[tokio::test]
async fn create_user_with_invalid_fields_lists_each_error() {
    let ctx = TestContext::new().await;

    let response = ctx
        .server
        .post("/users")
        .json(&json!({
            "username": "no spaces!",
            "email": "not-an-email",
            "password": "short"
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);

    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Validation failed");
    assert!(body["errors"]["username"].is_array());
    assert!(body["errors"]["email"].is_array());
    assert!(body["errors"]["password"].is_array());
    assert_eq!(user_count(&ctx).await, 0);
}

#[tokio::test]
async fn create_user_rejects_password_without_digit() {
    let ctx = TestContext::new().await;

    let response = ctx
        .server
        .post("/users")
        .json(&json!({
            "username": test_username(),
            "email": "nodigit@example.com",
            "password": "NoDigitsHere"
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);

    let body: serde_json::Value = response.json();
    assert!(body["errors"]["password"].is_array());
}

#[tokio::test]
async fn create_user_with_malformed_json_returns_bad_request() {
    let ctx = TestContext::new().await;

    let response = ctx
        .server
        .post("/users")
        .content_type("application/json")
        .text("{ not json")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);

    let body: serde_json::Value = response.json();
    assert!(body["errors"]["body"].is_array());
}
