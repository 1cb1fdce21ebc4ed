use axum::http::StatusCode;
use serde_json::json;

use crate::common::{test_password, test_username, TestContext};

#[tokio::test]
async fn change_password_swaps_credentials() {
    let ctx = TestContext::new().await;
    let username = test_username();
    let (_, access_token, _) = ctx.register_and_login(&username).await;

    let response = ctx
        .server
        .post("/auth/change-password")
        .authorization_bearer(&access_token)
        .json(&json!({
            "current_password": test_password(),
            "new_password": "BrandNewPass456"
        }))
        .await;

    response.assert_status(StatusCode::OK);

    let body: serde_json::Value = response.json();
    assert_eq!(body["message"], "Password changed successfully");

    ctx.server
        .post("/auth/login")
        .json(&json!({ "username": &username, "password": test_password() }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    ctx.server
        .post("/auth/login")
        .json(&json!({ "username": &username, "password": "BrandNewPass456" }))
        .await
        .assert_status(StatusCode::OK);
}

#[tokio::test]
async fn change_password_with_wrong_current_password_returns_bad_request() {
    let ctx = TestContext::new().await;
    let username = test_username();
    let (_, access_token, _) = ctx.register_and_login(&username).await;

    let response = ctx
        .server
        .post("/auth/change-password")
        .authorization_bearer(&access_token)
        .json(&json!({
            "current_password": "NotMyPassword1",
            "new_password": "BrandNewPass456"
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);

    let body: serde_json::Value = response.json();
    assert_eq!(body["errors"]["current_password"][0], "Current password is incorrect");

    // the old password still works
    ctx.server
        .post("/auth/login")
        .json(&json!({ "username": &username, "password": test_password() }))
        .await
        .assert_status(StatusCode::OK);
}

#[tokio::test]
async fn change_password_rejects_weak_new_password() {
    let ctx = TestContext::new().await;
    let (_, access_token, _) = ctx.register_and_login(&test_username()).await;

    let response = ctx
        .server
        .post("/auth/change-password")
        .authorization_bearer(&access_token)
        .json(&json!({
            "current_password": test_password(),
            "new_password": "alllowercase"
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);

    let body: serde_json::Value = response.json();
    assert_eq!(body["message"], "Validation failed");
    assert!(body["errors"]["new_password"].is_array());
}

#[tokio::test]
async fn change_password_requires_authentication() {
    let ctx = TestContext::new().await;

    let response = ctx
        .server
        .post("/auth/change-password")
        .json(&json!({
            "current_password": test_password(),
            "new_password": "BrandNewPass456"
        }))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}
