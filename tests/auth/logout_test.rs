use axum::http::StatusCode;
use serde_json::json;

use crate::common::{test_username, TestContext};

#[tokio::test]
async fn logout_revokes_the_presented_access_token() {
    let ctx = TestContext::new().await;
    let (_, access_token, _) = ctx.register_and_login(&test_username()).await;

    let response = ctx
        .server
        .post("/auth/logout")
        .authorization_bearer(&access_token)
        .await;

    response.assert_status(StatusCode::OK);

    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Successfully logged out");

    ctx.server
        .get("/auth/me")
        .authorization_bearer(&access_token)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    ctx.server
        .get("/users")
        .authorization_bearer(&access_token)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_twice_with_same_token_is_rejected() {
    let ctx = TestContext::new().await;
    let (_, access_token, _) = ctx.register_and_login(&test_username()).await;

    ctx.server
        .post("/auth/logout")
        .authorization_bearer(&access_token)
        .await
        .assert_status(StatusCode::OK);

    ctx.server
        .post("/auth/logout")
        .authorization_bearer(&access_token)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_without_token_returns_unauthorized() {
    let ctx = TestContext::new().await;

    let response = ctx.server.post("/auth/logout").await;

    response.assert_status(StatusCode::UNAUTHORIZED);

    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn logout_keeps_refresh_token_usable_when_not_supplied() {
    let ctx = TestContext::new().await;
    let (_, access_token, refresh_token) = ctx.register_and_login(&test_username()).await;

    ctx.server
        .post("/auth/logout")
        .authorization_bearer(&access_token)
        .await
        .assert_status(StatusCode::OK);

    ctx.server
        .post("/auth/refresh")
        .json(&json!({ "refresh_token": &refresh_token }))
        .await
        .assert_status(StatusCode::OK);
}

#[tokio::test]
async fn logout_with_refresh_token_revokes_it_too() {
    let ctx = TestContext::new().await;
    let (_, access_token, refresh_token) = ctx.register_and_login(&test_username()).await;

    ctx.server
        .post("/auth/logout")
        .authorization_bearer(&access_token)
        .json(&json!({ "refresh_token": &refresh_token }))
        .await
        .assert_status(StatusCode::OK);

    ctx.server
        .post("/auth/refresh")
        .json(&json!({ "refresh_token": &refresh_token }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_ignores_refresh_token_of_another_user() {
    let ctx = TestContext::new().await;
    let (_, alice_access, _) = ctx.register_and_login(&test_username()).await;
    let (_, _, bob_refresh) = ctx.register_and_login(&test_username()).await;

    ctx.server
        .post("/auth/logout")
        .authorization_bearer(&alice_access)
        .json(&json!({ "refresh_token": &bob_refresh }))
        .await
        .assert_status(StatusCode::OK);

    ctx.server
        .post("/auth/refresh")
        .json(&json!({ "refresh_token": &bob_refresh }))
        .await
        .assert_status(StatusCode::OK);
}

#[tokio::test]
async fn logout_does_not_affect_other_sessions() {
    let ctx = TestContext::new().await;
    let username = test_username();
    let (_, first_access, _) = ctx.register_and_login(&username).await;
    let (second_access, _) = ctx.login(&username, crate::common::test_password()).await;

    ctx.server
        .post("/auth/logout")
        .authorization_bearer(&first_access)
        .await
        .assert_status(StatusCode::OK);

    ctx.server
        .get("/auth/me")
        .authorization_bearer(&second_access)
        .await
        .assert_status(StatusCode::OK);
}
