use axum::http::StatusCode;

use crate::common::{test_password, test_username, TestContext};

async fn is_active(ctx: &TestContext, id: i64) -> Option<bool> {
    sqlx::query_as::<_, (bool,)>("SELECT is_active FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(&ctx.db)
        .await
        .unwrap()
        .map(|row| row.0)
}

#[tokio::test]
async fn delete_deactivates_without_removing_row() {
    let ctx = TestContext::new().await;
    let (_, viewer_token, _) = ctx.register_and_login(&test_username()).await;
    let (id, access_token, _) = ctx.register_and_login(&test_username()).await;

    let response = ctx
        .server
        .delete(&format!("/users/{id}"))
        .authorization_bearer(&access_token)
        .await;

    response.assert_status(StatusCode::OK);

    let body: serde_json::Value = response.json();
    assert_eq!(body["message"], "User deleted successfully");
    assert_eq!(body["data"]["id"], id);

    assert_eq!(is_active(&ctx, id).await, Some(false));

    ctx.server
        .get(&format!("/users/{id}"))
        .authorization_bearer(&viewer_token)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deactivated_user_tokens_stop_working() {
    let ctx = TestContext::new().await;
    let username = test_username();
    let (id, access_token, _) = ctx.register_and_login(&username).await;
    let (second_token, _) = ctx.login(&username, test_password()).await;

    ctx.server
        .delete(&format!("/users/{id}"))
        .authorization_bearer(&access_token)
        .await
        .assert_status(StatusCode::OK);

    ctx.server
        .get("/auth/me")
        .authorization_bearer(&second_token)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn user_cannot_delete_someone_else() {
    let ctx = TestContext::new().await;
    let (_, access_token, _) = ctx.register_and_login(&test_username()).await;
    let other_id = ctx.register(&test_username()).await;

    ctx.server
        .delete(&format!("/users/{other_id}"))
        .authorization_bearer(&access_token)
        .await
        .assert_status(StatusCode::FORBIDDEN);

    assert_eq!(is_active(&ctx, other_id).await, Some(true));
}

#[tokio::test]
async fn admin_can_delete_any_user() {
    let ctx = TestContext::new().await;
    let admin_token = ctx.admin_token().await;
    let id = ctx.register(&test_username()).await;

    ctx.server
        .delete(&format!("/users/{id}"))
        .authorization_bearer(&admin_token)
        .await
        .assert_status(StatusCode::OK);

    assert_eq!(is_active(&ctx, id).await, Some(false));
}

#[tokio::test]
async fn deleting_twice_returns_not_found() {
    let ctx = TestContext::new().await;
    let admin_token = ctx.admin_token().await;
    let id = ctx.register(&test_username()).await;

    ctx.server
        .delete(&format!("/users/{id}"))
        .authorization_bearer(&admin_token)
        .await
        .assert_status(StatusCode::OK);

    ctx.server
        .delete(&format!("/users/{id}"))
        .authorization_bearer(&admin_token)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_requires_authentication() {
    let ctx = TestContext::new().await;
    let id = ctx.register(&test_username()).await;

    ctx.server
        .delete(&format!("/users/{id}"))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}
