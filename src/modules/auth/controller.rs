use axum::{body::Bytes, extract::State, Extension};
use std::sync::Arc;

use crate::modules::auth::{
    middleware::AuthContext,
    schema::{
        ChangePasswordRequest, LoginRequest, LoginResponse, LogoutRequest, RefreshTokenRequest,
        RefreshTokenResponse, TOKEN_TYPE,
    },
    service::AuthService,
};
use crate::modules::users::schema::UserResponse;
use crate::services::error::AppError;
use crate::services::hashing;
use crate::services::response::Reply;
use crate::services::validation::ValidatedJson;
use crate::AppState;

// =============================================================================
// POST /auth/login
// =============================================================================

pub async fn login(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<Reply<LoginResponse>, AppError> {
    let auth = AuthService::new(state.db.clone(), &state.jwt_service);
    let pair = auth.login(&req.username, &req.password).await?;

    Ok(Reply::ok(
        LoginResponse {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            token_type: TOKEN_TYPE,
            expires_in: pair.expires_in,
        },
        "Login successful",
    ))
}

// =============================================================================
// POST /auth/refresh
// =============================================================================

pub async fn refresh(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<RefreshTokenRequest>,
) -> Result<Reply<RefreshTokenResponse>, AppError> {
    let auth = AuthService::new(state.db.clone(), &state.jwt_service);
    let (access_token, expires_in) = auth.refresh(&req.refresh_token).await?;

    Ok(Reply::ok(
        RefreshTokenResponse {
            access_token,
            token_type: TOKEN_TYPE,
            expires_in,
        },
        "Token refreshed",
    ))
}

// =============================================================================
// POST /auth/logout
// =============================================================================

pub async fn logout(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<AuthContext>,
    body: Bytes,
) -> Result<Reply<()>, AppError> {
    let req = if body.iter().all(u8::is_ascii_whitespace) {
        LogoutRequest::default()
    } else {
        serde_json::from_slice::<LogoutRequest>(&body)
            .map_err(|e| AppError::field("body", e.to_string()))?
    };

    let auth = AuthService::new(state.db.clone(), &state.jwt_service);
    auth.revoke(&ctx.jti).await?;

    if let Some(refresh_token) = req.refresh_token.as_deref() {
        auth.revoke_refresh_for(refresh_token, ctx.user.id).await?;
    }

    tracing::info!(user_id = ctx.user.id, "user_logged_out");
    Ok(Reply::message("Successfully logged out"))
}

// =============================================================================
// POST /auth/change-password
// =============================================================================

pub async fn change_password(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<AuthContext>,
    ValidatedJson(req): ValidatedJson<ChangePasswordRequest>,
) -> Result<Reply<()>, AppError> {
    if !hashing::verify_password(&req.current_password, &ctx.user.password_hash)? {
        return Err(AppError::field("current_password", "Current password is incorrect"));
    }

    AuthService::new(state.db.clone(), &state.jwt_service)
        .change_password(&ctx.user, &req.new_password)
        .await?;

    Ok(Reply::message("Password changed successfully"))
}

// =============================================================================
// GET /auth/me
// =============================================================================

pub async fn me(Extension(ctx): Extension<AuthContext>) -> Reply<UserResponse> {
    Reply::ok(UserResponse::from(ctx.user), "User retrieved successfully")
}
