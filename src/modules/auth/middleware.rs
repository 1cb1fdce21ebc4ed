use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::modules::auth::service::AuthService;
use crate::modules::users::{crud::UserCrud, model::User};
use crate::services::error::AppError;
use crate::AppState;

/// Caller identity attached to the request by [`require_auth`].
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user: User,
    pub jti: String,
}

impl AuthContext {
    pub fn can_manage(&self, user_id: i64) -> bool {
        self.user.id == user_id || self.user.is_admin()
    }
}

/// Rejects the request with 401 unless it carries a live, unrevoked access
/// token belonging to an active user.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(&request)
        .ok_or_else(AppError::unauthenticated)?
        .to_owned();

    let claims = AuthService::new(state.db.clone(), &state.jwt_service)
        .verify_access(&token)
        .await?;

    let user_id = claims.user_id().ok_or_else(AppError::unauthenticated)?;
    let user = UserCrud::new(state.db.clone())
        .find_active_by_id(user_id)
        .await?
        .ok_or_else(AppError::unauthenticated)?;

    request.extensions_mut().insert(AuthContext { user, jti: claims.jti });
    Ok(next.run(request).await)
}

fn bearer_token(request: &Request) -> Option<&str> {
    let value = request.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();

    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token)
    } else {
        None
    }
}
