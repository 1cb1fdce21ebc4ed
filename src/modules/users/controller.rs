use axum::{extract::State, Extension};
use std::sync::Arc;

use crate::modules::auth::middleware::AuthContext;
use crate::modules::users::{
    crud::UserCrud,
    model::{NewUser, UserChanges, UserRole},
    schema::{CreateUserRequest, DeletedUserResponse, UpdateUserRequest, UserResponse},
};
use crate::services::error::AppError;
use crate::services::hashing;
use crate::services::response::{ApiResponse, PageQuery, Pagination, Reply};
use crate::services::validation::{ValidPath, ValidQuery, ValidatedJson};
use crate::AppState;

fn not_found(id: i64) -> AppError {
    AppError::NotFound(format!("User with ID {id} not found"))
}

// =============================================================================
// GET /users
// =============================================================================

pub async fn list_users(
    State(state): State<Arc<AppState>>,
    ValidQuery(query): ValidQuery<PageQuery>,
) -> Result<Reply<Vec<UserResponse>>, AppError> {
    let (users, total) = UserCrud::new(state.db.clone())
        .list_active(i64::from(query.page_size()), query.offset())
        .await?;

    let data = users.into_iter().map(UserResponse::from).collect();
    let pagination = Pagination::new(query.page(), query.page_size(), total);

    Ok(Reply(
        axum::http::StatusCode::OK,
        ApiResponse::paginated(data, pagination, "Users retrieved successfully"),
    ))
}

// =============================================================================
// GET /users/{id}
// =============================================================================

pub async fn get_user(
    State(state): State<Arc<AppState>>,
    ValidPath(id): ValidPath<i64>,
) -> Result<Reply<UserResponse>, AppError> {
    let user = UserCrud::new(state.db.clone())
        .find_active_by_id(id)
        .await?
        .ok_or_else(|| not_found(id))?;

    Ok(Reply::ok(user.into(), "User retrieved successfully"))
}

// =============================================================================
// POST /users
// =============================================================================

pub async fn create_user(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<CreateUserRequest>,
) -> Result<Reply<UserResponse>, AppError> {
    let password_hash = hashing::hash_password(&req.password)?;

    let user = UserCrud::new(state.db.clone())
        .register(NewUser {
            username: req.username,
            email: req.email,
            password_hash,
            full_name: req.full_name,
            phone_number: req.phone_number,
            role: UserRole::User,
            is_superuser: false,
            is_verified: false,
        })
        .await?;

    Ok(Reply::created(user.into(), "User created successfully"))
}

// =============================================================================
// PUT|PATCH /users/{id}
// =============================================================================

pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<AuthContext>,
    ValidPath(id): ValidPath<i64>,
    ValidatedJson(req): ValidatedJson<UpdateUserRequest>,
) -> Result<Reply<UserResponse>, AppError> {
    let changes = UserChanges::from(req);

    if !ctx.can_manage(id) || (changes.touches_privileged_fields() && !ctx.user.is_admin()) {
        return Err(AppError::forbidden());
    }

    let user = UserCrud::new(state.db.clone())
        .apply_changes(id, &changes)
        .await?
        .ok_or_else(|| not_found(id))?;

    tracing::info!(user_id = id, actor_id = ctx.user.id, "user_updated");
    Ok(Reply::ok(user.into(), "User updated successfully"))
}

// =============================================================================
// DELETE /users/{id}
// =============================================================================

pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<AuthContext>,
    ValidPath(id): ValidPath<i64>,
) -> Result<Reply<DeletedUserResponse>, AppError> {
    if !ctx.can_manage(id) {
        return Err(AppError::forbidden());
    }

    if !UserCrud::new(state.db.clone()).deactivate(id).await? {
        return Err(not_found(id));
    }

    tracing::info!(user_id = id, actor_id = ctx.user.id, "user_deactivated");
    Ok(Reply::ok(DeletedUserResponse { id }, "User deleted successfully"))
}
