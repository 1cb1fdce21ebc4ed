pub mod config;
pub mod modules;
pub mod services;

use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

use config::{Config, DbPool};
use modules::auth::auth_routes;
use modules::users::user_routes;
use services::error::AppError;
use services::jwt::JwtService;
use services::rate_limit::{create_rate_limiter, RateLimitLayer};
use services::response::Reply;

pub struct AppState {
    pub db: DbPool,
    pub jwt_service: JwtService,
    pub config: Config,
}

pub fn create_app(db: DbPool, config: Config) -> Router {
    let jwt_service = JwtService::new(
        config.jwt_secret.clone(),
        config.access_token_expire_minutes,
        config.refresh_token_expire_days,
    );
    let rate_limiter = create_rate_limiter(config.rate_limit_per_minute);

    let state = Arc::new(AppState {
        db,
        jwt_service,
        config,
    });

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/health/db", get(database_health))
        .nest("/auth", auth_routes(state.clone()))
        .nest("/users", user_routes(state.clone()))
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(RequestBodyLimitLayer::new(1024 * 100)) // 100KB max body
        .layer(middleware::map_response(envelope_payload_too_large))
        .layer(RateLimitLayer::new(rate_limiter))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Serialize)]
struct AppInfo {
    name: String,
    version: &'static str,
    status: &'static str,
}

async fn root(State(state): State<Arc<AppState>>) -> Reply<AppInfo> {
    Reply::ok(
        AppInfo {
            name: state.config.app_name.clone(),
            version: env!("CARGO_PKG_VERSION"),
            status: "running",
        },
        "API is running",
    )
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

async fn health_check() -> Reply<HealthResponse> {
    Reply::ok(HealthResponse { status: "healthy" }, "Service is healthy")
}

#[derive(Serialize)]
struct DatabaseHealth {
    healthy: bool,
}

async fn database_health(State(state): State<Arc<AppState>>) -> Result<Reply<DatabaseHealth>, AppError> {
    config::database::ping(&state.db).await.map_err(|e| {
        tracing::error!(error = %e, "database health check failed");
        AppError::ServiceUnavailable("Database unavailable".to_string())
    })?;

    Ok(Reply::ok(DatabaseHealth { healthy: true }, "Database health check"))
}

/// The body limit answers 413 in plain text before any handler runs.
async fn envelope_payload_too_large(response: Response) -> Response {
    if response.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return AppError::PayloadTooLarge.into_response();
    }
    response
}

async fn not_found() -> AppError {
    AppError::NotFound("The requested resource was not found".to_string())
}

async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
