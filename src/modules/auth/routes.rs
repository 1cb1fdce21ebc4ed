use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::AppState;
use super::{controller, middleware::require_auth};

pub fn auth_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    let protected = Router::new()
        .route("/logout", post(controller::logout))
        .route("/change-password", post(controller::change_password))
        .route("/me", get(controller::me))
        .route_layer(middleware::from_fn_with_state(state, require_auth));

    Router::new()
        .route("/login", post(controller::login))
        .route("/refresh", post(controller::refresh))
        .merge(protected)
}
