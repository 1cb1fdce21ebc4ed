use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::modules::auth::middleware::require_auth;
use crate::AppState;
use super::controller;

pub fn user_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    let protected = Router::new()
        .route("/", get(controller::list_users))
        .route(
            "/{id}",
            get(controller::get_user)
                .put(controller::update_user)
                .patch(controller::update_user)
                .delete(controller::delete_user),
        )
        .route_layer(middleware::from_fn_with_state(state, require_auth));

    // registration stays public
    Router::new()
        .route("/", post(controller::create_user))
        .merge(protected)
}
