use std::sync::Arc;
use axum::{middleware, routing::get, Router};
use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers::*;

pub fn user_routes(config: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(get_all_users))
        .route("/profile/me", get(get_user_profile))
        .route("/appointments/my-appointments", get(get_my_appointments))
        .route("/{id}", get(get_single_user).put(update_user).delete(delete_user))
        .layer(middleware::from_fn_with_state(config.clone(), auth_middleware))
        .with_state(config)
}
