use crate::features::auth::handlers;
use crate::features::auth::services::AuthService;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Auth routes. `/api/auth/me` rejects requests without a session itself.
pub fn routes(service: Arc<AuthService>) -> Router {
    Router::new()
        .route("/api/auth/create-admin", post(handlers::create_admin))
        .route("/api/auth/login", post(handlers::login))
        .route("/api/auth/logout", post(handlers::logout))
        .route("/api/auth/me", get(handlers::get_me))
        .with_state(service)
}
