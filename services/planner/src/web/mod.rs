pub mod auth;
pub mod middleware;
pub mod protocol;
pub mod rest;
pub mod session;
pub mod state;

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

pub use middleware::require_credential;
pub use session::SessionController;
pub use state::AppState;

/// Builds the API routes. CORS, body limits and Swagger UI are layered on by the binary.
pub fn router(app_state: Arc<AppState>) -> Router {
    // Public routes (no credential required)
    let public_routes = Router::new()
        .route("/session", get(rest::session_handler))
        .route("/locale", put(rest::locale_handler))
        .route("/catalog", get(rest::catalog_handler))
        .route("/auth/login", post(auth::login_handler));

    // Protected routes (credential required)
    let protected_routes = Router::new()
        .route("/auth/logout", post(auth::logout_handler))
        .route("/plans", post(rest::generate_handler))
        .route("/plans/preview", get(rest::preview_handler))
        .route("/plans/export", get(rest::export_handler))
        .route("/plans/reset", post(rest::reset_handler))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_credential,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(app_state)
}
