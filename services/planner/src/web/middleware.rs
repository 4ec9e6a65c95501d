//! services/planner/src/web/middleware.rs
//!
//! Credential middleware for protecting routes.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::web::protocol::session_failure;
use crate::web::session::SessionError;
use crate::web::state::AppState;

/// Middleware that lets a request through only while a credential is active.
///
/// Without one it answers 401 with the localized re-login prompt.
pub async fn require_credential(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    if !state.session.has_credential().await {
        let locale = state.session.snapshot().await.locale;
        return session_failure(SessionError::NotAuthenticated, locale).into_response();
    }
    next.run(req).await
}
