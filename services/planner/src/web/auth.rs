//! services/planner/src/web/auth.rs
//!
//! Credential endpoints: login with an API key and logout.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use lesson_planner_core::{Label, PortError};
use std::sync::Arc;
use tracing::error;

use crate::web::protocol::{failure, session_failure, Failure, LoginRequest, SessionResponse};
use crate::web::session::SessionError;
use crate::web::state::AppState;

/// POST /auth/login - Validate, persist and activate an API key
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Key accepted and stored", body = SessionResponse),
        (status = 400, description = "No key was entered"),
        (status = 401, description = "The generation service rejected the key"),
        (status = 500, description = "The key could not be stored")
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, Failure> {
    let session = &state.session;
    match session.authenticate(&req.api_key).await {
        Ok(()) => Ok((StatusCode::OK, Json(SessionResponse::from(session.snapshot().await)))),
        Err(SessionError::Port(PortError::CredentialInvalid)) => {
            let locale = session.snapshot().await.locale;
            Err(failure(
                StatusCode::UNAUTHORIZED,
                locale.text(Label::ApiKeyInvalid),
            ))
        }
        Err(e) => {
            if matches!(e, SessionError::Port(PortError::Storage(_))) {
                error!("Failed to persist the credential: {}", e);
            }
            Err(session_failure(e, session.snapshot().await.locale))
        }
    }
}

/// POST /auth/logout - Clear the credential, its stored copy and all results
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Logout successful", body = SessionResponse),
        (status = 500, description = "The stored credential could not be removed")
    )
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, Failure> {
    let session = &state.session;
    if let Err(e) = session.deauthenticate().await {
        error!("Failed to remove the stored credential: {}", e);
        return Err(session_failure(e, session.snapshot().await.locale));
    }
    Ok((StatusCode::OK, Json(SessionResponse::from(session.snapshot().await))))
}
