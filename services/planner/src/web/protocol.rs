//! services/planner/src/web/protocol.rs
//!
//! Defines the JSON payloads exchanged between the browser client and the planner
//! server, and how session errors are turned into HTTP responses.

use axum::{http::StatusCode, Json};
use lesson_planner_core::{
    catalog::{SchoolLevel, SCHOOL_LEVELS},
    Label, LessonPlan, LessonPlanInput, Locale, PortError, TemplateKind,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::web::session::{SessionError, SessionSnapshot, View};

//=========================================================================================
// Payloads Sent FROM the Client (Browser) TO the Server
//=========================================================================================
// NOTE: The generation form is sent as multipart/form-data, not as JSON.
//=========================================================================================

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub api_key: String,
}

#[derive(Deserialize, ToSchema)]
pub struct LocaleRequest {
    /// `vi` or `en`.
    pub locale: String,
}

//=========================================================================================
// Payloads Sent FROM the Server TO the Client (Browser)
//=========================================================================================

/// The result panel, tagged by `state`.
#[derive(Serialize, Debug, Clone, ToSchema)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum ViewPayload {
    Empty,
    Loading,
    Error {
        message: String,
    },
    Ready {
        #[schema(value_type = Vec<Object>)]
        plans: Vec<LessonPlan>,
    },
}

impl From<View> for ViewPayload {
    fn from(view: View) -> Self {
        match view {
            View::Empty => ViewPayload::Empty,
            View::Loading => ViewPayload::Loading,
            View::Failed(message) => ViewPayload::Error { message },
            View::Ready(plans) => ViewPayload::Ready {
                plans: plans.as_ref().clone(),
            },
        }
    }
}

#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub authenticated: bool,
    pub locale: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login_error: Option<String>,
    pub view: ViewPayload,
}

impl From<SessionSnapshot> for SessionResponse {
    fn from(snapshot: SessionSnapshot) -> Self {
        Self {
            authenticated: snapshot.authenticated,
            locale: snapshot.locale.to_string(),
            login_error: snapshot
                .login_error
                .map(|label| snapshot.locale.text(label).to_string()),
            view: snapshot.view.into(),
        }
    }
}

/// The response payload sent after a successful generation.
#[derive(Serialize, Debug, ToSchema)]
pub struct GenerateResponse {
    pub count: usize,
    #[schema(value_type = Vec<Object>)]
    pub plans: Vec<LessonPlan>,
}

#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CatalogResponse {
    #[schema(value_type = Vec<Object>)]
    pub levels: &'static [SchoolLevel],
    pub templates: Vec<String>,
    pub min_periods: u32,
    pub max_periods: u32,
}

impl CatalogResponse {
    pub fn current() -> Self {
        Self {
            levels: SCHOOL_LEVELS,
            templates: [TemplateKind::Cv1001, TemplateKind::Cv5512]
                .iter()
                .map(|t| t.to_string())
                .collect(),
            min_periods: LessonPlanInput::MIN_PERIODS,
            max_periods: LessonPlanInput::MAX_PERIODS,
        }
    }
}

#[derive(Serialize, Debug, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

//=========================================================================================
// Error Mapping
//=========================================================================================

pub type Failure = (StatusCode, Json<ErrorResponse>);

pub fn failure(status: StatusCode, message: impl Into<String>) -> Failure {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

/// Maps a session error to a status code and a message that is safe to show.
pub fn session_failure(e: SessionError, locale: Locale) -> Failure {
    match e {
        SessionError::NotAuthenticated | SessionError::Port(PortError::CredentialInvalid) => {
            failure(StatusCode::UNAUTHORIZED, locale.text(Label::SessionExpired))
        }
        SessionError::Busy | SessionError::Discarded => {
            failure(StatusCode::CONFLICT, e.to_string())
        }
        SessionError::NothingToExport => failure(StatusCode::NOT_FOUND, e.to_string()),
        SessionError::Port(PortError::ValidationFailed(message)) => {
            failure(StatusCode::BAD_REQUEST, message)
        }
        SessionError::Port(PortError::GenerationFailed(message)) => {
            failure(StatusCode::BAD_GATEWAY, message)
        }
        SessionError::Port(PortError::ExportFailed(message)) => {
            failure(StatusCode::INTERNAL_SERVER_ERROR, message)
        }
        SessionError::Port(PortError::Storage(_)) => failure(
            StatusCode::INTERNAL_SERVER_ERROR,
            "The credential could not be stored",
        ),
    }
}
