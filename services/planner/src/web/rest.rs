//! services/planner/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::web::{
    auth,
    protocol::{
        failure, session_failure, CatalogResponse, ErrorResponse, Failure, GenerateResponse,
        LocaleRequest, LoginRequest, SessionResponse, ViewPayload,
    },
    state::AppState,
};
use axum::{
    extract::{multipart::Field, Multipart, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Json},
};
use lesson_planner_core::{LessonPlanInput, Locale, ReferenceFile, TemplateKind};
use std::sync::Arc;
use tracing::{info, warn};
use utoipa::OpenApi;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        session_handler,
        locale_handler,
        catalog_handler,
        generate_handler,
        preview_handler,
        export_handler,
        reset_handler,
        auth::login_handler,
        auth::logout_handler,
    ),
    components(
        schemas(
            SessionResponse,
            ViewPayload,
            GenerateResponse,
            CatalogResponse,
            ErrorResponse,
            LoginRequest,
            LocaleRequest
        )
    ),
    tags(
        (name = "Lesson Planner API", description = "Generates CV1001 / CV5512 lesson plans and exports them as Word documents.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Session Handlers
//=========================================================================================

/// Current credential status, locale and result panel.
#[utoipa::path(
    get,
    path = "/session",
    responses((status = 200, description = "Session state", body = SessionResponse))
)]
pub async fn session_handler(State(state): State<Arc<AppState>>) -> Json<SessionResponse> {
    Json(state.session.snapshot().await.into())
}

/// Switch the display and generation language.
#[utoipa::path(
    put,
    path = "/locale",
    request_body = LocaleRequest,
    responses(
        (status = 200, description = "Locale changed", body = SessionResponse),
        (status = 400, description = "Unsupported locale")
    )
)]
pub async fn locale_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LocaleRequest>,
) -> Result<Json<SessionResponse>, Failure> {
    let locale = req
        .locale
        .parse::<Locale>()
        .map_err(|e| failure(StatusCode::BAD_REQUEST, e.to_string()))?;
    state.session.set_locale(locale).await;
    Ok(Json(state.session.snapshot().await.into()))
}

/// The subjects, grades and templates the form offers.
#[utoipa::path(
    get,
    path = "/catalog",
    responses((status = 200, description = "Form taxonomy", body = CatalogResponse))
)]
pub async fn catalog_handler() -> Json<CatalogResponse> {
    Json(CatalogResponse::current())
}

//=========================================================================================
// Plan Handlers
//=========================================================================================

/// Generate lesson plans from the form.
///
/// Accepts multipart/form-data with the text fields `teacherName`, `subject`, `grade`,
/// `periods` and `template`, plus zero or more `files` parts (JPEG, PNG or PDF).
#[utoipa::path(
    post,
    path = "/plans",
    request_body(content_type = "multipart/form-data", description = "The lesson form and reference files."),
    responses(
        (status = 200, description = "Plans generated", body = GenerateResponse),
        (status = 400, description = "Invalid form input", body = ErrorResponse),
        (status = 401, description = "The credential is missing or was rejected", body = ErrorResponse),
        (status = 409, description = "A generation is already in progress", body = ErrorResponse),
        (status = 502, description = "The generation service failed", body = ErrorResponse)
    )
)]
pub async fn generate_handler(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<GenerateResponse>, Failure> {
    let (input, files) = read_form(multipart).await?;
    info!(
        subject = %input.subject,
        grade = %input.grade,
        template = %input.template,
        files = files.len(),
        "Generation requested"
    );

    let session = &state.session;
    match session.generate(input, files).await {
        Ok(plans) => Ok(Json(GenerateResponse {
            count: plans.len(),
            plans: plans.as_ref().clone(),
        })),
        Err(e) => Err(session_failure(e, session.snapshot().await.locale)),
    }
}

/// The result panel as an HTML fragment.
#[utoipa::path(
    get,
    path = "/plans/preview",
    responses((status = 200, description = "Rendered result panel", content_type = "text/html"))
)]
pub async fn preview_handler(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(state.session.preview_html().await)
}

/// Download the current plans as a Word document.
#[utoipa::path(
    get,
    path = "/plans/export",
    responses(
        (status = 200, description = "The document", content_type = "application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
        (status = 404, description = "Nothing has been generated yet", body = ErrorResponse),
        (status = 500, description = "The document could not be built", body = ErrorResponse)
    )
)]
pub async fn export_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, Failure> {
    let session = &state.session;
    let document = match session.export().await {
        Ok(document) => document,
        Err(e) => return Err(session_failure(e, session.snapshot().await.locale)),
    };

    let disposition = format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        ascii_fallback(&document.file_name),
        urlencoding::encode(&document.file_name)
    );
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, document.content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        document.bytes,
    ))
}

/// Clear the plans and any error, keeping the credential.
#[utoipa::path(
    post,
    path = "/plans/reset",
    responses(
        (status = 200, description = "Result panel cleared", body = SessionResponse),
        (status = 409, description = "A generation is in progress", body = ErrorResponse)
    )
)]
pub async fn reset_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SessionResponse>, Failure> {
    let session = &state.session;
    match session.reset().await {
        Ok(()) => Ok(Json(session.snapshot().await.into())),
        Err(e) => Err(session_failure(e, session.snapshot().await.locale)),
    }
}

//=========================================================================================
// Form Intake
//=========================================================================================

#[derive(Default)]
struct FormFields {
    teacher_name: Option<String>,
    subject: Option<String>,
    grade: Option<String>,
    periods: Option<String>,
    template: Option<String>,
}

fn bad_request(message: impl Into<String>) -> Failure {
    failure(StatusCode::BAD_REQUEST, message)
}

async fn field_text(field: Field<'_>) -> Result<String, Failure> {
    field
        .text()
        .await
        .map_err(|e| bad_request(format!("Failed to read form field: {}", e)))
}

async fn read_form(
    mut multipart: Multipart,
) -> Result<(LessonPlanInput, Vec<ReferenceFile>), Failure> {
    let mut fields = FormFields::default();
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(format!("Failed to read multipart data: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "teacherName" => fields.teacher_name = Some(field_text(field).await?),
            "subject" => fields.subject = Some(field_text(field).await?),
            "grade" => fields.grade = Some(field_text(field).await?),
            "periods" => fields.periods = Some(field_text(field).await?),
            "template" => fields.template = Some(field_text(field).await?),
            "files" => {
                let file_name = field.file_name().unwrap_or("untitled").to_string();
                let mime = field.content_type().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| bad_request(format!("Failed to read file bytes: {}", e)))?;
                match ReferenceFile::new(file_name.clone(), &mime, bytes) {
                    Some(file) => files.push(file),
                    None => warn!("Skipping '{}': unsupported type '{}'", file_name, mime),
                }
            }
            other => warn!("Ignoring unknown form field '{}'", other),
        }
    }

    let required = |value: Option<String>, name: &str| {
        value.ok_or_else(|| bad_request(format!("Missing form field '{}'", name)))
    };
    let periods = required(fields.periods, "periods")?
        .trim()
        .parse::<u32>()
        .map_err(|_| bad_request("Field 'periods' must be a whole number"))?;
    let template = required(fields.template, "template")?
        .parse::<TemplateKind>()
        .map_err(|e| bad_request(e.to_string()))?;

    let input = LessonPlanInput {
        teacher_name: required(fields.teacher_name, "teacherName")?,
        subject: required(fields.subject, "subject")?.trim().to_string(),
        grade: required(fields.grade, "grade")?.trim().to_string(),
        periods,
        template,
    };
    Ok((input, files))
}

/// Keeps ASCII filename characters and replaces the rest, for clients that ignore
/// the `filename*` parameter.
fn ascii_fallback(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_graphic() && c != '"' && c != '\\' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
