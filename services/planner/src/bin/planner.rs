//! services/planner/src/bin/planner.rs

use planner_lib::{
    adapters::{DocxWriter, FileCredentialStore, GeminiAdapter},
    config::Config,
    error::ApiError,
    web::{self, rest::ApiDoc, AppState, SessionController},
};
use axum::{
    extract::DefaultBodyLimit,
    http::{header::{ACCEPT, CONTENT_TYPE}, HeaderValue, Method},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Initialize Service Adapters ---
    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.gemini_timeout_secs))
        .build()?;
    let generator = Arc::new(GeminiAdapter::new(
        http_client,
        config.gemini_api_base.clone(),
        config.gemini_model.clone(),
    ));
    let store = Arc::new(FileCredentialStore::new(config.credential_path.clone()));
    let writer = Arc::new(DocxWriter::new());
    info!(model = %config.gemini_model, "Generation service configured");

    // --- 3. Restore the Session ---
    let session = SessionController::new(generator, store, writer, config.default_locale);
    if session.initialize().await {
        info!("Restored the stored credential");
    } else {
        info!("No stored credential; waiting for login");
    }

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState { session });

    let origin = config
        .allowed_origin
        .parse::<HeaderValue>()
        .map_err(|_| ApiError::InvalidOrigin(config.allowed_origin.clone()))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, ACCEPT]);

    // --- 5. Create the Web Router ---
    let api_router = web::router(app_state)
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(cors);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
