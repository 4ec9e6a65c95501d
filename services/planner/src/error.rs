//! services/planner/src/error.rs
//!
//! Startup failures of the planner binary. Request-time failures never reach this
//! type; they are mapped to HTTP responses in `web::protocol`.

use crate::config::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The `ALLOWED_ORIGIN` value is not a valid header value.
    #[error("Invalid CORS origin '{0}'")]
    InvalidOrigin(String),

    /// The HTTP client for the generation service could not be built.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Binding or serving the listener failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
