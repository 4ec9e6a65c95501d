//! crates/lesson_planner_core/src/ports.rs
//!
//! Defines the service contracts (traits) the core relies on.
//! The generation service, the credential storage and the document serializer all sit
//! behind these traits so the core never depends on a concrete HTTP client, filesystem
//! layout or word-processor library.

use async_trait::async_trait;

use crate::domain::{LessonPlan, LessonPlanInput, ReferenceFile};
use crate::export::DocumentLayout;
use crate::i18n::Locale;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// The error taxonomy shared by every port.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    /// The generation service rejected the credential, or none was supplied.
    #[error("The API credential is missing or was rejected")]
    CredentialInvalid,
    /// Form-level input problem; nothing was sent anywhere.
    #[error("Validation failed: {0}")]
    ValidationFailed(String),
    /// Any other generation failure. The message is localized and safe to show.
    #[error("{0}")]
    GenerationFailed(String),
    #[error("Export failed: {0}")]
    ExportFailed(String),
    #[error("Credential storage error: {0}")]
    Storage(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Issues a minimal request with `api_key`. Any failure, including transport
    /// errors, is reported as `false`.
    async fn validate_credential(&self, api_key: &str) -> bool;

    /// Generates one plan per period. The returned sequence is whatever the service
    /// produced; its length is not reconciled against `input.periods`.
    async fn generate_lesson_plans(
        &self,
        input: &LessonPlanInput,
        files: &[ReferenceFile],
        locale: Locale,
        api_key: &str,
    ) -> PortResult<Vec<LessonPlan>>;
}

/// Persistent slot for the single API credential.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn load(&self) -> PortResult<Option<String>>;
    async fn save(&self, api_key: &str) -> PortResult<()>;
    async fn clear(&self) -> PortResult<()>;
}

/// Serializes a laid-out document into the bytes of a downloadable file.
pub trait DocumentWriter: Send + Sync {
    fn write(&self, layout: &DocumentLayout) -> PortResult<Vec<u8>>;

    /// MIME type of the produced file.
    fn content_type(&self) -> &'static str;
}
