//! services/planner/src/adapters/gemini.rs
//!
//! This module contains the adapter for the Gemini `generateContent` endpoint.
//! It implements the `GenerationService` port from the `core` crate.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use lesson_planner_core::{
    classify_service_failure,
    domain::{LessonPlan, LessonPlanInput, ReferenceFile},
    i18n::{Label, Locale},
    ports::{GenerationService, PortError, PortResult},
    prompt::{build_request, RequestPart},
    FailureKind,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::{error, info, warn};

//=========================================================================================
// Wire Format
//=========================================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: &'static str,
    data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: Value,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenates the text parts of the first candidate.
    fn into_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content
            .parts
            .into_iter()
            .filter_map(|part| part.text)
            .collect();
        Some(text)
    }
}

/// Why a single call to the service failed. Never shown to the user verbatim.
#[derive(Debug)]
enum CallFailure {
    Transport(String),
    Status(u16, String),
    Decode(String),
}

impl CallFailure {
    fn detail(&self) -> &str {
        match self {
            CallFailure::Transport(detail)
            | CallFailure::Status(_, detail)
            | CallFailure::Decode(detail) => detail,
        }
    }
}

impl fmt::Display for CallFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallFailure::Transport(detail) => write!(f, "transport error: {}", detail),
            CallFailure::Status(code, detail) => write!(f, "HTTP {}: {}", code, detail),
            CallFailure::Decode(detail) => f.write_str(detail),
        }
    }
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `GenerationService` on top of Gemini's REST API.
#[derive(Clone)]
pub struct GeminiAdapter {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl GeminiAdapter {
    /// Creates a new `GeminiAdapter`.
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            model: model.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model.trim()
        )
    }

    /// Sends one request. Any non-2xx status is a failure; the body is left unread.
    async fn send(
        &self,
        api_key: &str,
        body: &GenerateContentRequest,
    ) -> Result<reqwest::Response, CallFailure> {
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| CallFailure::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(CallFailure::Status(status.as_u16(), text));
        }
        Ok(response)
    }

    /// Sends one request and returns the text of the first candidate.
    async fn call(&self, api_key: &str, body: &GenerateContentRequest) -> Result<String, CallFailure> {
        let parsed: GenerateContentResponse = self
            .send(api_key, body)
            .await?
            .json()
            .await
            .map_err(|e| CallFailure::Decode(format!("Failed to parse response envelope: {}", e)))?;

        parsed
            .into_text()
            .ok_or_else(|| CallFailure::Decode("Response contained no candidate text".to_string()))
    }
}

fn encode_parts(parts: Vec<RequestPart<'_>>) -> Vec<Part> {
    parts
        .into_iter()
        .map(|part| match part {
            RequestPart::Text(text) => Part::Text { text },
            RequestPart::InlineData { mime_type, data } => Part::Inline {
                inline_data: InlineData {
                    mime_type,
                    data: STANDARD.encode(data),
                },
            },
        })
        .collect()
}

/// Parses the model output: a JSON array of plan objects, possibly padded with whitespace.
fn parse_plans(text: &str) -> Result<Vec<LessonPlan>, serde_json::Error> {
    serde_json::from_str(text.trim())
}

//=========================================================================================
// `GenerationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl GenerationService for GeminiAdapter {
    async fn validate_credential(&self, api_key: &str) -> bool {
        if api_key.trim().is_empty() {
            return false;
        }

        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part::Text {
                    text: "hello".to_string(),
                }],
            }],
            generation_config: None,
        };

        // An accepted key may still yield no text (e.g. a safety block).
        match self.send(api_key, &body).await {
            Ok(_) => true,
            Err(failure) => {
                warn!("API key validation failed: {}", failure);
                false
            }
        }
    }

    async fn generate_lesson_plans(
        &self,
        input: &LessonPlanInput,
        files: &[ReferenceFile],
        locale: Locale,
        api_key: &str,
    ) -> PortResult<Vec<LessonPlan>> {
        if api_key.trim().is_empty() {
            return Err(PortError::CredentialInvalid);
        }

        let request = build_request(input, files, locale);
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: encode_parts(request.parts),
            }],
            generation_config: Some(GenerationConfig {
                response_mime_type: "application/json",
                response_schema: request.response_schema,
            }),
        };

        info!(
            template = %input.template,
            periods = input.periods,
            attachments = files.len(),
            "Requesting lesson plan generation"
        );

        let failed = || PortError::GenerationFailed(locale.text(Label::GenerationFailed).to_string());

        let text = match self.call(api_key, &body).await {
            Ok(text) => text,
            Err(failure) => {
                error!("Gemini API call failed: {}", failure);
                return match classify_service_failure(failure.detail()) {
                    FailureKind::CredentialInvalid => Err(PortError::CredentialInvalid),
                    FailureKind::Other => Err(failed()),
                };
            }
        };

        let plans = parse_plans(&text).map_err(|e| {
            error!("Generated content is not a valid lesson plan array: {}", e);
            failed()
        })?;

        info!(count = plans.len(), "Lesson plans generated");
        Ok(plans)
    }
}
