//! crates/lesson_planner_core/src/domain.rs
//!
//! Defines the content model of a generated lesson plan and the request that produces it.
//! The two ministry templates are distinct record shapes joined by the `template` tag,
//! so a CV1001 plan has no place to hold CV5512 fields and vice versa.

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use serde::{Deserialize, Deserializer, Serialize};

use crate::catalog;
use crate::ports::{PortError, PortResult};

//=========================================================================================
// Request Side
//=========================================================================================

/// The two lesson-plan standards the generator can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    /// Official Dispatch 1001 (and its 2345 predecessor), the primary-school layout.
    #[serde(alias = "CV1001")]
    Cv1001,
    /// Official Dispatch 5512, the secondary-school layout.
    #[serde(alias = "CV5512")]
    Cv5512,
}

impl TemplateKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TemplateKind::Cv1001 => "cv1001",
            TemplateKind::Cv5512 => "cv5512",
        }
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemplateKind {
    type Err = PortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cv1001" => Ok(TemplateKind::Cv1001),
            "cv5512" => Ok(TemplateKind::Cv5512),
            other => Err(PortError::ValidationFailed(format!(
                "Unknown lesson plan template '{}'",
                other
            ))),
        }
    }
}

/// What the teacher typed into the form. Rebuilt for every generation attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonPlanInput {
    pub teacher_name: String,
    pub subject: String,
    pub grade: String,
    pub periods: u32,
    pub template: TemplateKind,
}

impl LessonPlanInput {
    pub const MIN_PERIODS: u32 = 1;
    pub const MAX_PERIODS: u32 = 10;

    /// Checks the input against the form rules before any request is built.
    pub fn validate(&self) -> PortResult<()> {
        if self.teacher_name.trim().is_empty() {
            return Err(PortError::ValidationFailed(
                "Teacher name is required".to_string(),
            ));
        }
        if !catalog::is_known_subject(&self.subject) {
            return Err(PortError::ValidationFailed(format!(
                "Unknown subject '{}'",
                self.subject
            )));
        }
        if !catalog::is_known_grade(&self.grade) {
            return Err(PortError::ValidationFailed(format!(
                "Unknown grade '{}'",
                self.grade
            )));
        }
        if !(Self::MIN_PERIODS..=Self::MAX_PERIODS).contains(&self.periods) {
            return Err(PortError::ValidationFailed(format!(
                "Periods must be between {} and {}, got {}",
                Self::MIN_PERIODS,
                Self::MAX_PERIODS,
                self.periods
            )));
        }
        Ok(())
    }
}

/// The attachment types the form accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    Jpeg,
    Png,
    Pdf,
}

impl ReferenceKind {
    /// Maps a MIME type onto an accepted kind; anything else is rejected.
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Some(ReferenceKind::Jpeg),
            "image/png" => Some(ReferenceKind::Png),
            "application/pdf" => Some(ReferenceKind::Pdf),
            _ => None,
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ReferenceKind::Jpeg => "image/jpeg",
            ReferenceKind::Png => "image/png",
            ReferenceKind::Pdf => "application/pdf",
        }
    }

    pub fn is_image(self) -> bool {
        matches!(self, ReferenceKind::Jpeg | ReferenceKind::Png)
    }
}

/// An uploaded reference file. Read-only once handed to the generation client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceFile {
    pub name: String,
    pub kind: ReferenceKind,
    pub content: Bytes,
}

impl ReferenceFile {
    /// Returns `None` when the MIME type is not one of JPEG, PNG or PDF.
    pub fn new(name: impl Into<String>, mime: &str, content: Bytes) -> Option<Self> {
        ReferenceKind::from_mime(mime).map(|kind| Self {
            name: name.into(),
            kind,
            content,
        })
    }
}

//=========================================================================================
// Generated Content
//=========================================================================================

/// One generated plan, covering exactly one class period.
///
/// The JSON form matches the shape the generation service is asked to emit: the
/// `template` tag sits next to the shared header fields, and decides which outcome and
/// activity shapes are read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonPlan {
    pub subject: String,
    pub grade: String,
    pub lesson_title: String,
    /// Total periods of the whole lesson, not the index of this one.
    pub periods: u32,
    pub execution_time: String,
    pub teaching_aids: TeachingAids,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub post_lesson_adjustments: String,
    #[serde(flatten)]
    pub body: PlanBody,
}

impl LessonPlan {
    pub fn template(&self) -> TemplateKind {
        match self.body {
            PlanBody::Cv1001(_) => TemplateKind::Cv1001,
            PlanBody::Cv5512(_) => TemplateKind::Cv5512,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "template", rename_all = "lowercase")]
pub enum PlanBody {
    #[serde(alias = "CV1001")]
    Cv1001(Cv1001Plan),
    #[serde(alias = "CV5512")]
    Cv5512(Cv5512Plan),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeachingAids {
    pub teacher: String,
    pub student: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cv1001Plan {
    pub required_outcomes: Cv1001Outcomes,
    #[serde(default)]
    pub teaching_activities: Vec<Cv1001Activity>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cv5512Plan {
    pub required_outcomes: Cv5512Outcomes,
    #[serde(default)]
    pub teaching_activities: Vec<Cv5512Activity>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cv1001Outcomes {
    pub general_competencies: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub specific_competencies: String,
    pub qualities: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integrated_content: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cv5512Outcomes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub knowledge: Option<String>,
    pub general_competencies: String,
    pub qualities: String,
}

/// A teaching segment laid out as teacher actions beside student actions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cv1001Activity {
    pub activity_name: String,
    pub objective: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub teacher_activity: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub student_activity: String,
}

/// A teaching segment described by its content, expected product and organisation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cv5512Activity {
    pub activity_name: String,
    pub objective: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub content: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub product: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub implementation: String,
}

/// Reads an optional text field where the service may send `null` instead of omitting it.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Treats a missing value and a blank one the same way.
pub fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|s| !s.trim().is_empty())
}
