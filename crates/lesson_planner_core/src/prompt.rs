//! crates/lesson_planner_core/src/prompt.rs
//!
//! Builds the instruction text, the attachment parts and the response-schema constraint
//! sent to the generation service. Everything here is pure; the adapter only encodes
//! and transmits what this module produces.

use serde_json::{json, Value};

use crate::domain::{LessonPlanInput, ReferenceFile, TemplateKind};
use crate::i18n::{Label, Locale};

/// One piece of the request content, in the order it must be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestPart<'a> {
    Text(String),
    /// Raw attachment bytes, encoded by the adapter.
    InlineData {
        mime_type: &'static str,
        data: &'a [u8],
    },
}

/// A fully assembled generation request, independent of the wire format.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest<'a> {
    pub parts: Vec<RequestPart<'a>>,
    pub response_schema: Value,
}

/// Assembles the prompt, the attachments and the schema for one generation attempt.
///
/// Images travel inline. PDFs are only named in a text note: their content is not
/// extracted or embedded.
pub fn build_request<'a>(
    input: &LessonPlanInput,
    files: &'a [ReferenceFile],
    locale: Locale,
) -> GenerationRequest<'a> {
    let mut parts = vec![RequestPart::Text(build_prompt(input, files, locale))];

    parts.extend(
        files
            .iter()
            .filter(|file| file.kind.is_image())
            .map(|file| RequestPart::InlineData {
                mime_type: file.kind.mime_type(),
                data: file.content.as_ref(),
            }),
    );

    parts.extend(
        files
            .iter()
            .filter(|file| !file.kind.is_image())
            .map(|file| {
                RequestPart::Text(format!(
                    "{}: {}",
                    locale.text(Label::PdfReferenceNote),
                    file.name
                ))
            }),
    );

    GenerationRequest {
        parts,
        response_schema: build_response_schema(input.template),
    }
}

//=========================================================================================
// Instruction Text
//=========================================================================================

const ROLE_PREAMBLE: &str = "You are an expert in writing lesson plans that follow the standards of the \
Vietnamese Ministry of Education and Training. Write a detailed \"Kế hoạch bài dạy\".";

pub fn build_prompt(input: &LessonPlanInput, files: &[ReferenceFile], locale: Locale) -> String {
    let attachments = if files.is_empty() {
        "None".to_string()
    } else {
        files
            .iter()
            .map(|file| file.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    };

    let common = format!(
        r#"Input information:
- Teacher: {teacher}
- Subject: {subject}
- Grade: {grade}
- Total required periods: {periods}
- Attached files: {attachments}
- Language for generated content: {language}

MANDATORY RULES:
1. CHOOSE THE LESSON: from the subject and grade, pick the most suitable lesson of the current curriculum distribution and use it as the lesson title, including its number (for example "Bài 10: Cây xanh quanh em").
2. ONE PLAN PER PERIOD: the lesson spans {periods} period(s). Produce one COMPLETE and SEPARATE lesson plan object for EVERY period, {periods} object(s) in total.
3. SPLIT THE CONTENT: distribute content and activities across the periods so the whole lesson is continuous and complete. Every object repeats the subject, grade, lesson title and total periods, and has its own "executionTime" in the form "Tiết [number] - Tuần [number]".
4. USE THE ATTACHMENTS: when files are attached, analyse them. The teacher's questions must draw directly on their content and the students' answers must highlight that knowledge. Name the files in the teaching aids.
5. OUTPUT: return a JSON ARRAY. Each element is the complete plan for ONE period and must follow the provided schema. Leave "postLessonAdjustments" as an empty string."#,
        teacher = input.teacher_name,
        subject = input.subject,
        grade = input.grade,
        periods = input.periods,
        attachments = attachments,
        language = locale.text(Label::ContentLanguage),
    );

    let specific = match input.template {
        TemplateKind::Cv1001 => CV1001_RULES,
        TemplateKind::Cv5512 => CV5512_RULES,
    };

    format!("{}\n\n{}\n\n{}", ROLE_PREAMBLE, common, specific)
}

const CV1001_RULES: &str = r#"Template: CV 1001/2345 (standard primary layout).
RULES FOR CV 1001:
1. Set "template" to "cv1001" in every object.
2. Sections: I. Yêu cầu cần đạt, II. Đồ dùng dạy học, III. Các hoạt động dạy học, IV. Điều chỉnh sau bài dạy.
3. "requiredOutcomes" contains "generalCompetencies", "specificCompetencies", "qualities" and, only when relevant, "integratedContent".
4. "teachingActivities" holds exactly four activities named "1. Hoạt động mở đầu", "2. Hình thành kiến thức mới", "3. Hoạt động luyện tập - thực hành" and "4. Hoạt động vận dụng".
5. Every activity has "activityName", "objective", "teacherActivity" (the teacher's steps and instructions using modern methods) and "studentActivity" (the matching student actions and expected answers).
6. Never fill "knowledge", "content", "product" or "implementation"."#;

const CV5512_RULES: &str = r#"Template: CV 5512 (Official Dispatch 5512/BGDĐT-GDTrH).
RULES FOR CV 5512:
1. Set "template" to "cv5512" in every object.
2. Sections: I. MỤC TIÊU, II. THIẾT BỊ DẠY HỌC VÀ HỌC LIỆU, III. TIẾN TRÌNH DẠY HỌC, IV. ĐIỀU CHỈNH SAU BÀI DẠY.
3. "requiredOutcomes" contains "knowledge" (what students will know), "generalCompetencies" (weave subject-specific competencies into the activities instead of listing them) and "qualities".
4. "teachingActivities" holds exactly four activities: "HOẠT ĐỘNG 1: MỞ ĐẦU (KHỞI ĐỘNG)", "HOẠT ĐỘNG 2: HÌNH THÀNH KIẾN THỨC MỚI", "HOẠT ĐỘNG 3: LUYỆN TẬP", "HOẠT ĐỘNG 4: VẬN DỤNG".
5. Every activity has "activityName", "objective", "content" (the tasks and questions), "product" (the expected student output) and "implementation" (step-by-step organisation covering both teacher and student actions).
6. Never fill "teacherActivity", "studentActivity", "specificCompetencies" or "integratedContent"."#;

//=========================================================================================
// Response Schema
//=========================================================================================

fn string(description: &str) -> Value {
    json!({ "type": "STRING", "description": description })
}

/// The structural constraint for the service output: an array of plan objects of the
/// requested template, with every field the content model needs marked required.
pub fn build_response_schema(template: TemplateKind) -> Value {
    let (outcomes, outcomes_required, activity, activity_required) = match template {
        TemplateKind::Cv1001 => (
            json!({
                "generalCompetencies": string("General competencies."),
                "specificCompetencies": string("Subject-specific competencies."),
                "qualities": string("Personal qualities to develop."),
                "integratedContent": string("Integrated content, if any."),
            }),
            json!(["generalCompetencies", "specificCompetencies", "qualities"]),
            json!({
                "activityName": string("Name of the activity."),
                "objective": string("Goal of the activity."),
                "teacherActivity": string("What the teacher does."),
                "studentActivity": string("What the students do."),
            }),
            json!(["activityName", "objective", "teacherActivity", "studentActivity"]),
        ),
        TemplateKind::Cv5512 => (
            json!({
                "knowledge": string("What students will know or understand."),
                "generalCompetencies": string("Competencies to develop."),
                "qualities": string("Personal qualities to develop."),
            }),
            json!(["knowledge", "generalCompetencies", "qualities"]),
            json!({
                "activityName": string("Name of the activity."),
                "objective": string("Goal of the activity."),
                "content": string("Tasks and questions for the students."),
                "product": string("Expected student output."),
                "implementation": string("How the activity is organised, step by step."),
            }),
            json!(["activityName", "objective", "content", "product", "implementation"]),
        ),
    };

    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "template": {
                    "type": "STRING",
                    "format": "enum",
                    "enum": [template.as_str()],
                    "description": "Template tag of the plan.",
                },
                "subject": string("Subject."),
                "grade": string("Grade."),
                "lessonTitle": string("Lesson title."),
                "periods": { "type": "INTEGER", "description": "Total periods of the whole lesson." },
                "executionTime": string("Time slot of this period, formatted 'Tiết [number] - Tuần [number]'."),
                "requiredOutcomes": {
                    "type": "OBJECT",
                    "properties": outcomes,
                    "required": outcomes_required,
                },
                "teachingAids": {
                    "type": "OBJECT",
                    "properties": {
                        "teacher": string("Teacher's materials."),
                        "student": string("Students' materials."),
                    },
                    "required": ["teacher", "student"],
                },
                "teachingActivities": {
                    "type": "ARRAY",
                    "items": {
                        "type": "OBJECT",
                        "properties": activity,
                        "required": activity_required,
                    },
                },
                "postLessonAdjustments": string("Post-lesson notes. Always an empty string."),
            },
            "required": [
                "template", "subject", "grade", "lessonTitle", "periods", "executionTime",
                "requiredOutcomes", "teachingAids", "teachingActivities", "postLessonAdjustments",
            ],
        },
    })
}
