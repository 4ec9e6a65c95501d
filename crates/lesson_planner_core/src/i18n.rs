//! crates/lesson_planner_core/src/i18n.rs
//!
//! Static label table for the two supported locales.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ports::PortError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Vi,
    En,
}

impl Locale {
    pub fn as_str(self) -> &'static str {
        match self {
            Locale::Vi => "vi",
            Locale::En => "en",
        }
    }

    pub fn text(self, label: Label) -> &'static str {
        match self {
            Locale::Vi => vietnamese(label),
            Locale::En => english(label),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Locale {
    type Err = PortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vi" => Ok(Locale::Vi),
            "en" => Ok(Locale::En),
            other => Err(PortError::ValidationFailed(format!(
                "Unsupported locale '{}'",
                other
            ))),
        }
    }
}

/// Every display string the renderer, exporter and error surfaces use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    LessonPlanTitle,
    TeachingPlanTitle,
    Period,
    Subject,
    Grade,
    LessonTitle,
    Periods,
    ExecutionTime,
    DocumentDate,
    RequiredOutcomes,
    Knowledge,
    Competencies,
    GeneralCompetencies,
    SpecificCompetencies,
    Qualities,
    IntegratedContent,
    TeachingAids,
    TeacherAids,
    StudentAids,
    TeachingActivities,
    Objective,
    Content,
    Product,
    Implementation,
    TeacherActivityHeader,
    StudentActivityHeader,
    TeachingMethod,
    PostLessonAdjustments,
    FilenamePrefix,
    PdfReferenceNote,
    ContentLanguage,
    LoadingMessage,
    LoadingSubMessage,
    ErrorMessage,
    EmptyStateTitle,
    EmptyStateSubtitle,
    ApiKeyRequired,
    ApiKeyInvalid,
    SessionExpired,
    GenerationFailed,
    ExportFailed,
}

impl Label {
    pub const ALL: &'static [Label] = &[
        Label::LessonPlanTitle,
        Label::TeachingPlanTitle,
        Label::Period,
        Label::Subject,
        Label::Grade,
        Label::LessonTitle,
        Label::Periods,
        Label::ExecutionTime,
        Label::DocumentDate,
        Label::RequiredOutcomes,
        Label::Knowledge,
        Label::Competencies,
        Label::GeneralCompetencies,
        Label::SpecificCompetencies,
        Label::Qualities,
        Label::IntegratedContent,
        Label::TeachingAids,
        Label::TeacherAids,
        Label::StudentAids,
        Label::TeachingActivities,
        Label::Objective,
        Label::Content,
        Label::Product,
        Label::Implementation,
        Label::TeacherActivityHeader,
        Label::StudentActivityHeader,
        Label::TeachingMethod,
        Label::PostLessonAdjustments,
        Label::FilenamePrefix,
        Label::PdfReferenceNote,
        Label::ContentLanguage,
        Label::LoadingMessage,
        Label::LoadingSubMessage,
        Label::ErrorMessage,
        Label::EmptyStateTitle,
        Label::EmptyStateSubtitle,
        Label::ApiKeyRequired,
        Label::ApiKeyInvalid,
        Label::SessionExpired,
        Label::GenerationFailed,
        Label::ExportFailed,
    ];
}

fn vietnamese(label: Label) -> &'static str {
    match label {
        Label::LessonPlanTitle => "GIÁO ÁN",
        Label::TeachingPlanTitle => "KẾ HOẠCH BÀI DẠY",
        Label::Period => "Tiết",
        Label::Subject => "Môn học",
        Label::Grade => "Lớp",
        Label::LessonTitle => "Tên bài học",
        Label::Periods => "Số tiết",
        Label::ExecutionTime => "Thời gian thực hiện",
        Label::DocumentDate => "……………, ngày …… tháng …… năm ……",
        Label::RequiredOutcomes => "I. YÊU CẦU CẦN ĐẠT",
        Label::Knowledge => "1. Kiến thức:",
        Label::Competencies => "2. Năng lực:",
        Label::GeneralCompetencies => "- Năng lực chung:",
        Label::SpecificCompetencies => "- Năng lực đặc thù:",
        Label::Qualities => "- Phẩm chất:",
        Label::IntegratedContent => "- Nội dung tích hợp:",
        Label::TeachingAids => "II. ĐỒ DÙNG DẠY HỌC",
        Label::TeacherAids => "1. Giáo viên:",
        Label::StudentAids => "2. Học sinh:",
        Label::TeachingActivities => "III. CÁC HOẠT ĐỘNG DẠY HỌC",
        Label::Objective => "Mục tiêu:",
        Label::Content => "a) Nội dung:",
        Label::Product => "b) Sản phẩm:",
        Label::Implementation => "c) Tổ chức thực hiện:",
        Label::TeacherActivityHeader => "Hoạt động của giáo viên",
        Label::StudentActivityHeader => "Hoạt động của học sinh",
        Label::TeachingMethod => "* Cách tiến hành:",
        Label::PostLessonAdjustments => "IV. ĐIỀU CHỈNH SAU BÀI DẠY",
        Label::FilenamePrefix => "Giao_an",
        Label::PdfReferenceNote => "Nội dung tham khảo từ tệp PDF",
        Label::ContentLanguage => "Vietnamese",
        Label::LoadingMessage => "Đang tạo giáo án...",
        Label::LoadingSubMessage => "Quá trình này có thể mất một chút thời gian.",
        Label::ErrorMessage => "Đã xảy ra lỗi",
        Label::EmptyStateTitle => "Chưa có giáo án",
        Label::EmptyStateSubtitle => "Điền thông tin vào biểu mẫu để bắt đầu tạo giáo án.",
        Label::ApiKeyRequired => "Vui lòng nhập API key.",
        Label::ApiKeyInvalid => "API key không hợp lệ. Vui lòng kiểm tra lại.",
        Label::SessionExpired => {
            "API key không còn hợp lệ hoặc đã hết hạn. Vui lòng nhập lại API key."
        }
        Label::GenerationFailed => {
            "Không thể tạo giáo án từ AI. Vui lòng kiểm tra lại thông tin và thử lại."
        }
        Label::ExportFailed => "Không thể xuất tệp Word. Vui lòng thử lại.",
    }
}

fn english(label: Label) -> &'static str {
    match label {
        Label::LessonPlanTitle => "LESSON PLAN",
        Label::TeachingPlanTitle => "TEACHING PLAN",
        Label::Period => "Period",
        Label::Subject => "Subject",
        Label::Grade => "Grade",
        Label::LessonTitle => "Lesson title",
        Label::Periods => "Number of periods",
        Label::ExecutionTime => "Time of implementation",
        Label::DocumentDate => "……………, day …… month …… year ……",
        Label::RequiredOutcomes => "I. REQUIRED OUTCOMES",
        Label::Knowledge => "1. Knowledge:",
        Label::Competencies => "2. Competencies:",
        Label::GeneralCompetencies => "- General competencies:",
        Label::SpecificCompetencies => "- Specific competencies:",
        Label::Qualities => "- Qualities:",
        Label::IntegratedContent => "- Integrated content:",
        Label::TeachingAids => "II. TEACHING AIDS",
        Label::TeacherAids => "1. Teacher:",
        Label::StudentAids => "2. Students:",
        Label::TeachingActivities => "III. TEACHING ACTIVITIES",
        Label::Objective => "Objective:",
        Label::Content => "a) Content:",
        Label::Product => "b) Product:",
        Label::Implementation => "c) Implementation:",
        Label::TeacherActivityHeader => "Teacher's activities",
        Label::StudentActivityHeader => "Students' activities",
        Label::TeachingMethod => "* Procedure:",
        Label::PostLessonAdjustments => "IV. POST-LESSON ADJUSTMENTS",
        Label::FilenamePrefix => "Lesson_Plan",
        Label::PdfReferenceNote => "Reference content from PDF file",
        Label::ContentLanguage => "English",
        Label::LoadingMessage => "Generating lesson plan...",
        Label::LoadingSubMessage => "This may take a moment.",
        Label::ErrorMessage => "An error occurred",
        Label::EmptyStateTitle => "No lesson plan yet",
        Label::EmptyStateSubtitle => "Fill in the form to start generating a lesson plan.",
        Label::ApiKeyRequired => "Please enter an API key.",
        Label::ApiKeyInvalid => "The API key is not valid. Please check it and try again.",
        Label::SessionExpired => {
            "The API key is no longer valid or has expired. Please enter it again."
        }
        Label::GenerationFailed => {
            "Could not generate lesson plan from AI. Please check the information and try again."
        }
        Label::ExportFailed => "Could not export the Word document. Please try again.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_label_has_text_in_both_locales() {
        for label in Label::ALL {
            assert!(!Locale::Vi.text(*label).is_empty(), "{:?} missing in vi", label);
            assert!(!Locale::En.text(*label).is_empty(), "{:?} missing in en", label);
        }
    }

    #[test]
    fn locale_parses_and_defaults_to_vietnamese() {
        assert_eq!(Locale::default(), Locale::Vi);
        assert_eq!("EN".parse::<Locale>().unwrap(), Locale::En);
        assert!("fr".parse::<Locale>().is_err());
    }

    #[test]
    fn filename_prefix_has_no_whitespace() {
        for locale in [Locale::Vi, Locale::En] {
            assert!(!locale.text(Label::FilenamePrefix).contains(char::is_whitespace));
        }
    }
}
