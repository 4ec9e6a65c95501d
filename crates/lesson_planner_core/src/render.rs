//! crates/lesson_planner_core/src/render.rs
//!
//! Renders lesson plans into the HTML fragment shown in the result panel.
//!
//! The renderer holds no state. Which of the loading, error, empty or plan views is
//! shown is decided by the caller through [`RenderState`].

use std::fmt::Write;

use crate::domain::{non_blank, Cv1001Plan, Cv5512Plan, LessonPlan, PlanBody, TemplateKind};
use crate::i18n::{Label, Locale};

/// The mutually exclusive states of the result panel.
#[derive(Debug, Clone, Copy)]
pub enum RenderState<'a> {
    Loading,
    Failed(&'a str),
    Empty,
    Ready(&'a [LessonPlan]),
}

pub fn render_state(state: RenderState<'_>, locale: Locale) -> String {
    match state {
        RenderState::Loading => format!(
            "<div class=\"status loading\"><p class=\"title\">{}</p><p>{}</p></div>",
            escape_html(locale.text(Label::LoadingMessage)),
            escape_html(locale.text(Label::LoadingSubMessage)),
        ),
        RenderState::Failed(message) => format!(
            "<div class=\"status error\"><p class=\"title\">{}</p><p>{}</p></div>",
            escape_html(locale.text(Label::ErrorMessage)),
            escape_html(message),
        ),
        RenderState::Empty => format!(
            "<div class=\"status empty\"><h3>{}</h3><p>{}</p></div>",
            escape_html(locale.text(Label::EmptyStateTitle)),
            escape_html(locale.text(Label::EmptyStateSubtitle)),
        ),
        RenderState::Ready(plans) => render_plans(plans, locale),
    }
}

/// Renders every plan in order. An empty slice renders an empty container.
pub fn render_plans(plans: &[LessonPlan], locale: Locale) -> String {
    let mut html = String::from("<div class=\"lesson-plans\">");
    for (index, plan) in plans.iter().enumerate() {
        render_plan(&mut html, plan, index, locale);
    }
    html.push_str("</div>");
    html
}

pub fn plan_title(template: TemplateKind, locale: Locale) -> &'static str {
    match template {
        TemplateKind::Cv5512 => locale.text(Label::TeachingPlanTitle),
        TemplateKind::Cv1001 => locale.text(Label::LessonPlanTitle),
    }
}

fn render_plan(html: &mut String, plan: &LessonPlan, index: usize, locale: Locale) {
    let t = |label| escape_html(locale.text(label));

    let _ = write!(
        html,
        "<article class=\"lesson-plan\" data-template=\"{}\">",
        plan.template()
    );
    let _ = write!(
        html,
        "<h1>{} ({} {})</h1>",
        escape_html(plan_title(plan.template(), locale)),
        t(Label::Period),
        index + 1
    );
    let _ = write!(
        html,
        "<p class=\"center\"><b>{}:</b> {}; <b>{}:</b> {}</p>",
        t(Label::Subject),
        escape_html(&plan.subject),
        t(Label::Grade),
        escape_html(&plan.grade)
    );
    let _ = write!(
        html,
        "<p class=\"center\"><b>{}:</b> {}; <b>{}:</b> {}</p>",
        t(Label::LessonTitle),
        escape_html(&plan.lesson_title),
        t(Label::Periods),
        plan.periods
    );
    let _ = write!(
        html,
        "<p class=\"center\"><b>{}:</b> {}</p>",
        t(Label::ExecutionTime),
        escape_html(&plan.execution_time)
    );

    let _ = write!(html, "<h2>{}</h2>", t(Label::RequiredOutcomes));
    match &plan.body {
        PlanBody::Cv1001(body) => render_cv1001_outcomes(html, body, locale),
        PlanBody::Cv5512(body) => render_cv5512_outcomes(html, body, locale),
    }

    let _ = write!(html, "<h2>{}</h2>", t(Label::TeachingAids));
    labeled_line(html, locale.text(Label::TeacherAids), &plan.teaching_aids.teacher);
    labeled_line(html, locale.text(Label::StudentAids), &plan.teaching_aids.student);

    let _ = write!(html, "<h2>{}</h2>", t(Label::TeachingActivities));
    match &plan.body {
        PlanBody::Cv1001(body) => render_cv1001_activities(html, body, locale),
        PlanBody::Cv5512(body) => render_cv5512_activities(html, body, locale),
    }

    let _ = write!(html, "<h2>{}</h2>", t(Label::PostLessonAdjustments));
    html.push_str("<div class=\"adjustments\">");
    for _ in 0..crate::export::ADJUSTMENT_LINES {
        html.push_str("<div class=\"dotted-line\"></div>");
    }
    html.push_str("</div></article>");
}

fn render_cv1001_outcomes(html: &mut String, body: &Cv1001Plan, locale: Locale) {
    let outcomes = &body.required_outcomes;
    labeled_line(
        html,
        locale.text(Label::GeneralCompetencies),
        &outcomes.general_competencies,
    );
    labeled_line(
        html,
        locale.text(Label::SpecificCompetencies),
        &outcomes.specific_competencies,
    );
    labeled_line(html, locale.text(Label::Qualities), &outcomes.qualities);
    if let Some(integrated) = non_blank(outcomes.integrated_content.as_ref()) {
        labeled_line(html, locale.text(Label::IntegratedContent), integrated);
    }
}

fn render_cv5512_outcomes(html: &mut String, body: &Cv5512Plan, locale: Locale) {
    let outcomes = &body.required_outcomes;
    if let Some(knowledge) = non_blank(outcomes.knowledge.as_ref()) {
        labeled_line(html, locale.text(Label::Knowledge), knowledge);
    }
    labeled_line(
        html,
        locale.text(Label::Competencies),
        &outcomes.general_competencies,
    );
    labeled_line(html, locale.text(Label::Qualities), &outcomes.qualities);
}

fn render_cv1001_activities(html: &mut String, body: &Cv1001Plan, locale: Locale) {
    let _ = write!(
        html,
        "<table class=\"activities\"><thead><tr><th>{}</th><th>{}</th></tr></thead><tbody>",
        escape_html(locale.text(Label::TeacherActivityHeader)),
        escape_html(locale.text(Label::StudentActivityHeader))
    );
    for activity in &body.teaching_activities {
        let _ = write!(
            html,
            "<tr><td colspan=\"2\"><p class=\"activity-name\">{}</p><p><i><b>{}</b> {}</i></p></td></tr>",
            escape_html(&activity.activity_name),
            escape_html(locale.text(Label::Objective)),
            escape_html(&activity.objective)
        );
        let _ = write!(
            html,
            "<tr><td class=\"multiline\"><p><b>{}</b></p>{}</td><td class=\"multiline\">{}</td></tr>",
            escape_html(locale.text(Label::TeachingMethod)),
            multiline(&activity.teacher_activity),
            multiline(&activity.student_activity)
        );
    }
    html.push_str("</tbody></table>");
}

fn render_cv5512_activities(html: &mut String, body: &Cv5512Plan, locale: Locale) {
    html.push_str("<div class=\"activities\">");
    for activity in &body.teaching_activities {
        let _ = write!(
            html,
            "<section class=\"activity\"><p class=\"activity-name\">{}</p><p><b>{}</b> {}</p>",
            escape_html(&activity.activity_name),
            escape_html(locale.text(Label::Objective)),
            escape_html(&activity.objective)
        );
        for (label, text) in [
            (Label::Content, &activity.content),
            (Label::Product, &activity.product),
            (Label::Implementation, &activity.implementation),
        ] {
            let _ = write!(
                html,
                "<div><p class=\"label\">{}</p><div class=\"multiline\">{}</div></div>",
                escape_html(locale.text(label)),
                multiline(text)
            );
        }
        html.push_str("</section>");
    }
    html.push_str("</div>");
}

fn labeled_line(html: &mut String, label: &str, value: &str) {
    let _ = write!(
        html,
        "<p><b>{}</b> {}</p>",
        escape_html(label),
        escape_html(value)
    );
}

fn multiline(text: &str) -> String {
    escape_html(text).replace('\n', "<br>")
}

/// Escape HTML special characters.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        Cv1001Activity, Cv1001Outcomes, Cv5512Activity, Cv5512Outcomes, TeachingAids,
    };

    fn cv1001_plan(integrated: Option<&str>) -> LessonPlan {
        LessonPlan {
            subject: "Toán".to_string(),
            grade: "Lớp 2".to_string(),
            lesson_title: "Bài 5: Phép cộng".to_string(),
            periods: 2,
            execution_time: "Tiết 1 - Tuần 3".to_string(),
            teaching_aids: TeachingAids {
                teacher: "Bảng phụ".to_string(),
                student: "Que tính".to_string(),
            },
            post_lesson_adjustments: String::new(),
            body: PlanBody::Cv1001(Cv1001Plan {
                required_outcomes: Cv1001Outcomes {
                    general_competencies: "Hợp tác".to_string(),
                    specific_competencies: "Tư duy".to_string(),
                    qualities: "Chăm chỉ".to_string(),
                    integrated_content: integrated.map(str::to_string),
                },
                teaching_activities: vec![Cv1001Activity {
                    activity_name: "1. Hoạt động mở đầu".to_string(),
                    objective: "Khởi động".to_string(),
                    teacher_activity: "GV hỏi\nGV nhận xét".to_string(),
                    student_activity: "HS <trả lời>".to_string(),
                }],
            }),
        }
    }

    fn cv5512_plan() -> LessonPlan {
        LessonPlan {
            subject: "Hóa học".to_string(),
            grade: "Lớp 10".to_string(),
            lesson_title: "Bài 2".to_string(),
            periods: 1,
            execution_time: "Tiết 4 - Tuần 2".to_string(),
            teaching_aids: TeachingAids::default(),
            post_lesson_adjustments: String::new(),
            body: PlanBody::Cv5512(Cv5512Plan {
                required_outcomes: Cv5512Outcomes {
                    knowledge: Some("Nguyên tử".to_string()),
                    general_competencies: "Tự học".to_string(),
                    qualities: "Trách nhiệm".to_string(),
                },
                teaching_activities: vec![Cv5512Activity {
                    activity_name: "HOẠT ĐỘNG 1".to_string(),
                    objective: "Mở đầu".to_string(),
                    content: "Câu hỏi".to_string(),
                    product: "Câu trả lời".to_string(),
                    implementation: "Bước 1\nBước 2".to_string(),
                }],
            }),
        }
    }

    #[test]
    fn renders_one_block_per_plan() {
        let plans = vec![cv1001_plan(None), cv1001_plan(None)];
        let html = render_plans(&plans, Locale::Vi);
        assert_eq!(html.matches("<article").count(), 2);
        assert!(html.contains("GIÁO ÁN (Tiết 1)"));
        assert!(html.contains("GIÁO ÁN (Tiết 2)"));
    }

    #[test]
    fn empty_sequence_renders_without_error() {
        let html = render_state(RenderState::Ready(&[]), Locale::En);
        assert_eq!(html, "<div class=\"lesson-plans\"></div>");
    }

    #[test]
    fn cv1001_uses_the_two_column_table() {
        let html = render_plans(&[cv1001_plan(None)], Locale::Vi);
        assert!(html.contains("<table class=\"activities\">"));
        assert!(html.contains("colspan=\"2\""));
        assert!(html.contains("GV hỏi<br>GV nhận xét"));
        assert!(html.contains("HS &lt;trả lời&gt;"));
        assert!(html.contains("Năng lực đặc thù"));
        assert!(!html.contains("Kiến thức"));
        assert!(!html.contains("Sản phẩm"));
    }

    #[test]
    fn cv1001_omits_blank_integrated_content() {
        let absent = render_plans(&[cv1001_plan(None)], Locale::Vi);
        let blank = render_plans(&[cv1001_plan(Some(" "))], Locale::Vi);
        let present = render_plans(&[cv1001_plan(Some("Giáo dục môi trường"))], Locale::Vi);
        assert!(!absent.contains("Nội dung tích hợp"));
        assert!(!blank.contains("Nội dung tích hợp"));
        assert!(present.contains("Nội dung tích hợp"));
    }

    #[test]
    fn cv5512_uses_labeled_sections() {
        let html = render_plans(&[cv5512_plan()], Locale::Vi);
        assert!(html.contains("KẾ HOẠCH BÀI DẠY (Tiết 1)"));
        assert!(html.contains("1. Kiến thức:"));
        assert!(html.contains("2. Năng lực:"));
        assert!(html.contains("c) Tổ chức thực hiện:"));
        assert!(html.contains("Bước 1<br>Bước 2"));
        assert!(!html.contains("<table"));
        assert!(!html.contains("Năng lực đặc thù"));
    }

    #[test]
    fn status_views_are_localized() {
        assert!(render_state(RenderState::Loading, Locale::En).contains("Generating"));
        assert!(render_state(RenderState::Empty, Locale::Vi).contains("Chưa có giáo án"));
        let failed = render_state(RenderState::Failed("<boom>"), Locale::En);
        assert!(failed.contains("&lt;boom&gt;"));
    }

    #[test]
    fn each_plan_has_three_dotted_lines() {
        let html = render_plans(&[cv5512_plan()], Locale::En);
        assert_eq!(html.matches("dotted-line").count(), 3);
    }
}
