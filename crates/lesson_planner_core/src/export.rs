//! crates/lesson_planner_core/src/export.rs
//!
//! Lays lesson plans out as a word-processor document: a flat list of blocks with all
//! labels resolved and all formatting decisions made. A `DocumentWriter` adapter turns
//! the layout into a file; this module never touches a document library.

use crate::domain::{non_blank, Cv1001Plan, Cv5512Plan, LessonPlan, PlanBody};
use crate::i18n::{Label, Locale};
use crate::render::plan_title;

pub const FONT_FAMILY: &str = "Times New Roman";
/// Body text size in half-points (13pt).
pub const BODY_SIZE: usize = 26;
/// Title size in half-points (16pt).
pub const TITLE_SIZE: usize = 32;
/// First-line indent of outcome and aid lines, in twips (0.5 inch).
pub const FIRST_LINE_INDENT: i32 = 720;
/// Space after ordinary paragraphs, in twips.
pub const PARAGRAPH_SPACING: u32 = 120;
/// Space after lines inside activity table cells, in twips.
pub const CELL_LINE_SPACING: u32 = 100;
/// Space after each dotted adjustment line, in twips.
pub const DOTTED_LINE_SPACING: u32 = 360;
/// Number of blank dotted lines left for post-lesson adjustments.
pub const ADJUSTMENT_LINES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Justified,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
}

impl Span {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: false,
            italic: false,
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            bold: true,
            ..Self::plain(text)
        }
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Para {
    pub spans: Vec<Span>,
    pub align: Align,
    pub first_line_indent: bool,
    pub spacing_after: u32,
}

impl Para {
    pub fn new(spans: Vec<Span>) -> Self {
        Self {
            spans,
            align: Align::Justified,
            first_line_indent: false,
            spacing_after: PARAGRAPH_SPACING,
        }
    }

    pub fn aligned(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn indented(mut self) -> Self {
        self.first_line_indent = true;
        self
    }

    pub fn spacing(mut self, after: u32) -> Self {
        self.spacing_after = after;
        self
    }

    pub fn text(&self) -> String {
        self.spans.iter().map(|span| span.text.as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableRow {
    /// Column headers. Written as an ordinary first row, not repeated across pages.
    Header(Vec<Para>),
    /// One cell spanning every column.
    Merged(Vec<Para>),
    /// One cell per column.
    Cells(Vec<Vec<Para>>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableLayout {
    pub columns: usize,
    pub rows: Vec<TableRow>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    PageBreak,
    Title(String),
    Heading(String),
    Paragraph(Para),
    /// A bordered table.
    Table(TableLayout),
    /// An empty line filled with a dotted leader up to the right margin.
    DottedLine,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentLayout {
    pub file_name: String,
    pub blocks: Vec<Block>,
}

impl DocumentLayout {
    pub fn page_breaks(&self) -> usize {
        self.blocks
            .iter()
            .filter(|block| matches!(block, Block::PageBreak))
            .count()
    }
}

/// Lays out the whole sequence as one document, each plan after the first on a new page.
pub fn layout_document(plans: &[LessonPlan], locale: Locale) -> DocumentLayout {
    let mut blocks = Vec::new();
    for (index, plan) in plans.iter().enumerate() {
        if index > 0 {
            blocks.push(Block::PageBreak);
        }
        layout_plan(&mut blocks, plan, index, locale);
    }
    DocumentLayout {
        file_name: file_name(plans, locale),
        blocks,
    }
}

/// `<prefix>_<subject>_<lesson title>.docx`, taken from the first plan with every
/// whitespace character replaced by `_`.
pub fn file_name(plans: &[LessonPlan], locale: Locale) -> String {
    let prefix = locale.text(Label::FilenamePrefix);
    match plans.first() {
        Some(first) => format!(
            "{}_{}_{}.docx",
            prefix,
            underscore_whitespace(&first.subject),
            underscore_whitespace(&first.lesson_title)
        ),
        None => format!("{}.docx", prefix),
    }
}

fn underscore_whitespace(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect()
}

fn layout_plan(blocks: &mut Vec<Block>, plan: &LessonPlan, index: usize, locale: Locale) {
    let t = |label| locale.text(label);

    blocks.push(Block::Title(format!(
        "{} ({} {})",
        plan_title(plan.template(), locale),
        t(Label::Period),
        index + 1
    )));
    blocks.push(Block::Paragraph(
        Para::new(vec![
            Span::bold(format!("{}: ", t(Label::Subject))),
            Span::plain(format!("{}; ", plan.subject)),
            Span::bold(format!("{}: ", t(Label::Grade))),
            Span::plain(plan.grade.as_str()),
        ])
        .aligned(Align::Center),
    ));
    blocks.push(Block::Paragraph(
        Para::new(vec![
            Span::bold(format!("{}: ", t(Label::LessonTitle))),
            Span::plain(format!("{}; ", plan.lesson_title)),
            Span::bold(format!("{}: ", t(Label::Periods))),
            Span::plain(plan.periods.to_string()),
        ])
        .aligned(Align::Center),
    ));
    blocks.push(Block::Paragraph(
        Para::new(vec![
            Span::bold(format!("{}: ", t(Label::ExecutionTime))),
            Span::plain(plan.execution_time.as_str()),
        ])
        .aligned(Align::Center),
    ));
    blocks.push(Block::Paragraph(
        Para::new(vec![Span::plain(t(Label::DocumentDate)).italic()]).aligned(Align::Center),
    ));

    blocks.push(Block::Heading(t(Label::RequiredOutcomes).to_string()));
    match &plan.body {
        PlanBody::Cv1001(body) => layout_cv1001_outcomes(blocks, body, locale),
        PlanBody::Cv5512(body) => layout_cv5512_outcomes(blocks, body, locale),
    }

    blocks.push(Block::Heading(t(Label::TeachingAids).to_string()));
    blocks.push(outcome_line(t(Label::TeacherAids), &plan.teaching_aids.teacher));
    blocks.push(outcome_line(t(Label::StudentAids), &plan.teaching_aids.student));

    blocks.push(Block::Heading(t(Label::TeachingActivities).to_string()));
    match &plan.body {
        PlanBody::Cv1001(body) => blocks.push(Block::Table(cv1001_table(body, locale))),
        PlanBody::Cv5512(body) => layout_cv5512_activities(blocks, body, locale),
    }

    blocks.push(Block::Heading(t(Label::PostLessonAdjustments).to_string()));
    blocks.extend(std::iter::repeat(Block::DottedLine).take(ADJUSTMENT_LINES));
}

fn outcome_line(label: &str, value: &str) -> Block {
    Block::Paragraph(
        Para::new(vec![Span::bold(format!("{} ", label)), Span::plain(value)]).indented(),
    )
}

fn layout_cv1001_outcomes(blocks: &mut Vec<Block>, body: &Cv1001Plan, locale: Locale) {
    let outcomes = &body.required_outcomes;
    blocks.push(outcome_line(
        locale.text(Label::GeneralCompetencies),
        &outcomes.general_competencies,
    ));
    blocks.push(outcome_line(
        locale.text(Label::SpecificCompetencies),
        &outcomes.specific_competencies,
    ));
    blocks.push(outcome_line(locale.text(Label::Qualities), &outcomes.qualities));
    if let Some(integrated) = non_blank(outcomes.integrated_content.as_ref()) {
        blocks.push(outcome_line(locale.text(Label::IntegratedContent), integrated));
    }
}

fn layout_cv5512_outcomes(blocks: &mut Vec<Block>, body: &Cv5512Plan, locale: Locale) {
    let outcomes = &body.required_outcomes;
    if let Some(knowledge) = non_blank(outcomes.knowledge.as_ref()) {
        blocks.push(outcome_line(locale.text(Label::Knowledge), knowledge));
    }
    blocks.push(outcome_line(
        locale.text(Label::Competencies),
        &outcomes.general_competencies,
    ));
    blocks.push(outcome_line(locale.text(Label::Qualities), &outcomes.qualities));
}

fn cell_lines(text: &str) -> impl Iterator<Item = Para> + '_ {
    text.split('\n')
        .map(|line| Para::new(vec![Span::plain(line)]).spacing(CELL_LINE_SPACING))
}

fn cv1001_table(body: &Cv1001Plan, locale: Locale) -> TableLayout {
    let header_cell = |label| Para::new(vec![Span::bold(locale.text(label))]).aligned(Align::Left);

    let mut rows = vec![TableRow::Header(vec![
        header_cell(Label::TeacherActivityHeader),
        header_cell(Label::StudentActivityHeader),
    ])];

    for activity in &body.teaching_activities {
        rows.push(TableRow::Merged(vec![
            Para::new(vec![Span::bold(activity.activity_name.as_str())]).aligned(Align::Left),
            Para::new(vec![
                Span::bold(format!("{} ", locale.text(Label::Objective))).italic(),
                Span::plain(activity.objective.as_str()).italic(),
            ]),
        ]));

        let mut teacher = vec![header_cell(Label::TeachingMethod)];
        teacher.extend(cell_lines(&activity.teacher_activity));
        let student = cell_lines(&activity.student_activity).collect();
        rows.push(TableRow::Cells(vec![teacher, student]));
    }

    TableLayout { columns: 2, rows }
}

fn layout_cv5512_activities(blocks: &mut Vec<Block>, body: &Cv5512Plan, locale: Locale) {
    for activity in &body.teaching_activities {
        blocks.push(Block::Paragraph(Para::new(vec![Span::bold(
            activity.activity_name.as_str(),
        )])));
        blocks.push(Block::Paragraph(Para::new(vec![
            Span::bold(format!("{} ", locale.text(Label::Objective))),
            Span::plain(activity.objective.as_str()),
        ])));
        for (label, text) in [
            (Label::Content, &activity.content),
            (Label::Product, &activity.product),
            (Label::Implementation, &activity.implementation),
        ] {
            blocks.push(Block::Paragraph(Para::new(vec![Span::bold(format!(
                "{} ",
                locale.text(label)
            ))])));
            blocks.extend(
                text.split('\n')
                    .map(|line| Block::Paragraph(Para::new(vec![Span::plain(line)]))),
            );
        }
    }
}
