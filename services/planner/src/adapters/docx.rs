//! services/planner/src/adapters/docx.rs
//!
//! Lowers a `DocumentLayout` into a Word document with `docx-rs`.

use std::io::Cursor;

use docx_rs::{
    AlignmentType, Docx, LineSpacing, Paragraph, Run, RunFonts, SpecialIndentType, Tab,
    TabLeaderType, TabValueType, Table, TableCell, VAlignType, WidthType,
};
use lesson_planner_core::{
    export::{
        Align, Block, Para, Span, TableLayout, TableRow, BODY_SIZE, DOTTED_LINE_SPACING,
        FIRST_LINE_INDENT, FONT_FAMILY, PARAGRAPH_SPACING, TITLE_SIZE,
    },
    ports::{DocumentWriter, PortError, PortResult},
    DocumentLayout,
};
use tracing::{debug, error};

const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Right edge of the text area on an A4 page with default margins, in twips.
const RIGHT_TAB_POSITION: usize = 9350;

/// An adapter that implements `DocumentWriter` for `.docx` files.
#[derive(Clone, Default)]
pub struct DocxWriter;

impl DocxWriter {
    pub fn new() -> Self {
        Self
    }
}

fn fonts() -> RunFonts {
    RunFonts::new()
        .ascii(FONT_FAMILY)
        .hi_ansi(FONT_FAMILY)
        .east_asia(FONT_FAMILY)
        .cs(FONT_FAMILY)
}

fn run(span: &Span, size: usize) -> Run {
    let mut run = Run::new().add_text(&span.text).size(size).fonts(fonts());
    if span.bold {
        run = run.bold();
    }
    if span.italic {
        run = run.italic();
    }
    run
}

fn alignment(align: Align) -> AlignmentType {
    match align {
        Align::Left => AlignmentType::Left,
        Align::Center => AlignmentType::Center,
        Align::Justified => AlignmentType::Both,
    }
}

fn paragraph(para: &Para) -> Paragraph {
    let mut paragraph = para
        .spans
        .iter()
        .fold(Paragraph::new(), |p, span| p.add_run(run(span, BODY_SIZE)))
        .align(alignment(para.align))
        .line_spacing(LineSpacing::new().after(para.spacing_after));
    if para.first_line_indent {
        paragraph = paragraph.indent(
            None,
            Some(SpecialIndentType::FirstLine(FIRST_LINE_INDENT)),
            None,
            None,
        );
    }
    paragraph
}

fn title(text: &str) -> Paragraph {
    Paragraph::new()
        .add_run(run(&Span::bold(text), TITLE_SIZE))
        .align(AlignmentType::Center)
        .line_spacing(LineSpacing::new().after(PARAGRAPH_SPACING * 2))
}

fn heading(text: &str) -> Paragraph {
    Paragraph::new()
        .add_run(run(&Span::bold(text), BODY_SIZE))
        .align(AlignmentType::Left)
        .line_spacing(LineSpacing::new().before(PARAGRAPH_SPACING).after(PARAGRAPH_SPACING))
}

fn dotted_line() -> Paragraph {
    Paragraph::new()
        .add_tab(
            Tab::new()
                .val(TabValueType::Right)
                .leader(TabLeaderType::Dot)
                .pos(RIGHT_TAB_POSITION),
        )
        .add_run(Run::new().add_tab().size(BODY_SIZE).fonts(fonts()))
        .line_spacing(LineSpacing::new().after(DOTTED_LINE_SPACING))
}

fn cell(paras: &[Para]) -> TableCell {
    paras
        .iter()
        .fold(TableCell::new(), |cell, para| cell.add_paragraph(paragraph(para)))
        .vertical_align(VAlignType::Top)
}

fn table(layout: &TableLayout) -> Table {
    let column_width = RIGHT_TAB_POSITION / layout.columns.max(1);
    let rows = layout
        .rows
        .iter()
        .map(|row| match row {
            TableRow::Header(cells) => docx_rs::TableRow::new(
                cells
                    .iter()
                    .map(|para| cell(std::slice::from_ref(para)))
                    .collect(),
            ),
            TableRow::Merged(paras) => {
                docx_rs::TableRow::new(vec![cell(paras).grid_span(layout.columns)])
            }
            TableRow::Cells(cells) => {
                docx_rs::TableRow::new(cells.iter().map(|paras| cell(paras)).collect())
            }
        })
        .collect();

    Table::new(rows)
        .set_grid(vec![column_width; layout.columns])
        .width(5000, WidthType::Pct)
}

fn page_break() -> Paragraph {
    Paragraph::new().page_break_before(true)
}

/// Builds the in-memory document. A page break is carried onto the next paragraph.
fn build(layout: &DocumentLayout) -> Docx {
    let mut docx = Docx::new();
    let mut break_pending = false;
    for block in &layout.blocks {
        let next = match block {
            Block::PageBreak => {
                break_pending = true;
                continue;
            }
            Block::Table(layout) => {
                if break_pending {
                    docx = docx.add_paragraph(page_break());
                    break_pending = false;
                }
                docx = docx.add_table(table(layout));
                continue;
            }
            Block::Title(text) => title(text),
            Block::Heading(text) => heading(text),
            Block::Paragraph(para) => paragraph(para),
            Block::DottedLine => dotted_line(),
        };
        let next = if break_pending {
            break_pending = false;
            next.page_break_before(true)
        } else {
            next
        };
        docx = docx.add_paragraph(next);
    }
    docx
}

impl DocumentWriter for DocxWriter {
    fn write(&self, layout: &DocumentLayout) -> PortResult<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        build(layout).build().pack(&mut buffer).map_err(|e| {
            error!("Failed to pack document '{}': {}", layout.file_name, e);
            PortError::ExportFailed(e.to_string())
        })?;

        let bytes = buffer.into_inner();
        debug!(file = %layout.file_name, size = bytes.len(), "Document packed");
        Ok(bytes)
    }

    fn content_type(&self) -> &'static str {
        DOCX_CONTENT_TYPE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lesson_planner_core::{
        layout_document, Cv1001Activity, Cv1001Outcomes, Cv1001Plan, LessonPlan, Locale,
        PlanBody, TeachingAids,
    };
    use std::io::Read;

    fn plan(period: u32) -> LessonPlan {
        LessonPlan {
            subject: "Toán".to_string(),
            grade: "Lớp 3".to_string(),
            lesson_title: "Bài 5: Phép nhân".to_string(),
            periods: 2,
            execution_time: format!("Tiết {} - Tuần 2", period),
            teaching_aids: TeachingAids {
                teacher: "Bảng phụ".to_string(),
                student: "Que tính".to_string(),
            },
            post_lesson_adjustments: String::new(),
            body: PlanBody::Cv1001(Cv1001Plan {
                required_outcomes: Cv1001Outcomes {
                    general_competencies: "Hợp tác".to_string(),
                    specific_competencies: "Tính toán".to_string(),
                    qualities: "Trung thực".to_string(),
                    integrated_content: None,
                },
                teaching_activities: vec![Cv1001Activity {
                    activity_name: "1. Khởi động".to_string(),
                    objective: "Ôn bài cũ".to_string(),
                    teacher_activity: "GV nêu câu hỏi".to_string(),
                    student_activity: "HS trả lời".to_string(),
                }],
            }),
        }
    }

    fn document_xml(bytes: Vec<u8>) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut xml = String::new();
        archive
            .by_name("word/document.xml")
            .unwrap()
            .read_to_string(&mut xml)
            .unwrap();
        xml
    }

    #[test]
    fn writes_a_readable_word_document() {
        let layout = layout_document(&[plan(1), plan(2)], Locale::Vi);
        let bytes = DocxWriter::new().write(&layout).unwrap();
        let xml = document_xml(bytes);

        assert!(xml.contains("Times New Roman"));
        assert!(xml.contains("Tiết 2 - Tuần 2"));
        assert!(xml.contains("HS trả lời"));
        assert_eq!(xml.matches("<w:pageBreakBefore").count(), 1);
        assert_eq!(xml.matches("</w:tbl>").count(), 2);
    }

    #[test]
    fn merged_activity_rows_span_both_columns() {
        let layout = layout_document(&[plan(1)], Locale::Vi);
        let xml = document_xml(DocxWriter::new().write(&layout).unwrap());
        assert!(xml.contains("w:gridSpan w:val=\"2\""));
    }

    #[test]
    fn adjustment_lines_use_a_dotted_leader() {
        let layout = layout_document(&[plan(1)], Locale::En);
        let xml = document_xml(DocxWriter::new().write(&layout).unwrap());
        assert!(xml.contains("w:leader=\"dot\""));
    }

    #[test]
    fn empty_layout_still_packs() {
        let layout = layout_document(&[], Locale::Vi);
        let bytes = DocxWriter::new().write(&layout).unwrap();
        assert!(!bytes.is_empty());
        assert!(DocxWriter::new().content_type().ends_with("document"));
    }
}
