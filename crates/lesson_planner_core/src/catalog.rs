//! crates/lesson_planner_core/src/catalog.rs
//!
//! The fixed subject and grade taxonomy offered by the form, grouped by school level.

use serde::Serialize;

/// One school level with the grades and subjects taught in it.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchoolLevel {
    pub name: &'static str,
    pub grades: &'static [&'static str],
    pub subjects: &'static [&'static str],
}

pub const SCHOOL_LEVELS: &[SchoolLevel] = &[
    SchoolLevel {
        name: "Cấp 1 (Tiểu học)",
        grades: &["Lớp 1", "Lớp 2", "Lớp 3", "Lớp 4", "Lớp 5"],
        subjects: &[
            "Tiếng Việt",
            "Toán",
            "Đạo đức",
            "Tự nhiên và Xã hội",
            "Lịch sử và Địa lí",
            "Khoa học",
            "Tin học",
            "Công nghệ",
            "Âm nhạc",
            "Mĩ thuật",
            "Giáo dục thể chất",
            "Hoạt động trải nghiệm",
            "Ngoại ngữ (Tiếng Anh)",
        ],
    },
    SchoolLevel {
        name: "Cấp 2 (THCS)",
        grades: &["Lớp 6", "Lớp 7", "Lớp 8", "Lớp 9"],
        subjects: &[
            "Ngữ văn",
            "Toán",
            "Ngoại ngữ (Tiếng Anh)",
            "Giáo dục công dân",
            "Lịch sử và Địa lí",
            "Khoa học tự nhiên (Vật lí, Hóa học, Sinh học)",
            "Công nghệ",
            "Tin học",
            "Âm nhạc và Mĩ thuật",
            "Giáo dục thể chất",
            "Hoạt động trải nghiệm, hướng nghiệp",
        ],
    },
    SchoolLevel {
        name: "Cấp 3 (THPT)",
        grades: &["Lớp 10", "Lớp 11", "Lớp 12"],
        subjects: &[
            "Ngữ văn",
            "Toán",
            "Ngoại ngữ (Tiếng Anh)",
            "Giáo dục thể chất",
            "Giáo dục quốc phòng và an ninh",
            "Hoạt động trải nghiệm, hướng nghiệp",
            "Nội dung giáo dục của địa phương",
            "Vật lí",
            "Hóa học",
            "Sinh học",
            "Lịch sử",
            "Địa lí",
            "Giáo dục kinh tế và pháp luật",
            "Công nghệ",
            "Tin học",
        ],
    },
];

// Subjects and grades are chosen independently in the form, so a subject from one
// level paired with a grade from another is still accepted.
pub fn is_known_subject(subject: &str) -> bool {
    SCHOOL_LEVELS
        .iter()
        .any(|level| level.subjects.contains(&subject))
}

pub fn is_known_grade(grade: &str) -> bool {
    SCHOOL_LEVELS.iter().any(|level| level.grades.contains(&grade))
}
