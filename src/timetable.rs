//! Structured timetable record → flat course text blocks.
//!
//! The timetable JSON is keyed top-level by a `courses` object; course and
//! section maps preserve their declared order. Each course renders into one
//! human-readable block that becomes a chunk-split candidate.

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct Timetable {
    pub courses: IndexMap<String, Course>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Course {
    pub course_name: String,
    /// Unit count; number or string in source data, stringified on render.
    pub units: Value,
    #[serde(default)]
    pub sections: IndexMap<String, Section>,
    /// Exam descriptors; in practice a one-element list. Only the first
    /// entry is rendered — extra entries are silently dropped.
    #[serde(default)]
    pub exams: Option<Vec<ExamInfo>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Section {
    #[serde(default)]
    pub instructor: Vec<String>,
    #[serde(default)]
    pub schedule: Vec<ScheduleEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleEntry {
    pub room: Value,
    #[serde(default)]
    pub days: Vec<String>,
    #[serde(default)]
    pub hours: Vec<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExamInfo {
    #[serde(default)]
    pub midsem: Value,
    #[serde(default)]
    pub compre: Value,
}

pub fn load_timetable(path: &Path) -> Result<Timetable> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read timetable: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse timetable: {}", path.display()))
}

/// Render every course into its text block, in declared order.
pub fn render_courses(courses: &IndexMap<String, Course>) -> Vec<String> {
    courses
        .iter()
        .map(|(course_no, course)| render_course(course_no, course))
        .collect()
}

/// Render one course: header, then each section with instructors and
/// schedule lines, then exam info when present (an empty exam list counts
/// as absent).
pub fn render_course(course_no: &str, course: &Course) -> String {
    let mut out = format!(
        "Course No: {}\nCourse Name: {}\nUnits: {}",
        course_no,
        course.course_name,
        scalar(&course.units)
    );

    for (section_name, section) in &course.sections {
        let instructors = section.instructor.join(", ");
        let schedule_text = section
            .schedule
            .iter()
            .map(|entry| {
                let days = entry.days.join(", ");
                let hours = entry
                    .hours
                    .iter()
                    .map(scalar)
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("Room: {}, Days: {}, Hours: {}", scalar(&entry.room), days, hours)
            })
            .collect::<Vec<_>>()
            .join("\n");

        out.push_str(&format!(
            "\nSection: {}\nInstructors: {}\nSchedule:\n{}",
            section_name, instructors, schedule_text
        ));
    }

    if let Some(exam) = course.exams.as_ref().and_then(|exams| exams.first()) {
        out.push_str(&format!(
            "\nExams:\nMidsem: {}, Compre: {}",
            scalar(&exam.midsem),
            scalar(&exam.compre)
        ));
    }

    out
}

/// Stringify a scalar JSON value without quoting strings.
fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
