use std::path::Path;

use anyhow::Context;

use crate::error::SamplerError;
use crate::models::StudentRecord;

pub const FULL_NAME_COLUMN: &str = "Full name";
pub const USERNAME_COLUMN: &str = "Username";
pub const GRADE_COLUMN: &str = "Grade";

/// Cell values spreadsheet exports use for "no value"; these rows are dropped
/// like blank grades.
const MISSING_GRADE_TOKENS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

pub fn load_marksheet(path: &Path) -> anyhow::Result<Vec<StudentRecord>> {
    let reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open marksheet {}", path.display()))?;
    read_marksheet(reader).with_context(|| format!("failed to read marksheet {}", path.display()))
}

/// Reads graded students in file order. Rows with an empty grade or one of
/// the missing-value markers are dropped; they are usually enrolment
/// leftovers rather than submissions.
pub fn read_marksheet<R: std::io::Read>(
    mut reader: csv::Reader<R>,
) -> anyhow::Result<Vec<StudentRecord>> {
    let headers = reader.headers()?.clone();
    let name_idx = column_index(&headers, FULL_NAME_COLUMN)?;
    let username_idx = column_index(&headers, USERNAME_COLUMN)?;
    let grade_idx = column_index(&headers, GRADE_COLUMN)?;

    let mut students = Vec::new();
    let mut dropped = 0usize;

    for result in reader.records() {
        let row = result?;
        let raw_grade = row.get(grade_idx).unwrap_or("").trim();
        if raw_grade.is_empty() || MISSING_GRADE_TOKENS.contains(&raw_grade) {
            dropped += 1;
            continue;
        }

        let grade: f64 = raw_grade.parse().map_err(|_| SamplerError::InvalidGrade {
            line: row.position().map(|p| p.line()).unwrap_or_default(),
            value: raw_grade.to_string(),
        })?;
        if grade.is_nan() {
            dropped += 1;
            continue;
        }

        let full_name = row.get(name_idx).unwrap_or("").trim().to_string();
        students.push(StudentRecord {
            initials: initials(&full_name),
            username: row.get(username_idx).unwrap_or("").trim().to_string(),
            full_name,
            grade,
        });
    }

    tracing::info!(graded = students.len(), dropped, "marksheet loaded");
    Ok(students)
}

pub fn initials(full_name: &str) -> String {
    full_name
        .split_whitespace()
        .filter_map(|part| part.chars().next())
        .flat_map(char::to_uppercase)
        .collect()
}

fn column_index(headers: &csv::StringRecord, column: &str) -> Result<usize, SamplerError> {
    headers
        .iter()
        .position(|header| header.trim_start_matches('\u{feff}').trim() == column)
        .ok_or_else(|| SamplerError::MissingColumn {
            column: column.to_string(),
        })
}
