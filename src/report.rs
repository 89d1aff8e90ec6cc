use std::fmt::Write;

use crate::copier::CopyOutcome;
use crate::models::SampleSet;

const USERNAME_HEADER: &str = "Username";
const INITIALS_HEADER: &str = "Initials";

pub fn summarize_set(set: &SampleSet) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "{}:{}", set.label, set.records.len());

    if set.records.is_empty() {
        let _ = writeln!(output, "No scripts in this range.");
        let _ = writeln!(output);
        return output;
    }

    let username_width = set
        .records
        .iter()
        .map(|s| s.username.chars().count())
        .chain(std::iter::once(USERNAME_HEADER.len()))
        .max()
        .unwrap_or_default();
    let initials_width = set
        .records
        .iter()
        .map(|s| s.initials.chars().count())
        .chain(std::iter::once(INITIALS_HEADER.len()))
        .max()
        .unwrap_or_default();

    let _ = writeln!(
        output,
        "{:>username_width$} {:>initials_width$}",
        USERNAME_HEADER, INITIALS_HEADER
    );
    for student in &set.records {
        let _ = writeln!(
            output,
            "{:>username_width$} {:>initials_width$}",
            student.username, student.initials
        );
    }
    let _ = writeln!(output);

    output
}

pub fn summarize_copies(label: &str, outcome: &CopyOutcome) -> String {
    let mut output = format!(
        "{label}: copied {}, skipped {}",
        outcome.copied.len(),
        outcome.skipped.len()
    );
    if !outcome.skipped.is_empty() {
        let _ = write!(output, " (no submission for {})", outcome.skipped.join(", "));
    }
    output
}
