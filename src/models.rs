use serde::Deserialize;

#[derive(Debug, Clone, PartialEq)]
pub struct StudentRecord {
    pub full_name: String,
    pub username: String,
    pub grade: f64,
    pub initials: String,
}

/// Inclusive grade interval used to pick one slice of the marksheet.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GradeRange {
    pub label: String,
    pub min: f64,
    pub max: f64,
}

impl GradeRange {
    pub fn new(label: &str, min: f64, max: f64) -> Self {
        Self {
            label: label.to_string(),
            min,
            max,
        }
    }

    pub fn contains(&self, grade: f64) -> bool {
        grade >= self.min && grade <= self.max
    }
}

/// A reported and copied sample, built by concatenating the selections of
/// each range in order.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SampleGroup {
    pub label: String,
    pub ranges: Vec<GradeRange>,
    #[serde(default)]
    pub prune: bool,
}

#[derive(Debug, Clone)]
pub struct SampleSet {
    pub label: String,
    pub records: Vec<StudentRecord>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionLayout {
    /// One directory per student.
    #[default]
    Folders,
    /// One file per student.
    Files,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PruneConfig {
    pub fraction: f64,
    pub cap: usize,
}

impl Default for PruneConfig {
    fn default() -> Self {
        Self {
            fraction: 0.05,
            cap: 4,
        }
    }
}
