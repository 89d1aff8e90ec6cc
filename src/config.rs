use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{Datelike, NaiveDate, Utc};
use serde::Deserialize;

use crate::error::SamplerError;
use crate::models::{PruneConfig, SampleGroup, SubmissionLayout};
use crate::select::default_groups;

pub const DEFAULT_CONFIG_PATH: &str = "sampler.toml";

/// Configuration file as written by the user. Unset paths and names are
/// derived from the unit code when resolved.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    unit_code: String,
    session: Option<String>,
    #[serde(default = "default_marksheet")]
    marksheet: PathBuf,
    submissions_dir: Option<PathBuf>,
    samples_dir: Option<PathBuf>,
    sample_name: Option<String>,
    #[serde(default)]
    layout: SubmissionLayout,
    #[serde(default)]
    pruning: PruneConfig,
    #[serde(default = "default_groups")]
    groups: Vec<SampleGroup>,
}

fn default_marksheet() -> PathBuf {
    PathBuf::from("GradesMarksheet.csv")
}

#[derive(Debug, Clone)]
pub struct SamplerConfig {
    pub unit_code: String,
    pub marksheet: PathBuf,
    pub submissions_dir: PathBuf,
    pub samples_dir: PathBuf,
    pub sample_name: String,
    pub layout: SubmissionLayout,
    pub pruning: PruneConfig,
    pub groups: Vec<SampleGroup>,
}

impl SamplerConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_toml(&text, Utc::now().date_naive())
            .with_context(|| format!("failed to load config {}", path.display()))
    }

    pub fn from_toml(text: &str, today: NaiveDate) -> anyhow::Result<Self> {
        let file: ConfigFile = toml::from_str(text)?;
        let unit_code = file.unit_code.trim().to_string();
        let session = file
            .session
            .unwrap_or_else(|| academic_session(today));

        let config = Self {
            marksheet: file.marksheet,
            submissions_dir: file
                .submissions_dir
                .unwrap_or_else(|| PathBuf::from(format!("{unit_code}_OriginalSubmissions"))),
            samples_dir: file
                .samples_dir
                .unwrap_or_else(|| PathBuf::from(format!("{unit_code}_Samples"))),
            sample_name: file
                .sample_name
                .unwrap_or_else(|| format!("{unit_code}_{session}_")),
            layout: file.layout,
            pruning: file.pruning,
            groups: file.groups,
            unit_code,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), SamplerError> {
        if self.unit_code.is_empty() {
            return Err(SamplerError::InvalidConfig("unit_code must not be empty".into()));
        }
        if !self.pruning.fraction.is_finite() || !(0.0..=1.0).contains(&self.pruning.fraction) {
            return Err(SamplerError::InvalidConfig(format!(
                "pruning.fraction must be between 0 and 1, got {}",
                self.pruning.fraction
            )));
        }
        if self.groups.is_empty() {
            return Err(SamplerError::InvalidConfig("at least one group is required".into()));
        }
        for group in &self.groups {
            if group.ranges.is_empty() {
                return Err(SamplerError::InvalidConfig(format!(
                    "group `{}` has no ranges",
                    group.label
                )));
            }
            for range in &group.ranges {
                if range.min.is_nan() || range.max.is_nan() || range.min > range.max {
                    return Err(SamplerError::InvalidConfig(format!(
                        "range `{}` in group `{}` has min {} above max {}",
                        range.label, group.label, range.min, range.max
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Teaching session tag such as `S1_23-24`. Semester 1 runs September to
/// January, semester 2 the rest of the academic year.
pub fn academic_session(today: NaiveDate) -> String {
    let (semester, start_year) = match today.month() {
        9..=12 => (1, today.year()),
        1 => (1, today.year() - 1),
        _ => (2, today.year() - 1),
    };
    format!(
        "S{semester}_{:02}-{:02}",
        start_year.rem_euclid(100),
        (start_year + 1).rem_euclid(100)
    )
}

pub const TEMPLATE: &str = r#"# Moderation sampler configuration.

# Unit code used to prefix sample names and default directories.
unit_code = "MEXXXXX"

# Session tag in sample names. Defaults to the current academic session.
# session = "S1_23-24"

# Moodle marksheet export.
marksheet = "GradesMarksheet.csv"

# Extracted submissions download and sample destination.
# submissions_dir = "MEXXXXX_OriginalSubmissions"
# samples_dir = "MEXXXXX_Samples"

# "folders" when submissions were downloaded in folders (multiple files per
# student), "files" when there is one file per student.
layout = "folders"

[pruning]
# Share of all graded scripts allowed in each in-between range.
fraction = 0.05
# Absolute ceiling per in-between range.
cap = 4

[[groups]]
label = "Firsts"
ranges = [{ label = "firsts", min = 70.0, max = 100.0 }]

[[groups]]
label = "Fails"
ranges = [{ label = "fails", min = 0.0, max = 39.9 }]

[[groups]]
label = "Borderlines"
ranges = [
    { label = "border_fails", min = 39.0, max = 41.0 },
    { label = "border_22s", min = 49.0, max = 51.0 },
    { label = "border_21s", min = 59.0, max = 61.0 },
    { label = "border_firsts", min = 69.0, max = 71.0 },
]

[[groups]]
label = "In Between Sample"
prune = true
ranges = [
    { label = "mid_3rds", min = 44.0, max = 46.0 },
    { label = "mid_22s", min = 54.0, max = 56.0 },
    { label = "mid_21s", min = 64.0, max = 66.0 },
]
"#;
