use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::models::{SampleSet, SubmissionLayout};

/// One top-level entry of the submissions directory. Matching runs against
/// the lossy UTF-8 form; copying uses the name exactly as the filesystem
/// returned it.
#[derive(Debug, Clone)]
pub struct SubmissionEntry {
    file_name: OsString,
    name: String,
}

impl SubmissionEntry {
    pub fn new(file_name: impl Into<OsString>) -> Self {
        let file_name = file_name.into();
        let name = file_name.to_string_lossy().into_owned();
        Self { file_name, name }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn file_name(&self) -> &OsStr {
        &self.file_name
    }
}

/// Top-level entries of the extracted submissions directory, in the order the
/// filesystem listed them.
#[derive(Debug, Clone)]
pub struct SubmissionIndex {
    root: PathBuf,
    entries: Vec<SubmissionEntry>,
}

impl SubmissionIndex {
    pub fn scan(root: &Path) -> anyhow::Result<Self> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(root)
            .with_context(|| format!("failed to list submissions in {}", root.display()))?
        {
            entries.push(entry?.file_name());
        }

        tracing::debug!(root = %root.display(), entries = entries.len(), "indexed submissions");
        Ok(Self::new(root, entries))
    }

    pub fn new<I>(root: &Path, entries: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<OsString>,
    {
        Self {
            root: root.to_path_buf(),
            entries: entries.into_iter().map(SubmissionEntry::new).collect(),
        }
    }

    /// First entry whose name contains `full_name`. Listing order decides
    /// ties, so two students sharing a name fragment resolve to whichever
    /// entry the filesystem returned first.
    pub fn find(&self, full_name: &str) -> Option<&SubmissionEntry> {
        if full_name.is_empty() {
            return None;
        }
        self.entries
            .iter()
            .find(|entry| entry.name().contains(full_name))
    }

    pub fn path_of(&self, entry: &SubmissionEntry) -> PathBuf {
        self.root.join(&entry.file_name)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Where and how sample copies are written.
#[derive(Debug, Clone, Copy)]
pub struct CopyTarget<'a> {
    pub samples_dir: &'a Path,
    pub sample_name: &'a str,
    pub layout: SubmissionLayout,
}

#[derive(Debug, Default)]
pub struct CopyOutcome {
    pub copied: Vec<PathBuf>,
    pub skipped: Vec<String>,
}

/// Copies every matched submission of `set` into the samples directory.
/// Unmatched students are skipped without error; filesystem failures abort.
pub fn copy_samples(
    set: &SampleSet,
    index: &SubmissionIndex,
    target: &CopyTarget<'_>,
) -> anyhow::Result<CopyOutcome> {
    let mut outcome = CopyOutcome::default();

    for (position, student) in set.records.iter().enumerate() {
        let Some(entry) = index.find(&student.full_name) else {
            tracing::debug!(set = %set.label, student = %student.full_name, "no submission found");
            outcome.skipped.push(student.full_name.clone());
            continue;
        };

        let source = index.path_of(entry);
        let base = sample_file_name(target.sample_name, student.grade, position + 1);

        let destination = match target.layout {
            SubmissionLayout::Folders => {
                let destination = target.samples_dir.join(&base);
                copy_dir_all(&source, &destination).with_context(|| {
                    format!(
                        "failed to copy {} to {}",
                        source.display(),
                        destination.display()
                    )
                })?;
                destination
            }
            SubmissionLayout::Files => {
                let file_name = match Path::new(entry.file_name()).extension() {
                    Some(ext) => format!("{base}.{}", ext.to_string_lossy()),
                    None => base,
                };
                let destination = target.samples_dir.join(file_name);
                fs::copy(&source, &destination).with_context(|| {
                    format!(
                        "failed to copy {} to {}",
                        source.display(),
                        destination.display()
                    )
                })?;
                destination
            }
        };

        tracing::debug!(set = %set.label, from = %source.display(), to = %destination.display(), "copied sample");
        outcome.copied.push(destination);
    }

    Ok(outcome)
}

/// `{sample_name}_{grade}_sample{position}`. The position restarts for every
/// sample set, so the same student and grade can produce the same name twice.
pub fn sample_file_name(sample_name: &str, grade: f64, position: usize) -> String {
    format!("{sample_name}_{}_sample{position}", format_grade(grade))
}

/// Whole grades keep one decimal place, as the marksheet export prints them.
pub fn format_grade(grade: f64) -> String {
    if grade.fract() == 0.0 {
        format!("{grade:.1}")
    } else {
        grade.to_string()
    }
}

/// Recursive copy that merges into an existing destination.
fn copy_dir_all(source: &Path, destination: &Path) -> std::io::Result<()> {
    fs::create_dir_all(destination)?;
    for entry in fs::read_dir(source)? {
        let entry = entry?;
        let target = destination.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir_all(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), target)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StudentRecord;
    use tempfile::tempdir;

    fn student(name: &str, grade: f64) -> StudentRecord {
        StudentRecord {
            full_name: name.to_string(),
            username: name.to_lowercase().replace(' ', "."),
            grade,
            initials: crate::marksheet::initials(name),
        }
    }

    fn set(label: &str, records: Vec<StudentRecord>) -> SampleSet {
        SampleSet {
            label: label.to_string(),
            records,
        }
    }

    #[test]
    fn matches_only_the_entry_containing_the_name() {
        let index = SubmissionIndex::new(
            Path::new("originals"),
            vec!["John Smith_12345".to_string(), "Jane Smith_67890".to_string()],
        );

        let found = |name: &str| index.find(name).map(SubmissionEntry::name);
        assert_eq!(found("John Smith"), Some("John Smith_12345"));
        assert_eq!(found("Jane Smith"), Some("Jane Smith_67890"));
        assert_eq!(found("Smith_"), Some("John Smith_12345"));
        assert!(index.find("").is_none());
    }

    #[test]
    fn known_limitation_first_listed_entry_wins_on_ambiguous_names() {
        let index = SubmissionIndex::new(
            Path::new("originals"),
            vec![
                "Joann Lee_222_assignsubmission_file_".to_string(),
                "Ann Lee_111_assignsubmission_file_".to_string(),
            ],
        );

        assert_eq!(
            index.find("Ann Lee").map(SubmissionEntry::name),
            Some("Joann Lee_222_assignsubmission_file_")
        );
    }

    #[test]
    fn formats_grades_like_the_marksheet() {
        assert_eq!(format_grade(70.0), "70.0");
        assert_eq!(format_grade(39.9), "39.9");
        assert_eq!(format_grade(100.0), "100.0");
        assert_eq!(
            sample_file_name("ME12345_S1_23-24_", 72.5, 3),
            "ME12345_S1_23-24__72.5_sample3"
        );
    }

    #[test]
    fn copies_folders_recursively_and_merges() {
        let originals = tempdir().unwrap();
        let samples = tempdir().unwrap();
        let submission = originals.path().join("John Smith_12345_assignsubmission_file_");
        fs::create_dir_all(submission.join("code")).unwrap();
        fs::write(submission.join("report.pdf"), "report").unwrap();
        fs::write(submission.join("code").join("main.m"), "disp(1)").unwrap();

        let existing = samples.path().join("UNIT__72.0_sample1");
        fs::create_dir_all(&existing).unwrap();
        fs::write(existing.join("notes.txt"), "moderator notes").unwrap();

        let index = SubmissionIndex::scan(originals.path()).unwrap();
        let target = CopyTarget {
            samples_dir: samples.path(),
            sample_name: "UNIT_",
            layout: SubmissionLayout::Folders,
        };
        let outcome =
            copy_samples(&set("Firsts", vec![student("John Smith", 72.0)]), &index, &target)
                .unwrap();

        assert_eq!(outcome.copied, vec![existing.clone()]);
        assert!(outcome.skipped.is_empty());
        assert_eq!(fs::read_to_string(existing.join("report.pdf")).unwrap(), "report");
        assert_eq!(
            fs::read_to_string(existing.join("code").join("main.m")).unwrap(),
            "disp(1)"
        );
        assert!(existing.join("notes.txt").exists());
    }

    #[test]
    fn copies_single_files_with_their_extension() {
        let originals = tempdir().unwrap();
        let samples = tempdir().unwrap();
        fs::write(originals.path().join("Jane Doe_67890_essay.docx"), "essay").unwrap();
        fs::write(samples.path().join("UNIT__38.5_sample1.docx"), "stale").unwrap();

        let index = SubmissionIndex::scan(originals.path()).unwrap();
        let target = CopyTarget {
            samples_dir: samples.path(),
            sample_name: "UNIT_",
            layout: SubmissionLayout::Files,
        };
        let outcome =
            copy_samples(&set("Fails", vec![student("Jane Doe", 38.5)]), &index, &target)
                .unwrap();

        let expected = samples.path().join("UNIT__38.5_sample1.docx");
        assert_eq!(outcome.copied, vec![expected.clone()]);
        assert_eq!(fs::read_to_string(expected).unwrap(), "essay");
    }

    #[test]
    fn known_limitation_unmatched_students_are_skipped_silently() {
        let originals = tempdir().unwrap();
        let samples = tempdir().unwrap();
        fs::create_dir(originals.path().join("John Smith_12345")).unwrap();

        let index = SubmissionIndex::scan(originals.path()).unwrap();
        let target = CopyTarget {
            samples_dir: samples.path(),
            sample_name: "UNIT_",
            layout: SubmissionLayout::Folders,
        };
        let outcome = copy_samples(
            &set(
                "Firsts",
                vec![student("Nobody Here", 80.0), student("John Smith", 75.0)],
            ),
            &index,
            &target,
        )
        .unwrap();

        assert_eq!(outcome.skipped, vec!["Nobody Here".to_string()]);
        // The skipped student still consumes position 1.
        assert_eq!(
            outcome.copied,
            vec![samples.path().join("UNIT__75.0_sample2")]
        );
        assert!(!samples.path().join("UNIT__80.0_sample1").exists());
        assert_eq!(fs::read_dir(samples.path()).unwrap().count(), 1);
    }

    #[test]
    fn missing_source_folder_is_fatal() {
        let originals = tempdir().unwrap();
        let samples = tempdir().unwrap();
        let index = SubmissionIndex::new(originals.path(), vec!["John Smith_gone".to_string()]);
        let target = CopyTarget {
            samples_dir: samples.path(),
            sample_name: "UNIT_",
            layout: SubmissionLayout::Folders,
        };

        let result = copy_samples(&set("Firsts", vec![student("John Smith", 90.0)]), &index, &target);

        assert!(result.is_err());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn copies_entries_whose_names_are_not_utf8() {
        use std::os::unix::ffi::OsStrExt;

        let originals = tempdir().unwrap();
        let samples = tempdir().unwrap();
        let raw = OsStr::from_bytes(b"John Smith_12345_caf\xe9");
        let submission = originals.path().join(raw);
        fs::create_dir(&submission).unwrap();
        fs::write(submission.join("a.txt"), "work").unwrap();

        let index = SubmissionIndex::scan(originals.path()).unwrap();
        let entry = index.find("John Smith").unwrap();
        assert_eq!(entry.file_name(), raw);
        assert_eq!(index.path_of(entry), submission);

        let target = CopyTarget {
            samples_dir: samples.path(),
            sample_name: "UNIT_",
            layout: SubmissionLayout::Folders,
        };
        let outcome =
            copy_samples(&set("Firsts", vec![student("John Smith", 80.0)]), &index, &target)
                .unwrap();

        let expected = samples.path().join("UNIT__80.0_sample1");
        assert_eq!(outcome.copied, vec![expected.clone()]);
        assert_eq!(fs::read_to_string(expected.join("a.txt")).unwrap(), "work");
    }
}
