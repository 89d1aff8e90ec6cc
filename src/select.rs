use rand::Rng;

use crate::models::{GradeRange, PruneConfig, SampleGroup, SampleSet, StudentRecord};

pub fn find_in_range(students: &[StudentRecord], range: &GradeRange) -> Vec<StudentRecord> {
    students
        .iter()
        .filter(|student| range.contains(student.grade))
        .cloned()
        .collect()
}

/// Largest in-between sample allowed for a cohort of `population` graded scripts.
pub fn target_size(population: usize, pruning: &PruneConfig) -> usize {
    let scaled = (population as f64 * pruning.fraction).ceil();
    let scaled = if scaled.is_finite() && scaled > 0.0 {
        scaled as usize
    } else {
        0
    };
    scaled.min(pruning.cap)
}

/// Keeps a uniform random subset of `target` records when there are more than
/// that, preserving the marksheet order of the survivors.
pub fn prune<R: Rng + ?Sized>(
    records: Vec<StudentRecord>,
    target: usize,
    rng: &mut R,
) -> Vec<StudentRecord> {
    if records.len() <= target {
        return records;
    }

    let mut keep = rand::seq::index::sample(rng, records.len(), target).into_vec();
    keep.sort_unstable();
    keep.into_iter().map(|idx| records[idx].clone()).collect()
}

pub fn build_sample<R: Rng + ?Sized>(
    students: &[StudentRecord],
    group: &SampleGroup,
    pruning: &PruneConfig,
    rng: &mut R,
) -> SampleSet {
    let target = target_size(students.len(), pruning);
    let mut records = Vec::new();

    for range in &group.ranges {
        let selected = find_in_range(students, range);
        let selected = if group.prune {
            let before = selected.len();
            let kept = prune(selected, target, rng);
            if kept.len() < before {
                tracing::debug!(range = %range.label, before, after = kept.len(), "pruned range");
            }
            kept
        } else {
            selected
        };
        records.extend(selected);
    }

    SampleSet {
        label: group.label.clone(),
        records,
    }
}

pub fn default_groups() -> Vec<SampleGroup> {
    vec![
        SampleGroup {
            label: "Firsts".to_string(),
            ranges: vec![GradeRange::new("firsts", 70.0, 100.0)],
            prune: false,
        },
        SampleGroup {
            label: "Fails".to_string(),
            ranges: vec![GradeRange::new("fails", 0.0, 39.9)],
            prune: false,
        },
        SampleGroup {
            label: "Borderlines".to_string(),
            ranges: vec![
                GradeRange::new("border_fails", 39.0, 41.0),
                GradeRange::new("border_22s", 49.0, 51.0),
                GradeRange::new("border_21s", 59.0, 61.0),
                GradeRange::new("border_firsts", 69.0, 71.0),
            ],
            prune: false,
        },
        SampleGroup {
            label: "In Between Sample".to_string(),
            ranges: vec![
                GradeRange::new("mid_3rds", 44.0, 46.0),
                GradeRange::new("mid_22s", 54.0, 56.0),
                GradeRange::new("mid_21s", 64.0, 66.0),
            ],
            prune: true,
        },
    ]
}
