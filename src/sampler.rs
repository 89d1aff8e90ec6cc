use anyhow::Context;
use rand::Rng;

use crate::config::SamplerConfig;
use crate::copier::{self, CopyOutcome, CopyTarget, SubmissionIndex};
use crate::marksheet;
use crate::models::SampleSet;
use crate::select;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    SummaryOnly,
    Copy,
}

#[derive(Debug)]
pub struct GroupOutcome {
    pub set: SampleSet,
    pub copies: Option<CopyOutcome>,
}

pub fn run<R: Rng + ?Sized>(
    config: &SamplerConfig,
    mode: RunMode,
    rng: &mut R,
) -> anyhow::Result<Vec<GroupOutcome>> {
    let students = marksheet::load_marksheet(&config.marksheet)?;

    let index = match mode {
        RunMode::SummaryOnly => None,
        RunMode::Copy => {
            let index = SubmissionIndex::scan(&config.submissions_dir)?;
            if index.is_empty() {
                tracing::warn!(dir = %config.submissions_dir.display(), "submissions directory is empty");
            }
            std::fs::create_dir_all(&config.samples_dir).with_context(|| {
                format!("failed to create samples dir {}", config.samples_dir.display())
            })?;
            Some(index)
        }
    };
    let target = CopyTarget {
        samples_dir: &config.samples_dir,
        sample_name: &config.sample_name,
        layout: config.layout,
    };

    let mut outcomes = Vec::with_capacity(config.groups.len());
    for group in &config.groups {
        let set = select::build_sample(&students, group, &config.pruning, rng);
        let copies = match &index {
            Some(index) => {
                let outcome = copier::copy_samples(&set, index, &target)?;
                tracing::info!(
                    group = %set.label,
                    copied = outcome.copied.len(),
                    skipped = outcome.skipped.len(),
                    "group copied"
                );
                Some(outcome)
            }
            None => None,
        };

        outcomes.push(GroupOutcome { set, copies });
    }

    Ok(outcomes)
}
