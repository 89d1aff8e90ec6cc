use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod config;
mod copier;
mod error;
mod marksheet;
mod models;
mod report;
mod sampler;
mod select;

use config::{SamplerConfig, DEFAULT_CONFIG_PATH};
use sampler::RunMode;

#[derive(Parser)]
#[command(name = "moderation-sampler")]
#[command(about = "Pick moderation samples from a Moodle marksheet and copy their submissions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a commented configuration template
    Init {
        #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
        out: PathBuf,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the sample summaries without copying anything
    Summary {
        #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,
    },
    /// Print the summaries and copy sampled submissions
    Sample {
        #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("moderation_sampler=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { out, force } => {
            if out.exists() && !force {
                anyhow::bail!("{} already exists, pass --force to overwrite", out.display());
            }
            std::fs::write(&out, config::TEMPLATE)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Configuration template written to {}.", out.display());
        }
        Commands::Summary { config } => {
            let config = SamplerConfig::load(&config)?;
            let outcomes = sampler::run(&config, RunMode::SummaryOnly, &mut rand::thread_rng())?;

            for outcome in &outcomes {
                print!("{}", report::summarize_set(&outcome.set));
            }
        }
        Commands::Sample { config } => {
            let config = SamplerConfig::load(&config)?;
            let outcomes = sampler::run(&config, RunMode::Copy, &mut rand::thread_rng())?;

            for outcome in &outcomes {
                print!("{}", report::summarize_set(&outcome.set));
                if let Some(copies) = &outcome.copies {
                    println!("{}", report::summarize_copies(&outcome.set.label, copies));
                    println!();
                }
            }
            println!("Samples written to {}.", config.samples_dir.display());
        }
    }

    Ok(())
}
