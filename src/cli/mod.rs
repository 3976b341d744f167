//! Command-line interface wiring for lit-triage.

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::{
    config::Settings,
    data::sample_set::{SampleSet, WriteOptions},
    error::SampleError,
};

pub mod fetch;
pub mod figtext;
pub mod preprocess;
pub mod rows;
pub mod split;
pub mod stats;
pub mod train;

/// Top-level CLI definition.
#[derive(Debug, Parser)]
#[command(author, version, about = "Literature triage sample toolkit", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Parse CLI arguments from the environment.
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Dispatch the selected sub-command.
    pub async fn dispatch(self, settings: Settings) -> Result<()> {
        match self.command {
            Commands::Fetch(args) => fetch::run(args, settings).await,
            Commands::Rows(args) => rows::run(args, settings).await,
            Commands::Preprocess(args) => preprocess::run(args, settings).await,
            Commands::Figtext(args) => figtext::run(args, settings).await,
            Commands::Split(args) => split::run(args, settings).await,
            Commands::Stats(args) => stats::run(args, settings).await,
            Commands::Train(args) => train::run(args, settings).await,
        }
    }
}

/// Supported sub-commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Search PubMed and write unclassified samples.
    Fetch(fetch::Args),
    /// Convert a CSV export of curation database rows to a sample file.
    Rows(rows::Args),
    /// Apply named preprocessing steps to a sample file.
    Preprocess(preprocess::Args),
    /// Extract figure/table text from stdin.
    Figtext(figtext::Args),
    /// Randomly split sample files into retained and leftover sets.
    Split(split::Args),
    /// Report class counts and journal distribution.
    Stats(stats::Args),
    /// Train and evaluate a logistic regression classifier.
    Train(train::Args),
}

/// Read a sample file, falling back to the configured sample type when the
/// file has no metadata line.
pub(crate) fn load_samples(path: &Path, settings: &Settings) -> Result<SampleSet> {
    let text = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let mut set = SampleSet::new(None);
    match set.read_text(&text).map(|_| ()) {
        Ok(()) => Ok(set),
        Err(SampleError::MissingSampleType) => {
            let mut set = SampleSet::new(Some(settings.sample_type));
            set.read_text(&text)
                .with_context(|| format!("parse {}", path.display()))?;
            Ok(set)
        }
        Err(err) => Err(err).with_context(|| format!("parse {}", path.display())),
    }
}

/// Write a sample set to `output`, or stdout when it is `None` or `-`.
pub(crate) fn write_samples(
    set: &SampleSet,
    output: Option<&PathBuf>,
    options: WriteOptions,
) -> Result<()> {
    match output.filter(|p| p.as_os_str() != "-") {
        Some(path) => set
            .write_path(path, options)
            .with_context(|| format!("write {}", path.display())),
        None => {
            let stdout = io::stdout();
            let mut lock = stdout.lock();
            set.write(&mut lock, options).context("write samples to stdout")?;
            lock.flush()?;
            Ok(())
        }
    }
}
