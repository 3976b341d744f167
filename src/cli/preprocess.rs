//! CLI entry-point applying a preprocessing pipeline to a sample file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use tracing::{info, instrument};

use crate::{
    cli::{load_samples, write_samples},
    config::Settings,
    data::{preprocess::PreprocessContext, sample_set::WriteOptions},
    nlp::clean::SnowballStemmer,
};

/// Args for the `preprocess` sub-command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Sample file to read.
    pub input: PathBuf,
    /// Comma separated step names, applied in order.
    #[arg(long, short, value_delimiter = ',')]
    pub steps: Vec<String>,
    /// Leave rejected samples out of the output.
    #[arg(long)]
    pub omit_rejects: bool,
    /// Output sample file (stdout when omitted).
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let mut set = load_samples(&args.input, &settings)?;
    let stemmer = SnowballStemmer::english();
    let ctx = PreprocessContext::new(settings.figure_converter(), &stemmer);

    let rejected = set
        .preprocess(&args.steps, &ctx)
        .with_context(|| format!("preprocess {}", args.input.display()))?
        .len();
    info!(
        samples = set.len(),
        rejected,
        steps = ?args.steps,
        "preprocessing complete"
    );

    let options = WriteOptions {
        omit_rejects: args.omit_rejects,
        ..WriteOptions::default()
    };
    write_samples(&set, args.output.as_ref(), options)
}
