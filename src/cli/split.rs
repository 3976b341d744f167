//! CLI entry-point splitting sample files into retained and leftover sets.

use std::{
    collections::BTreeSet,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use clap::Args as ClapArgs;
use tracing::{info, instrument};

use crate::{
    cli::{load_samples, write_samples},
    config::Settings,
    data::{sample_set::WriteOptions, split::split_sample_set},
};

/// Args for the `split` sub-command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Sample files of one sample type.
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,
    /// Fraction of samples to retain.
    #[arg(long, default_value_t = 0.2)]
    pub fraction: f64,
    /// Random seed (random when omitted).
    #[arg(long)]
    pub seed: Option<u64>,
    /// File of monitored journal names, one per line.
    #[arg(long)]
    pub journals: Option<PathBuf>,
    /// Output file for the retained samples.
    #[arg(long)]
    pub retained: PathBuf,
    /// Output file for the leftover samples.
    #[arg(long)]
    pub leftover: PathBuf,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    if !(0.0..=1.0).contains(&args.fraction) {
        bail!("fraction must be within 0..=1, got {}", args.fraction);
    }
    let mut inputs = args.inputs.iter();
    let Some(first) = inputs.next() else {
        bail!("no input files");
    };
    let mut merged = load_samples(first, &settings)?;
    for path in inputs {
        let set = load_samples(path, &settings)?;
        merged
            .add_samples(set.iter_samples(false).cloned())
            .with_context(|| format!("merge {}", path.display()))?;
    }

    let journals = match &args.journals {
        Some(path) => Some(read_journals(path)?),
        None => None,
    };
    let seed = args.seed.unwrap_or_else(rand::random);
    info!(seed, fraction = args.fraction, "splitting samples");

    let (retained, leftover) =
        split_sample_set(&merged, args.fraction, seed, journals.as_ref())?;
    write_samples(&retained, Some(&args.retained), WriteOptions::default())?;
    write_samples(&leftover, Some(&args.leftover), WriteOptions::default())
}

/// Journal names as stored on samples: spaces become `_`.
fn read_journals(path: &Path) -> Result<BTreeSet<String>> {
    let text = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| line.replace(' ', "_"))
        .collect())
}
