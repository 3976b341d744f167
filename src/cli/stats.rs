//! CLI entry-point summarising sample files.

use std::{
    collections::BTreeMap,
    io::{self, Write},
    path::PathBuf,
};

use anyhow::Result;
use clap::Args as ClapArgs;
use tracing::instrument;

use crate::{cli::load_samples, config::Settings, data::sample_set::SampleSet};

/// Args for the `stats` sub-command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Sample files to summarise.
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,
    /// Also print sample counts per journal.
    #[arg(long)]
    pub journals: bool,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let mut out = io::stdout().lock();
    for path in &args.inputs {
        let set = load_samples(path, &settings)?;
        writeln!(out, "{}", path.display())?;
        write_summary(&mut out, &set)?;
        if args.journals {
            write_journal_distribution(&mut out, &set)?;
        }
    }
    out.flush()?;
    Ok(())
}

fn write_summary<W: Write>(out: &mut W, set: &SampleSet) -> Result<()> {
    let total = set.len();
    let pct = |n: usize| {
        if total == 0 {
            0.0
        } else {
            100.0 * n as f64 / total as f64
        }
    };
    writeln!(
        out,
        "  type: {}",
        set.sample_type().map(|t| t.name()).unwrap_or("-")
    )?;
    writeln!(out, "  samples: {total}")?;
    if let Some([first, second]) = set.class_names() {
        let (positive, negative) = match set.y_positive() {
            Some(0) => (first, second),
            _ => (second, first),
        };
        writeln!(
            out,
            "  positive ({positive}): {} ({:.1}%)",
            set.num_positives(),
            pct(set.num_positives())
        )?;
        writeln!(
            out,
            "  negative ({negative}): {} ({:.1}%)",
            set.num_negatives(),
            pct(set.num_negatives())
        )?;
    }
    writeln!(out, "  rejected: {}", set.rejects().len())?;
    writeln!(out, "  journals: {}", set.journals().len())?;
    Ok(())
}

fn write_journal_distribution<W: Write>(out: &mut W, set: &SampleSet) -> Result<()> {
    // journal -> (samples, positives)
    let mut counts: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for sample in set {
        if let Some(journal) = sample.journal() {
            let entry = counts.entry(journal).or_default();
            entry.0 += 1;
            entry.1 += usize::from(sample.is_positive());
        }
    }
    for (journal, (samples, positives)) in counts {
        writeln!(out, "    {journal}\t{samples}\t{positives}")?;
    }
    Ok(())
}
