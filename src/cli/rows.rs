//! CLI entry-point converting curation database row exports to samples.

use std::{fs::File, path::PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Args as ClapArgs;
use tracing::instrument;

use crate::{
    cli::write_samples,
    config::{RecordFormat, Settings},
    data::{
        rows::{read_csv_rows, RowCleaning},
        sample::SampleType,
        sample_set::WriteOptions,
    },
};

/// Args for the `rows` sub-command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// CSV export with a header row.
    pub input: PathBuf,
    /// Sample type to build (defaults to SAMPLE_TYPE).
    #[arg(long)]
    pub sample_type: Option<String>,
    /// Truncate text fields to this many characters (debugging aid).
    #[arg(long)]
    pub text_length: Option<usize>,
    /// Database host recorded in the metadata line.
    #[arg(long, default_value = "unknown")]
    pub host: String,
    /// Database name recorded in the metadata line.
    #[arg(long, default_value = "unknown")]
    pub db: String,
    /// Output sample file (stdout when omitted).
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let sample_type = match &args.sample_type {
        Some(name) => name.parse::<SampleType>()?,
        None => settings.sample_type,
    };
    let cleaning = RowCleaning {
        format: RecordFormat::default(),
        max_text_length: args.text_length,
    };
    let file = File::open(&args.input).with_context(|| format!("open {:?}", args.input))?;
    let mut set = read_csv_rows(file, sample_type, &cleaning)
        .with_context(|| format!("convert rows from {:?}", args.input))?;
    set.set_meta_item("host", &args.host)
        .set_meta_item("db", &args.db)
        .set_meta_item("time", Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string());

    write_samples(&set, args.output.as_ref(), WriteOptions::default())
}
