//! CLI entry-point for fetching PubMed articles as unclassified samples.

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use tokio::time::sleep;
use tracing::{info, instrument};

use crate::{
    cli::write_samples,
    config::Settings,
    data::{pubmed, sample_set::WriteOptions},
};

/// Args for the `fetch` sub-command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// PubMed search query.
    #[arg(long)]
    pub query: String,
    /// Override maximum PubMed records fetched.
    #[arg(long)]
    pub max_results: Option<usize>,
    /// Output sample file (stdout when omitted).
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let max_results = args.max_results.unwrap_or(settings.max_pubmed_results);

    info!(query = %args.query, "searching pubmed");
    let pmids = pubmed::search_pubmed(&args.query, max_results, &settings)
        .await
        .with_context(|| format!("search pubmed for {}", args.query))?;
    sleep(Duration::from_millis(350)).await; // be nice to E-utilities
    let records = pubmed::fetch_pubmed(&pmids, &settings)
        .await
        .with_context(|| format!("fetch pubmed records for {}", args.query))?;

    let set = pubmed::records_to_sample_set(&records, &args.query)?;
    write_samples(&set, args.output.as_ref(), WriteOptions::default())
}
