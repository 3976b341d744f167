//! CLI entry-point printing the figure/table text of stdin.

use std::io::{self, Read, Write};

use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use tracing::{debug, instrument};

use crate::{
    config::Settings,
    nlp::figure_text::{FigureTextConverter, FigureTextMode},
};

const SEPARATOR: &str = "----------";

/// Args for the `figtext` sub-command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// legends, legParagraphs or legCloseWords (defaults to FIG_CONVERSION).
    #[arg(long)]
    pub mode: Option<String>,
    /// Words either side of a mention for legCloseWords.
    #[arg(long)]
    pub num_words: Option<usize>,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let mode = match &args.mode {
        Some(mode) => mode.parse::<FigureTextMode>()?,
        None => settings.fig_conversion,
    };
    let converter = FigureTextConverter::new(
        mode,
        args.num_words.unwrap_or(settings.fig_conversion_nwords),
    );

    let mut text = String::new();
    io::stdin()
        .read_to_string(&mut text)
        .context("read text from stdin")?;
    let blurbs = converter.extract(&text);
    debug!(blurbs = blurbs.len(), %mode, "extracted figure text");

    let mut out = io::stdout().lock();
    for blurb in blurbs {
        writeln!(out, "{blurb}\n{SEPARATOR}")?;
    }
    out.flush()?;
    Ok(())
}
