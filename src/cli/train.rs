//! CLI entry-point training and evaluating the triage classifier.

use std::{fs::File, path::PathBuf};

use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use tracing::{info, instrument};

use crate::{
    cli::load_samples,
    config::Settings,
    data::preprocess::PreprocessContext,
    nlp::{
        classifier::{train_and_evaluate, TrainConfig},
        clean::SnowballStemmer,
        vectorize::VectorizerConfig,
    },
};

/// Args for the `train` sub-command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Classified sample file.
    pub input: PathBuf,
    /// Comma separated preprocessing steps applied before training.
    #[arg(long, value_delimiter = ',')]
    pub steps: Vec<String>,
    /// Fraction of samples held out for evaluation.
    #[arg(long, default_value_t = 0.2)]
    pub test_fraction: f64,
    #[arg(long, default_value_t = 1)]
    pub seed: u64,
    #[arg(long, default_value_t = 150)]
    pub max_iterations: u64,
    /// Longest word n-gram used as a feature.
    #[arg(long, default_value_t = 2)]
    pub ngram_max: usize,
    #[arg(long, default_value_t = 0.02)]
    pub min_df: f64,
    #[arg(long, default_value_t = 0.75)]
    pub max_df: f64,
    /// Write the evaluation report as JSON under the outputs dir.
    #[arg(long)]
    pub report: Option<PathBuf>,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let mut set = load_samples(&args.input, &settings)?;
    if !args.steps.is_empty() {
        let stemmer = SnowballStemmer::english();
        let ctx = PreprocessContext::new(settings.figure_converter(), &stemmer);
        set.preprocess(&args.steps, &ctx)
            .with_context(|| format!("preprocess {}", args.input.display()))?;
    }

    let config = TrainConfig {
        test_fraction: args.test_fraction,
        seed: args.seed,
        max_iterations: args.max_iterations,
        vectorizer: VectorizerConfig {
            ngram_max: args.ngram_max,
            min_df: args.min_df,
            max_df: args.max_df,
            binary: true,
        },
    };
    let report = train_and_evaluate(&set, &config)?;
    let eval = report.evaluation;
    println!(
        "positive class '{}': precision {:.3} recall {:.3} f1 {:.3} (tp {} fp {} tn {} fn {})",
        report.positive_class,
        eval.precision(),
        eval.recall(),
        eval.f_score(1.0),
        eval.true_positives,
        eval.false_positives,
        eval.true_negatives,
        eval.false_negatives,
    );

    if let Some(name) = &args.report {
        let path = settings.join_output(name)?;
        let file = File::create(&path).with_context(|| format!("create {path:?}"))?;
        serde_json::to_writer_pretty(file, &report)?;
        info!(path = %path.display(), "wrote training report");
    }
    Ok(())
}
