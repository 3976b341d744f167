//! Logistic regression triage classifier trained on sample documents.

use anyhow::{bail, Context, Result};
use linfa::{
    dataset::DatasetBase,
    prelude::{Fit, Predict},
};
use linfa_logistic::LogisticRegression;
use ndarray::Array1;
use serde::Serialize;
use tracing::{info, warn};

use crate::{
    data::{sample_set::SampleSet, split::split_indices},
    nlp::vectorize::{CountVectorizer, VectorizerConfig},
};

/// Training run settings.
#[derive(Debug, Clone, Copy)]
pub struct TrainConfig {
    /// Fraction of samples held out for evaluation.
    pub test_fraction: f64,
    pub seed: u64,
    pub max_iterations: u64,
    pub vectorizer: VectorizerConfig,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            seed: 1,
            max_iterations: 150,
            vectorizer: VectorizerConfig::default(),
        }
    }
}

/// Confusion counts with respect to the positive class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Evaluation {
    pub true_positives: usize,
    pub false_positives: usize,
    pub true_negatives: usize,
    pub false_negatives: usize,
}

impl Evaluation {
    pub fn from_predictions(actual: &[usize], predicted: &[usize], positive: usize) -> Self {
        let mut eval = Self::default();
        for (&truth, &guess) in actual.iter().zip(predicted) {
            match (truth == positive, guess == positive) {
                (true, true) => eval.true_positives += 1,
                (false, true) => eval.false_positives += 1,
                (false, false) => eval.true_negatives += 1,
                (true, false) => eval.false_negatives += 1,
            }
        }
        eval
    }

    pub fn precision(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_positives)
    }

    pub fn recall(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_negatives)
    }

    /// F-beta score; beta > 1 weighs recall higher.
    pub fn f_score(&self, beta: f64) -> f64 {
        let (p, r) = (self.precision(), self.recall());
        let b2 = beta * beta;
        if p == 0.0 && r == 0.0 {
            return 0.0;
        }
        (1.0 + b2) * p * r / (b2 * p + r)
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// Summary of one train/evaluate run.
#[derive(Debug, Clone, Serialize)]
pub struct TrainReport {
    pub train_samples: usize,
    pub test_samples: usize,
    pub vocabulary: usize,
    pub positive_class: &'static str,
    pub evaluation: Evaluation,
}

/// Split `set`, fit on the training part and evaluate on the held out part.
/// Rejected samples are left out.
pub fn train_and_evaluate(set: &SampleSet, config: &TrainConfig) -> Result<TrainReport> {
    let documents = set.documents(true);
    let labels = set.known_y_values(true).context("collecting known classes")?;
    let (Some(positive), Some(class_names)) = (set.y_positive(), set.class_names()) else {
        bail!("sample set has no sample type");
    };

    let (test_idx, train_idx) = split_indices(documents.len(), config.test_fraction, config.seed);
    if train_idx.is_empty() || test_idx.is_empty() {
        bail!(
            "need samples on both sides of the split (train {}, test {})",
            train_idx.len(),
            test_idx.len()
        );
    }
    let pick = |idx: &[usize]| -> (Vec<String>, Vec<usize>) {
        idx.iter()
            .map(|&i| (documents[i].clone(), labels[i]))
            .unzip()
    };
    let (train_docs, train_y) = pick(&train_idx);
    let (test_docs, test_y) = pick(&test_idx);

    let vectorizer = CountVectorizer::fit(config.vectorizer, &train_docs);
    if vectorizer.is_empty() {
        bail!("vocabulary is empty after document frequency filtering");
    }
    info!(
        train = train_docs.len(),
        test = test_docs.len(),
        vocabulary = vectorizer.len(),
        "fitting logistic regression"
    );

    let dataset = DatasetBase::new(vectorizer.transform(&train_docs), Array1::from(train_y));
    let fitted = LogisticRegression::default()
        .max_iterations(config.max_iterations)
        .fit(&dataset)
        .context("fitting logistic regression")?;
    let predicted: Array1<usize> = fitted.predict(&vectorizer.transform(&test_docs));

    let evaluation = Evaluation::from_predictions(&test_y, &predicted.to_vec(), positive);
    if evaluation.true_positives + evaluation.false_negatives == 0 {
        warn!("no positive samples in the test split");
    }
    Ok(TrainReport {
        train_samples: train_docs.len(),
        test_samples: test_docs.len(),
        vocabulary: vectorizer.len(),
        positive_class: class_names[positive],
        evaluation,
    })
}
