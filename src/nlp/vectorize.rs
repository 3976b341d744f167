//! Bag of n-grams document vectorisation.

use std::collections::{BTreeMap, HashSet};

use ndarray::Array2;
use once_cell::sync::Lazy;
use regex::Regex;

static TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w\w+\b").expect("valid token regex"));

/// Vocabulary construction settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VectorizerConfig {
    /// Longest n-gram; unigrams are always included.
    pub ngram_max: usize,
    /// Terms in fewer than this fraction of documents are dropped.
    pub min_df: f64,
    /// Terms in more than this fraction of documents are dropped.
    pub max_df: f64,
    /// Record presence (1.0) instead of counts.
    pub binary: bool,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            ngram_max: 2,
            min_df: 0.02,
            max_df: 0.75,
            binary: true,
        }
    }
}

/// Term to column index mapping learned from a document collection.
#[derive(Debug, Clone)]
pub struct CountVectorizer {
    config: VectorizerConfig,
    vocabulary: BTreeMap<String, usize>,
}

impl CountVectorizer {
    /// Learn the vocabulary of `docs`. Columns follow term order.
    pub fn fit(config: VectorizerConfig, docs: &[String]) -> Self {
        let mut doc_freq: BTreeMap<String, usize> = BTreeMap::new();
        for doc in docs {
            let terms: HashSet<String> = ngrams(doc, config.ngram_max).into_iter().collect();
            for term in terms {
                *doc_freq.entry(term).or_default() += 1;
            }
        }

        let n_docs = docs.len() as f64;
        let vocabulary = doc_freq
            .into_iter()
            .filter(|(_, df)| {
                let df = *df as f64;
                df >= config.min_df * n_docs && df <= config.max_df * n_docs
            })
            .enumerate()
            .map(|(column, (term, _))| (term, column))
            .collect();
        Self { config, vocabulary }
    }

    /// Document-term matrix, one row per document.
    pub fn transform(&self, docs: &[String]) -> Array2<f64> {
        let mut matrix = Array2::<f64>::zeros((docs.len(), self.vocabulary.len()));
        for (row, doc) in docs.iter().enumerate() {
            for term in ngrams(doc, self.config.ngram_max) {
                if let Some(&column) = self.vocabulary.get(&term) {
                    let cell = &mut matrix[[row, column]];
                    if self.config.binary {
                        *cell = 1.0;
                    } else {
                        *cell += 1.0;
                    }
                }
            }
        }
        matrix
    }

    pub fn len(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vocabulary.is_empty()
    }

    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.vocabulary.keys().map(String::as_str)
    }
}

/// Lowercased word n-grams of length 1..=`ngram_max`, space joined.
pub fn ngrams(doc: &str, ngram_max: usize) -> Vec<String> {
    let lowered = doc.to_lowercase();
    let tokens: Vec<&str> = TOKEN.find_iter(&lowered).map(|m| m.as_str()).collect();
    let mut grams = Vec::new();
    for n in 1..=ngram_max.max(1) {
        grams.extend(tokens.windows(n).map(|w| w.join(" ")));
    }
    grams
}
