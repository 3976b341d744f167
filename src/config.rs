//! Runtime configuration utilities for lit-triage.

use std::{
    env,
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::Deserialize;

use crate::{
    data::sample::SampleType,
    nlp::figure_text::{FigureTextConverter, FigureTextMode},
};

/// Field separator within a sample record.
pub const FIELD_SEP: char = '|';
/// Terminator written after every record (header and metadata lines included).
/// The trailing newline keeps a field ending in `;` unambiguous.
pub const RECORD_END: &str = ";;\n";

/// Delimiters of the flat sample file format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFormat {
    pub field_sep: char,
    pub record_end: String,
}

impl Default for RecordFormat {
    fn default() -> Self {
        Self {
            field_sep: FIELD_SEP,
            record_end: RECORD_END.to_string(),
        }
    }
}

impl RecordFormat {
    /// True if `value` can be written as one field and read back unchanged.
    /// Only the final field of a record may contain the field separator.
    pub fn can_hold(&self, value: &str, final_field: bool) -> bool {
        if !final_field && value.contains(self.field_sep) {
            return false;
        }
        let framed = format!("{value}{}", self.record_end);
        framed.find(self.record_end.as_str()) == Some(value.len())
    }

    /// Replace delimiter sequences in free text so it can be written safely.
    pub fn clean_delimiters(&self, text: &str) -> String {
        text.replace(self.record_end.as_str(), " ")
            .replace(self.field_sep, " ")
    }
}

/// Application configuration resolved from `.env` and defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Contact email for PubMed E-utilities courtesy policy.
    pub pubmed_email: String,
    /// Tool name sent with PubMed requests.
    pub pubmed_tool: String,
    /// Maximum PubMed records fetched per query.
    pub max_pubmed_results: usize,
    /// Root folder for analytic outputs.
    pub outputs_dir: PathBuf,
    /// Figure text strategy used by the plain `figureText` preprocessor.
    pub fig_conversion: FigureTextMode,
    /// Window size for the `legCloseWords` strategy.
    pub fig_conversion_nwords: usize,
    /// Sample type assumed for files without a metadata line.
    pub sample_type: SampleType,
}

impl Settings {
    /// Load configuration from environment with reasonable defaults.
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let pubmed_email =
            env::var("PUBMED_EMAIL").unwrap_or_else(|_| "research@example.com".to_string());
        let pubmed_tool = env::var("PUBMED_TOOL").unwrap_or_else(|_| "lit_triage".to_string());
        let max_pubmed_results = env::var("MAX_PUBMED_RESULTS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(500);
        let outputs_dir = env::var("OUTPUTS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./outputs"));
        let fig_conversion = match env::var("FIG_CONVERSION") {
            Ok(value) => value.parse().context("parsing FIG_CONVERSION")?,
            Err(_) => FigureTextMode::LegCloseWords,
        };
        let fig_conversion_nwords = match env::var("FIG_CONVERSION_NWORDS") {
            Ok(value) => value.parse().context("parsing FIG_CONVERSION_NWORDS")?,
            Err(_) => 50,
        };
        let sample_type = match env::var("SAMPLE_TYPE") {
            Ok(value) => value.parse().context("parsing SAMPLE_TYPE")?,
            Err(_) => SampleType::PrimTriageClassified,
        };

        Ok(Self {
            pubmed_email,
            pubmed_tool,
            max_pubmed_results,
            outputs_dir,
            fig_conversion,
            fig_conversion_nwords,
            sample_type,
        })
    }

    /// Figure text converter for the configured default strategy.
    pub fn figure_converter(&self) -> FigureTextConverter {
        FigureTextConverter::new(self.fig_conversion, self.fig_conversion_nwords)
    }

    /// Create the output directory on demand and join a path beneath it.
    pub fn join_output<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<PathBuf> {
        std::fs::create_dir_all(&self.outputs_dir).context("creating outputs dir")?;
        Ok(self.outputs_dir.join(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_delimiters_blanks_separators() {
        let format = RecordFormat::default();
        assert_eq!(format.clean_delimiters("a|b;;\nc;d;"), "a b c;d;");
        assert_eq!(format.clean_delimiters("a;;b"), "a;;b");
    }

    #[test]
    fn can_hold_checks_field_and_record_delimiters() {
        let format = RecordFormat::default();
        assert!(format.can_hold("see Table 1;", false));
        assert!(format.can_hold("a;;", true));
        assert!(format.can_hold("x|y", true));
        assert!(!format.can_hold("x|y", false));
        assert!(!format.can_hold("a;;\nb", true));
    }
}
