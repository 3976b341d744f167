//! Error types for the sample record model and text pipeline.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SampleError>;

#[derive(Debug, Error)]
pub enum SampleError {
    #[error("record has {found} fields, {sample_type} expects {expected}")]
    FieldCount {
        sample_type: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("invalid sample class name '{0}'")]
    InvalidClassName(String),

    #[error("unknown field '{field}' for {sample_type}")]
    UnknownField {
        sample_type: &'static str,
        field: String,
    },

    #[error("invalid value '{value}' for field '{field}'")]
    InvalidFieldValue { field: &'static str, value: String },

    #[error("unknown sample type '{0}'")]
    UnknownSampleType(String),

    #[error("unknown preprocessing step '{0}'")]
    UnknownPreprocessor(String),

    #[error("unknown figure text mode '{0}' (expected legends, legParagraphs or legCloseWords)")]
    UnknownFigureMode(String),

    #[error("invalid sample type {found}, sample set holds {expected}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("{sample_type} has no {capability} fields")]
    MissingCapability {
        sample_type: &'static str,
        capability: &'static str,
    },

    #[error("classified sample '{id}' has no known class")]
    MissingKnownClass { id: String },

    #[error("field '{field}' of sample '{id}' contains a record delimiter: {value:?}")]
    DelimiterInField {
        id: String,
        field: &'static str,
        value: String,
    },

    #[error("sample input is empty")]
    EmptyInput,

    #[error("sample type not given and input carries no metadata line")]
    MissingSampleType,

    #[error("sample record {index} ({snippet:?}): {source}")]
    Record {
        index: usize,
        snippet: String,
        #[source]
        source: Box<SampleError>,
    },

    #[error("preprocessor '{step}' failed on sample {index}; last processed: {last_ok}")]
    Preprocess {
        step: String,
        index: usize,
        last_ok: String,
        #[source]
        source: Box<SampleError>,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
