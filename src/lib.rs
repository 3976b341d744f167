//! Literature triage toolkit: sample records, text preprocessing and the
//! flat sample file format used to train relevance classifiers.

pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod logging;
pub mod nlp;

pub use error::{Result, SampleError};
