//! Sample records, sample files and their sources.

pub mod preprocess;
pub mod pubmed;
pub mod rows;
pub mod sample;
pub mod sample_set;
pub mod split;
