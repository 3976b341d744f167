//! Text processing: figure text extraction, token normalisation, cleaning
//! and the document classifier.

pub mod classifier;
pub mod clean;
pub mod figure_text;
pub mod normalize;
pub mod vectorize;
