//! Named preprocessing steps.
//!
//! Pipelines are configured as ordered lists of step names, so every
//! [`Preprocessor`] round-trips through its name.

use std::{fmt, str::FromStr};

use crate::{
    data::sample::Sample,
    error::{Result, SampleError},
    nlp::{
        clean::Stem,
        figure_text::{FigureTextConverter, FigureTextMode},
    },
};

const FIGURE_TEXT: &str = "figureText";
const FIGURE_TEXT_LEGENDS: &str = "figureTextLegends";
const FIGURE_TEXT_LEG_PARAGRAPHS: &str = "figureTextLegParagraphs";
const FIGURE_TEXT_LEG_CLOSE_WORDS: &str = "figureTextLegCloseWords";

/// One preprocessing step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preprocessor {
    /// Figure text with the converter from [`PreprocessContext`].
    FigureText,
    /// Figure text with an explicit strategy.
    FigureTextWith(FigureTextConverter),
    FeatureTransform,
    RemoveUrls,
    RemoveUrlsCleanStem,
    TokenPerLine,
    TruncateText,
    RemoveText,
    AddJournalFeature,
    RejectIfNoMice,
    RejectReviews,
}

/// Collaborators shared by every step of one pipeline run.
pub struct PreprocessContext<'a> {
    pub figure_text: FigureTextConverter,
    pub stemmer: &'a dyn Stem,
}

impl<'a> PreprocessContext<'a> {
    pub fn new(figure_text: FigureTextConverter, stemmer: &'a dyn Stem) -> Self {
        Self {
            figure_text,
            stemmer,
        }
    }
}

impl Preprocessor {
    /// Apply this step to `sample` in place.
    pub fn apply<'s>(
        &self,
        sample: &'s mut Sample,
        ctx: &PreprocessContext<'_>,
    ) -> Result<&'s mut Sample> {
        Ok(match self {
            Self::FigureText => sample.figure_text(&ctx.figure_text),
            Self::FigureTextWith(converter) => sample.figure_text(converter),
            Self::FeatureTransform => sample.feature_transform(),
            Self::RemoveUrls => sample.remove_urls(),
            Self::RemoveUrlsCleanStem => sample.remove_urls_clean_stem(ctx.stemmer),
            Self::TokenPerLine => sample.token_per_line(),
            Self::TruncateText => sample.truncate_text(),
            Self::RemoveText => sample.remove_text(),
            Self::AddJournalFeature => sample.add_journal_feature()?,
            Self::RejectIfNoMice => sample.reject_if_no_mice(),
            Self::RejectReviews => sample.reject_reviews()?,
        })
    }
}

/// Resolve step names, failing on the first unknown one.
pub fn parse_steps<S: AsRef<str>>(names: &[S]) -> Result<Vec<Preprocessor>> {
    names.iter().map(|name| name.as_ref().parse()).collect()
}

impl FromStr for Preprocessor {
    type Err = SampleError;

    fn from_str(s: &str) -> Result<Self> {
        let step = match s {
            FIGURE_TEXT => Self::FigureText,
            FIGURE_TEXT_LEGENDS => {
                Self::FigureTextWith(FigureTextConverter::new(FigureTextMode::Legends, 0))
            }
            FIGURE_TEXT_LEG_PARAGRAPHS => {
                Self::FigureTextWith(FigureTextConverter::new(FigureTextMode::LegParagraphs, 0))
            }
            "featureTransform" => Self::FeatureTransform,
            "removeURLs" => Self::RemoveUrls,
            "removeURLsCleanStem" => Self::RemoveUrlsCleanStem,
            "tokenPerLine" => Self::TokenPerLine,
            "truncateText" => Self::TruncateText,
            "removeText" => Self::RemoveText,
            "addJournalFeature" => Self::AddJournalFeature,
            "rejectIfNoMice" => Self::RejectIfNoMice,
            "rejectReviews" => Self::RejectReviews,
            other => {
                let num_words = other
                    .strip_prefix(FIGURE_TEXT_LEG_CLOSE_WORDS)
                    .filter(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
                    .and_then(|n| n.parse().ok())
                    .ok_or_else(|| SampleError::UnknownPreprocessor(other.to_string()))?;
                Self::FigureTextWith(FigureTextConverter::new(
                    FigureTextMode::LegCloseWords,
                    num_words,
                ))
            }
        };
        Ok(step)
    }
}

impl fmt::Display for Preprocessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FigureText => f.write_str(FIGURE_TEXT),
            Self::FigureTextWith(converter) => match converter.mode() {
                FigureTextMode::Legends => f.write_str(FIGURE_TEXT_LEGENDS),
                FigureTextMode::LegParagraphs => f.write_str(FIGURE_TEXT_LEG_PARAGRAPHS),
                FigureTextMode::LegCloseWords => {
                    write!(f, "{FIGURE_TEXT_LEG_CLOSE_WORDS}{}", converter.num_words())
                }
            },
            Self::FeatureTransform => f.write_str("featureTransform"),
            Self::RemoveUrls => f.write_str("removeURLs"),
            Self::RemoveUrlsCleanStem => f.write_str("removeURLsCleanStem"),
            Self::TokenPerLine => f.write_str("tokenPerLine"),
            Self::TruncateText => f.write_str("truncateText"),
            Self::RemoveText => f.write_str("removeText"),
            Self::AddJournalFeature => f.write_str("addJournalFeature"),
            Self::RejectIfNoMice => f.write_str("rejectIfNoMice"),
            Self::RejectReviews => f.write_str("rejectReviews"),
        }
    }
}
