//! Figure and table text extraction from article body text.
//!
//! Article text is segmented into paragraphs on blank lines. Paragraphs that
//! open with a legend marker ("Figure 1", "Supplemental Table S2", ...) are
//! captions; other paragraphs may mention figures or tables in passing. The
//! three [`FigureTextMode`] strategies trade recall for volume of retained
//! text.

use std::{fmt, str::FromStr};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::error::{Result, SampleError};

/// Paragraph boundary in extracted article text.
pub const PARAGRAPH_BOUNDARY: &str = "\n\n";

// Plurals are not legend starts: "Figures 2 and 3 show ..." is narrative.
static LEGEND_START: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:(?:supp\w*|online|extended\s+data)\s+)?(?:figure|fig|table)\b")
        .expect("valid legend regex")
});

static FIGURE_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:figure|fig|table)s?\b").expect("valid figure word regex"));

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\S+").expect("valid word regex"));

/// Strategy for reducing article text to figure/table related text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum FigureTextMode {
    /// Only legend paragraphs.
    #[serde(rename = "legends")]
    Legends,
    /// Legend paragraphs plus any paragraph mentioning a figure or table.
    #[serde(rename = "legParagraphs")]
    LegParagraphs,
    /// Legend paragraphs plus word windows around figure/table mentions.
    #[serde(rename = "legCloseWords")]
    LegCloseWords,
}

impl FigureTextMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Legends => "legends",
            Self::LegParagraphs => "legParagraphs",
            Self::LegCloseWords => "legCloseWords",
        }
    }
}

impl FromStr for FigureTextMode {
    type Err = SampleError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "legends" => Ok(Self::Legends),
            "legParagraphs" => Ok(Self::LegParagraphs),
            "legCloseWords" => Ok(Self::LegCloseWords),
            other => Err(SampleError::UnknownFigureMode(other.to_string())),
        }
    }
}

impl fmt::Display for FigureTextMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Split text on [`PARAGRAPH_BOUNDARY`], trimming each paragraph.
///
/// Always yields at least one item; empty paragraphs are yielded as `""`.
pub fn paragraphs(text: &str) -> impl Iterator<Item = &str> {
    text.split(PARAGRAPH_BOUNDARY).map(str::trim)
}

/// True if the paragraph opens with a figure/table legend marker.
pub fn is_legend(paragraph: &str) -> bool {
    LEGEND_START.is_match(paragraph.trim_start())
}

/// True if the paragraph mentions a figure or table anywhere.
pub fn has_figure_word(paragraph: &str) -> bool {
    FIGURE_WORD.is_match(paragraph)
}

/// Configured figure text extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FigureTextConverter {
    mode: FigureTextMode,
    num_words: usize,
}

impl FigureTextConverter {
    pub fn new(mode: FigureTextMode, num_words: usize) -> Self {
        Self { mode, num_words }
    }

    pub fn mode(&self) -> FigureTextMode {
        self.mode
    }

    pub fn num_words(&self) -> usize {
        self.num_words
    }

    /// Return the figure/table related blurbs of `text`, in document order.
    pub fn extract<'a>(&self, text: &'a str) -> Vec<&'a str> {
        match self.mode {
            FigureTextMode::Legends => paragraphs(text).filter(|p| is_legend(p)).collect(),
            FigureTextMode::LegParagraphs => paragraphs(text)
                .filter(|p| is_legend(p) || has_figure_word(p))
                .collect(),
            FigureTextMode::LegCloseWords => {
                let mut blurbs = Vec::new();
                for paragraph in paragraphs(text) {
                    if is_legend(paragraph) {
                        blurbs.push(paragraph);
                    } else {
                        blurbs.extend(close_words(paragraph, self.num_words));
                    }
                }
                blurbs
            }
        }
    }
}

/// Extract figure text with a mode given by name.
pub fn extract<'a>(text: &'a str, mode: &str, num_words: usize) -> Result<Vec<&'a str>> {
    let mode = mode.parse::<FigureTextMode>()?;
    Ok(FigureTextConverter::new(mode, num_words).extract(text))
}

/// Inclusive range of word indices within one paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TextBlurb {
    first: usize,
    last: usize,
}

impl TextBlurb {
    fn around(word: usize, num_words: usize, last_word: usize) -> Self {
        Self {
            first: word.saturating_sub(num_words),
            last: word.saturating_add(num_words).min(last_word),
        }
    }

    /// Overlapping or directly adjacent blurbs are one contiguous span.
    fn overlaps(&self, other: &TextBlurb) -> bool {
        other.first <= self.last + 1 && self.first <= other.last + 1
    }

    fn merge_if_overlap(&mut self, other: &TextBlurb) -> bool {
        if !self.overlaps(other) {
            return false;
        }
        self.first = self.first.min(other.first);
        self.last = self.last.max(other.last);
        true
    }

    fn text<'a>(&self, paragraph: &'a str, words: &[(usize, usize)]) -> &'a str {
        &paragraph[words[self.first].0..words[self.last].1]
    }
}

/// Windows of `num_words` whitespace-delimited words either side of every
/// figure/table word in `paragraph`. Windows closer than `2 * num_words`
/// words apart are merged.
fn close_words(paragraph: &str, num_words: usize) -> Vec<&str> {
    let words: Vec<(usize, usize)> = WORD
        .find_iter(paragraph)
        .map(|m| (m.start(), m.end()))
        .collect();
    let Some(last_word) = words.len().checked_sub(1) else {
        return Vec::new();
    };

    let mut blurbs: Vec<TextBlurb> = Vec::new();
    for hit in FIGURE_WORD.find_iter(paragraph) {
        let word = words.partition_point(|&(_, end)| end <= hit.start());
        let window = TextBlurb::around(word, num_words, last_word);
        let merged = blurbs
            .last_mut()
            .is_some_and(|current| current.merge_if_overlap(&window));
        if !merged {
            blurbs.push(window);
        }
    }

    blurbs
        .iter()
        .map(|blurb| blurb.text(paragraph, &words))
        .collect()
}
