//! URL stripping, tokenisation and stemming applied to sample text fields.

use std::{borrow::Cow, fmt};

use once_cell::sync::Lazy;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};

use super::normalize::normalize;

static URLS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:https?://|www[.]|doi)\S*").expect("valid url regex"));

// Tokens kept for stemming: start with a letter or underscore, 2+ chars.
static STEM_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b[a-z_]\w+\b").expect("valid token regex"));

static WORD_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").expect("valid word regex"));

/// Word stemming capability injected into preprocessing.
pub trait Stem {
    fn stem<'a>(&self, word: &'a str) -> Cow<'a, str>;
}

/// Snowball stemmer (English).
pub struct SnowballStemmer {
    inner: Stemmer,
}

impl SnowballStemmer {
    pub fn english() -> Self {
        Self {
            inner: Stemmer::create(Algorithm::English),
        }
    }
}

impl Default for SnowballStemmer {
    fn default() -> Self {
        Self::english()
    }
}

impl fmt::Debug for SnowballStemmer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnowballStemmer").finish_non_exhaustive()
    }
}

impl Stem for SnowballStemmer {
    fn stem<'a>(&self, word: &'a str) -> Cow<'a, str> {
        self.inner.stem(word)
    }
}

/// Drop URLs and lowercase. Each remaining piece is prefixed with a space.
pub fn remove_urls(text: &str) -> String {
    URLS.split(text)
        .map(|piece| format!(" {}", piece.to_lowercase()))
        .collect()
}

/// Drop URLs, normalise tokens, lowercase, keep word tokens of two or more
/// characters and stem them. Output tokens are each prefixed with a space.
pub fn remove_urls_clean_stem(text: &str, stemmer: &dyn Stem) -> String {
    let mut output = String::with_capacity(text.len());
    for piece in URLS.split(text) {
        let piece = normalize(piece).to_lowercase();
        for token in STEM_TOKEN.find_iter(&piece) {
            output.push(' ');
            output.push_str(&stemmer.stem(token.as_str()));
        }
    }
    output
}

/// One word token per line, punctuation dropped.
pub fn token_per_line(text: &str) -> String {
    let mut output = String::with_capacity(text.len());
    for token in WORD_TOKEN.find_iter(text) {
        output.push_str(token.as_str());
        output.push('\n');
    }
    output
}

/// First `max_chars` characters of `text` with newlines flattened to spaces.
pub fn truncate_flat(text: &str, max_chars: usize) -> String {
    text.chars()
        .take(max_chars)
        .map(|c| if c == '\n' { ' ' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_are_removed_and_text_lowercased() {
        assert_eq!(
            remove_urls("My Abstract: w/ http://url.org end"),
            " my abstract: w/  end"
        );
        assert_eq!(remove_urls("see www.jax.org and doi:10.1/x."), " see  and ");
    }

    #[test]
    fn clean_stem_drops_short_tokens_and_stems() {
        let stemmer = SnowballStemmer::english();
        assert_eq!(
            remove_urls_clean_stem("My Title w/ Fig text", &stemmer),
            " my titl figur text"
        );
        assert_eq!(
            remove_urls_clean_stem("a knock out https://foo words -/-. Tables", &stemmer),
            " knock_out word mut_mut tabl"
        );
    }

    #[test]
    fn token_per_line_keeps_word_characters() {
        assert_eq!(token_per_line(" my abstract: w/ end"), "my\nabstract\nw\nend\n");
        assert_eq!(token_per_line("  "), "");
    }

    #[test]
    fn truncate_flat_counts_characters() {
        assert_eq!(truncate_flat("ab\ncd", 4), "ab c");
        assert_eq!(truncate_flat("short", 10), "short");
    }
}
