//! src/mappers/word_counter.rs
use crate::counts::WordCounts;
use regex::Regex;
use std::sync::LazyLock;

static WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("[a-z']+").expect("word pattern is valid"));

/// Lower-cases `text` and returns every maximal run of ASCII letters and
/// apostrophes, in order of appearance.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    WORD.find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

pub fn count_words(text: &str) -> WordCounts {
    let mut counts = WordCounts::new();
    for word in tokenize(text) {
        counts.increment(&word);
    }
    counts
}
