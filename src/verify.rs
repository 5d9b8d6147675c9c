//! src/verify.rs
use crate::counts::WordCounts;
use crate::mappers::count_words;

/// Comparison of a reduce result against a direct count of the source.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Verification {
    pub baseline_unique_words: usize,
    pub result_unique_words: usize,
    /// Counts the result is short of, per word.
    pub missing: WordCounts,
    /// Counts the result has beyond the baseline, per word.
    pub extra: WordCounts,
}

impl Verification {
    pub fn is_exact(&self) -> bool {
        self.missing.is_empty() && self.extra.is_empty()
    }

    /// No word is counted more often than it occurs. Words lost at chunk
    /// boundaries still leave a result consistent.
    pub fn is_consistent(&self) -> bool {
        self.extra.is_empty()
    }
}

pub fn verify(source_text: &str, result: &WordCounts) -> Verification {
    let baseline = count_words(source_text);
    Verification {
        baseline_unique_words: baseline.len(),
        result_unique_words: result.iter().filter(|(_, count)| **count > 0).count(),
        missing: positive_difference(&baseline, result),
        extra: positive_difference(result, &baseline),
    }
}

fn positive_difference(left: &WordCounts, right: &WordCounts) -> WordCounts {
    left.iter()
        .filter_map(|(word, count)| {
            let diff = count.saturating_sub(right.get(word));
            (diff > 0).then(|| (word.clone(), diff))
        })
        .collect()
}
