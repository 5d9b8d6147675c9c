//! src/reducers/adder.rs
use crate::counts::WordCounts;
use crate::error::PipelineError;

/// Sums word counts key by key. A word missing from an input contributes 0.
///
/// The result does not depend on the order or grouping of the inputs.
/// Merging nothing is an error.
pub fn merge<I>(partials: I) -> Result<WordCounts, PipelineError>
where
    I: IntoIterator<Item = WordCounts>,
{
    let mut partials = partials.into_iter();
    let mut merged = partials.next().ok_or(PipelineError::EmptyInput)?;
    for partial in partials {
        for (word, count) in &partial {
            merged.add(word, *count);
        }
    }
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use claims::{assert_matches, assert_ok};

    fn counts(pairs: &[(&str, u64)]) -> WordCounts {
        pairs.iter().map(|(w, c)| (*w, *c)).collect()
    }

    fn samples() -> Vec<WordCounts> {
        vec![
            counts(&[("a", 1), ("b", 4)]),
            counts(&[("a", 2), ("c", 1)]),
            counts(&[]),
            counts(&[("b", 1), ("c", 3), ("d", 0)]),
        ]
    }

    #[test]
    fn sums_counts_per_word() {
        let merged = assert_ok!(merge(vec![counts(&[("a", 1)]), counts(&[("a", 2), ("b", 1)])]));
        assert_eq!(merged, counts(&[("a", 3), ("b", 1)]));
    }

    #[test]
    fn merging_one_mapping_returns_it_unchanged() {
        let single = counts(&[("x", 5), ("y", 0)]);
        assert_eq!(assert_ok!(merge(vec![single.clone()])), single);
    }

    #[test]
    fn merging_nothing_is_an_error() {
        assert_matches!(merge(Vec::new()), Err(PipelineError::EmptyInput));
    }

    #[test]
    fn order_of_inputs_does_not_matter() {
        let expected = assert_ok!(merge(samples()));
        let mut reversed = samples();
        reversed.reverse();
        assert_eq!(assert_ok!(merge(reversed)), expected);

        let mut rotated = samples();
        rotated.rotate_left(2);
        assert_eq!(assert_ok!(merge(rotated)), expected);
    }

    #[test]
    fn merging_in_batches_matches_merging_at_once() {
        let all = samples();
        let expected = assert_ok!(merge(all.clone()));
        let left = assert_ok!(merge(all[..2].to_vec()));
        let right = assert_ok!(merge(all[2..].to_vec()));
        assert_eq!(assert_ok!(merge(vec![left, right])), expected);
    }
}
