//! src/counts.rs
use std::collections::BTreeMap;
use std::collections::btree_map;

/// Word to occurrence count. Serialises as a flat JSON object, keys sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct WordCounts(BTreeMap<String, u64>);

impl WordCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, word: &str) -> u64 {
        self.0.get(word).copied().unwrap_or(0)
    }

    pub fn add(&mut self, word: &str, count: u64) {
        match self.0.get_mut(word) {
            Some(current) => *current = current.saturating_add(count),
            None => {
                self.0.insert(word.to_string(), count);
            }
        }
    }

    pub fn increment(&mut self, word: &str) {
        self.add(word, 1);
    }

    /// Number of distinct words.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.0.values().fold(0u64, |acc, c| acc.saturating_add(*c))
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, u64> {
        self.0.iter()
    }

    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

impl<'a> IntoIterator for &'a WordCounts {
    type Item = (&'a String, &'a u64);
    type IntoIter = btree_map::Iter<'a, String, u64>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<S: Into<String>> FromIterator<(S, u64)> for WordCounts {
    fn from_iter<I: IntoIterator<Item = (S, u64)>>(iter: I) -> Self {
        let mut counts = WordCounts::new();
        for (word, count) in iter {
            let word: String = word.into();
            counts.add(&word, count);
        }
        counts
    }
}

impl From<BTreeMap<String, u64>> for WordCounts {
    fn from(map: BTreeMap<String, u64>) -> Self {
        Self(map)
    }
}
