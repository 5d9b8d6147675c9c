//! src/text_splitter.rs
//!
//! Divides a text into a fixed number of chunks of roughly equal byte length
//! without cutting through a word.

pub const DEFAULT_CHUNK_COUNT: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk<'a> {
    pub index: usize,
    pub text: &'a str,
}

/// Requested counts of zero or less mean [`DEFAULT_CHUNK_COUNT`].
pub fn effective_chunk_count(requested: i64) -> usize {
    if requested <= 0 {
        DEFAULT_CHUNK_COUNT
    } else {
        usize::try_from(requested).unwrap_or(usize::MAX)
    }
}

/// Splits `text` into exactly `chunk_count` chunks (at least one), produced
/// lazily in index order.
///
/// The target chunk size is `S = ceil(len / n)` and chunk `i` starts from the
/// raw byte range `[i·S, (i+1)·S)` clipped to the text. A start inside a word
/// moves forward to the next whitespace byte and an end inside a word moves
/// back to just after the previous one. Each chunk is trimmed on its own, so
/// a word straddling a raw boundary lands in neither neighbour.
pub fn split_text(text: &str, chunk_count: usize) -> impl ExactSizeIterator<Item = Chunk<'_>> {
    let count = chunk_count.max(1);
    let bytes = text.as_bytes();
    let len = bytes.len();
    let target = len.div_ceil(count);

    (0..count).map(move |index| {
        let start = index.saturating_mul(target).min(len);
        let end = index.saturating_add(1).saturating_mul(target).min(len);
        let (start, end) = trim_to_words(bytes, start, end);
        // Adjusted edges sit at the text edges or next to an ASCII
        // whitespace byte, so both are char boundaries.
        let text = if start < end { &text[start..end] } else { "" };
        Chunk { index, text }
    })
}

fn trim_to_words(bytes: &[u8], mut start: usize, mut end: usize) -> (usize, usize) {
    let len = bytes.len();
    if start >= end {
        return (start, end);
    }
    if start > 0 && !bytes[start].is_ascii_whitespace() && !bytes[start - 1].is_ascii_whitespace()
    {
        while start < end && !bytes[start].is_ascii_whitespace() {
            start += 1;
        }
    }
    if end < len && !bytes[end - 1].is_ascii_whitespace() && !bytes[end].is_ascii_whitespace() {
        while end > start && !bytes[end - 1].is_ascii_whitespace() {
            end -= 1;
        }
    }
    (start, end)
}
