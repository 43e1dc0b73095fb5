//! Half-open text spans.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

/// A half-open range `[begin, end)` of character offsets into a segment's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Span {
    /// Inclusive start offset
    pub begin: usize,
    /// Exclusive end offset
    pub end: usize,
}

impl Span {
    /// Create a new span.
    pub fn new(begin: usize, end: usize) -> Self {
        debug_assert!(begin <= end, "span begin {} after end {}", begin, end);
        Self { begin, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.begin
    }

    pub fn is_empty(&self) -> bool {
        self.begin == self.end
    }

    /// Returns true if `other` lies entirely inside this span.
    pub fn covers(&self, other: Span) -> bool {
        self.begin <= other.begin && other.end <= self.end
    }

    /// The character range.
    pub fn range(&self) -> Range<usize> {
        self.begin..self.end
    }

    /// Covered text, or `None` when the span falls outside `text`.
    pub fn text<'t>(&self, text: &'t str) -> Option<&'t str> {
        let begin = byte_offset(text, self.begin)?;
        let len = byte_offset(&text[begin..], self.len())?;
        text.get(begin..begin + len)
    }
}

/// Byte position of the `chars`-th character, or the end of `text`.
fn byte_offset(text: &str, chars: usize) -> Option<usize> {
    text.char_indices()
        .map(|(idx, _)| idx)
        .chain(std::iter::once(text.len()))
        .nth(chars)
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.begin, self.end)
    }
}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Self {
        Span::new(range.start, range.end)
    }
}
