use std::cell::RefCell;
use std::ops::Range;

use crate::cell::ValueError;

/// Append-only text buffer with line-oriented retrieval.
///
/// Text accumulates verbatim; `line(n)` and `line_count()` view it split at
/// line breaks (`\n` or `\r\n`). The split is computed lazily on the first
/// line query and cached until the next append or clear.
#[derive(Debug, Default)]
pub struct LineBuffer {
    text: String,
    split: RefCell<Option<Vec<Range<usize>>>>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append text verbatim. Line breaks embedded in `text` count as line
    /// boundaries on later queries.
    pub fn accumulate(&mut self, text: &str) -> Result<(), ValueError> {
        self.text
            .try_reserve(text.len())
            .map_err(|_| ValueError::OutOfMemory)?;
        self.text.push_str(text);
        *self.split.get_mut() = None;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.text.clear();
        *self.split.get_mut() = None;
    }

    /// The entire accumulated text, line breaks included.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn line_count(&self) -> usize {
        self.ensure_split();
        self.split.borrow().as_ref().map_or(0, |s| s.len())
    }

    /// The `n`-th line (0-based), without its terminator. Out-of-range
    /// indices yield the empty string rather than an error.
    pub fn line(&self, n: usize) -> &str {
        self.ensure_split();
        let range = {
            let split = self.split.borrow();
            match split.as_ref().and_then(|s| s.get(n)) {
                Some(range) => range.clone(),
                None => return "",
            }
        };
        &self.text[range]
    }

    fn ensure_split(&self) {
        if self.split.borrow().is_some() {
            return;
        }
        *self.split.borrow_mut() = Some(split_lines(&self.text));
    }
}

/// Byte ranges of the lines in `text`, matching `str::lines`: split at `\n`,
/// strip a `\r` that immediately precedes it, and no empty trailing line
/// after a final line break.
fn split_lines(text: &str) -> Vec<Range<usize>> {
    let bytes = text.as_bytes();
    let mut ranges = Vec::new();
    let mut start = 0;
    for (i, &b) in bytes.iter().enumerate() {
        if b == b'\n' {
            let mut end = i;
            if end > start && bytes[end - 1] == b'\r' {
                end -= 1;
            }
            ranges.push(start..end);
            start = i + 1;
        }
    }
    if start < bytes.len() {
        ranges.push(start..bytes.len());
    }
    ranges
}
