use rustc_hash::FxHashSet;

use crate::line_buffer::LineBuffer;

/// Collects one diagnostic stream (errors or warnings) for a run.
///
/// Every `add` advances the count, but each distinct message text is
/// retained only once; repeats bump the count without growing the buffer.
#[derive(Debug, Default)]
pub struct Reporter {
    buffer: LineBuffer,
    seen: FxHashSet<String>,
    count: usize,
}

impl Reporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message and return the updated count. The text is stored
    /// verbatim; retention is best-effort, the count advances regardless.
    pub fn add(&mut self, message: &str) -> usize {
        self.count += 1;
        if self.seen.insert(message.to_string()) {
            let _ = self.buffer.accumulate(message);
        }
        self.count
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// All retained message text, in first-seen order.
    pub fn text(&self) -> &str {
        self.buffer.text()
    }

    pub fn line(&self, n: usize) -> &str {
        self.buffer.line(n)
    }

    pub fn line_count(&self) -> usize {
        self.buffer.line_count()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.seen.clear();
        self.count = 0;
    }
}
