//! Rope wrapper using the ropey crate.
//!
//! All positions are character offsets unless a method name says bytes.
//! Line text returned by [`RopeWrapper::line_text`] never includes the line
//! terminator.

use ropey::{Rope, RopeSlice};

/// Characters ropey treats as line breaks on their own. `\r\n` also counts
/// as a single break.
const LINE_BREAKS: [char; 7] = [
    '\n', '\u{000B}', '\u{000C}', '\r', '\u{0085}', '\u{2028}', '\u{2029}',
];

/// Length in chars of the break that ends `line` (0, 1 or 2).
fn terminator_len(line: RopeSlice<'_>) -> usize {
    let len = line.len_chars();
    if len == 0 || !LINE_BREAKS.contains(&line.char(len - 1)) {
        return 0;
    }
    if len >= 2 && line.char(len - 1) == '\n' && line.char(len - 2) == '\r' {
        2
    } else {
        1
    }
}

/// Wrapper around ropey::Rope with convenience methods.
#[derive(Clone, Debug, Default)]
pub struct RopeWrapper {
    rope: Rope,
}

impl RopeWrapper {
    #[must_use]
    pub fn new() -> Self {
        Self { rope: Rope::new() }
    }

    #[must_use]
    pub fn from_str(s: &str) -> Self {
        Self {
            rope: Rope::from_str(s),
        }
    }

    #[must_use]
    pub fn len_bytes(&self) -> usize {
        self.rope.len_bytes()
    }

    #[must_use]
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    /// Number of lines. An empty rope, and a rope ending in a newline, both
    /// count the (empty) last line.
    #[must_use]
    pub fn len_lines(&self) -> usize {
        self.rope.len_lines()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rope.len_bytes() == 0
    }

    /// Get a line by index, including its terminator.
    #[must_use]
    pub fn line(&self, idx: usize) -> Option<RopeSlice<'_>> {
        if idx < self.rope.len_lines() {
            Some(self.rope.line(idx))
        } else {
            None
        }
    }

    /// Text of line `idx` without its terminator.
    ///
    /// Out-of-range lines read as empty.
    #[must_use]
    pub fn line_text(&self, idx: usize) -> String {
        self.line(idx).map_or_else(String::new, |line| {
            line.slice(..line.len_chars() - terminator_len(line)).to_string()
        })
    }

    /// Number of characters on line `idx`, excluding the terminator.
    #[must_use]
    pub fn line_len(&self, idx: usize) -> usize {
        self.line(idx)
            .map_or(0, |line| line.len_chars() - terminator_len(line))
    }

    /// Character at `char_idx`, if in range.
    #[must_use]
    pub fn char_at(&self, char_idx: usize) -> Option<char> {
        self.rope.get_char(char_idx)
    }

    /// Get a slice of the rope. Out-of-range bounds yield an empty slice.
    #[must_use]
    pub fn slice<R>(&self, range: R) -> RopeSlice<'_>
    where
        R: std::ops::RangeBounds<usize>,
    {
        self.rope
            .get_slice(range)
            .unwrap_or_else(|| self.rope.slice(..0))
    }

    /// Insert text at a character position. Positions past the end are ignored.
    pub fn insert(&mut self, char_idx: usize, text: &str) {
        if char_idx <= self.len_chars() {
            self.rope.insert(char_idx, text);
        }
    }

    /// Remove a range of characters, clamped to the rope.
    pub fn remove(&mut self, range: std::ops::Range<usize>) {
        let len = self.len_chars();
        let start = range.start.min(len);
        let end = range.end.min(len);
        if start < end {
            self.rope.remove(start..end);
        }
    }

    /// Replace the entire contents.
    pub fn replace(&mut self, text: &str) {
        self.rope = Rope::from_str(text);
    }

    /// Append text to the end.
    pub fn append(&mut self, text: &str) {
        let len = self.len_chars();
        self.rope.insert(len, text);
    }

    #[must_use]
    pub fn to_string(&self) -> String {
        self.rope.to_string()
    }

    #[must_use]
    pub fn char_to_byte(&self, char_idx: usize) -> usize {
        self.rope.char_to_byte(char_idx.min(self.len_chars()))
    }

    #[must_use]
    pub fn byte_to_char(&self, byte_idx: usize) -> usize {
        self.rope.byte_to_char(byte_idx.min(self.len_bytes()))
    }

    #[must_use]
    pub fn char_to_line(&self, char_idx: usize) -> usize {
        self.rope.char_to_line(char_idx.min(self.len_chars()))
    }

    /// Get the char index at the start of a line.
    #[must_use]
    pub fn line_to_char(&self, line_idx: usize) -> usize {
        if line_idx >= self.len_lines() {
            self.len_chars()
        } else {
            self.rope.line_to_char(line_idx)
        }
    }

    /// Get access to the underlying rope.
    #[must_use]
    pub fn inner(&self) -> &Rope {
        &self.rope
    }
}

impl From<&str> for RopeWrapper {
    fn from(s: &str) -> Self {
        Self::from_str(s)
    }
}

impl From<String> for RopeWrapper {
    fn from(s: String) -> Self {
        Self::from_str(&s)
    }
}
