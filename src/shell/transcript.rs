//! Append-only styled transcript with a protected prefix.
//!
//! Everything before the boundary offset is committed: it changes only by
//! programmatic appends (prompts, process output) or a full clear. The
//! region from the boundary to the end is the line being composed, and the
//! caret always stays inside it.

use std::ops::Range;

use crate::style::Style;
use crate::text::RopeWrapper;

/// A styled run of committed text, in character offsets.
#[derive(Clone, Debug, PartialEq)]
pub struct StyledSpan {
    pub range: Range<usize>,
    pub style: Style,
}

#[derive(Clone, Debug, Default)]
pub struct Transcript {
    rope: RopeWrapper,
    spans: Vec<StyledSpan>,
    boundary: usize,
    caret: usize,
}

impl Transcript {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    #[must_use]
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rope.is_empty()
    }

    #[must_use]
    pub fn ends_with_newline(&self) -> bool {
        self.len_chars()
            .checked_sub(1)
            .and_then(|last| self.rope.char_at(last))
            .is_none_or(|ch| ch == '\n')
    }

    /// Offset before which no user edit is allowed.
    #[must_use]
    pub const fn boundary(&self) -> usize {
        self.boundary
    }

    #[must_use]
    pub const fn caret(&self) -> usize {
        self.caret
    }

    /// Styled runs of committed text, in order.
    #[must_use]
    pub fn spans(&self) -> &[StyledSpan] {
        &self.spans
    }

    /// The line being composed (boundary to end).
    #[must_use]
    pub fn editable_text(&self) -> String {
        self.rope.slice(self.boundary..self.len_chars()).to_string()
    }

    // ----- programmatic appends -----

    /// Append committed text with a style. The boundary and the caret move
    /// to the end.
    ///
    /// Any text being composed is committed along with it, unstyled. Callers
    /// that want it styled use [`commit_input`](Self::commit_input) first.
    pub fn append(&mut self, text: &str, style: Style) {
        let start = self.len_chars();
        self.rope.append(text);
        let end = self.len_chars();
        self.push_span(start..end, style);
        self.boundary = end;
        self.caret = end;
    }

    /// Commit the composed line with `style`, advancing the boundary past it.
    /// Returns the committed text.
    pub fn commit_input(&mut self, style: Style) -> String {
        let end = self.len_chars();
        let text = self.editable_text();
        self.push_span(self.boundary..end, style);
        self.boundary = end;
        self.caret = end;
        text
    }

    fn push_span(&mut self, range: Range<usize>, style: Style) {
        if range.is_empty() {
            return;
        }
        match self.spans.last_mut() {
            Some(last) if last.style == style && last.range.end == range.start => {
                last.range.end = range.end;
            }
            _ => self.spans.push(StyledSpan { range, style }),
        }
    }

    /// Drop everything, including the protected prefix.
    pub fn clear(&mut self) {
        self.rope = RopeWrapper::new();
        self.spans.clear();
        self.boundary = 0;
        self.caret = 0;
    }

    // ----- user edits (never cross the boundary) -----

    /// Move the caret, clamping it into the editable region.
    pub fn set_caret(&mut self, offset: usize) {
        self.caret = offset.clamp(self.boundary, self.len_chars());
    }

    pub fn move_caret_left(&mut self) {
        self.set_caret(self.caret.saturating_sub(1));
    }

    pub fn move_caret_right(&mut self) {
        self.set_caret(self.caret + 1);
    }

    pub fn move_caret_home(&mut self) {
        self.caret = self.boundary;
    }

    pub fn move_caret_end(&mut self) {
        self.caret = self.len_chars();
    }

    /// Insert at the caret; a caret found before the boundary is first
    /// clamped to it.
    pub fn insert(&mut self, text: &str) {
        self.set_caret(self.caret);
        self.rope.insert(self.caret, text);
        self.caret += text.chars().count();
    }

    /// Delete the character before the caret. Refused at the boundary.
    pub fn backspace(&mut self) -> bool {
        self.set_caret(self.caret);
        if self.caret <= self.boundary {
            return false;
        }
        self.rope.remove(self.caret - 1..self.caret);
        self.caret -= 1;
        true
    }

    /// Delete the character after the caret.
    pub fn delete_forward(&mut self) -> bool {
        self.set_caret(self.caret);
        if self.caret >= self.len_chars() {
            return false;
        }
        self.rope.remove(self.caret..self.caret + 1);
        true
    }

    /// Delete a range. Refused if any of it lies before the boundary.
    pub fn delete_range(&mut self, range: Range<usize>) -> bool {
        if range.start < self.boundary || range.start > range.end {
            return false;
        }
        let end = range.end.min(self.len_chars());
        self.rope.remove(range.start..end);
        self.set_caret(self.caret.min(range.start).max(self.boundary));
        true
    }

    /// Replace the composed line; the caret moves to the end.
    pub fn set_editable(&mut self, text: &str) {
        let end = self.len_chars();
        self.rope.remove(self.boundary..end);
        self.rope.append(text);
        self.caret = self.len_chars();
    }

    /// Composed text up to the caret.
    #[must_use]
    pub fn text_before_caret(&self) -> String {
        self.rope.slice(self.boundary..self.caret).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgba;

    fn prompt() -> Style {
        Style::fg(Rgba::GREEN)
    }

    #[test]
    fn append_advances_boundary() {
        let mut t = Transcript::new();
        t.append("dir $ ", prompt());
        assert_eq!(t.boundary(), 6);
        assert_eq!(t.caret(), 6);
        t.insert("ls");
        assert_eq!(t.editable_text(), "ls");
        assert_eq!(t.boundary(), 6);
    }

    #[test]
    fn backspace_stops_at_boundary() {
        let mut t = Transcript::new();
        t.append("$ ", prompt());
        t.insert("a");
        assert!(t.backspace());
        assert!(!t.backspace());
        assert_eq!(t.text(), "$ ");
    }

    #[test]
    fn caret_is_clamped_before_edits() {
        let mut t = Transcript::new();
        t.append("$ ", prompt());
        t.insert("bc");
        t.set_caret(0);
        assert_eq!(t.caret(), 2);
        t.insert("a");
        assert_eq!(t.editable_text(), "abc");
        t.move_caret_left();
        t.move_caret_left();
        assert_eq!(t.caret(), 2);
    }

    #[test]
    fn delete_range_refuses_protected_text() {
        let mut t = Transcript::new();
        t.append("$ ", prompt());
        t.insert("xyz");
        assert!(!t.delete_range(1..3));
        assert!(t.delete_range(2..4));
        assert_eq!(t.text(), "$ z");
        assert_eq!(t.caret(), 2);
    }

    #[test]
    fn commit_and_spans() {
        let mut t = Transcript::new();
        t.append("$ ", prompt());
        t.insert("echo");
        let command = Style::fg(Rgba::WHITE);
        assert_eq!(t.commit_input(command), "echo");
        t.append("\n", Style::NONE);
        assert_eq!(t.boundary(), 7);
        assert_eq!(t.editable_text(), "");
        assert_eq!(t.spans().len(), 3);
        assert_eq!(t.spans()[1].range, 2..6);
        assert_eq!(t.spans()[1].style, command);
    }

    #[test]
    fn adjacent_spans_merge() {
        let mut t = Transcript::new();
        t.append("a", prompt());
        t.append("b", prompt());
        assert_eq!(t.spans().len(), 1);
        assert_eq!(t.spans()[0].range, 0..2);
    }

    #[test]
    fn set_editable_replaces_line_only() {
        let mut t = Transcript::new();
        t.append("$ ", prompt());
        t.insert("draft");
        t.set_editable("history");
        assert_eq!(t.text(), "$ history");
        assert_eq!(t.caret(), 9);
        t.clear();
        assert!(t.is_empty());
        assert!(t.ends_with_newline());
    }
}
