//! Editable document with cursor, selection, undo/redo and edit policy.
//!
//! [`EditBuffer`] owns one [`Document`] and its [`HighlightCache`]. Every
//! mutation goes through a single replace primitive, which keeps the fold
//! list and the highlight side table in step with the text and re-tokenizes
//! the affected lines before returning.
//!
//! # Examples
//!
//! ```
//! use ember::EditBuffer;
//!
//! let mut buf = EditBuffer::with_text("fn main() {");
//! buf.move_to_line_end();
//! buf.insert_newline();
//! assert_eq!(buf.text(), "fn main() {\n    \n}");
//! assert_eq!(buf.cursor_line_col(), (2, 5));
//!
//! buf.type_char('(');
//! assert_eq!(buf.text(), "fn main() {\n    ()\n}");
//!
//! buf.undo();
//! assert_eq!(buf.text(), "fn main() {\n    \n}");
//! ```

use std::ops::Range;
use std::sync::Arc;

use tracing::debug;
use unicode_segmentation::UnicodeSegmentation;

use super::brackets::{self, BracketPair};
use super::color_literal::{self, ColorLiteral};
use super::document::Document;
use super::fold::FoldMarker;
use super::policy;
use crate::color::Rgba;
use crate::highlight::{HighlightCache, LineState, RuleHighlighter, Theme, Token, Tokenizer};
use crate::input::{KeyCode, KeyEvent};
use crate::settings::Settings;
use crate::style::Style;

/// Pixel padding around line numbers in the gutter.
const GUTTER_PADDING: u32 = 8;
/// Pixel width reserved for fold markers at the right of the gutter.
const FOLD_MARKER_WIDTH: u32 = 16;

/// Cursor position in the buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Cursor {
    /// Character offset in the buffer.
    pub offset: usize,
    /// Line number (0-indexed).
    pub row: usize,
    /// Column number in characters (0-indexed).
    pub col: usize,
}

/// An edit operation for undo/redo.
#[derive(Clone, Debug)]
enum EditOp {
    Insert { offset: usize, text: String },
    Delete { offset: usize, text: String },
}

impl EditOp {
    fn invert(&self) -> Self {
        match self {
            Self::Insert { offset, text } => Self::Delete {
                offset: *offset,
                text: text.clone(),
            },
            Self::Delete { offset, text } => Self::Insert {
                offset: *offset,
                text: text.clone(),
            },
        }
    }
}

/// Default maximum number of undo groups to retain.
const DEFAULT_MAX_HISTORY_DEPTH: usize = 1000;

/// Edit history for undo/redo with bounded memory usage.
#[derive(Clone, Debug)]
struct History {
    undo_stack: Vec<Vec<EditOp>>,
    redo_stack: Vec<Vec<EditOp>>,
    current_group: Vec<EditOp>,
    max_depth: usize,
}

impl Default for History {
    fn default() -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            current_group: Vec::new(),
            max_depth: DEFAULT_MAX_HISTORY_DEPTH,
        }
    }
}

impl History {
    fn push(&mut self, op: EditOp) {
        self.current_group.push(op);
        self.redo_stack.clear();
    }

    fn commit(&mut self) {
        if !self.current_group.is_empty() {
            self.undo_stack
                .push(std::mem::take(&mut self.current_group));
            if self.undo_stack.len() > self.max_depth {
                let excess = self.undo_stack.len() - self.max_depth;
                self.undo_stack.drain(..excess);
            }
        }
    }

    fn pop_undo(&mut self) -> Option<Vec<EditOp>> {
        self.commit();
        self.undo_stack.pop()
    }

    fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.current_group.clear();
    }
}

/// What a [`Decoration`] marks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecorationKind {
    /// Full-width background of the cursor line.
    CurrentLine,
    /// One bracket of the pair around the cursor.
    BracketMatch,
}

/// A background highlight over a character range.
#[derive(Clone, Debug, PartialEq)]
pub struct Decoration {
    pub kind: DecorationKind,
    pub range: Range<usize>,
    pub background: Rgba,
}

/// Editable document with cursor, selection, history and highlighting.
///
/// Plain edits ([`insert`](Self::insert), deletes) accumulate into the
/// current undo group until [`commit`](Self::commit). Policy edits
/// ([`type_char`](Self::type_char) auto-pairs,
/// [`insert_newline`](Self::insert_newline) skeletons,
/// [`format_document`](Self::format_document)) are undone as one step.
pub struct EditBuffer {
    document: Document,
    cursor: Cursor,
    anchor: Option<usize>,
    history: History,
    highlights: HighlightCache,
    last_highlighted: Range<usize>,
    settings: Settings,
    theme: Theme,
}

impl Default for EditBuffer {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl std::fmt::Debug for EditBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditBuffer")
            .field("cursor", &self.cursor)
            .field("anchor", &self.anchor)
            .field("lines", &self.document.len_lines())
            .finish_non_exhaustive()
    }
}

impl EditBuffer {
    /// Create an empty buffer.
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        let document = Document::new();
        let highlights =
            HighlightCache::new(Arc::new(RuleHighlighter::new()), document.len_lines());
        let theme = Theme::from_settings(&settings);
        let mut buffer = Self {
            document,
            cursor: Cursor::default(),
            anchor: None,
            history: History::default(),
            highlights,
            last_highlighted: 0..0,
            settings,
            theme,
        };
        buffer.refresh_highlighting();
        buffer
    }

    /// Create a buffer with initial text and default settings.
    #[must_use]
    pub fn with_text(text: &str) -> Self {
        let mut buffer = Self::default();
        buffer.set_text(text);
        buffer
    }

    /// Use a different tokenizer. The whole document is re-highlighted.
    pub fn set_tokenizer(&mut self, tokenizer: Arc<dyn Tokenizer>) {
        self.highlights.set_tokenizer(tokenizer);
        self.refresh_highlighting();
    }

    // ----- content -----

    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Full text, as handed to save operations.
    #[must_use]
    pub fn text(&self) -> String {
        self.document.text()
    }

    /// Replace the entire text, resetting cursor, selection, folds and history.
    pub fn set_text(&mut self, text: &str) {
        self.document.set_text(text);
        self.highlights.reset(self.document.len_lines());
        self.refresh_highlighting();
        self.cursor = Cursor::default();
        self.anchor = None;
        self.history.clear();
    }

    #[must_use]
    pub fn len_lines(&self) -> usize {
        self.document.len_lines()
    }

    #[must_use]
    pub fn line_text(&self, line: usize) -> String {
        self.document.line_text(line)
    }

    // ----- settings -----

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    #[must_use]
    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Apply a newly delivered settings object. Tokens are kept; only the
    /// styles they map to change.
    pub fn apply_settings(&mut self, settings: Settings) {
        self.theme = Theme::from_settings(&settings);
        self.settings = settings;
    }

    // ----- highlighting -----

    fn refresh_highlighting(&mut self) {
        self.last_highlighted = self.highlights.update(self.document.rope());
    }

    /// Lines re-tokenized by the most recent edit.
    #[must_use]
    pub fn last_highlighted(&self) -> Range<usize> {
        self.last_highlighted.clone()
    }

    #[must_use]
    pub fn tokens_for_line(&self, line: usize) -> &[Token] {
        self.highlights.tokens_for_line(line)
    }

    #[must_use]
    pub fn line_state(&self, line: usize) -> LineState {
        self.highlights.line_state(line)
    }

    /// Styled spans for a line (byte offsets within the line).
    #[must_use]
    pub fn styled_line(&self, line: usize) -> Vec<(Range<usize>, Style)> {
        self.highlights.styled_line(line, &self.theme)
    }

    // ----- cursor and selection -----

    #[must_use]
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Cursor line and column, both 1-based, for status display.
    #[must_use]
    pub fn cursor_line_col(&self) -> (usize, usize) {
        (self.cursor.row + 1, self.cursor.col + 1)
    }

    /// Place the cursor at a character offset, clearing the selection.
    pub fn set_cursor_by_offset(&mut self, offset: usize) {
        self.anchor = None;
        self.place_cursor(offset);
    }

    /// Select from `anchor` to `head`; the cursor ends at `head`.
    pub fn select(&mut self, anchor: usize, head: usize) {
        let len = self.document.len_chars();
        self.anchor = Some(anchor.min(len));
        self.place_cursor(head);
    }

    pub fn select_all(&mut self) {
        self.select(0, self.document.len_chars());
    }

    pub fn clear_selection(&mut self) {
        self.anchor = None;
    }

    /// The selected character range, if non-empty.
    #[must_use]
    pub fn selection(&self) -> Option<Range<usize>> {
        let anchor = self.anchor?;
        let head = self.cursor.offset;
        (anchor != head).then(|| anchor.min(head)..anchor.max(head))
    }

    #[must_use]
    pub fn has_selection(&self) -> bool {
        self.selection().is_some()
    }

    #[must_use]
    pub fn selected_text(&self) -> Option<String> {
        self.selection()
            .map(|range| self.document.rope().slice(range).to_string())
    }

    /// Move one grapheme left, or to the end of the previous line.
    pub fn move_left(&mut self) {
        let Cursor { row, col, .. } = self.cursor;
        if col == 0 {
            if row > 0 {
                self.move_to(row - 1, usize::MAX);
            }
            return;
        }
        let line = self.document.line_text(row);
        let target = grapheme_columns(&line)
            .take_while(|&c| c < col)
            .last()
            .unwrap_or(0);
        self.move_to(row, target);
    }

    /// Move one grapheme right, or to the start of the next line.
    pub fn move_right(&mut self) {
        let Cursor { row, col, .. } = self.cursor;
        let line = self.document.line_text(row);
        match grapheme_columns(&line).find(|&c| c > col) {
            Some(target) => self.move_to(row, target),
            None if row + 1 < self.document.len_lines() => self.move_to(row + 1, 0),
            None => {}
        }
    }

    /// Move to the previous visible line, keeping the column where possible.
    pub fn move_up(&mut self) {
        let target = (0..self.cursor.row)
            .rev()
            .find(|&line| self.document.is_line_visible(line));
        if let Some(row) = target {
            self.move_to(row, self.cursor.col);
        }
    }

    /// Move to the next visible line, keeping the column where possible.
    pub fn move_down(&mut self) {
        let target = (self.cursor.row + 1..self.document.len_lines())
            .find(|&line| self.document.is_line_visible(line));
        if let Some(row) = target {
            self.move_to(row, self.cursor.col);
        }
    }

    pub fn move_to_line_start(&mut self) {
        self.move_to(self.cursor.row, 0);
    }

    pub fn move_to_line_end(&mut self) {
        self.move_to(self.cursor.row, usize::MAX);
    }

    /// Move to a row and column, clamping both.
    pub fn move_to(&mut self, row: usize, col: usize) {
        let rope = self.document.rope();
        let row = row.min(rope.len_lines().saturating_sub(1));
        let col = col.min(rope.line_len(row));
        let offset = rope.line_to_char(row) + col;
        self.set_cursor_by_offset(offset);
    }

    fn place_cursor(&mut self, offset: usize) {
        let rope = self.document.rope();
        let offset = offset.min(rope.len_chars());
        let row = rope.char_to_line(offset);
        self.cursor = Cursor {
            offset,
            row,
            col: offset - rope.line_to_char(row),
        };
    }

    // ----- editing primitives -----

    /// The one mutation path: replace `range` with `text`, keep folds and
    /// highlights in step, and optionally record the edit for undo.
    fn replace_range(&mut self, range: Range<usize>, text: &str, record: bool) {
        let len = self.document.len_chars();
        let start = range.start.min(len);
        let end = range.end.clamp(start, len);
        let removed = self.document.rope().slice(start..end).to_string();
        if removed.is_empty() && text.is_empty() {
            return;
        }

        let change = self.document.replace(start..end, text);
        self.highlights.splice(change);
        self.refresh_highlighting();

        if record {
            if !removed.is_empty() {
                self.history.push(EditOp::Delete {
                    offset: start,
                    text: removed,
                });
            }
            if !text.is_empty() {
                self.history.push(EditOp::Insert {
                    offset: start,
                    text: text.to_string(),
                });
            }
        }
    }

    /// Insert text at the cursor, replacing any selection. No edit policy
    /// applies.
    pub fn insert(&mut self, text: &str) {
        let range = self.take_selection_or_cursor();
        let start = range.start;
        self.replace_range(range, text, true);
        self.place_cursor(start + text.chars().count());
    }

    fn take_selection_or_cursor(&mut self) -> Range<usize> {
        let range = self
            .selection()
            .unwrap_or(self.cursor.offset..self.cursor.offset);
        self.anchor = None;
        range
    }

    /// Delete the selection, or the character before the cursor.
    pub fn delete_backward(&mut self) {
        if let Some(range) = self.selection() {
            self.delete_range(range);
            return;
        }
        if self.cursor.offset > 0 {
            self.delete_range(self.cursor.offset - 1..self.cursor.offset);
        }
    }

    /// Delete the selection, or the character after the cursor.
    pub fn delete_forward(&mut self) {
        if let Some(range) = self.selection() {
            self.delete_range(range);
            return;
        }
        self.delete_range(self.cursor.offset..self.cursor.offset + 1);
    }

    /// Delete a character range and leave the cursor at its start.
    pub fn delete_range(&mut self, range: Range<usize>) {
        let start = range.start;
        self.anchor = None;
        self.replace_range(range, "", true);
        self.place_cursor(start);
    }

    // ----- edit policy -----

    /// Handle a typed character.
    ///
    /// With a selection, the selection is replaced by `ch` alone. Otherwise
    /// an opener with a closing counterpart inserts both and leaves the
    /// cursor between them. `'\n'` is routed to [`insert_newline`](Self::insert_newline).
    pub fn type_char(&mut self, ch: char) {
        if ch == '\n' {
            self.insert_newline();
            return;
        }

        if self.has_selection() {
            self.history.commit();
            self.insert(ch.encode_utf8(&mut [0; 4]));
            self.history.commit();
            return;
        }

        match policy::auto_close(ch) {
            Some(close) => {
                self.history.commit();
                let at = self.cursor.offset;
                let pair: String = [ch, close].iter().collect();
                self.replace_range(at..at, &pair, true);
                self.place_cursor(at + 1);
                self.history.commit();
            }
            None => self.insert(ch.encode_utf8(&mut [0; 4])),
        }
    }

    /// Insert a newline with auto-indent (and the brace skeleton after `{`).
    pub fn insert_newline(&mut self) {
        self.history.commit();
        if let Some(range) = self.selection() {
            self.delete_range(range);
        }

        let rope = self.document.rope();
        let row = self.cursor.row;
        let line = rope.line_text(row);
        let split = line
            .char_indices()
            .nth(self.cursor.col)
            .map_or(line.len(), |(idx, _)| idx);
        let (before, after) = line.split_at(split);
        let insert = policy::newline_insert(before, after, &self.settings.indent_unit());

        let at = self.cursor.offset;
        self.replace_range(at..at, &insert.text, true);
        self.place_cursor(at + insert.cursor);
        self.history.commit();
    }

    /// Re-indent the whole document from brace structure.
    ///
    /// Destructive: all existing indentation is discarded. Undo restores it.
    pub fn format_document(&mut self) {
        let old = self.document.text();
        let formatted = policy::reindent(&old, &self.settings.indent_unit());
        if formatted == old {
            return;
        }
        debug!(lines = self.document.len_lines(), "formatting document");

        let (row, col) = (self.cursor.row, self.cursor.col);
        self.history.commit();
        self.anchor = None;
        self.replace_range(0..self.document.len_chars(), &formatted, true);
        self.history.commit();
        self.move_to(row, col);
    }

    // ----- key routing -----

    /// Route a key event through the edit policy. Returns false for keys the
    /// buffer does not handle, so the host can try its own bindings.
    ///
    /// Shift with a navigation key extends the selection. Ctrl+Z undoes,
    /// Ctrl+Y or Ctrl+Shift+Z redoes, Ctrl+A selects all and Ctrl+Shift+I
    /// formats the document.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.ctrl() {
            return self.handle_chord(key);
        }
        if let Some(ch) = key.typed_char() {
            self.type_char(ch);
            return true;
        }

        match key.code {
            KeyCode::Enter => self.insert_newline(),
            KeyCode::Tab => {
                let unit = self.settings.indent_unit();
                self.insert(&unit);
            }
            KeyCode::Backspace => self.delete_backward(),
            KeyCode::Delete => self.delete_forward(),
            KeyCode::Esc => self.clear_selection(),
            code if code.is_navigation() => self.navigate(code, key.shift()),
            _ => return false,
        }
        true
    }

    fn handle_chord(&mut self, key: KeyEvent) -> bool {
        if key.is_ctrl_letter('z') {
            if key.shift() {
                self.redo();
            } else {
                self.undo();
            }
        } else if key.is_ctrl_letter('y') {
            self.redo();
        } else if key.is_ctrl_letter('a') {
            self.select_all();
        } else if key.is_ctrl_letter('i') && key.shift() {
            self.format_document();
        } else {
            return false;
        }
        true
    }

    fn navigate(&mut self, code: KeyCode, extend: bool) {
        let anchor = if extend {
            Some(self.anchor.unwrap_or(self.cursor.offset))
        } else {
            None
        };

        match code {
            KeyCode::Left => self.move_left(),
            KeyCode::Right => self.move_right(),
            KeyCode::Up => self.move_up(),
            KeyCode::Down => self.move_down(),
            KeyCode::Home => self.move_to_line_start(),
            KeyCode::End => self.move_to_line_end(),
            _ => {}
        }
        self.anchor = anchor;
    }

    // ----- history -----

    /// Undo the last edit group. Returns false if there was nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(ops) = self.history.pop_undo() else {
            return false;
        };

        for op in ops.iter().rev() {
            self.apply_op(&op.invert());
        }
        self.history.redo_stack.push(ops);
        true
    }

    /// Redo the last undone group. Returns false if there was nothing to redo.
    pub fn redo(&mut self) -> bool {
        let Some(ops) = self.history.redo_stack.pop() else {
            return false;
        };

        for op in &ops {
            self.apply_op(op);
        }
        self.history.undo_stack.push(ops);
        true
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.history.undo_stack.is_empty() || !self.history.current_group.is_empty()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.history.redo_stack.is_empty()
    }

    /// Close the current undo group.
    pub fn commit(&mut self) {
        self.history.commit();
    }

    fn apply_op(&mut self, op: &EditOp) {
        self.anchor = None;
        match op {
            EditOp::Insert { offset, text } => {
                self.replace_range(*offset..*offset, text, false);
                self.place_cursor(offset + text.chars().count());
            }
            EditOp::Delete { offset, text } => {
                let end = offset + text.chars().count();
                self.replace_range(*offset..end, "", false);
                self.place_cursor(*offset);
            }
        }
    }

    // ----- folding -----

    /// Fold or unfold the region starting at `line`. A line that does not
    /// start a foldable region is left alone and false is returned.
    pub fn toggle_fold(&mut self, line: usize) -> bool {
        let toggled = self.document.toggle_fold(line);
        if toggled && !self.document.is_line_visible(self.cursor.row) {
            // Park the cursor on the fold header so it never sits in hidden text.
            let len = self.document.rope().line_len(line);
            self.move_to(line, len);
        }
        toggled
    }

    #[must_use]
    pub fn fold_marker(&self, line: usize) -> Option<FoldMarker> {
        self.document.fold_marker(line)
    }

    #[must_use]
    pub fn is_line_visible(&self, line: usize) -> bool {
        self.document.is_line_visible(line)
    }

    /// Open every fold. The cursor is always visible already.
    pub fn unfold_all(&mut self) {
        self.document.unfold_all();
    }

    /// Line indices the host should draw, skipping folded bodies.
    pub fn visible_lines(&self) -> impl Iterator<Item = usize> + '_ {
        self.document.visible_lines()
    }

    // ----- view helpers -----

    /// The bracket the cursor touches and its match.
    #[must_use]
    pub fn matching_bracket(&self) -> Option<BracketPair> {
        brackets::bracket_at_cursor(self.document.rope(), self.cursor.offset)
    }

    /// Backgrounds to paint around the cursor: the current line, then the
    /// touched bracket and its match (when one exists).
    #[must_use]
    pub fn decorations(&self) -> Vec<Decoration> {
        let rope = self.document.rope();
        let line_start = rope.line_to_char(self.cursor.row);
        let mut decorations = vec![Decoration {
            kind: DecorationKind::CurrentLine,
            range: line_start..line_start + rope.line_len(self.cursor.row),
            background: self.theme.current_line_bg(),
        }];

        if let Some(BracketPair {
            anchor,
            partner: Some(partner),
        }) = self.matching_bracket()
        {
            for pos in [anchor, partner] {
                decorations.push(Decoration {
                    kind: DecorationKind::BracketMatch,
                    range: pos..pos + 1,
                    background: self.theme.bracket_match_bg(),
                });
            }
        }
        decorations
    }

    /// Number of digits needed for the largest line number.
    #[must_use]
    pub fn line_number_digits(&self) -> u32 {
        self.document.len_lines().max(1).ilog10() + 1
    }

    /// Gutter width in pixels for a font whose digits are `digit_width` wide:
    /// padding, the line numbers, and the fold-marker strip.
    #[must_use]
    pub fn gutter_width(&self, digit_width: u32) -> u32 {
        GUTTER_PADDING + digit_width * self.line_number_digits() + FOLD_MARKER_WIDTH
    }

    // ----- color literals -----

    /// The color literal under character offset `offset`, in absolute
    /// character offsets.
    #[must_use]
    pub fn color_literal_at(&self, offset: usize) -> Option<ColorLiteral> {
        let rope = self.document.rope();
        if offset > rope.len_chars() {
            return None;
        }
        let row = rope.char_to_line(offset);
        let line_start = rope.line_to_char(row);
        let found = color_literal::color_literal_at(&rope.line_text(row), offset - line_start)?;
        Some(ColorLiteral {
            start: line_start + found.start,
            end: line_start + found.end,
            ..found
        })
    }

    /// Rewrite the literal at `literal` as an uppercase `#RRGGBB` for `color`.
    pub fn replace_color_literal(&mut self, literal: &ColorLiteral, color: Rgba) {
        self.history.commit();
        self.anchor = None;
        let hex = color.to_hex();
        self.replace_range(literal.start..literal.end, &hex, true);
        self.place_cursor(literal.start + hex.len());
        self.history.commit();
    }
}

/// Character columns at the end of each grapheme on `line`.
fn grapheme_columns(line: &str) -> impl Iterator<Item = usize> + '_ {
    line.graphemes(true).scan(0, |col, grapheme| {
        *col += grapheme.chars().count();
        Some(*col)
    })
}
