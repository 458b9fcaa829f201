//! The editor's document: rope text plus fold state.

use std::ops::Range;

use super::fold::{self, FoldMarker, FoldRegion};
use super::rope::RopeWrapper;

/// Line-level summary of one edit: lines `start..start + removed` of the old
/// text were replaced by lines `start..start + inserted` of the new text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LineChange {
    pub start: usize,
    pub removed: usize,
    pub inserted: usize,
}

impl LineChange {
    /// Change that replaces a whole document.
    #[must_use]
    pub const fn whole(old_lines: usize, new_lines: usize) -> Self {
        Self {
            start: 0,
            removed: old_lines,
            inserted: new_lines,
        }
    }

    /// Net change in line count.
    #[must_use]
    pub fn delta(&self) -> isize {
        self.inserted as isize - self.removed as isize
    }

    /// Old-text line range touched by the edit.
    #[must_use]
    pub const fn old_range(&self) -> Range<usize> {
        self.start..self.start + self.removed
    }
}

/// Text plus the set of currently folded regions.
///
/// Visibility is derived: a line is hidden while any folded region hides it.
#[derive(Clone, Debug, Default)]
pub struct Document {
    rope: RopeWrapper,
    folds: Vec<FoldRegion>,
}

impl Document {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: RopeWrapper::from_str(text),
            folds: Vec::new(),
        }
    }

    #[must_use]
    pub fn rope(&self) -> &RopeWrapper {
        &self.rope
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
    pub fn len_lines(&self) -> usize {
        self.rope.len_lines()
    }

    #[must_use]
    pub fn line_text(&self, line: usize) -> String {
        self.rope.line_text(line)
    }

    /// Replace the whole text. All folds are dropped.
    pub fn set_text(&mut self, text: &str) -> LineChange {
        let old_lines = self.rope.len_lines();
        self.rope.replace(text);
        self.unfold_all();
        LineChange::whole(old_lines, self.rope.len_lines())
    }

    /// Replace the characters in `range` with `text`.
    ///
    /// The range is clamped to the document. Folds entirely before or after
    /// the edit survive (shifted as needed); a fold the edit reaches into is
    /// dropped when the edit changes the line count.
    pub fn replace(&mut self, range: Range<usize>, text: &str) -> LineChange {
        let len = self.rope.len_chars();
        let start = range.start.min(len);
        let end = range.end.clamp(start, len);

        // Line counts come from the rope itself, so every break it knows
        // (lone `\r`, form feed, U+2028) is counted. A `\r` just before
        // `start` may pair with a `\n` at `start`, so its line is included.
        let first = match start.checked_sub(1) {
            Some(prev) if self.rope.char_at(prev) == Some('\r') => self.rope.char_to_line(prev),
            _ => self.rope.char_to_line(start),
        };
        let removed = self.rope.char_to_line(end) - first + 1;

        self.rope.remove(start..end);
        self.rope.insert(start, text);

        let inserted_end = start + text.chars().count();
        let change = LineChange {
            start: first,
            removed,
            inserted: self.rope.char_to_line(inserted_end) - first + 1,
        };
        self.adjust_folds(change);
        change
    }

    fn adjust_folds(&mut self, change: LineChange) {
        let delta = change.delta();
        if delta == 0 {
            return;
        }
        let last_old = change.start + change.removed - 1;
        self.folds.retain_mut(|region| {
            if region.end < change.start {
                true
            } else if region.start > last_old {
                region.start = region.start.saturating_add_signed(delta);
                region.end = region.end.saturating_add_signed(delta);
                true
            } else {
                false
            }
        });
    }

    /// Fold or unfold the region starting at `line`.
    ///
    /// Returns false (and changes nothing) when `line` does not start a
    /// foldable region.
    pub fn toggle_fold(&mut self, line: usize) -> bool {
        if let Some(idx) = self.folds.iter().position(|r| r.start == line) {
            self.folds.remove(idx);
            return true;
        }
        match fold::fold_region(&self.rope, line) {
            Some(region) => {
                self.folds.push(region);
                true
            }
            None => false,
        }
    }

    /// Unfold everything.
    pub fn unfold_all(&mut self) {
        self.folds.clear();
    }

    #[must_use]
    pub fn folds(&self) -> &[FoldRegion] {
        &self.folds
    }

    #[must_use]
    pub fn is_folded(&self, line: usize) -> bool {
        self.folds.iter().any(|r| r.start == line)
    }

    #[must_use]
    pub fn is_line_visible(&self, line: usize) -> bool {
        !self.folds.iter().any(|r| r.hides(line))
    }

    /// Indices of lines not hidden by a fold, in order.
    pub fn visible_lines(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len_lines()).filter(|&line| self.is_line_visible(line))
    }

    /// Gutter marker for `line`, if it starts a foldable region.
    #[must_use]
    pub fn fold_marker(&self, line: usize) -> Option<FoldMarker> {
        if let Some(region) = self.folds.iter().find(|r| r.start == line) {
            return Some(FoldMarker {
                region: *region,
                folded: true,
            });
        }
        fold::fold_region(&self.rope, line).map(|region| FoldMarker {
            region,
            folded: false,
        })
    }
}
