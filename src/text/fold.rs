//! Line-granularity fold regions bounded by balanced `{` / `}`.

use super::rope::RopeWrapper;

/// Lines `start..=end` bounded by a balanced brace pair. Folding hides the
/// lines strictly between the two.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FoldRegion {
    pub start: usize,
    pub end: usize,
}

impl FoldRegion {
    /// True if `line` is hidden while this region is folded.
    #[must_use]
    pub const fn hides(&self, line: usize) -> bool {
        self.start < line && line < self.end
    }

    /// Number of lines hidden while folded.
    #[must_use]
    pub const fn hidden_len(&self) -> usize {
        self.end.saturating_sub(self.start + 1)
    }
}

/// Gutter state for a line that starts a foldable region.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FoldMarker {
    pub region: FoldRegion,
    pub folded: bool,
}

/// True if the trimmed text of a line contains an opening brace.
#[must_use]
pub fn opens_block(line: &str) -> bool {
    line.trim().contains('{')
}

fn brace_balance(line: &str) -> isize {
    line.chars().fold(0, |acc, ch| match ch {
        '{' => acc + 1,
        '}' => acc - 1,
        _ => acc,
    })
}

/// The fold region starting at `line`, if one exists.
///
/// Counting starts on `line` itself, adding one per `{` and subtracting one
/// per `}` line by line; the region ends on the first line where the running
/// count returns to zero. A start line without a brace, a count that never
/// balances, or a region with nothing between its bounds yields `None`.
#[must_use]
pub fn fold_region(rope: &RopeWrapper, line: usize) -> Option<FoldRegion> {
    if line >= rope.len_lines() {
        return None;
    }
    let first = rope.line_text(line);
    if !opens_block(&first) {
        return None;
    }

    let mut count = brace_balance(&first);
    if count == 0 {
        return None;
    }
    for end in line + 1..rope.len_lines() {
        count += brace_balance(&rope.line_text(end));
        if count == 0 {
            let region = FoldRegion { start: line, end };
            return (region.hidden_len() > 0).then_some(region);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_regions() {
        let rope = RopeWrapper::from_str("a {\n  b {\n    c\n  }\n}\n");
        assert_eq!(fold_region(&rope, 0), Some(FoldRegion { start: 0, end: 4 }));
        assert_eq!(fold_region(&rope, 1), Some(FoldRegion { start: 1, end: 3 }));
        assert_eq!(fold_region(&rope, 2), None);
    }

    #[test]
    fn unbalanced_is_not_foldable() {
        let rope = RopeWrapper::from_str("a {\n  b\n");
        assert_eq!(fold_region(&rope, 0), None);
    }

    #[test]
    fn one_line_block_is_not_foldable() {
        let rope = RopeWrapper::from_str("x = {}\ny\n");
        assert_eq!(fold_region(&rope, 0), None);
        let rope = RopeWrapper::from_str("{\n}\n");
        assert_eq!(fold_region(&rope, 0), None);
    }

    #[test]
    fn else_line_balances_to_zero() {
        let rope = RopeWrapper::from_str("if {\n a\n} else {\n b\n}");
        // Counting is per line, so `} else {` nets zero and the region runs on.
        assert_eq!(fold_region(&rope, 0), Some(FoldRegion { start: 0, end: 4 }));
        assert_eq!(fold_region(&rope, 2), None);
    }

    #[test]
    fn out_of_range_line() {
        assert_eq!(fold_region(&RopeWrapper::new(), 3), None);
    }
}
