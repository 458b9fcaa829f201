//! Inline color literals (`#abc`, `#aabbcc`, `rgb(r, g, b)`) within a line.

use crate::color::Rgba;
use crate::highlight::{RuleTable, TokenKind};

/// A color literal found in a line, in character columns.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorLiteral {
    pub start: usize,
    pub end: usize,
    pub color: Rgba,
}

impl ColorLiteral {
    #[must_use]
    pub const fn contains(&self, col: usize) -> bool {
        self.start <= col && col < self.end
    }
}

/// All parseable color literals in `line`, ordered by start column.
///
/// Uses the color-literal rules of the standard highlight table, so anything
/// underlined as a color is found here. Matches that do not parse (such as
/// `rgb(300, 0, 0)`) are skipped.
#[must_use]
pub fn color_literals(line: &str) -> Vec<ColorLiteral> {
    let table = RuleTable::standard();
    let mut found: Vec<ColorLiteral> = table
        .rules()
        .iter()
        .filter(|rule| rule.kind() == TokenKind::ColorLiteral)
        .flat_map(|rule| rule.spans(line).collect::<Vec<_>>())
        .filter_map(|(start, end)| {
            let color = Rgba::parse(&line[start..end])?;
            Some(ColorLiteral {
                start: line[..start].chars().count(),
                end: line[..end].chars().count(),
                color,
            })
        })
        .collect();
    found.sort_by_key(|lit| lit.start);
    found
}

/// The color literal covering character column `col`, if any.
#[must_use]
pub fn color_literal_at(line: &str, col: usize) -> Option<ColorLiteral> {
    color_literals(line).into_iter().find(|lit| lit.contains(col))
}
