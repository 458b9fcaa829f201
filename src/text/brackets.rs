//! Bracket matching over nested `()`, `[]` and `{}`.
//!
//! Matching is purely lexical: brackets inside strings and comments count
//! like any other. Scans walk the rope character by character across line
//! boundaries and stop at the start or end of the buffer.

use super::rope::RopeWrapper;

/// Scan direction for [`find_match`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Start just after the bracket and walk toward the end.
    Forward,
    /// Start just before the bracket and walk toward the start.
    Backward,
}

/// The counterpart of a bracket character, or `None` for anything else.
#[must_use]
pub const fn partner(ch: char) -> Option<char> {
    match ch {
        '(' => Some(')'),
        ')' => Some('('),
        '[' => Some(']'),
        ']' => Some('['),
        '{' => Some('}'),
        '}' => Some('{'),
        _ => None,
    }
}

#[must_use]
pub const fn is_opener(ch: char) -> bool {
    matches!(ch, '(' | '[' | '{')
}

#[must_use]
pub const fn is_closer(ch: char) -> bool {
    matches!(ch, ')' | ']' | '}')
}

/// Find the bracket that balances the one at `pos`.
///
/// Depth starts at one; every further occurrence of the same character
/// deepens it and every partner character closes one level. Returns the
/// position where depth reaches zero, or `None` if `pos` is not a bracket
/// or the buffer boundary is reached first.
#[must_use]
pub fn find_match(rope: &RopeWrapper, pos: usize, direction: Direction) -> Option<usize> {
    let ch = rope.char_at(pos)?;
    let target = partner(ch)?;
    let inner = rope.inner();
    let mut depth = 1usize;

    match direction {
        Direction::Forward => {
            for (offset, c) in inner.chars_at(pos + 1).enumerate() {
                if c == ch {
                    depth += 1;
                } else if c == target {
                    depth -= 1;
                    if depth == 0 {
                        return Some(pos + 1 + offset);
                    }
                }
            }
        }
        Direction::Backward => {
            let mut chars = inner.chars_at(pos);
            let mut idx = pos;
            while let Some(c) = chars.prev() {
                idx -= 1;
                if c == ch {
                    depth += 1;
                } else if c == target {
                    depth -= 1;
                    if depth == 0 {
                        return Some(idx);
                    }
                }
            }
        }
    }

    None
}

/// A bracket next to the cursor and its match, if any.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BracketPair {
    /// Position of the bracket the cursor is touching.
    pub anchor: usize,
    /// Position of its balancing partner.
    pub partner: Option<usize>,
}

/// Locate the bracket the cursor at `cursor` is touching and its match.
///
/// An opener just before the cursor wins; otherwise a closer at the cursor
/// is used. Any other arrangement yields `None`.
#[must_use]
pub fn bracket_at_cursor(rope: &RopeWrapper, cursor: usize) -> Option<BracketPair> {
    if let Some(before) = cursor.checked_sub(1) {
        if rope.char_at(before).is_some_and(is_opener) {
            return Some(BracketPair {
                anchor: before,
                partner: find_match(rope, before, Direction::Forward),
            });
        }
    }
    if rope.char_at(cursor).is_some_and(is_closer) {
        return Some(BracketPair {
            anchor: cursor,
            partner: find_match(rope, cursor, Direction::Backward),
        });
    }
    None
}
