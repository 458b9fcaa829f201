//! Keystroke interception rules: auto-close pairs, auto-indent on newline,
//! and whole-document re-indent.
//!
//! These are pure functions over text; [`EditBuffer`](super::EditBuffer)
//! applies their results.

/// Closing counterpart inserted after a typed opener.
#[must_use]
pub const fn auto_close(ch: char) -> Option<char> {
    match ch {
        '(' => Some(')'),
        '[' => Some(']'),
        '{' => Some('}'),
        '"' => Some('"'),
        '\'' => Some('\''),
        _ => None,
    }
}

/// Text to insert for a newline and where the cursor lands within it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewlineInsert {
    pub text: String,
    /// Cursor position after the insert, in chars from the insert point.
    pub cursor: usize,
}

/// Leading whitespace of a line.
#[must_use]
pub fn leading_indent(line: &str) -> &str {
    let end = line.len() - line.trim_start().len();
    &line[..end]
}

/// Compute the newline insert for a cursor splitting a line into `before`
/// and `after`.
///
/// The new line keeps the indentation of the current one. When `before`
/// ends with `{`, the result is a two-line skeleton: an inner line indented
/// one more `unit` (where the cursor lands) and a line with the original
/// indentation plus `}`. If the text after the cursor already starts with
/// `}`, that brace is reused instead of inserting a second one.
#[must_use]
pub fn newline_insert(before: &str, after: &str, unit: &str) -> NewlineInsert {
    let indent = leading_indent(before);

    if before.trim_end().ends_with('{') {
        let inner = format!("\n{indent}{unit}");
        let cursor = inner.chars().count();
        let text = if after.trim_start().starts_with('}') {
            format!("{inner}\n{indent}")
        } else {
            format!("{inner}\n{indent}}}")
        };
        return NewlineInsert { text, cursor };
    }

    let text = format!("\n{indent}");
    let cursor = text.chars().count();
    NewlineInsert { text, cursor }
}

/// Re-derive indentation for a whole document.
///
/// Existing indentation is discarded. The level drops by one before a line
/// that starts with `}` and rises by one after a line that ends with `{`.
/// Blank lines come out empty; a trailing newline is preserved.
#[must_use]
pub fn reindent(text: &str, unit: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut level = 0usize;

    for (idx, line) in text.lines().enumerate() {
        if idx > 0 {
            out.push('\n');
        }
        let stripped = line.trim();
        if stripped.starts_with('}') {
            level = level.saturating_sub(1);
        }
        if !stripped.is_empty() {
            for _ in 0..level {
                out.push_str(unit);
            }
            out.push_str(stripped);
        }
        if stripped.ends_with('{') {
            level += 1;
        }
    }

    if text.ends_with('\n') {
        out.push('\n');
    }
    out
}
