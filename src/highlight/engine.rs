//! Line-at-a-time highlighting with carried multi-line state.
//!
//! [`RuleHighlighter`] applies a [`RuleTable`] to one line, then runs the
//! docstring pass, which is the only construct that spans lines. Overlapping
//! rule matches resolve last-applied-wins: each rule paints its byte ranges
//! over whatever earlier rules painted, and the docstring pass paints last.

use std::sync::Arc;

use super::rules::RuleTable;
use super::token::{Token, TokenKind};
use crate::text::RopeWrapper;

/// Which triple-quote delimiter opened a docstring.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Quote {
    /// `"""`
    Double,
    /// `'''`
    Single,
}

impl Quote {
    #[must_use]
    pub const fn delimiter(self) -> &'static str {
        match self {
            Self::Double => "\"\"\"",
            Self::Single => "'''",
        }
    }
}

const DELIMITER_LEN: usize = 3;

/// Lexical state at the end of a line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum LineState {
    #[default]
    Normal,
    /// Inside an unterminated triple-quoted string.
    InDocstring(Quote),
}

impl LineState {
    /// Compact exit-state tag: 0 = clean, 1 = inside a multi-line construct.
    #[must_use]
    pub const fn tag(self) -> u8 {
        match self {
            Self::Normal => 0,
            Self::InDocstring(_) => 1,
        }
    }
}

/// Core highlighting abstraction.
pub trait Tokenizer: Send + Sync {
    /// Tokenize a single line given the state from the previous line.
    /// Returns: (tokens, state_at_end_of_line).
    fn tokenize_line(&self, line: &str, state: LineState) -> (Vec<Token>, LineState);

    /// Tokenize an entire text by calling `tokenize_line` for each line.
    ///
    /// Token offsets are absolute byte offsets into `text`. Lines are split
    /// the way the editor's rope splits them, so every line break it knows
    /// (`\n`, `\r\n`, lone `\r`, form feed, U+2028) ends a line.
    fn tokenize(&self, text: &str) -> Vec<Token> {
        let rope = RopeWrapper::from_str(text);
        let mut tokens = Vec::new();
        let mut state = LineState::Normal;

        for line in 0..rope.len_lines() {
            let offset = rope.char_to_byte(rope.line_to_char(line));
            let (line_tokens, new_state) = self.tokenize_line(&rope.line_text(line), state);
            tokens.extend(
                line_tokens
                    .into_iter()
                    .map(|t| Token::new(t.kind, t.start + offset, t.end + offset)),
            );
            state = new_state;
        }

        tokens
    }
}

/// Regex rule-table highlighter.
#[derive(Clone, Debug)]
pub struct RuleHighlighter {
    rules: Arc<RuleTable>,
}

impl Default for RuleHighlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleHighlighter {
    /// Highlighter over the built-in rule table.
    #[must_use]
    pub fn new() -> Self {
        Self::with_rules(RuleTable::standard())
    }

    #[must_use]
    pub fn with_rules(rules: Arc<RuleTable>) -> Self {
        Self { rules }
    }

    #[must_use]
    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }
}

impl Tokenizer for RuleHighlighter {
    fn tokenize_line(&self, line: &str, state: LineState) -> (Vec<Token>, LineState) {
        let mut paint: Vec<Option<TokenKind>> = vec![None; line.len()];

        for rule in self.rules.rules() {
            let kind = rule.kind();
            for (start, end) in rule.spans(line) {
                paint[start..end].fill(Some(kind));
            }
        }

        let exit = paint_docstrings(line, state, &mut paint);
        (coalesce(&paint), exit)
    }
}

fn next_opening(line: &str, from: usize) -> Option<(usize, Quote)> {
    let rest = &line[from..];
    let double = rest.find(Quote::Double.delimiter()).map(|i| (i, Quote::Double));
    let single = rest.find(Quote::Single.delimiter()).map(|i| (i, Quote::Single));
    let earliest = match (double, single) {
        (Some(d), Some(s)) => Some(if s.0 < d.0 { s } else { d }),
        (d, s) => d.or(s),
    };
    earliest.map(|(i, quote)| (from + i, quote))
}

fn paint_docstrings(line: &str, state: LineState, paint: &mut [Option<TokenKind>]) -> LineState {
    let mut pos = 0;

    if let LineState::InDocstring(quote) = state {
        match line.find(quote.delimiter()) {
            Some(close) => {
                let end = close + DELIMITER_LEN;
                paint[..end].fill(Some(TokenKind::Docstring));
                pos = end;
            }
            None => {
                paint.fill(Some(TokenKind::Docstring));
                return state;
            }
        }
    }

    while let Some((start, quote)) = next_opening(line, pos) {
        let body = start + DELIMITER_LEN;
        match line[body..].find(quote.delimiter()) {
            Some(rel) => {
                let end = body + rel + DELIMITER_LEN;
                paint[start..end].fill(Some(TokenKind::Docstring));
                pos = end;
            }
            None => {
                paint[start..].fill(Some(TokenKind::Docstring));
                return LineState::InDocstring(quote);
            }
        }
    }

    LineState::Normal
}

/// Collapse per-byte paint into maximal same-kind runs.
fn coalesce(paint: &[Option<TokenKind>]) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut run: Option<(TokenKind, usize)> = None;

    for (idx, slot) in paint.iter().enumerate() {
        match (run, *slot) {
            (Some((kind, _)), Some(next)) if kind == next => {}
            (Some((kind, start)), next) => {
                tokens.push(Token::new(kind, start, idx));
                run = next.map(|k| (k, idx));
            }
            (None, next) => run = next.map(|k| (k, idx)),
        }
    }
    if let Some((kind, start)) = run {
        tokens.push(Token::new(kind, start, paint.len()));
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds_at(tokens: &[Token], line: &str, needle: &str) -> Vec<TokenKind> {
        let start = line.find(needle).expect("needle present");
        let end = start + needle.len();
        tokens
            .iter()
            .filter(|t| t.start < end && t.end > start)
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn keyword_and_function_call() {
        let hl = RuleHighlighter::new();
        let line = "if ready(x): return 1";
        let (tokens, state) = hl.tokenize_line(line, LineState::Normal);
        assert_eq!(state, LineState::Normal);
        assert_eq!(kinds_at(&tokens, line, "if"), vec![TokenKind::Keyword]);
        assert_eq!(kinds_at(&tokens, line, "ready"), vec![TokenKind::Function]);
        assert_eq!(kinds_at(&tokens, line, "return"), vec![TokenKind::Keyword]);
        assert_eq!(kinds_at(&tokens, line, "1"), vec![TokenKind::Number]);
    }

    #[test]
    fn later_rules_overwrite_earlier_ones() {
        let hl = RuleHighlighter::new();
        // Comment paints the whole tail, then the bracket rule repaints the parens.
        let line = "# call(x)";
        let (tokens, _) = hl.tokenize_line(line, LineState::Normal);
        assert_eq!(tokens[0], Token::new(TokenKind::Comment, 0, 2));
        assert_eq!(kinds_at(&tokens, line, "call"), vec![TokenKind::Function]);
        assert_eq!(kinds_at(&tokens, line, "("), vec![TokenKind::Bracket]);
    }

    #[test]
    fn types_win_over_keywords() {
        let hl = RuleHighlighter::new();
        let line = "int count";
        let (tokens, _) = hl.tokenize_line(line, LineState::Normal);
        assert_eq!(tokens, vec![Token::new(TokenKind::Type, 0, 3)]);
    }

    #[test]
    fn single_line_docstring() {
        let hl = RuleHighlighter::new();
        let line = r#"x = """doc""" + 1"#;
        let (tokens, state) = hl.tokenize_line(line, LineState::Normal);
        assert_eq!(state, LineState::Normal);
        assert!(tokens.contains(&Token::new(TokenKind::Docstring, 4, 13)));
    }

    #[test]
    fn docstring_opens_and_closes_across_lines() {
        let hl = RuleHighlighter::new();
        let (tokens, state) = hl.tokenize_line(r#"    """Start of doc"#, LineState::Normal);
        assert_eq!(state, LineState::InDocstring(Quote::Double));
        assert_eq!(state.tag(), 1);
        assert_eq!(tokens.last(), Some(&Token::new(TokenKind::Docstring, 4, 19)));

        let (tokens, state) = hl.tokenize_line("middle if while", state);
        assert_eq!(state, LineState::InDocstring(Quote::Double));
        assert_eq!(tokens, vec![Token::new(TokenKind::Docstring, 0, 15)]);

        let (tokens, state) = hl.tokenize_line(r#"end""" if"#, state);
        assert_eq!(state, LineState::Normal);
        assert_eq!(tokens[0], Token::new(TokenKind::Docstring, 0, 6));
        assert_eq!(tokens[1], Token::new(TokenKind::Keyword, 7, 9));
    }

    #[test]
    fn other_quote_does_not_close() {
        let hl = RuleHighlighter::new();
        let open = LineState::InDocstring(Quote::Double);
        let (_, state) = hl.tokenize_line("it's '''quoted'''", open);
        assert_eq!(state, open);
    }

    #[test]
    fn reopen_after_close_on_same_line() {
        let hl = RuleHighlighter::new();
        let (_, state) = hl.tokenize_line(r#"a""" b = '''c"#, LineState::InDocstring(Quote::Double));
        assert_eq!(state, LineState::InDocstring(Quote::Single));
    }

    #[test]
    fn empty_line_is_clean() {
        let hl = RuleHighlighter::new();
        assert_eq!(hl.tokenize_line("", LineState::Normal), (vec![], LineState::Normal));
        let open = LineState::InDocstring(Quote::Single);
        assert_eq!(hl.tokenize_line("", open), (vec![], open));
    }

    #[test]
    fn multibyte_text_is_safe() {
        let hl = RuleHighlighter::new();
        let line = "名前 = \"värde\" # コメント";
        let (tokens, _) = hl.tokenize_line(line, LineState::Normal);
        for token in &tokens {
            assert!(line.is_char_boundary(token.start));
            assert!(line.is_char_boundary(token.end));
        }
    }

    #[test]
    fn tokenize_offsets_crlf() {
        let hl = RuleHighlighter::new();
        let tokens = hl.tokenize("if\r\nif");
        assert_eq!(
            tokens,
            vec![
                Token::new(TokenKind::Keyword, 0, 2),
                Token::new(TokenKind::Keyword, 4, 6),
            ]
        );
    }

    #[test]
    fn tokenize_splits_on_every_line_break() {
        let hl = RuleHighlighter::new();
        let tokens = hl.tokenize("if\x0cif\rif");
        assert_eq!(
            tokens,
            vec![
                Token::new(TokenKind::Keyword, 0, 2),
                Token::new(TokenKind::Keyword, 3, 5),
                Token::new(TokenKind::Keyword, 6, 8),
            ]
        );
    }

    #[test]
    fn color_literals_are_tokenized() {
        let hl = RuleHighlighter::new();
        let line = "bg = rgb(1, 2, 3)  # #fff";
        let (tokens, _) = hl.tokenize_line(line, LineState::Normal);
        assert!(tokens.contains(&Token::new(TokenKind::ColorLiteral, 5, 17)));
        assert!(tokens.contains(&Token::new(TokenKind::ColorLiteral, 21, 25)));
    }
}
