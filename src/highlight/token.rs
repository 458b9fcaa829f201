//! Token types for syntax highlighting.

use std::ops::Range;

/// Display style classes produced by the rule table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Keywords and types
    Keyword,
    Type,

    // Definitions and calls
    Function,
    Class,
    Decorator,
    SpecialVar,
    Property,

    // Literals
    String,
    StringEscape,
    Regex,
    Number,
    ColorLiteral,
    Url,

    // Comments
    Comment,
    Docstring,

    // Operators and punctuation
    Operator,
    Bracket,
}

impl TokenKind {
    /// Number of token kinds, for dense per-kind tables.
    pub const COUNT: usize = 17;

    /// All kinds in declaration order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Keyword,
        Self::Type,
        Self::Function,
        Self::Class,
        Self::Decorator,
        Self::SpecialVar,
        Self::Property,
        Self::String,
        Self::StringEscape,
        Self::Regex,
        Self::Number,
        Self::ColorLiteral,
        Self::Url,
        Self::Comment,
        Self::Docstring,
        Self::Operator,
        Self::Bracket,
    ];

    /// Dense index of this kind.
    #[must_use]
    pub const fn as_usize(self) -> usize {
        self as usize
    }

    /// Stable lowercase name, as used in themes and logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Keyword => "keyword",
            Self::Type => "type",
            Self::Function => "function",
            Self::Class => "class",
            Self::Decorator => "decorator",
            Self::SpecialVar => "special_var",
            Self::Property => "property",
            Self::String => "string",
            Self::StringEscape => "string_escape",
            Self::Regex => "regex",
            Self::Number => "number",
            Self::ColorLiteral => "color_literal",
            Self::Url => "url",
            Self::Comment => "comment",
            Self::Docstring => "docstring",
            Self::Operator => "operator",
            Self::Bracket => "bracket",
        }
    }
}

/// A styled span within one line, in byte offsets relative to line start.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

impl Token {
    #[must_use]
    pub fn new(kind: TokenKind, start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "token range must be start <= end");
        Self { kind, start, end }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}
