//! Static mapping from lexical pattern to display style.
//!
//! A [`RuleTable`] is an ordered list of regular expressions. The highlight
//! engine applies every rule to a line independently, in table order, and a
//! later rule overwrites the style of any bytes an earlier rule already
//! styled. The ordering of [`RuleTable::standard`] is therefore part of the
//! observable coloring behavior.

use std::sync::{Arc, OnceLock};

use regex::Regex;

use super::token::TokenKind;
use crate::error::Result;

const KEYWORDS: &[&str] = &[
    "and", "as", "assert", "async", "await", "break", "class", "continue", "def", "del", "elif",
    "else", "except", "finally", "for", "from", "global", "if", "import", "in", "is", "lambda",
    "nonlocal", "not", "or", "pass", "raise", "return", "try", "while", "with", "yield",
    "function", "var", "let", "const", "static", "public", "private", "protected", "void", "int",
    "string", "bool", "float", "double",
];

const TYPES: &[&str] = &[
    "bool", "int", "float", "str", "list", "dict", "set", "tuple", "object", "None", "True",
    "False",
];

/// Patterns applied after keywords and types, in order.
///
/// The second element is the capture group whose span is styled (0 = whole
/// match).
const PATTERNS: &[(&str, TokenKind, usize)] = &[
    (r#"""".*?""""#, TokenKind::Docstring, 0),
    (r"'''.*?'''", TokenKind::Docstring, 0),
    (r"#.*", TokenKind::Comment, 0),
    (r"\bdef\s+(\w+)", TokenKind::Function, 1),
    (r"\bclass\s+(\w+)", TokenKind::Class, 1),
    (r"@\w+", TokenKind::Decorator, 0),
    (r#""[^"\\]*(?:\\.[^"\\]*)*""#, TokenKind::String, 0),
    (r"'[^'\\]*(?:\\.[^'\\]*)*'", TokenKind::String, 0),
    (r"\b\d+\b", TokenKind::Number, 0),
    (r"\b0x[0-9A-Fa-f]+\b", TokenKind::Number, 0),
    (r"\b\d+\.\d*\b", TokenKind::Number, 0),
    (r"\bself\b", TokenKind::SpecialVar, 0),
    (r"\bcls\b", TokenKind::SpecialVar, 0),
    (r"\b(\w+)\s*\(", TokenKind::Function, 1),
    (r"[+\-*/=<>!&|^~]", TokenKind::Operator, 0),
    (r"[\[\]{}()]", TokenKind::Bracket, 0),
    (r"\br'[^'\\]*(?:\\.[^'\\]*)*'", TokenKind::Regex, 0),
    (r#"\br"[^"\\]*(?:\\.[^"\\]*)*""#, TokenKind::Regex, 0),
    (r"https?://\S+", TokenKind::Url, 0),
    (r#"\\[abfnrtv'"\\]"#, TokenKind::StringEscape, 0),
    (r"\.\w+", TokenKind::Property, 0),
    (r"#(?:[0-9a-fA-F]{3}){1,2}\b", TokenKind::ColorLiteral, 0),
    (
        r"rgb\(\s*\d+\s*,\s*\d+\s*,\s*\d+\s*\)",
        TokenKind::ColorLiteral,
        0,
    ),
];

/// One lexical rule.
#[derive(Clone, Debug)]
pub struct Rule {
    pattern: Regex,
    kind: TokenKind,
    group: usize,
}

impl Rule {
    /// Compile a rule that styles the whole match.
    pub fn new(pattern: &str, kind: TokenKind) -> Result<Self> {
        Self::with_group(pattern, kind, 0)
    }

    /// Compile a rule that styles only capture group `group`.
    pub fn with_group(pattern: &str, kind: TokenKind, group: usize) -> Result<Self> {
        let pattern = Regex::new(pattern)?;
        if group >= pattern.captures_len() {
            return Err(crate::Error::InvalidPattern(format!(
                "{pattern} has no capture group {group}"
            )));
        }
        Ok(Self {
            pattern,
            kind,
            group,
        })
    }

    #[must_use]
    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    #[must_use]
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Byte ranges this rule styles in `line`, left to right.
    pub fn spans<'a>(&'a self, line: &'a str) -> impl Iterator<Item = (usize, usize)> + 'a {
        self.pattern.captures_iter(line).filter_map(move |caps| {
            caps.get(self.group)
                .filter(|m| !m.is_empty())
                .map(|m| (m.start(), m.end()))
        })
    }
}

/// Ordered collection of rules.
#[derive(Clone, Debug, Default)]
pub struct RuleTable {
    rules: Vec<Rule>,
}

impl RuleTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule. It takes precedence over every rule already present.
    pub fn push(&mut self, rule: Rule) -> &mut Self {
        self.rules.push(rule);
        self
    }

    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The built-in table, compiled once per process.
    #[must_use]
    pub fn standard() -> Arc<Self> {
        static TABLE: OnceLock<Arc<RuleTable>> = OnceLock::new();
        Arc::clone(TABLE.get_or_init(|| Arc::new(Self::build_standard())))
    }

    fn build_standard() -> Self {
        let mut table = Self::new();
        table.push(word_rule(KEYWORDS, TokenKind::Keyword));
        table.push(word_rule(TYPES, TokenKind::Type));
        for &(pattern, kind, group) in PATTERNS {
            let rule = Rule::with_group(pattern, kind, group)
                .unwrap_or_else(|err| panic!("built-in rule {pattern:?} is invalid: {err}"));
            table.push(rule);
        }
        table
    }
}

fn word_rule(words: &[&str], kind: TokenKind) -> Rule {
    let pattern = format!(r"\b(?:{})\b", words.join("|"));
    Rule::new(&pattern, kind)
        .unwrap_or_else(|err| panic!("built-in word rule is invalid: {err}"))
}
