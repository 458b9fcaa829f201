//! Syntax highlighting: rule table, line engine, per-document cache and theme.
//!
//! Highlighting is lexical. A [`RuleTable`] of regular expressions is applied
//! to one line at a time by a [`Tokenizer`]; the only state carried from one
//! line to the next is the [`LineState`] recording an open triple-quoted
//! string. [`HighlightCache`] keeps tokens and exit states per line and
//! re-tokenizes incrementally after edits.
//!
//! # Examples
//!
//! ```
//! use ember::highlight::{LineState, RuleHighlighter, TokenKind, Tokenizer};
//!
//! let highlighter = RuleHighlighter::new();
//! let (tokens, state) = highlighter.tokenize_line("def main():", LineState::Normal);
//! assert_eq!(tokens[0].kind, TokenKind::Keyword);
//! assert_eq!(state, LineState::Normal);
//!
//! let (_, state) = highlighter.tokenize_line("    \"\"\"Docs", LineState::Normal);
//! assert_eq!(state.tag(), 1);
//! ```

pub mod engine;
mod line_cache;
pub mod rules;
pub mod theme;
pub mod token;

pub use engine::{LineState, Quote, RuleHighlighter, Tokenizer};
pub use line_cache::HighlightCache;
pub use rules::{Rule, RuleTable};
pub use theme::Theme;
pub use token::{Token, TokenKind};
