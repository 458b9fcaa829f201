use crate::highlight::engine::{LineState, Tokenizer};
use crate::highlight::theme::Theme;
use crate::highlight::token::Token;
use crate::style::Style;
use crate::text::{LineChange, RopeWrapper};
use std::ops::Range;
use std::sync::Arc;
use tracing::trace;

/// Per-line token cache and exit-state side table for one document.
///
/// The cache does not own text. The owner reports every edit through
/// [`HighlightCache::splice`] and then calls [`HighlightCache::update`] with
/// the edited rope. Edited lines are always re-tokenized; re-tokenizing then
/// cascades to following lines only while a line's exit state differs from
/// the value recorded for it before the edit.
pub struct HighlightCache {
    tokenizer: Arc<dyn Tokenizer>,

    line_tokens: Vec<Vec<Token>>,
    // State at END of each line
    line_states: Vec<LineState>,
    // Lines whose text changed since the last update
    stale: Vec<bool>,
}

impl std::fmt::Debug for HighlightCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HighlightCache")
            .field("lines", &self.line_states.len())
            .field("stale", &self.stale.iter().filter(|s| **s).count())
            .finish_non_exhaustive()
    }
}

impl HighlightCache {
    /// Empty cache for a document of `line_count` lines; every line starts stale.
    #[must_use]
    pub fn new(tokenizer: Arc<dyn Tokenizer>, line_count: usize) -> Self {
        let mut cache = Self {
            tokenizer,
            line_tokens: Vec::new(),
            line_states: Vec::new(),
            stale: Vec::new(),
        };
        cache.reset(line_count);
        cache
    }

    /// Swap the tokenizer. Every line becomes stale.
    pub fn set_tokenizer(&mut self, tokenizer: Arc<dyn Tokenizer>) {
        self.tokenizer = tokenizer;
        self.reset(self.line_states.len());
    }

    /// Forget everything and mark `line_count` lines stale.
    pub fn reset(&mut self, line_count: usize) {
        self.line_tokens = vec![Vec::new(); line_count];
        self.line_states = vec![LineState::Normal; line_count];
        self.stale = vec![true; line_count];
    }

    /// Record an edit. The replaced lines become stale placeholders; the last
    /// of them inherits the old exit state of the last removed line so the
    /// cascade can tell whether anything after the edit is affected.
    pub fn splice(&mut self, change: LineChange) {
        let len = self.line_states.len();
        let start = change.start.min(len);
        let end = (change.start + change.removed).min(len);
        let carried = end
            .checked_sub(1)
            .filter(|&last| last >= start)
            .map_or(LineState::Normal, |last| self.line_states[last]);
        let inserted = change.inserted.max(1);
        let mut states = vec![LineState::Normal; inserted];
        states[inserted - 1] = carried;

        self.line_tokens
            .splice(start..end, std::iter::repeat_n(Vec::new(), inserted));
        self.line_states.splice(start..end, states);
        self.stale
            .splice(start..end, std::iter::repeat_n(true, inserted));
    }

    /// Re-tokenize stale lines and cascade. Returns the range of lines that
    /// were re-tokenized (empty when nothing was stale).
    pub fn update(&mut self, rope: &RopeWrapper) -> Range<usize> {
        let line_count = rope.len_lines();
        if self.line_states.len() != line_count {
            trace!(
                cached = self.line_states.len(),
                line_count, "line count out of sync, re-highlighting everything"
            );
            self.reset(line_count);
        }

        let Some(mut line) = self.stale.iter().position(|s| *s) else {
            return 0..0;
        };
        let first = line;
        let mut last = line;
        let mut state = Self::entry_state(&self.line_states, line);

        while line < line_count {
            let text = rope.line_text(line);
            let (tokens, exit) = self.tokenizer.tokenize_line(&text, state);
            self.line_tokens[line] = tokens;
            let exit_changed = self.line_states[line] != exit;
            self.line_states[line] = exit;
            self.stale[line] = false;
            last = line;

            let next_stale = self.stale.get(line + 1).copied().unwrap_or(false);
            if exit_changed || next_stale {
                state = exit;
                line += 1;
                continue;
            }

            match self.stale[line + 1..].iter().position(|s| *s) {
                Some(skip) => {
                    line += 1 + skip;
                    state = Self::entry_state(&self.line_states, line);
                }
                None => break,
            }
        }

        trace!(first, last, "re-highlighted lines");
        first..last + 1
    }

    fn entry_state(states: &[LineState], line: usize) -> LineState {
        line.checked_sub(1)
            .and_then(|prev| states.get(prev).copied())
            .unwrap_or_default()
    }

    /// Tokens for a line (byte offsets within the line).
    #[must_use]
    pub fn tokens_for_line(&self, line: usize) -> &[Token] {
        self.line_tokens.get(line).map_or(&[], Vec::as_slice)
    }

    /// Exit state of a line. Lines past the end read as normal.
    #[must_use]
    pub fn line_state(&self, line: usize) -> LineState {
        self.line_states.get(line).copied().unwrap_or_default()
    }

    /// True if any line awaits re-tokenizing.
    #[must_use]
    pub fn is_stale(&self) -> bool {
        self.stale.iter().any(|s| *s)
    }

    #[must_use]
    pub fn len_lines(&self) -> usize {
        self.line_states.len()
    }

    /// Styled spans for a line under `theme`, in byte offsets within the line.
    #[must_use]
    pub fn styled_line(&self, line: usize, theme: &Theme) -> Vec<(Range<usize>, Style)> {
        self.tokens_for_line(line)
            .iter()
            .map(|token| (token.range(), *theme.style_for(token.kind)))
            .filter(|(_, style)| !style.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::engine::{Quote, RuleHighlighter};
    use crate::highlight::token::TokenKind;
    use crate::text::Document;

    fn cache_for(doc: &Document) -> HighlightCache {
        let mut cache = HighlightCache::new(Arc::new(RuleHighlighter::new()), doc.len_lines());
        cache.update(doc.rope());
        cache
    }

    #[test]
    fn initial_update_covers_everything() {
        let doc = Document::from_text("if a:\n    return 1\n");
        let mut cache = HighlightCache::new(Arc::new(RuleHighlighter::new()), doc.len_lines());
        assert_eq!(cache.update(doc.rope()), 0..3);
        assert!(!cache.is_stale());
        assert_eq!(cache.tokens_for_line(0)[0].kind, TokenKind::Keyword);
        assert_eq!(cache.update(doc.rope()), 0..0);
    }

    #[test]
    fn single_line_edit_does_not_cascade() {
        let mut doc = Document::from_text("a = 1\nb = 2\nc = 3\nd = 4");
        let mut cache = cache_for(&doc);
        let change = doc.replace(0..0, "if ");
        cache.splice(change);
        assert_eq!(cache.update(doc.rope()), 0..1);
        assert_eq!(cache.tokens_for_line(0)[0].kind, TokenKind::Keyword);
    }

    #[test]
    fn opening_docstring_cascades_until_state_settles() {
        let mut doc = Document::from_text("x = 1\ny = 2\nz = 3\n\"\"\"\nw = 4");
        let mut cache = cache_for(&doc);
        assert_eq!(cache.line_state(3), LineState::InDocstring(Quote::Double));

        // Opening a docstring on line 0 flips lines 0..=2 into docstring mode;
        // line 3's `"""` now closes it, so its exit state flips to normal and
        // line 4 is re-tokenized too.
        let change = doc.replace(0..0, "\"\"\"");
        cache.splice(change);
        assert_eq!(cache.update(doc.rope()), 0..5);
        assert_eq!(cache.line_state(2), LineState::InDocstring(Quote::Double));
        assert_eq!(cache.line_state(3), LineState::Normal);
        assert_eq!(cache.tokens_for_line(4)[0].kind, TokenKind::Operator);
    }

    #[test]
    fn cascade_stops_at_unchanged_exit_state() {
        let mut doc = Document::from_text("\"\"\"\na\nb\n\"\"\"\nc\nd");
        let mut cache = cache_for(&doc);
        // Edit inside the docstring: exit state of line 1 is unchanged.
        let pos = doc.rope().line_to_char(1);
        let change = doc.replace(pos..pos, "more ");
        cache.splice(change);
        assert_eq!(cache.update(doc.rope()), 1..2);
    }

    #[test]
    fn inserted_and_removed_lines_keep_table_aligned() {
        let mut doc = Document::from_text("a\nb\nc");
        let mut cache = cache_for(&doc);
        let change = doc.replace(1..1, "\n\"\"\"x\ny");
        cache.splice(change);
        cache.update(doc.rope());
        assert_eq!(cache.len_lines(), doc.len_lines());
        assert_eq!(cache.line_state(1), LineState::InDocstring(Quote::Double));
        assert_eq!(cache.line_state(4), LineState::InDocstring(Quote::Double));

        let end = doc.len_chars();
        let change = doc.replace(1..end, "");
        cache.splice(change);
        cache.update(doc.rope());
        assert_eq!(cache.len_lines(), 1);
        assert_eq!(cache.line_state(0), LineState::Normal);
    }

    #[test]
    fn styled_line_uses_theme() {
        let doc = Document::from_text("return x");
        let cache = cache_for(&doc);
        let theme = Theme::default();
        let spans = cache.styled_line(0, &theme);
        assert_eq!(spans[0].0, 0..6);
        assert_eq!(spans[0].1, *theme.style_for(TokenKind::Keyword));
    }
}
