#![allow(dead_code)]

use std::sync::Once;

static INIT: Once = Once::new();

/// Route `tracing` output through the test harness so it shows up on failure.
pub fn setup_test_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init();
    });
}

/// Tokens for every line of `text`, tokenized from scratch with line state
/// threaded through.
pub fn fresh_tokens(text: &str) -> Vec<Vec<ember::Token>> {
    use ember::Tokenizer;

    let tokenizer = ember::RuleHighlighter::new();
    let rope = ember::RopeWrapper::from_str(text);
    let mut state = ember::LineState::Normal;
    (0..rope.len_lines())
        .map(|line| {
            let (tokens, exit) = tokenizer.tokenize_line(&rope.line_text(line), state);
            state = exit;
            tokens
        })
        .collect()
}
