//! End-to-end terminal sessions: builtins, history, and real child processes.

mod common;

use std::path::Path;
use std::time::{Duration, Instant};

use common::setup_test_logging;
use ember::shell::{Completer, TextClass};
use ember::{KeyCode, KeyEvent, Terminal, TerminalState};

fn session(dir: &Path) -> Terminal {
    setup_test_logging();
    Terminal::new(dir).with_completer(Completer::with_commands(["echo", "sleep"]))
}

fn run(term: &mut Terminal, line: &str) {
    for ch in line.chars() {
        term.handle_key(KeyEvent::char(ch));
    }
    term.handle_key(KeyEvent::key(KeyCode::Enter));
}

#[test]
fn echo_prints_and_reprompts() {
    let dir = tempfile::tempdir().unwrap();
    let mut term = session(dir.path());
    run(&mut term, "echo hello");

    let text = term.transcript().text();
    assert!(text.ends_with(&format!("hello\n{}", term.prompt())));
    assert_eq!(term.transcript().boundary(), term.transcript().len_chars());
    assert_eq!(term.state(), TerminalState::Idle);
    assert_eq!(term.history().entries(), ["echo hello"]);
}

#[test]
fn cd_to_missing_directory_stays_idle() {
    let dir = tempfile::tempdir().unwrap();
    let mut term = session(dir.path());
    run(&mut term, "cd does-not-exist");

    assert_eq!(term.state(), TerminalState::Idle);
    assert!(!term.is_process_running());
    let error = term.palette().style(TextClass::Error);
    let transcript = term.transcript();
    let span = transcript
        .spans()
        .iter()
        .find(|s| s.style == error)
        .expect("error span");
    let text = transcript.text();
    let flagged: String = text
        .chars()
        .skip(span.range.start)
        .take(span.range.len())
        .collect();
    assert!(flagged.contains("does-not-exist"));
}

#[test]
fn history_walk_restores_draft() {
    let dir = tempfile::tempdir().unwrap();
    let mut term = session(dir.path());
    for cmd in ["echo a", "echo b", "echo c"] {
        run(&mut term, cmd);
    }
    term.type_str("draft");

    let mut seen = Vec::new();
    for _ in 0..3 {
        term.handle_key(KeyEvent::key(KeyCode::Up));
        seen.push(term.transcript().editable_text());
    }
    assert_eq!(seen, ["echo c", "echo b", "echo a"]);

    // Past the oldest entry nothing changes.
    term.handle_key(KeyEvent::key(KeyCode::Up));
    assert_eq!(term.transcript().editable_text(), "echo a");

    for _ in 0..3 {
        term.handle_key(KeyEvent::key(KeyCode::Down));
    }
    assert_eq!(term.transcript().editable_text(), "draft");
}

#[test]
fn protected_prefix_survives_editing_keys() {
    let dir = tempfile::tempdir().unwrap();
    let mut term = session(dir.path());
    let before = term.transcript().text();
    for code in [KeyCode::Home, KeyCode::Left, KeyCode::Backspace, KeyCode::Backspace] {
        term.handle_key(KeyEvent::key(code));
    }
    assert_eq!(term.transcript().text(), before);
    assert!(term.transcript().caret() >= term.transcript().boundary());
}

#[cfg(unix)]
fn wait_for(term: &mut Terminal, state: TerminalState, limit: Duration) {
    let deadline = Instant::now() + limit;
    while term.state() != state {
        assert!(Instant::now() < deadline, "terminal never reached {state:?}");
        term.poll_timeout(Duration::from_millis(20));
    }
}

#[cfg(unix)]
#[test]
fn interrupt_then_run_again() {
    let dir = tempfile::tempdir().unwrap();
    let mut term = Terminal::with_config(dir.path(), ember::ShellConfig::posix("/bin/sh"));
    run(&mut term, "sleep 30");
    assert_eq!(term.state(), TerminalState::Running);

    let started = Instant::now();
    term.handle_key(KeyEvent::with_ctrl(KeyCode::Char('c')));
    assert!(started.elapsed() < Duration::from_secs(3));
    assert_eq!(term.state(), TerminalState::Idle);
    assert!(!term.is_process_running());
    assert!(term.transcript().text().contains("^C\n"));

    run(&mut term, "printf 'again\\n'");
    wait_for(&mut term, TerminalState::Idle, Duration::from_secs(10));
    let text = term.transcript().text();
    assert!(text.contains("again\n"));
    assert!(text.ends_with(&term.prompt()));
}

#[cfg(unix)]
#[test]
fn stderr_is_styled_as_error_when_separate() {
    let dir = tempfile::tempdir().unwrap();
    let config = ember::ShellConfig::posix("/bin/sh").with_mode(ember::StreamMode::Separate);
    let mut term = Terminal::with_config(dir.path(), config);
    run(&mut term, "printf 'oops\\n' >&2");
    wait_for(&mut term, TerminalState::Idle, Duration::from_secs(10));

    let error = term.palette().style(TextClass::Error);
    let text = term.transcript().text();
    assert!(text.contains("oops\n"));
    let span = term
        .transcript()
        .spans()
        .iter()
        .find(|s| s.style == error)
        .expect("stderr span");
    let flagged: String = text
        .chars()
        .skip(span.range.start)
        .take(span.range.len())
        .collect();
    assert!(flagged.contains("oops"));
}

#[cfg(unix)]
#[test]
fn running_command_reads_typed_lines() {
    let dir = tempfile::tempdir().unwrap();
    let mut term = Terminal::with_config(dir.path(), ember::ShellConfig::posix("/bin/sh"));
    run(&mut term, "read name; echo \"hi $name\"");
    assert_eq!(term.state(), TerminalState::Running);
    run(&mut term, "ada");
    wait_for(&mut term, TerminalState::Idle, Duration::from_secs(10));
    assert!(term.transcript().text().contains("hi ada\n"));
}
