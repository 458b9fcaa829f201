//! Interactive terminal session.
//!
//! A [`Terminal`] is `Idle` while the user composes a line, `Running` while
//! a spawned command is attached, and `Closed` after `exit`. Builtins run
//! in-process and return to `Idle` immediately. Output from a running child
//! is collected by [`Terminal::poll`], which the host calls from its event
//! loop.
//!
//! # Examples
//!
//! ```
//! use ember::shell::{Terminal, TerminalState};
//!
//! let mut term = Terminal::new(std::env::temp_dir());
//! term.type_str("echo hello");
//! term.submit();
//! assert_eq!(term.state(), TerminalState::Idle);
//! assert!(term.transcript().text().contains("echo hello\nhello\n"));
//! assert_eq!(term.transcript().boundary(), term.transcript().len_chars());
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info};

use super::completion::{self, Completer};
use super::history::CommandHistory;
use super::process::{self, OutputStream, ProcessBridge, ProcessEvent, ShellConfig};
use super::transcript::Transcript;
use crate::ansi::{AnsiDecoder, Segment};
use crate::color::Rgba;
use crate::input::{KeyCode, KeyEvent};
use crate::settings::Settings;
use crate::style::Style;

/// Commands handled without spawning, matched on the exact first token.
pub const BUILTINS: &[&str] = &["clear", "cls", "cd", "exit", "pwd", "echo", "help"];

const WELCOME: &str = "Welcome to Ember Terminal\n";
const CONTINUATION_PROMPT: &str = "> ";
const HELP: &str = "Built-in commands:
  clear, cls   Clear the screen
  cd <dir>     Change directory
  pwd          Print working directory
  echo <text>  Display text
  exit         Close the terminal
  help         Show this message
Anything else runs in the system shell.
";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TerminalState {
    Idle,
    Running,
    Closed,
}

/// Callbacks from a terminal to whatever hosts it.
pub trait TerminalHost {
    /// The user ran `exit`.
    fn request_close(&mut self);
}

/// What a piece of transcript text is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextClass {
    Prompt,
    Command,
    Output,
    Error,
    Warning,
    Success,
}

/// Colors for each [`TextClass`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TerminalPalette {
    pub background: Rgba,
    pub prompt: Rgba,
    pub command: Rgba,
    pub output: Rgba,
    pub error: Rgba,
    pub warning: Rgba,
    pub success: Rgba,
}

impl Default for TerminalPalette {
    fn default() -> Self {
        Self {
            background: Rgba::from_rgb_u8(0x28, 0x2A, 0x36),
            prompt: Rgba::from_rgb_u8(0x50, 0xFA, 0x7B),
            command: Rgba::from_rgb_u8(0xF8, 0xF8, 0xF2),
            output: Rgba::from_rgb_u8(0x8B, 0xE9, 0xFD),
            error: Rgba::from_rgb_u8(0xFF, 0x55, 0x55),
            warning: Rgba::from_rgb_u8(0xF1, 0xFA, 0x8C),
            success: Rgba::from_rgb_u8(0x50, 0xFA, 0x7B),
        }
    }
}

impl TerminalPalette {
    #[must_use]
    pub const fn style(&self, class: TextClass) -> Style {
        Style::fg(match class {
            TextClass::Prompt => self.prompt,
            TextClass::Command => self.command,
            TextClass::Output => self.output,
            TextClass::Error => self.error,
            TextClass::Warning => self.warning,
            TextClass::Success => self.success,
        })
    }
}

/// Per-stream decoding state for the running child.
#[derive(Debug, Default)]
struct StreamDecoder {
    carry: Vec<u8>,
    ansi: AnsiDecoder,
}

impl StreamDecoder {
    fn feed(&mut self, data: &[u8]) -> Vec<Segment> {
        let text = process::decode_chunk(&mut self.carry, data);
        self.ansi.feed(&text)
    }

    fn finish(&mut self) -> Vec<Segment> {
        let mut segments = Vec::new();
        if !self.carry.is_empty() {
            let rest = String::from_utf8_lossy(&std::mem::take(&mut self.carry)).into_owned();
            segments.extend(self.ansi.feed(&rest));
        }
        segments.extend(self.ansi.flush());
        self.ansi.reset();
        segments
    }
}

/// One embedded terminal with its own working directory.
pub struct Terminal {
    transcript: Transcript,
    history: CommandHistory,
    completer: Completer,
    bridge: ProcessBridge,
    stdout: StreamDecoder,
    stderr: StreamDecoder,
    state: TerminalState,
    cwd: PathBuf,
    pending_lines: Vec<String>,
    palette: TerminalPalette,
    settings: Settings,
    host: Option<Box<dyn TerminalHost>>,
}

impl std::fmt::Debug for Terminal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Terminal")
            .field("state", &self.state)
            .field("cwd", &self.cwd)
            .field("bridge", &self.bridge)
            .finish_non_exhaustive()
    }
}

impl Terminal {
    /// Terminal in `cwd` using the platform shell.
    #[must_use]
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self::with_config(cwd, ShellConfig::default())
    }

    /// Shows the welcome banner and the first prompt.
    #[must_use]
    pub fn with_config(cwd: impl Into<PathBuf>, config: ShellConfig) -> Self {
        let mut terminal = Self {
            transcript: Transcript::new(),
            history: CommandHistory::new(),
            completer: Completer::new(),
            bridge: ProcessBridge::new(config),
            stdout: StreamDecoder::default(),
            stderr: StreamDecoder::default(),
            state: TerminalState::Idle,
            cwd: cwd.into(),
            pending_lines: Vec::new(),
            palette: TerminalPalette::default(),
            settings: Settings::default(),
            host: None,
        };
        terminal.append(WELCOME, TextClass::Success);
        terminal.show_prompt();
        terminal
    }

    /// Inject the host notified on `exit`.
    #[must_use]
    pub fn with_host(mut self, host: Box<dyn TerminalHost>) -> Self {
        self.host = Some(host);
        self
    }

    /// Replace the completer (e.g. with a fixed command list).
    #[must_use]
    pub fn with_completer(mut self, completer: Completer) -> Self {
        self.completer = completer;
        self
    }

    // ----- accessors -----

    #[must_use]
    pub const fn state(&self) -> TerminalState {
        self.state
    }

    #[must_use]
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    #[must_use]
    pub const fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    #[must_use]
    pub const fn history(&self) -> &CommandHistory {
        &self.history
    }

    #[must_use]
    pub const fn palette(&self) -> &TerminalPalette {
        &self.palette
    }

    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Candidates of the current completion cycle.
    #[must_use]
    pub fn completion_candidates(&self) -> &[String] {
        self.completer.candidates()
    }

    #[must_use]
    pub fn is_process_running(&self) -> bool {
        self.bridge.is_running()
    }

    /// Prompt text for the current directory: `<basename> $ `.
    #[must_use]
    pub fn prompt(&self) -> String {
        let name = self
            .cwd
            .file_name()
            .map_or_else(|| self.cwd.display().to_string(), |n| n.to_string_lossy().into_owned());
        format!("{name} $ ")
    }

    /// Take a reloaded settings object. The transcript background follows
    /// the editor background.
    pub fn apply_settings(&mut self, settings: Settings) {
        self.palette.background = settings.colors.background;
        self.settings = settings;
    }

    // ----- transcript helpers -----

    fn append(&mut self, text: &str, class: TextClass) {
        let style = self.palette.style(class);
        self.transcript.append(text, style);
    }

    fn append_line(&mut self, text: &str, class: TextClass) {
        self.ensure_newline();
        self.append(text, class);
        self.append("\n", TextClass::Output);
    }

    fn ensure_newline(&mut self) {
        if !self.transcript.ends_with_newline() {
            self.append("\n", TextClass::Output);
        }
    }

    fn show_prompt(&mut self) {
        self.ensure_newline();
        let prompt = self.prompt();
        self.append(&prompt, TextClass::Prompt);
    }

    fn append_segments(&mut self, segments: Vec<Segment>, forced: Option<TextClass>) {
        for segment in segments {
            let style = match (forced, segment.fg) {
                (Some(class), _) => self.palette.style(class),
                (None, Some(fg)) => Style::fg(fg),
                (None, None) => self.palette.style(TextClass::Output),
            };
            self.transcript.append(&segment.text, style);
        }
    }

    // ----- key routing -----

    /// Route a key. Returns false if the key was ignored.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.code != KeyCode::Tab {
            self.completer.reset();
        }
        match self.state {
            TerminalState::Closed => false,
            TerminalState::Running => self.handle_running_key(key),
            TerminalState::Idle => self.handle_idle_key(key),
        }
    }

    fn handle_idle_key(&mut self, key: KeyEvent) -> bool {
        if key.is_ctrl_c() {
            self.cancel_line();
            return true;
        }
        if let Some(ch) = key.typed_char() {
            self.type_char(ch);
            return true;
        }
        match key.code {
            KeyCode::Enter => self.submit(),
            KeyCode::Up => self.history_older(),
            KeyCode::Down => self.history_newer(),
            KeyCode::Tab => self.complete(),
            KeyCode::Backspace => return self.transcript.backspace(),
            KeyCode::Delete => return self.transcript.delete_forward(),
            _ => return self.move_caret(key.code),
        }
        true
    }

    fn handle_running_key(&mut self, key: KeyEvent) -> bool {
        if key.is_ctrl_c() {
            self.interrupt();
            return true;
        }
        if let Some(ch) = key.typed_char() {
            self.type_char(ch);
            return true;
        }
        match key.code {
            KeyCode::Enter => {
                self.send_input_line();
                true
            }
            KeyCode::Backspace => self.transcript.backspace(),
            KeyCode::Delete => self.transcript.delete_forward(),
            code => self.move_caret(code),
        }
    }

    fn move_caret(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Left => self.transcript.move_caret_left(),
            KeyCode::Right => self.transcript.move_caret_right(),
            KeyCode::Home => self.transcript.move_caret_home(),
            KeyCode::End => self.transcript.move_caret_end(),
            _ => return false,
        }
        true
    }

    /// Insert a character at the caret (clamped to the editable region).
    pub fn type_char(&mut self, ch: char) {
        if self.state == TerminalState::Closed {
            return;
        }
        self.transcript.insert(ch.encode_utf8(&mut [0; 4]));
    }

    /// Insert text at the caret.
    pub fn type_str(&mut self, text: &str) {
        for ch in text.chars() {
            self.type_char(ch);
        }
    }

    // ----- history and completion -----

    pub fn history_older(&mut self) {
        let current = self.transcript.editable_text();
        if let Some(entry) = self.history.older(&current).map(str::to_string) {
            self.transcript.set_editable(&entry);
        }
    }

    pub fn history_newer(&mut self) {
        if let Some(entry) = self.history.newer().map(str::to_string) {
            self.transcript.set_editable(&entry);
        }
    }

    /// Complete the token before the caret.
    pub fn complete(&mut self) {
        let line = self.transcript.text_before_caret();
        if let Some(completed) = self.completer.complete(&line, &self.cwd) {
            let after: String = self
                .transcript
                .editable_text()
                .chars()
                .skip(line.chars().count())
                .collect();
            self.transcript.set_editable(&completed);
            let caret = self.transcript.caret();
            self.transcript.insert(&after);
            self.transcript.set_caret(caret);
        }
    }

    // ----- submission -----

    /// Submit the composed line.
    pub fn submit(&mut self) {
        if self.state != TerminalState::Idle {
            return;
        }
        let line = self.transcript.commit_input(self.palette.style(TextClass::Command));
        self.append("\n", TextClass::Output);

        if let Some(fragment) = line.trim_end().strip_suffix('\\') {
            self.pending_lines.push(fragment.to_string());
            self.append(CONTINUATION_PROMPT, TextClass::Prompt);
            return;
        }

        let command = if self.pending_lines.is_empty() {
            line
        } else {
            self.pending_lines.push(line);
            std::mem::take(&mut self.pending_lines).join("\n")
        };

        self.history.push(&command);
        let command = command.trim();
        if command.is_empty() {
            self.show_prompt();
            return;
        }
        self.execute(command);
    }

    fn execute(&mut self, command: &str) {
        let (name, args) = command
            .split_once(char::is_whitespace)
            .map_or((command, ""), |(name, rest)| (name, rest.trim_start()));

        if !BUILTINS.contains(&name) {
            self.spawn(command);
            return;
        }
        debug!(builtin = name, "running builtin");
        match name {
            "clear" | "cls" => self.transcript.clear(),
            "cd" => self.change_dir(args),
            "exit" => {
                self.close();
                return;
            }
            "pwd" => {
                let cwd = self.cwd.display().to_string();
                self.append_line(&cwd, TextClass::Output);
            }
            "echo" => self.append_line(args, TextClass::Output),
            _ => self.append(HELP, TextClass::Output),
        }
        self.show_prompt();
    }

    fn change_dir(&mut self, arg: &str) {
        let target = if arg.is_empty() { "~" } else { arg };
        let resolved = completion::expand_tilde(target, &self.cwd)
            .and_then(|path| path.canonicalize().ok())
            .filter(|path| path.is_dir());

        match resolved {
            Some(dir) => {
                debug!(from = %self.cwd.display(), to = %dir.display(), "changed directory");
                self.cwd = dir;
            }
            None => {
                self.append_line(&format!("cd: no such directory: {target}"), TextClass::Error);
            }
        }
    }

    fn close(&mut self) {
        info!("terminal closed by exit");
        self.bridge.kill();
        self.state = TerminalState::Closed;
        if let Some(host) = self.host.as_mut() {
            host.request_close();
        }
    }

    fn spawn(&mut self, command: &str) {
        let cwd = self.cwd.clone();
        match self.bridge.spawn(command, &cwd) {
            Ok(()) => {
                self.stdout = StreamDecoder::default();
                self.stderr = StreamDecoder::default();
                self.state = TerminalState::Running;
            }
            Err(err) => {
                self.append_line(&format!("Error: {err}"), TextClass::Error);
                self.show_prompt();
            }
        }
    }

    fn send_input_line(&mut self) {
        let line = self.transcript.commit_input(self.palette.style(TextClass::Command));
        self.append("\n", TextClass::Output);
        if let Err(err) = self.bridge.write_stdin(format!("{line}\n").as_bytes()) {
            debug!(error = %err, "stdin write failed");
        }
    }

    // ----- process output -----

    /// Collect output from the running command without blocking. Returns true
    /// if the transcript changed.
    pub fn poll(&mut self) -> bool {
        self.poll_timeout(Duration::ZERO)
    }

    /// Like [`poll`](Self::poll), but waits up to `timeout` for output.
    pub fn poll_timeout(&mut self, timeout: Duration) -> bool {
        if self.state != TerminalState::Running {
            return false;
        }
        let events = self.bridge.poll_timeout(timeout);
        let changed = !events.is_empty();
        for event in events {
            match event {
                ProcessEvent::Output { stream: OutputStream::Stdout, data } => {
                    let segments = self.stdout.feed(&data);
                    self.append_segments(segments, None);
                }
                ProcessEvent::Output { stream: OutputStream::Stderr, data } => {
                    let segments = self.stderr.feed(&data);
                    self.append_segments(segments, Some(TextClass::Error));
                }
                ProcessEvent::Exited { code } => self.finish_process(code),
            }
        }
        changed
    }

    fn finish_process(&mut self, code: Option<i32>) {
        let tail = self.stdout.finish();
        self.append_segments(tail, None);
        let tail = self.stderr.finish();
        self.append_segments(tail, Some(TextClass::Error));

        if code != Some(0) {
            let shown = code.map_or_else(|| "signal".to_string(), |c| c.to_string());
            self.append_line(&format!("[Exit code: {shown}]"), TextClass::Warning);
        }
        self.state = TerminalState::Idle;
        self.show_prompt();
    }

    /// Kill the running command (bounded wait) and return to `Idle` with a
    /// `^C` marker. In `Idle` this abandons the composed line instead.
    pub fn interrupt(&mut self) {
        match self.state {
            TerminalState::Running => {
                self.bridge.kill();
                self.stdout = StreamDecoder::default();
                self.stderr = StreamDecoder::default();
                self.state = TerminalState::Idle;
                self.append_line("^C", TextClass::Error);
                self.show_prompt();
            }
            TerminalState::Idle => self.cancel_line(),
            TerminalState::Closed => {}
        }
    }

    fn cancel_line(&mut self) {
        self.transcript.commit_input(self.palette.style(TextClass::Command));
        self.pending_lines.clear();
        self.history.reset_navigation();
        self.append_line("^C", TextClass::Error);
        self.show_prompt();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn terminal(dir: &Path) -> Terminal {
        Terminal::new(dir).with_completer(Completer::with_commands(["cat", "cd", "ls"]))
    }

    fn run(term: &mut Terminal, line: &str) {
        term.type_str(line);
        term.submit();
    }

    #[test]
    fn banner_and_prompt() {
        let dir = tempfile::tempdir().unwrap();
        let term = terminal(dir.path());
        let name = dir.path().file_name().unwrap().to_string_lossy().into_owned();
        assert_eq!(term.prompt(), format!("{name} $ "));
        assert_eq!(term.transcript().text(), format!("{WELCOME}{name} $ "));
        assert_eq!(term.transcript().boundary(), term.transcript().len_chars());
    }

    #[test]
    fn echo_is_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let mut term = terminal(dir.path());
        run(&mut term, "echo hello");
        assert_eq!(term.state(), TerminalState::Idle);
        assert!(!term.is_process_running());
        let text = term.transcript().text();
        assert!(text.ends_with(&format!("echo hello\nhello\n{}", term.prompt())));
        assert_eq!(term.transcript().boundary(), term.transcript().len_chars());
    }

    #[test]
    fn cd_to_missing_directory_reports_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut term = terminal(dir.path());
        run(&mut term, "cd nowhere");
        assert_eq!(term.state(), TerminalState::Idle);
        assert!(!term.is_process_running());
        assert_eq!(term.cwd(), dir.path());
        let error = term.palette().style(TextClass::Error);
        assert!(term.transcript().spans().iter().any(|s| s.style == error));
        assert!(term.transcript().text().contains("cd: no such directory: nowhere\n"));
    }

    #[test]
    fn cd_changes_prompt_and_pwd() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("inner")).unwrap();
        let mut term = terminal(dir.path());
        run(&mut term, "cd inner");
        assert!(term.prompt().starts_with("inner"));
        run(&mut term, "pwd");
        let expected = dir.path().join("inner").canonicalize().unwrap();
        assert!(term.transcript().text().contains(&expected.display().to_string()));
    }

    #[test]
    fn cd_tilde_goes_home() {
        let Some(home) = dirs::home_dir().and_then(|h| h.canonicalize().ok()) else {
            return;
        };
        let dir = tempfile::tempdir().unwrap();
        let mut term = terminal(dir.path());
        run(&mut term, "cd ~");
        assert_eq!(term.cwd(), home);
        run(&mut term, "cd /");
        run(&mut term, "cd");
        assert_eq!(term.cwd(), home);
    }

    #[test]
    fn spawn_failure_is_reported_inline() {
        let dir = tempfile::tempdir().unwrap();
        let mut term = Terminal::with_config(dir.path(), ShellConfig::posix("/no/such/shell"));
        run(&mut term, "ls");

        assert_eq!(term.state(), TerminalState::Idle);
        assert!(!term.is_process_running());
        let transcript = term.transcript();
        let text = transcript.text();
        let error = term.palette().style(TextClass::Error);
        let flagged: Vec<String> = transcript
            .spans()
            .iter()
            .filter(|s| s.style == error)
            .map(|s| text.chars().skip(s.range.start).take(s.range.len()).collect())
            .collect();
        assert!(flagged.iter().any(|t| t.starts_with("Error: failed to start /no/such/shell")));
        assert!(text.ends_with(&format!("\n{}", term.prompt())));
        assert_eq!(transcript.boundary(), transcript.len_chars());

        // The session stays usable.
        run(&mut term, "echo still here");
        assert!(term.transcript().text().contains("still here\n"));
    }

    #[test]
    fn clear_wipes_transcript() {
        let dir = tempfile::tempdir().unwrap();
        let mut term = terminal(dir.path());
        run(&mut term, "clear");
        assert_eq!(term.transcript().text(), term.prompt());
    }

    #[test]
    fn exit_notifies_host() {
        struct Flag(Rc<Cell<bool>>);
        impl TerminalHost for Flag {
            fn request_close(&mut self) {
                self.0.set(true);
            }
        }
        let closed = Rc::new(Cell::new(false));
        let dir = tempfile::tempdir().unwrap();
        let mut term = terminal(dir.path()).with_host(Box::new(Flag(Rc::clone(&closed))));
        run(&mut term, "exit");
        assert!(closed.get());
        assert_eq!(term.state(), TerminalState::Closed);
        assert!(!term.handle_key(KeyEvent::char('x')));
    }

    #[test]
    fn continuation_lines_join() {
        let dir = tempfile::tempdir().unwrap();
        let mut term = terminal(dir.path());
        run(&mut term, "echo one \\");
        assert!(term.transcript().text().ends_with("\n> "));
        run(&mut term, "two");
        assert_eq!(term.history().entries(), ["echo one \ntwo"]);
        assert!(term.transcript().text().contains("one \ntwo\n"));
    }

    #[test]
    fn help_lists_builtins() {
        let dir = tempfile::tempdir().unwrap();
        let mut term = terminal(dir.path());
        run(&mut term, "help");
        for builtin in BUILTINS {
            assert!(term.transcript().text().contains(builtin));
        }
    }

    #[test]
    fn keys_respect_boundary() {
        let dir = tempfile::tempdir().unwrap();
        let mut term = terminal(dir.path());
        let before = term.transcript().text();
        assert!(!term.handle_key(KeyEvent::key(KeyCode::Backspace)));
        term.handle_key(KeyEvent::char('l'));
        term.handle_key(KeyEvent::key(KeyCode::Home));
        term.handle_key(KeyEvent::key(KeyCode::Left));
        term.handle_key(KeyEvent::char('x'));
        assert_eq!(term.transcript().editable_text(), "xl");
        assert!(term.transcript().text().starts_with(&before));
    }

    #[test]
    fn history_keys_restore_draft() {
        let dir = tempfile::tempdir().unwrap();
        let mut term = terminal(dir.path());
        for cmd in ["echo a", "echo b", "echo c"] {
            run(&mut term, cmd);
        }
        term.type_str("dra");
        for _ in 0..3 {
            term.handle_key(KeyEvent::key(KeyCode::Up));
        }
        assert_eq!(term.transcript().editable_text(), "echo a");
        for _ in 0..3 {
            term.handle_key(KeyEvent::key(KeyCode::Down));
        }
        assert_eq!(term.transcript().editable_text(), "dra");
    }

    #[test]
    fn tab_completes_and_cycles() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("alpha.txt"), "").unwrap();
        std::fs::write(dir.path().join("also.txt"), "").unwrap();
        let mut term = terminal(dir.path());
        term.type_str("cat al");
        let tab = KeyEvent::key(KeyCode::Tab);
        term.handle_key(tab);
        assert_eq!(term.transcript().editable_text(), "cat alpha.txt");
        term.handle_key(tab);
        assert_eq!(term.transcript().editable_text(), "cat also.txt");
        assert_eq!(term.completion_candidates().len(), 2);
        term.handle_key(KeyEvent::char(' '));
        assert!(term.completion_candidates().is_empty());
    }

    #[test]
    fn ctrl_c_in_idle_abandons_line() {
        let dir = tempfile::tempdir().unwrap();
        let mut term = terminal(dir.path());
        term.type_str("half typed \\");
        term.handle_key(KeyEvent::with_ctrl(KeyCode::Char('c')));
        assert_eq!(term.transcript().editable_text(), "");
        assert!(term.transcript().text().ends_with(&format!("^C\n{}", term.prompt())));
        assert!(term.history().is_empty());
    }

    #[cfg(unix)]
    fn wait_idle(term: &mut Terminal) {
        let deadline = std::time::Instant::now() + Duration::from_secs(10);
        while term.state() == TerminalState::Running {
            assert!(std::time::Instant::now() < deadline, "command did not finish");
            term.poll_timeout(Duration::from_millis(50));
        }
    }

    #[cfg(unix)]
    #[test]
    fn spawned_output_is_colored() {
        let dir = tempfile::tempdir().unwrap();
        let mut term = Terminal::with_config(dir.path(), ShellConfig::posix("/bin/sh"));
        run(&mut term, "printf '\\033[31mred\\033[0m plain\\n'");
        assert_eq!(term.state(), TerminalState::Running);
        wait_idle(&mut term);
        let text = term.transcript().text();
        assert!(text.contains("red plain\n"));
        let red = Style::fg(Rgba::from_ansi_index(1));
        assert!(term.transcript().spans().iter().any(|s| s.style == red));
        assert!(text.ends_with(&term.prompt()));
    }

    #[cfg(unix)]
    #[test]
    fn nonzero_exit_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut term = Terminal::with_config(dir.path(), ShellConfig::posix("/bin/sh"));
        run(&mut term, "sh -c 'exit 4'");
        wait_idle(&mut term);
        assert!(term.transcript().text().contains("[Exit code: 4]\n"));
    }
}
