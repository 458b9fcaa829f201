//! Tab completion for the terminal line.
//!
//! The first token completes against known command names; later tokens
//! complete against filesystem entries. Pressing the completion key again
//! on the line it just produced steps to the next candidate, wrapping.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

use tracing::debug;

use super::terminal::BUILTINS;

/// Commands offered even when `PATH` cannot be scanned.
const COMMON_COMMANDS: &[&str] = &[
    "cd", "ls", "dir", "pwd", "echo", "clear", "mkdir", "rm", "cp", "mv", "cat", "grep", "git",
];

#[derive(Clone, Debug)]
struct Cycle {
    /// Line as it was before the first press.
    origin: String,
    /// Line produced by the latest press.
    applied: String,
    candidates: Vec<String>,
    index: usize,
}

/// Completion state for one terminal.
#[derive(Clone, Debug, Default)]
pub struct Completer {
    commands: Option<Vec<String>>,
    cycle: Option<Cycle>,
}

impl Completer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Completer with a fixed command list instead of scanning `PATH`.
    #[must_use]
    pub fn with_commands<I, S>(commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set: BTreeSet<String> = commands.into_iter().map(Into::into).collect();
        Self {
            commands: Some(set.into_iter().collect()),
            cycle: None,
        }
    }

    /// Candidates from the current cycle, for a host popup.
    #[must_use]
    pub fn candidates(&self) -> &[String] {
        self.cycle.as_ref().map_or(&[], |c| c.candidates.as_slice())
    }

    /// End the current cycle. Called on any key other than completion.
    pub fn reset(&mut self) {
        self.cycle = None;
    }

    /// Complete `line` (the text from the boundary to the caret) relative to
    /// `cwd`. Returns the replacement line, or `None` if nothing matches.
    pub fn complete(&mut self, line: &str, cwd: &Path) -> Option<String> {
        if let Some(cycle) = self.cycle.as_mut().filter(|c| c.applied == line) {
            cycle.index = (cycle.index + 1) % cycle.candidates.len();
            cycle.applied = apply(&cycle.origin, &cycle.candidates[cycle.index]);
            return Some(cycle.applied.clone());
        }

        let candidates = self.candidates_for(line, cwd);
        if candidates.is_empty() {
            self.cycle = None;
            return None;
        }
        let applied = apply(line, &candidates[0]);
        self.cycle = Some(Cycle {
            origin: line.to_string(),
            applied: applied.clone(),
            candidates,
            index: 0,
        });
        Some(applied)
    }

    /// Candidates for the token being typed at the end of `line`.
    pub fn candidates_for(&mut self, line: &str, cwd: &Path) -> Vec<String> {
        let (head, token) = split_last_token(line);
        if head.trim().is_empty() {
            let commands = self.commands.get_or_insert_with(scan_commands);
            return commands
                .iter()
                .filter(|c| c.starts_with(token))
                .cloned()
                .collect();
        }
        path_candidates(token, cwd)
    }
}

/// Split at the start of the last whitespace-separated token. A line ending
/// in whitespace has an empty last token.
fn split_last_token(line: &str) -> (&str, &str) {
    let start = line
        .rfind(char::is_whitespace)
        .map_or(0, |idx| idx + line[idx..].chars().next().map_or(1, char::len_utf8));
    line.split_at(start)
}

/// Replace the last token of `line` with a completion of it. Filesystem
/// candidates complete only the basename, so the typed directory part is
/// kept.
fn apply(line: &str, candidate: &str) -> String {
    let (head, token) = split_last_token(line);
    let dir_part = token.rfind(is_separator).map_or("", |idx| &token[..=idx]);
    format!("{head}{dir_part}{candidate}")
}

fn is_separator(ch: char) -> bool {
    ch == '/' || ch == MAIN_SEPARATOR
}

/// Resolve a user-typed path: `~` and `~/rest` go under the home directory,
/// anything else is joined onto `base`. `None` if the path needs a home
/// directory and none is known.
pub(crate) fn expand_tilde(path: &str, base: &Path) -> Option<PathBuf> {
    match path.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with(is_separator) => {
            dirs::home_dir().map(|home| home.join(rest.trim_start_matches(is_separator)))
        }
        _ => Some(base.join(path)),
    }
}

/// Entries of the directory implied by `token` whose names start with its
/// basename. Directories get a trailing separator. Hidden entries are
/// offered only when the basename starts with a dot.
fn path_candidates(token: &str, cwd: &Path) -> Vec<String> {
    let (dir_part, prefix) = match token.rfind(is_separator) {
        Some(idx) => (&token[..=idx], &token[idx + 1..]),
        None => ("", token),
    };

    let dir = if dir_part.is_empty() {
        cwd.to_path_buf()
    } else {
        match expand_tilde(dir_part, cwd) {
            Some(dir) => dir,
            None => return Vec::new(),
        }
    };

    let Ok(entries) = std::fs::read_dir(&dir) else {
        return Vec::new();
    };
    let mut found: Vec<String> = entries
        .filter_map(std::result::Result::ok)
        .filter_map(|entry| {
            let name = entry.file_name().into_string().ok()?;
            if !name.starts_with(prefix) || (name.starts_with('.') && !prefix.starts_with('.')) {
                return None;
            }
            let is_dir = entry.path().is_dir();
            Some(if is_dir {
                format!("{name}{MAIN_SEPARATOR}")
            } else {
                name
            })
        })
        .collect();
    found.sort();
    found
}

/// Command names from `PATH`, the common list and the builtins.
fn scan_commands() -> Vec<String> {
    let mut names: BTreeSet<String> = COMMON_COMMANDS
        .iter()
        .chain(BUILTINS)
        .map(ToString::to_string)
        .collect();

    if let Some(path) = std::env::var_os("PATH") {
        for dir in std::env::split_paths(&path) {
            let Ok(entries) = std::fs::read_dir(&dir) else {
                continue;
            };
            names.extend(
                entries
                    .filter_map(std::result::Result::ok)
                    .filter(|entry| is_executable(&entry.path()))
                    .filter_map(|entry| entry.file_name().into_string().ok()),
            );
        }
    }

    debug!(count = names.len(), "command name cache filled");
    names.into_iter().collect()
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .is_ok_and(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
