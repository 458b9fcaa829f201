//! Command history with a draft slot.

/// Entries kept before the oldest is dropped.
pub const DEFAULT_HISTORY_CAP: usize = 100;

/// Submitted commands, oldest first, plus a navigation cursor.
///
/// The cursor equals `len()` at the live position. Moving away from the
/// live position saves the in-progress line as the draft; coming back
/// restores it.
#[derive(Clone, Debug)]
pub struct CommandHistory {
    entries: Vec<String>,
    index: usize,
    draft: String,
    cap: usize,
}

impl Default for CommandHistory {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAP)
    }
}

impl CommandHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            entries: Vec::new(),
            index: 0,
            draft: String::new(),
            cap: cap.max(1),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries, oldest first.
    #[must_use]
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// True when not navigating.
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.index == self.entries.len()
    }

    /// Record a submitted command and return to the live position. Blank
    /// commands are not recorded.
    pub fn push(&mut self, command: &str) {
        if !command.trim().is_empty() {
            self.entries.push(command.to_string());
            if self.entries.len() > self.cap {
                let excess = self.entries.len() - self.cap;
                self.entries.drain(..excess);
            }
        }
        self.index = self.entries.len();
        self.draft.clear();
    }

    /// Step toward older entries. `current` is the line on screen; it is
    /// saved as the draft when leaving the live position. Returns the text
    /// to show, or `None` at the oldest entry.
    pub fn older(&mut self, current: &str) -> Option<&str> {
        if self.index == 0 {
            return None;
        }
        if self.is_live() {
            self.draft = current.to_string();
        }
        self.index -= 1;
        Some(&self.entries[self.index])
    }

    /// Step toward newer entries, ending at the draft. Returns `None` when
    /// already live.
    pub fn newer(&mut self) -> Option<&str> {
        if self.is_live() {
            return None;
        }
        self.index += 1;
        if self.is_live() {
            Some(&self.draft)
        } else {
            Some(&self.entries[self.index])
        }
    }

    /// Abandon navigation without changing the draft.
    pub fn reset_navigation(&mut self) {
        self.index = self.entries.len();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history(commands: &[&str]) -> CommandHistory {
        let mut h = CommandHistory::new();
        for c in commands {
            h.push(c);
        }
        h
    }

    #[test]
    fn up_then_down_restores_draft() {
        let mut h = history(&["a", "b", "c"]);
        assert_eq!(h.older("dra"), Some("c"));
        assert_eq!(h.older("c"), Some("b"));
        assert_eq!(h.older("b"), Some("a"));
        assert_eq!(h.older("a"), None);
        assert_eq!(h.newer(), Some("b"));
        assert_eq!(h.newer(), Some("c"));
        assert_eq!(h.newer(), Some("dra"));
        assert_eq!(h.newer(), None);
        assert!(h.is_live());
    }

    #[test]
    fn blank_commands_are_skipped() {
        let h = history(&["ls", "   ", ""]);
        assert_eq!(h.entries(), ["ls"]);
    }

    #[test]
    fn capped_drops_oldest() {
        let mut h = CommandHistory::with_capacity(2);
        h.push("1");
        h.push("2");
        h.push("3");
        assert_eq!(h.entries(), ["2", "3"]);
        assert_eq!(h.len(), 2);
    }

    #[test]
    fn empty_history_navigation() {
        let mut h = CommandHistory::new();
        assert_eq!(h.older("x"), None);
        assert_eq!(h.newer(), None);
        assert!(h.is_empty());
    }

    #[test]
    fn push_resets_navigation() {
        let mut h = history(&["a", "b"]);
        h.older("");
        h.push("c");
        assert!(h.is_live());
        assert_eq!(h.older(""), Some("c"));
    }
}
