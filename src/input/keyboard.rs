//! Key events delivered by the host to editors and terminals.

use bitflags::bitflags;

bitflags! {
    /// Keyboard modifier flags.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct KeyModifiers: u8 {
        const SHIFT = 0b0000_0001;
        /// Alt/Option key.
        const ALT = 0b0000_0010;
        const CTRL = 0b0000_0100;
    }
}

/// The keys the editing core reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Backspace,
    Enter,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    /// Completion in the terminal, one indent unit in the editor.
    Tab,
    Delete,
    /// A character key (includes space).
    Char(char),
    Esc,
}

impl KeyCode {
    /// Check if this is a navigation key (arrows, home, end).
    #[must_use]
    pub const fn is_navigation(&self) -> bool {
        matches!(
            self,
            Self::Left | Self::Right | Self::Up | Self::Down | Self::Home | Self::End
        )
    }

    /// Get the character if this is a character key.
    #[must_use]
    pub const fn char(&self) -> Option<char> {
        match self {
            Self::Char(c) => Some(*c),
            _ => None,
        }
    }
}

/// A keyboard event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyEvent {
    #[must_use]
    pub const fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    /// Create a key event with no modifiers.
    #[must_use]
    pub const fn key(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::empty())
    }

    /// Create a character key event.
    #[must_use]
    pub const fn char(c: char) -> Self {
        Self::key(KeyCode::Char(c))
    }

    /// Create a Ctrl+key event.
    #[must_use]
    pub const fn with_ctrl(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::CTRL)
    }

    #[must_use]
    pub const fn shift(&self) -> bool {
        self.modifiers.contains(KeyModifiers::SHIFT)
    }

    #[must_use]
    pub const fn ctrl(&self) -> bool {
        self.modifiers.contains(KeyModifiers::CTRL)
    }

    #[must_use]
    pub const fn alt(&self) -> bool {
        self.modifiers.contains(KeyModifiers::ALT)
    }

    /// Check if this matches a specific key with exactly these modifiers.
    #[must_use]
    pub fn matches(&self, code: KeyCode, modifiers: KeyModifiers) -> bool {
        self.code == code && self.modifiers == modifiers
    }

    /// Ctrl+<letter>, ignoring case and Shift.
    #[must_use]
    pub fn is_ctrl_letter(&self, letter: char) -> bool {
        self.ctrl()
            && !self.alt()
            && matches!(self.code, KeyCode::Char(c) if c.eq_ignore_ascii_case(&letter))
    }

    /// Interrupt chord (Ctrl+C).
    #[must_use]
    pub fn is_ctrl_c(&self) -> bool {
        self.is_ctrl_letter('c') && !self.shift()
    }

    /// Text this key types into a buffer, if any. Chords with Ctrl or Alt
    /// type nothing.
    #[must_use]
    pub fn typed_char(&self) -> Option<char> {
        if self.ctrl() || self.alt() {
            return None;
        }
        self.code.char()
    }
}

impl From<char> for KeyEvent {
    fn from(c: char) -> Self {
        Self::char(c)
    }
}

impl From<KeyCode> for KeyEvent {
    fn from(code: KeyCode) -> Self {
        Self::key(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_event_creation() {
        let event = KeyEvent::char('a');
        assert_eq!(event.code, KeyCode::Char('a'));
        assert!(event.modifiers.is_empty());
        assert_eq!(event.typed_char(), Some('a'));
    }

    #[test]
    fn test_ctrl_chords() {
        let event = KeyEvent::with_ctrl(KeyCode::Char('c'));
        assert!(event.ctrl());
        assert!(!event.shift());
        assert!(event.is_ctrl_c());
        assert_eq!(event.typed_char(), None);

        let shifted = KeyEvent::new(KeyCode::Char('Z'), KeyModifiers::CTRL | KeyModifiers::SHIFT);
        assert!(shifted.is_ctrl_letter('z'));
        assert!(!shifted.is_ctrl_c());
    }

    #[test]
    fn test_key_code_checks() {
        assert!(KeyCode::Up.is_navigation());
        assert!(!KeyCode::Enter.is_navigation());
        assert_eq!(KeyCode::Tab.char(), None);
    }

    #[test]
    fn test_key_event_from_code() {
        let event: KeyEvent = KeyCode::Enter.into();
        assert!(event.matches(KeyCode::Enter, KeyModifiers::empty()));
    }
}
