//! Keyboard input as delivered by the host window.
//!
//! The core never reads a terminal or window system itself; the host
//! translates its native key events into [`KeyEvent`] and routes them to
//! [`EditBuffer::handle_key`](crate::text::EditBuffer::handle_key) or
//! [`Terminal::handle_key`](crate::shell::Terminal::handle_key).

mod keyboard;

pub use keyboard::{KeyCode, KeyEvent, KeyModifiers};
