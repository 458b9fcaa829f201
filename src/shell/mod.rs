//! Embedded terminal: transcript, history, completion and the process
//! bridge.
//!
//! - [`Transcript`]: styled append-only text with a protected prefix
//! - [`CommandHistory`]: submitted commands with a draft slot
//! - [`Completer`]: command-name and filesystem completion
//! - [`ProcessBridge`]: one child process at a time, output over a channel
//! - [`Terminal`]: the session that routes keys through all of the above

mod completion;
mod history;
mod process;
mod terminal;
mod transcript;

pub use completion::Completer;
pub use history::{CommandHistory, DEFAULT_HISTORY_CAP};
pub use process::{
    KILL_WAIT, OutputStream, ProcessBridge, ProcessEvent, ShellConfig, StreamMode, decode_chunk,
};
pub use terminal::{
    BUILTINS, Terminal, TerminalHost, TerminalPalette, TerminalState, TextClass,
};
pub use transcript::{StyledSpan, Transcript};
