//! `ember` - text-editing engine and embedded shell for a desktop code editor
//!
//! Two subsystems share one crate:
//!
//! - [`text`] and [`highlight`]: a rope-backed document with incremental,
//!   line-state-aware highlighting, bracket matching, line folding and the
//!   typing policy (auto-pair, auto-indent, re-indent).
//! - [`shell`]: a terminal transcript with a protected prompt prefix,
//!   command history, tab completion and a non-blocking child-process
//!   bridge with ANSI color decoding.
//!
//! [`Workspace`] ties editor tabs and the terminal to the host's file and
//! settings interfaces.

// Crate-level lint configuration
#![allow(clippy::cast_possible_truncation)] // Small, range-checked casts
#![allow(clippy::cast_sign_loss)] // Intentional index conversions
#![allow(clippy::cast_precision_loss)] // Intentional for color math
#![allow(clippy::cast_possible_wrap)] // Intentional index conversions
#![allow(clippy::module_name_repetitions)] // Allow shell::ShellConfig etc
#![allow(clippy::missing_errors_doc)] // Docs WIP
#![allow(clippy::missing_panics_doc)] // Docs WIP
#![allow(clippy::missing_const_for_fn)] // Many functions could be const, not critical
#![allow(clippy::doc_markdown)] // Allow technical names without backticks
#![allow(clippy::needless_pass_by_value)] // Settings are handed over by value
#![allow(clippy::should_implement_trait)] // from_str naming is intentional
#![allow(clippy::inherent_to_string)] // to_string methods are convenient
#![allow(clippy::items_after_statements)] // Common pattern in tests

pub mod ansi;
pub mod color;
pub mod error;
pub mod highlight;
pub mod input;
pub mod settings;
pub mod shell;
pub mod style;
pub mod text;
pub mod workspace;

// Re-export core types at crate root
pub use color::Rgba;
pub use error::{Error, Result};
pub use settings::Settings;
pub use style::{Style, TextAttributes};

pub use highlight::{HighlightCache, LineState, RuleHighlighter, Theme, Token, TokenKind, Tokenizer};
pub use input::{KeyCode, KeyEvent, KeyModifiers};
pub use shell::{ProcessBridge, ShellConfig, StreamMode, Terminal, TerminalHost, TerminalState};
pub use text::{Document, EditBuffer, FoldRegion, RopeWrapper};
pub use workspace::{EditorHost, EditorTab, Workspace};
