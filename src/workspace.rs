//! Editor tabs, the terminal, and the file interface between them and the
//! host.
//!
//! The host performs dialogs and persistence of settings; the workspace
//! reads and writes file content, owns one [`EditBuffer`] per tab and at
//! most one [`Terminal`], and forwards reloaded [`Settings`] to all of them.
//!
//! # Examples
//!
//! ```
//! use ember::{EditorHost, Settings, Workspace};
//!
//! let dir = std::env::temp_dir().join(format!("ember-doc-{}", std::process::id()));
//! std::fs::create_dir_all(&dir).unwrap();
//! let path = dir.join("notes.txt");
//! std::fs::write(&path, "hello").unwrap();
//!
//! let mut ws = Workspace::new(Settings::default());
//! let tab = ws.open_in_new_tab(&path).unwrap();
//! ws.tab_mut(tab).unwrap().buffer_mut().insert("> ");
//! ws.save_tab(tab, None).unwrap();
//! assert_eq!(std::fs::read_to_string(&path).unwrap(), "> hello");
//! # std::fs::remove_dir_all(&dir).unwrap();
//! ```

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::settings::Settings;
use crate::shell::Terminal;
use crate::text::EditBuffer;

/// What editors and terminals may ask of the window that hosts them.
pub trait EditorHost {
    /// Open `path` in a new editor tab and return the tab index.
    fn open_in_new_tab(&mut self, path: &Path) -> Result<usize>;
}

/// Decode file bytes as editor text. Content that is not UTF-8, or that
/// contains NUL bytes, is treated as binary.
pub fn decode_text(bytes: Vec<u8>, path: &Path) -> Result<String> {
    let binary = || Error::BinaryContent {
        path: path.to_path_buf(),
    };
    if bytes.contains(&0) {
        return Err(binary());
    }
    String::from_utf8(bytes).map_err(|_| binary())
}

/// One open editor.
#[derive(Debug)]
pub struct EditorTab {
    path: Option<PathBuf>,
    buffer: EditBuffer,
    saved_text: String,
}

impl EditorTab {
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Tab caption: the file name, or `Untitled`.
    #[must_use]
    pub fn title(&self) -> String {
        self.path
            .as_deref()
            .and_then(Path::file_name)
            .map_or_else(|| "Untitled".to_string(), |n| n.to_string_lossy().into_owned())
    }

    #[must_use]
    pub const fn buffer(&self) -> &EditBuffer {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut EditBuffer {
        &mut self.buffer
    }

    /// True if the text differs from what was last opened or saved.
    #[must_use]
    pub fn is_modified(&self) -> bool {
        self.buffer.text() != self.saved_text
    }
}

/// Open tabs plus the optional terminal.
#[derive(Debug)]
pub struct Workspace {
    settings: Settings,
    tabs: Vec<EditorTab>,
    terminal: Option<Terminal>,
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl Workspace {
    #[must_use]
    pub const fn new(settings: Settings) -> Self {
        Self {
            settings,
            tabs: Vec::new(),
            terminal: None,
        }
    }

    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    #[must_use]
    pub fn tabs(&self) -> &[EditorTab] {
        &self.tabs
    }

    #[must_use]
    pub fn tab(&self, index: usize) -> Option<&EditorTab> {
        self.tabs.get(index)
    }

    pub fn tab_mut(&mut self, index: usize) -> Option<&mut EditorTab> {
        self.tabs.get_mut(index)
    }

    /// Add an empty, untitled tab.
    pub fn new_tab(&mut self) -> usize {
        self.push_tab(None, "")
    }

    fn push_tab(&mut self, path: Option<PathBuf>, text: &str) -> usize {
        let mut buffer = EditBuffer::new(self.settings.clone());
        buffer.set_text(text);
        self.tabs.push(EditorTab {
            path,
            buffer,
            saved_text: text.to_string(),
        });
        self.tabs.len() - 1
    }

    /// Read `path` into a new tab. Read failures and binary content are
    /// returned to the caller; no tab is created for them.
    pub fn open_file(&mut self, path: &Path) -> Result<usize> {
        let bytes = std::fs::read(path)?;
        let text = decode_text(bytes, path)?;
        let index = self.push_tab(Some(path.to_path_buf()), &text);
        info!(path = %path.display(), tab = index, "opened file");
        Ok(index)
    }

    /// Write a tab's text. With `path`, the tab is saved there and adopts
    /// it (save-as); otherwise the tab's own path is used.
    pub fn save_tab(&mut self, index: usize, path: Option<&Path>) -> Result<()> {
        let tab = self.tabs.get_mut(index).ok_or(Error::NoSuchTab(index))?;
        let target = match path {
            Some(path) => path.to_path_buf(),
            None => tab.path.clone().ok_or_else(|| {
                Error::Io(std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "tab has no file path",
                ))
            })?,
        };
        let text = tab.buffer.text();
        std::fs::write(&target, &text)?;
        info!(path = %target.display(), tab = index, "saved file");
        tab.saved_text = text;
        tab.path = Some(target);
        Ok(())
    }

    /// Close a tab, returning it.
    pub fn close_tab(&mut self, index: usize) -> Result<EditorTab> {
        if index >= self.tabs.len() {
            return Err(Error::NoSuchTab(index));
        }
        Ok(self.tabs.remove(index))
    }

    /// Start the terminal in `cwd`, replacing any existing one.
    pub fn open_terminal(&mut self, cwd: impl Into<PathBuf>) -> &mut Terminal {
        self.install_terminal(Terminal::new(cwd))
    }

    /// Use a preconfigured terminal (custom shell or completer).
    pub fn install_terminal(&mut self, mut terminal: Terminal) -> &mut Terminal {
        terminal.apply_settings(self.settings.clone());
        self.terminal.insert(terminal)
    }

    #[must_use]
    pub const fn terminal(&self) -> Option<&Terminal> {
        self.terminal.as_ref()
    }

    pub fn terminal_mut(&mut self) -> Option<&mut Terminal> {
        self.terminal.as_mut()
    }

    /// Drop the terminal, killing any running command.
    pub fn close_terminal(&mut self) -> Option<Terminal> {
        self.terminal.take()
    }

    /// Deliver a reloaded settings object to every editor and the terminal.
    pub fn reload_settings(&mut self, settings: Settings) {
        debug!(tabs = self.tabs.len(), "reloading settings");
        for tab in &mut self.tabs {
            tab.buffer.apply_settings(settings.clone());
        }
        if let Some(terminal) = self.terminal.as_mut() {
            terminal.apply_settings(settings.clone());
        }
        self.settings = settings;
    }
}

impl EditorHost for Workspace {
    fn open_in_new_tab(&mut self, path: &Path) -> Result<usize> {
        self.open_file(path)
    }
}
