//! Error types for ember.
//!
//! Only the file interface and settings parsing surface errors to callers.
//! Highlighting, folding, bracket matching and edit policy are total over
//! arbitrary text, and terminal failures are rendered into the transcript.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Result type alias for ember operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for ember operations.
#[derive(Debug)]
pub enum Error {
    /// I/O error while reading or writing a file.
    Io(io::Error),
    /// Invalid color format (e.g., malformed hex string).
    InvalidColor(String),
    /// Settings document could not be parsed.
    Settings(String),
    /// Highlight rule pattern failed to compile.
    InvalidPattern(String),
    /// File content is not decodable text.
    BinaryContent { path: PathBuf },
    /// Child process could not be started.
    Spawn { program: String, source: io::Error },
    /// Editor tab index does not exist.
    NoSuchTab(usize),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::InvalidColor(s) => write!(f, "invalid color format: {s}"),
            Self::Settings(s) => write!(f, "invalid settings: {s}"),
            Self::InvalidPattern(s) => write!(f, "invalid highlight pattern: {s}"),
            Self::BinaryContent { path } => {
                write!(f, "{} is not a text file", path.display())
            }
            Self::Spawn { program, source } => {
                write!(f, "failed to start {program}: {source}")
            }
            Self::NoSuchTab(index) => write!(f, "no editor tab at index {index}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) | Self::Spawn { source: e, .. } => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<regex::Error> for Error {
    fn from(e: regex::Error) -> Self {
        Self::InvalidPattern(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Settings(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidColor("not-a-color".to_string());
        assert!(err.to_string().contains("invalid color format"));

        let err = Error::BinaryContent {
            path: PathBuf::from("image.png"),
        };
        assert!(err.to_string().contains("image.png"));

        let err = Error::Spawn {
            program: "/bin/sh".to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "missing"),
        };
        assert!(err.to_string().contains("/bin/sh"));
        assert!(std::error::Error::source(&err).is_some());

        assert!(Error::NoSuchTab(3).to_string().contains('3'));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "test");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Settings(_)));
    }
}
