//! ANSI escape sequence decoding for process output.
//!
//! # Examples
//!
//! ```
//! use ember::ansi::AnsiDecoder;
//! use ember::Rgba;
//!
//! let mut decoder = AnsiDecoder::new();
//! let segments = decoder.feed("\x1b[32mok\x1b[0m done");
//! assert_eq!(segments[0].text, "ok");
//! assert_eq!(segments[0].fg, Some(Rgba::from_ansi_index(2)));
//! assert_eq!(segments[1].fg, None);
//! ```

mod decode;

pub use decode::{AnsiDecoder, Segment};
