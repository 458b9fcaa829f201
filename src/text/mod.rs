//! Text storage, bracket/fold analysis and editing.
//!
//! Key types:
//!
//! - [`RopeWrapper`]: rope-backed text with char/line conversions
//! - [`Document`]: text plus fold state; reports each edit as a [`LineChange`]
//! - [`EditBuffer`]: cursor, selection, undo/redo and the typing policy
//!
//! # Examples
//!
//! ```
//! use ember::text::{find_match, Direction, RopeWrapper};
//!
//! let rope = RopeWrapper::from_str("f(a[0])");
//! assert_eq!(find_match(&rope, 1, Direction::Forward), Some(6));
//! assert_eq!(find_match(&rope, 0, Direction::Forward), None);
//! ```

mod brackets;
mod color_literal;
mod document;
mod edit;
mod fold;
pub mod policy;
mod rope;

pub use brackets::{BracketPair, Direction, bracket_at_cursor, find_match, partner};
pub use color_literal::{ColorLiteral, color_literal_at, color_literals};
pub use document::{Document, LineChange};
pub use edit::{Cursor, Decoration, DecorationKind, EditBuffer};
pub use fold::{FoldMarker, FoldRegion, fold_region};
pub use rope::RopeWrapper;
