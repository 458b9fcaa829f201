//! Editor settings consumed from a parsed key-value document.
//!
//! The host owns loading and persistence; this module only turns a JSON
//! value into a fully-populated [`Settings`]. Every key is optional, and a
//! key whose value has the wrong type or an unparseable color falls back to
//! its default with a warning. An empty object (or `null`) yields
//! [`Settings::default`].
//!
//! # Examples
//!
//! ```
//! use ember::Settings;
//!
//! let settings = Settings::from_json_str(r##"{
//!     "font_size": 14,
//!     "syntax": { "keyword_color": "#C678DD" }
//! }"##).unwrap();
//! assert_eq!(settings.font_size, 14);
//! assert_eq!(settings.tab_width, 4);
//! assert_eq!(settings.syntax.keyword.to_hex(), "#C678DD");
//! ```

use crate::color::Rgba;
use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;

pub const DEFAULT_FONT_FAMILY: &str = "Consolas";
pub const DEFAULT_FONT_SIZE: u32 = 11;
pub const DEFAULT_TAB_WIDTH: usize = 4;
/// Widest accepted indent unit, in spaces.
pub const MAX_TAB_WIDTH: usize = 16;

/// Deserialize an optional field, discarding values of the wrong type.
fn lenient<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    match serde_json::from_value(value.clone()) {
        Ok(parsed) => Ok(Some(parsed)),
        Err(err) => {
            warn!(%value, error = %err, "ignoring settings value of unexpected type");
            Ok(None)
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawSyntax {
    #[serde(deserialize_with = "lenient")]
    keyword_color: Option<String>,
    #[serde(deserialize_with = "lenient")]
    string_color: Option<String>,
    #[serde(deserialize_with = "lenient")]
    comment_color: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawSettings {
    #[serde(deserialize_with = "lenient")]
    font_family: Option<String>,
    #[serde(deserialize_with = "lenient")]
    font_size: Option<u32>,
    #[serde(deserialize_with = "lenient")]
    tab_width: Option<usize>,
    #[serde(deserialize_with = "lenient")]
    editor_bg: Option<String>,
    #[serde(deserialize_with = "lenient")]
    editor_fg: Option<String>,
    #[serde(deserialize_with = "lenient")]
    line_number_bg: Option<String>,
    #[serde(deserialize_with = "lenient", alias = "line_number_fg")]
    line_number_color: Option<String>,
    #[serde(deserialize_with = "lenient")]
    current_line_bg: Option<String>,
    #[serde(deserialize_with = "lenient", alias = "bracket_highlight_bg")]
    bracket_match_bg: Option<String>,
    #[serde(deserialize_with = "lenient")]
    selection_bg: Option<String>,
    #[serde(deserialize_with = "lenient")]
    selection_fg: Option<String>,
    #[serde(deserialize_with = "lenient")]
    syntax: Option<RawSyntax>,
}

/// Editor chrome colors.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EditorColors {
    pub background: Rgba,
    pub foreground: Rgba,
    pub line_number_bg: Rgba,
    pub line_number_fg: Rgba,
    pub current_line_bg: Rgba,
    pub bracket_match_bg: Rgba,
    pub selection_bg: Rgba,
    pub selection_fg: Rgba,
}

impl Default for EditorColors {
    fn default() -> Self {
        Self {
            background: Rgba::from_rgb_u8(0x28, 0x2C, 0x34),
            foreground: Rgba::from_rgb_u8(0xAB, 0xB2, 0xBF),
            line_number_bg: Rgba::from_rgb_u8(0x21, 0x25, 0x2B),
            line_number_fg: Rgba::from_rgb_u8(0x63, 0x6D, 0x83),
            current_line_bg: Rgba::from_rgb_u8(0x2C, 0x31, 0x3C),
            bracket_match_bg: Rgba::from_rgb_u8(0x3E, 0x44, 0x51),
            selection_bg: Rgba::from_rgb_u8(0x3E, 0x44, 0x51),
            selection_fg: Rgba::WHITE,
        }
    }
}

/// Colors for the configurable syntax classes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SyntaxColors {
    pub keyword: Rgba,
    pub string: Rgba,
    pub comment: Rgba,
}

impl Default for SyntaxColors {
    fn default() -> Self {
        Self {
            keyword: Rgba::from_rgb_u8(0x61, 0xAF, 0xEF),
            string: Rgba::from_rgb_u8(0x98, 0xC3, 0x79),
            comment: Rgba::from_rgb_u8(0x5C, 0x63, 0x70),
        }
    }
}

/// Fully resolved editor settings.
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub font_family: String,
    pub font_size: u32,
    /// Indent unit width in spaces, between 1 and [`MAX_TAB_WIDTH`].
    pub tab_width: usize,
    pub colors: EditorColors,
    pub syntax: SyntaxColors,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            font_size: DEFAULT_FONT_SIZE,
            tab_width: DEFAULT_TAB_WIDTH,
            colors: EditorColors::default(),
            syntax: SyntaxColors::default(),
        }
    }
}

fn color_or(key: &str, raw: Option<&str>, default: Rgba) -> Rgba {
    match raw {
        None => default,
        Some(text) => text.parse().unwrap_or_else(|err: Error| {
            warn!(key, error = %err, "invalid color in settings, using default");
            default
        }),
    }
}

impl Settings {
    /// Parse settings from JSON text.
    ///
    /// Fails only when the text is not JSON at all.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        Ok(Self::from_value(&value))
    }

    /// Resolve settings from an already-parsed JSON value. Never fails.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let raw = if value.is_object() {
            RawSettings::deserialize(value).unwrap_or_else(|err| {
                warn!(error = %err, "unreadable settings object, using defaults");
                RawSettings::default()
            })
        } else {
            if !value.is_null() {
                warn!(%value, "settings root is not an object, using defaults");
            }
            RawSettings::default()
        };
        Self::resolve(raw)
    }

    fn resolve(raw: RawSettings) -> Self {
        let defaults = Self::default();
        let dc = defaults.colors;
        let colors = EditorColors {
            background: color_or("editor_bg", raw.editor_bg.as_deref(), dc.background),
            foreground: color_or("editor_fg", raw.editor_fg.as_deref(), dc.foreground),
            line_number_bg: color_or(
                "line_number_bg",
                raw.line_number_bg.as_deref(),
                dc.line_number_bg,
            ),
            line_number_fg: color_or(
                "line_number_color",
                raw.line_number_color.as_deref(),
                dc.line_number_fg,
            ),
            current_line_bg: color_or(
                "current_line_bg",
                raw.current_line_bg.as_deref(),
                dc.current_line_bg,
            ),
            bracket_match_bg: color_or(
                "bracket_match_bg",
                raw.bracket_match_bg.as_deref(),
                dc.bracket_match_bg,
            ),
            selection_bg: color_or("selection_bg", raw.selection_bg.as_deref(), dc.selection_bg),
            selection_fg: color_or("selection_fg", raw.selection_fg.as_deref(), dc.selection_fg),
        };

        let ds = defaults.syntax;
        let syntax = raw.syntax.unwrap_or_default();
        let syntax = SyntaxColors {
            keyword: color_or("syntax.keyword_color", syntax.keyword_color.as_deref(), ds.keyword),
            string: color_or("syntax.string_color", syntax.string_color.as_deref(), ds.string),
            comment: color_or("syntax.comment_color", syntax.comment_color.as_deref(), ds.comment),
        };

        Self {
            font_family: raw
                .font_family
                .filter(|family| !family.trim().is_empty())
                .unwrap_or(defaults.font_family),
            font_size: raw
                .font_size
                .filter(|size| *size > 0)
                .unwrap_or(defaults.font_size),
            tab_width: raw
                .tab_width
                .filter(|width| {
                    let ok = (1..=MAX_TAB_WIDTH).contains(width);
                    if !ok {
                        warn!(
                            value = *width,
                            max = MAX_TAB_WIDTH,
                            "tab_width out of range, using default"
                        );
                    }
                    ok
                })
                .unwrap_or(defaults.tab_width),
            colors,
            syntax,
        }
    }

    /// One indent unit as spaces.
    #[must_use]
    pub fn indent_unit(&self) -> String {
        " ".repeat(self.tab_width)
    }
}
