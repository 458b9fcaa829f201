//! RGBA color type used by themes, settings, and the terminal transcript.
//!
//! This module provides the [`Rgba`] type, which represents colors using
//! floating-point RGBA components. It supports:
//!
//! - **Color creation**: From f32/u8 components or hex strings
//! - **CSS-style literals**: `rgb(r, g, b)` as written in source files
//! - **Terminal palette**: The eight basic ANSI foreground colors
//!
//! # Examples
//!
//! ```
//! use ember::Rgba;
//!
//! let accent = Rgba::from_hex("#61AFEF").unwrap();
//! assert_eq!(accent.to_rgb_u8(), (0x61, 0xAF, 0xEF));
//!
//! let literal = Rgba::parse("rgb(255, 0, 0)").unwrap();
//! assert_eq!(literal, Rgba::RED);
//! ```

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// RGBA color with f32 components in range [0.0, 1.0].
///
/// Colors round-trip through `#RRGGBB` notation without loss, which matters
/// for color literals that are re-written into the document.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);

    /// Opaque white.
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);

    /// Opaque red.
    pub const RED: Self = Self::rgb(1.0, 0.0, 0.0);

    /// Opaque green.
    pub const GREEN: Self = Self::rgb(0.0, 1.0, 0.0);

    /// Opaque blue.
    pub const BLUE: Self = Self::rgb(0.0, 0.0, 1.0);

    /// Create a new RGBA color from f32 components.
    #[must_use]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque color from f32 RGB components.
    #[must_use]
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Create an opaque color from u8 RGB components.
    #[must_use]
    pub fn from_rgb_u8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: f32::from(r) / 255.0,
            g: f32::from(g) / 255.0,
            b: f32::from(b) / 255.0,
            a: 1.0,
        }
    }

    /// Parse a hex color string (e.g., "#FF0000" or "FF0000").
    ///
    /// Supports 3-char (#RGB) and 6-char (#RRGGBB) formats.
    #[must_use]
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.is_ascii() {
            return None;
        }

        match hex.len() {
            3 => {
                // #RGB -> #RRGGBB
                let r = u8::from_str_radix(&hex[0..1], 16).ok()?;
                let g = u8::from_str_radix(&hex[1..2], 16).ok()?;
                let b = u8::from_str_radix(&hex[2..3], 16).ok()?;
                Some(Self::from_rgb_u8(r * 17, g * 17, b * 17))
            }
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                Some(Self::from_rgb_u8(r, g, b))
            }
            _ => None,
        }
    }

    /// Parse a CSS-style `rgb(r, g, b)` literal with components in 0..=255.
    #[must_use]
    pub fn from_css_rgb(text: &str) -> Option<Self> {
        let inner = text
            .trim()
            .strip_prefix("rgb(")?
            .strip_suffix(')')?;
        let mut parts = inner.split(',').map(|part| part.trim().parse::<u8>());
        let r = parts.next()?.ok()?;
        let g = parts.next()?.ok()?;
        let b = parts.next()?.ok()?;
        if parts.next().is_some() {
            return None;
        }
        Some(Self::from_rgb_u8(r, g, b))
    }

    /// Parse any color notation accepted in settings or source literals.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.starts_with("rgb(") {
            Self::from_css_rgb(text)
        } else if text.starts_with('#') {
            Self::from_hex(text)
        } else {
            None
        }
    }

    /// Convert to u8 RGB tuple, clamping values to [0, 255].
    #[must_use]
    pub fn to_rgb_u8(self) -> (u8, u8, u8) {
        let to_u8 = |value: f32| (value * 255.0).round().clamp(0.0, 255.0) as u8;
        (to_u8(self.r), to_u8(self.g), to_u8(self.b))
    }

    /// Format as uppercase `#RRGGBB`, ignoring alpha.
    #[must_use]
    pub fn to_hex(self) -> String {
        let (r, g, b) = self.to_rgb_u8();
        format!("#{r:02X}{g:02X}{b:02X}")
    }

    /// Color for a basic ANSI foreground index (0 = black .. 7 = white).
    ///
    /// Indices outside 0..=7 wrap into that range.
    #[must_use]
    pub fn from_ansi_index(index: u8) -> Self {
        match index % 8 {
            0 => Self::BLACK,
            1 => Self::from_rgb_u8(205, 49, 49),
            2 => Self::from_rgb_u8(13, 188, 121),
            3 => Self::from_rgb_u8(229, 229, 16),
            4 => Self::from_rgb_u8(36, 114, 200),
            5 => Self::from_rgb_u8(188, 63, 188),
            6 => Self::from_rgb_u8(17, 168, 205),
            _ => Self::from_rgb_u8(229, 229, 229),
        }
    }
}

impl FromStr for Rgba {
    type Err = Error;

    /// Strict counterpart of [`Rgba::parse`].
    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s).ok_or_else(|| Error::InvalidColor(s.trim().to_string()))
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
