use crate::color::Rgba;
use crate::highlight::token::TokenKind;
use crate::settings::Settings;
use crate::style::Style;

/// Maps token kinds to styles and carries the editor chrome colors.
#[derive(Clone, Debug, PartialEq)]
pub struct Theme {
    styles: [Option<Style>; TokenKind::COUNT],
    default_style: Style,

    background: Rgba,
    foreground: Rgba,
    selection_bg: Rgba,
    selection_fg: Rgba,
    line_number_bg: Rgba,
    line_number_fg: Rgba,
    current_line_bg: Rgba,
    bracket_match_bg: Rgba,
}

impl Default for Theme {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

/// One Dark palette entries used by the fixed (non-configurable) classes.
mod palette {
    use crate::color::Rgba;

    pub fn chalky() -> Rgba {
        Rgba::from_rgb_u8(0xE5, 0xC0, 0x7B)
    }
    pub fn coral() -> Rgba {
        Rgba::from_rgb_u8(0xE0, 0x6C, 0x75)
    }
    pub fn whiskey() -> Rgba {
        Rgba::from_rgb_u8(0xD1, 0x9A, 0x66)
    }
    pub fn green() -> Rgba {
        Rgba::from_rgb_u8(0x98, 0xC3, 0x79)
    }
    pub fn malibu() -> Rgba {
        Rgba::from_rgb_u8(0x61, 0xAF, 0xEF)
    }
    pub fn fountain_blue() -> Rgba {
        Rgba::from_rgb_u8(0x56, 0xB6, 0xC2)
    }
    pub fn light_dark() -> Rgba {
        Rgba::from_rgb_u8(0x7F, 0x84, 0x8E)
    }
    pub fn light_white() -> Rgba {
        Rgba::from_rgb_u8(0xAB, 0xB2, 0xBF)
    }
}

impl Theme {
    /// Build the theme for `settings`.
    ///
    /// Keywords, strings and comments take their colors from the settings'
    /// syntax section; everything else uses the fixed palette.
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        let colors = settings.colors;
        let syntax = settings.syntax;

        let mut theme = Self {
            styles: [None; TokenKind::COUNT],
            default_style: Style::fg(colors.foreground),
            background: colors.background,
            foreground: colors.foreground,
            selection_bg: colors.selection_bg,
            selection_fg: colors.selection_fg,
            line_number_bg: colors.line_number_bg,
            line_number_fg: colors.line_number_fg,
            current_line_bg: colors.current_line_bg,
            bracket_match_bg: colors.bracket_match_bg,
        };

        theme
            .set_style(TokenKind::Keyword, Style::fg(syntax.keyword).with_bold())
            .set_style(TokenKind::Type, Style::fg(palette::chalky()))
            .set_style(TokenKind::Function, Style::fg(palette::malibu()))
            .set_style(TokenKind::Class, Style::fg(palette::chalky()).with_bold())
            .set_style(TokenKind::Decorator, Style::fg(palette::coral()).with_italic())
            .set_style(TokenKind::SpecialVar, Style::fg(palette::whiskey()))
            .set_style(TokenKind::Property, Style::fg(palette::coral()))
            .set_style(TokenKind::String, Style::fg(syntax.string))
            .set_style(TokenKind::StringEscape, Style::fg(palette::fountain_blue()))
            .set_style(TokenKind::Regex, Style::fg(palette::green()))
            .set_style(TokenKind::Number, Style::fg(palette::whiskey()))
            .set_style(
                TokenKind::ColorLiteral,
                Style::fg(palette::coral()).with_underline(),
            )
            .set_style(TokenKind::Url, Style::fg(palette::malibu()).with_underline())
            .set_style(TokenKind::Comment, Style::fg(syntax.comment).with_italic())
            .set_style(
                TokenKind::Docstring,
                Style::fg(palette::light_dark()).with_italic(),
            )
            .set_style(TokenKind::Operator, Style::fg(palette::fountain_blue()))
            .set_style(TokenKind::Bracket, Style::fg(palette::light_white()));
        theme
    }

    /// Get the style for a token kind (falls back to default style).
    #[must_use]
    pub fn style_for(&self, kind: TokenKind) -> &Style {
        self.styles[kind.as_usize()]
            .as_ref()
            .unwrap_or(&self.default_style)
    }

    #[must_use]
    pub const fn default_style(&self) -> Style {
        self.default_style
    }

    /// Set a style for a token kind.
    pub fn set_style(&mut self, kind: TokenKind, style: Style) -> &mut Self {
        self.styles[kind.as_usize()] = Some(style);
        self
    }

    /// Builder-style style setter.
    #[must_use]
    pub fn with_style(mut self, kind: TokenKind, style: Style) -> Self {
        self.set_style(kind, style);
        self
    }

    #[must_use]
    pub const fn background(&self) -> Rgba {
        self.background
    }

    #[must_use]
    pub const fn foreground(&self) -> Rgba {
        self.foreground
    }

    /// Style applied to selected text.
    #[must_use]
    pub const fn selection(&self) -> Style {
        Style::fg(self.selection_fg).with_bg(self.selection_bg)
    }

    #[must_use]
    pub const fn line_number_bg(&self) -> Rgba {
        self.line_number_bg
    }

    #[must_use]
    pub const fn line_number_fg(&self) -> Rgba {
        self.line_number_fg
    }

    /// Full-width background of the line holding the cursor.
    #[must_use]
    pub const fn current_line_bg(&self) -> Rgba {
        self.current_line_bg
    }

    /// Background of a matched bracket pair.
    #[must_use]
    pub const fn bracket_match_bg(&self) -> Rgba {
        self.bracket_match_bg
    }
}
