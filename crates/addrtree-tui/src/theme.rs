//! Palettes and semantic styles.

use ratatui::style::{Color, Modifier, Style};
use strum::{Display, EnumString};

/// Palette names accepted in `defaults.theme` and `--theme`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ThemeName {
    /// Follows the terminal's own colors.
    #[default]
    Default,
    Dark,
    Contrast,
}

impl ThemeName {
    pub fn palette(self) -> Theme {
        match self {
            Self::Default => Theme::TERMINAL,
            Self::Dark => Theme::NEON,
            Self::Contrast => Theme::CONTRAST,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub accent: Color,
    pub secondary: Color,
    pub text: Color,
    pub muted: Color,
    pub border: Color,
    pub highlight_bg: Color,
    pub overlay_bg: Color,
    pub error: Color,
    pub warning: Color,
    pub success: Color,
}

impl Default for Theme {
    fn default() -> Self {
        ThemeName::default().palette()
    }
}

impl Theme {
    /// ANSI colors only, so the terminal theme decides the actual shades.
    pub const TERMINAL: Self = Self {
        accent: Color::Blue,
        secondary: Color::Cyan,
        text: Color::Reset,
        muted: Color::DarkGray,
        border: Color::Gray,
        highlight_bg: Color::DarkGray,
        overlay_bg: Color::Reset,
        error: Color::Red,
        warning: Color::Yellow,
        success: Color::Green,
    };

    pub const NEON: Self = Self {
        accent: Color::Rgb(225, 53, 255),     // #e135ff
        secondary: Color::Rgb(128, 255, 234), // #80ffea
        text: Color::Rgb(189, 193, 207),      // #bdc1cf
        muted: Color::Rgb(98, 114, 164),      // #6272a4
        border: Color::Rgb(98, 114, 164),
        highlight_bg: Color::Rgb(40, 42, 54), // #282a36
        overlay_bg: Color::Rgb(30, 31, 41),   // #1e1f29
        error: Color::Rgb(255, 99, 99),       // #ff6363
        warning: Color::Rgb(241, 250, 140),   // #f1fa8c
        success: Color::Rgb(80, 250, 123),    // #50fa7b
    };

    pub const CONTRAST: Self = Self {
        accent: Color::Yellow,
        secondary: Color::White,
        text: Color::White,
        muted: Color::Gray,
        border: Color::White,
        highlight_bg: Color::Blue,
        overlay_bg: Color::Black,
        error: Color::LightRed,
        warning: Color::LightYellow,
        success: Color::LightGreen,
    };

    pub fn title(&self) -> Style {
        Style::default().fg(self.secondary).add_modifier(Modifier::BOLD)
    }

    pub fn border(&self, focused: bool) -> Style {
        if focused {
            Style::default().fg(self.accent)
        } else {
            Style::default().fg(self.border)
        }
    }

    pub fn text(&self) -> Style {
        Style::default().fg(self.text)
    }

    pub fn muted(&self) -> Style {
        Style::default().fg(self.muted)
    }

    pub fn table_header(&self) -> Style {
        Style::default()
            .fg(self.secondary)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
    }

    /// Cursor row in lists and trees.
    pub fn selected(&self) -> Style {
        Style::default()
            .fg(self.accent)
            .bg(self.highlight_bg)
            .add_modifier(Modifier::BOLD)
    }

    /// A row marked for adding to a recipient line.
    pub fn marked(&self) -> Style {
        Style::default().fg(self.success).add_modifier(Modifier::BOLD)
    }

    pub fn error_banner(&self) -> Style {
        Style::default().fg(self.error).add_modifier(Modifier::BOLD)
    }

    pub fn warning(&self) -> Style {
        Style::default().fg(self.warning)
    }

    pub fn key_hint(&self) -> Style {
        Style::default().fg(self.muted)
    }

    pub fn key_hint_key(&self) -> Style {
        Style::default().fg(self.secondary).add_modifier(Modifier::BOLD)
    }

    pub fn button(&self, enabled: bool) -> Style {
        if enabled {
            Style::default().fg(self.accent).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.muted).add_modifier(Modifier::DIM)
        }
    }

    pub fn overlay(&self) -> Style {
        Style::default().bg(self.overlay_bg)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn theme_names_parse_case_insensitively() {
        assert_eq!(ThemeName::from_str("dark").unwrap(), ThemeName::Dark);
        assert_eq!(ThemeName::from_str("Contrast").unwrap(), ThemeName::Contrast);
        assert_eq!(ThemeName::from_str("DEFAULT").unwrap(), ThemeName::Default);
        assert!(ThemeName::from_str("solarized").is_err());
    }

    #[test]
    fn each_name_has_its_own_palette() {
        assert_eq!(ThemeName::Dark.palette(), Theme::NEON);
        assert_ne!(ThemeName::Default.palette(), ThemeName::Contrast.palette());
        assert_eq!(ThemeName::Contrast.to_string(), "contrast");
    }
}
