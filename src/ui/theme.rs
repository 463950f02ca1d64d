//! # Theme System
//!
//! Centralized colors for the veil TUI. Rendering code references [`Theme`]
//! fields instead of hardcoding `ratatui::style::Color` values; the active
//! theme is selected by name in the config file.
//!
//! ## Built-in Themes
//!
//! - **Phosphor** (default) - green-on-black terminal look
//! - **Catppuccin Mocha** - warm, dark pastel theme
//! - **Nord** - arctic, north-bluish color palette

use ratatui::style::Color;

/// All colors used by the veil TUI, grouped by semantic role.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Human-readable name referenced from the config file.
    pub name: &'static str,

    /// Main background color for panels and modals.
    pub bg: Color,
    /// Primary text color.
    pub fg: Color,
    /// Muted/secondary text (hints, footer, inactive buttons).
    pub fg_dim: Color,

    /// Primary accent: branding, focused borders, active buttons.
    pub accent: Color,
    /// Secondary accent: typed text, panel titles.
    pub secondary: Color,

    /// Success / green indicator (redacted link).
    pub success: Color,
    /// Error / red indicator (alerts).
    pub error: Color,
}

impl Theme {
    /// Return the list of all built-in themes.
    pub fn all() -> &'static [Theme] {
        &BUILT_IN_THEMES
    }

    /// Find a built-in theme by name (case-insensitive).
    pub fn by_name(name: &str) -> Option<&'static Theme> {
        BUILT_IN_THEMES
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(name))
    }

    /// Return the default theme (Phosphor).
    pub fn default_theme() -> &'static Theme {
        &BUILT_IN_THEMES[0]
    }
}

static BUILT_IN_THEMES: [Theme; 3] = [
    // 0 - Phosphor (default)
    Theme {
        name: "Phosphor",
        bg: Color::Rgb(8, 12, 8),
        fg: Color::Rgb(140, 220, 140),
        fg_dim: Color::Rgb(70, 110, 70),
        accent: Color::Rgb(80, 250, 123),
        secondary: Color::Rgb(220, 240, 180),
        success: Color::Rgb(80, 250, 123),
        error: Color::Rgb(255, 85, 85),
    },
    // 1 - Catppuccin Mocha
    Theme {
        name: "Catppuccin Mocha",
        bg: Color::Rgb(30, 30, 46),
        fg: Color::Rgb(205, 214, 244),
        fg_dim: Color::Rgb(108, 112, 134),
        accent: Color::Rgb(137, 180, 250),
        secondary: Color::Rgb(249, 226, 175),
        success: Color::Rgb(166, 227, 161),
        error: Color::Rgb(243, 139, 168),
    },
    // 2 - Nord
    Theme {
        name: "Nord",
        bg: Color::Rgb(46, 52, 64),
        fg: Color::Rgb(216, 222, 233),
        fg_dim: Color::Rgb(76, 86, 106),
        accent: Color::Rgb(136, 192, 208),
        secondary: Color::Rgb(235, 203, 139),
        success: Color::Rgb(163, 190, 140),
        error: Color::Rgb(191, 97, 106),
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_theme_is_phosphor() {
        assert_eq!(Theme::default_theme().name, "Phosphor");
    }

    #[test]
    fn test_by_name_is_case_insensitive() {
        assert!(Theme::by_name("nord").is_some());
        assert!(Theme::by_name("NORD").is_some());
        assert!(Theme::by_name("no-such-theme").is_none());
    }

    #[test]
    fn test_theme_names_are_unique() {
        let names: Vec<&str> = Theme::all().iter().map(|t| t.name).collect();
        let mut deduped = names.clone();
        deduped.sort_unstable();
        deduped.dedup();
        assert_eq!(names.len(), deduped.len());
    }
}
