//! Style profiles and background detection.
//!
//! The active theme lives in a process-wide register: initialized from
//! the environment (and workspace config) at startup, replaced only by
//! an explicit preference change, read by rendering on every frame.

use std::sync::{LazyLock, RwLock};

use ratatui::style::{Color, Modifier, Style};

use crate::store::config::AppearanceConfig;

/// Named style profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Profile {
    #[default]
    Default,
    Neon,
    Pills,
    Mono,
}

impl Profile {
    pub fn parse(name: &str) -> Option<Profile> {
        match name {
            "default" => Some(Profile::Default),
            "neon" => Some(Profile::Neon),
            "pills" => Some(Profile::Pills),
            "mono" => Some(Profile::Mono),
            _ => None,
        }
    }
}

/// Resolved colors for the TUI
#[derive(Debug, Clone)]
pub struct Theme {
    pub profile: Profile,
    pub dark: bool,
    pub background: Color,
    pub text: Color,
    pub text_bright: Color,
    pub dim: Color,
    pub accent: Color,
    pub selection_bg: Color,
    pub priority: Color,
    pub on_hold: Color,
    pub done: Color,
    pub error: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Theme::build(Profile::Default, true)
    }
}

impl Theme {
    pub fn build(profile: Profile, dark: bool) -> Theme {
        let (background, text, text_bright, dim, selection_bg) = if dark {
            (
                Color::Reset,
                Color::Gray,
                Color::White,
                Color::DarkGray,
                Color::Rgb(0x2A, 0x2A, 0x40),
            )
        } else {
            (
                Color::Reset,
                Color::Black,
                Color::Black,
                Color::Gray,
                Color::Rgb(0xD8, 0xD8, 0xF0),
            )
        };
        let (accent, priority, on_hold, done, error) = match profile {
            Profile::Default => (
                Color::Cyan,
                Color::Yellow,
                Color::Magenta,
                Color::Green,
                Color::Red,
            ),
            Profile::Neon => (
                Color::Rgb(0xFB, 0x41, 0x96),
                Color::Rgb(0xFF, 0xD7, 0x00),
                Color::Rgb(0xCC, 0x66, 0xFF),
                Color::Rgb(0x44, 0xFF, 0x88),
                Color::Rgb(0xFF, 0x44, 0x44),
            ),
            Profile::Pills => (
                Color::Rgb(0x44, 0x88, 0xFF),
                Color::Rgb(0xFF, 0xA5, 0x00),
                Color::Rgb(0x9A, 0x6A, 0xFF),
                Color::Rgb(0x3C, 0xB3, 0x71),
                Color::Rgb(0xE5, 0x48, 0x4D),
            ),
            Profile::Mono => {
                let c = if dark { Color::White } else { Color::Black };
                (c, c, c, c, c)
            }
        };
        Theme {
            profile,
            dark,
            background,
            text,
            text_bright,
            dim,
            accent,
            selection_bg,
            priority,
            on_hold,
            done,
            error,
        }
    }

    pub fn base(&self) -> Style {
        Style::default().fg(self.text)
    }

    pub fn dim_style(&self) -> Style {
        Style::default().fg(self.dim)
    }

    pub fn accent_style(&self) -> Style {
        Style::default().fg(self.accent)
    }

    pub fn selected(&self) -> Style {
        Style::default()
            .bg(self.selection_bg)
            .fg(self.text_bright)
            .add_modifier(Modifier::BOLD)
    }
}

static THEME: LazyLock<RwLock<Theme>> = LazyLock::new(|| RwLock::new(Theme::default()));

/// Snapshot of the active theme
pub fn current() -> Theme {
    THEME.read().expect("theme register poisoned").clone()
}

/// Replace the active theme (startup or explicit preference change)
pub fn install(theme: Theme) {
    *THEME.write().expect("theme register poisoned") = theme;
}

/// Resolve the theme from environment variables with workspace config
/// below them in precedence. Unknown values are ignored.
pub fn detect(config: &AppearanceConfig) -> Theme {
    let profile = std::env::var("CLARITY_TUI_PROFILE")
        .ok()
        .as_deref()
        .and_then(Profile::parse)
        .or_else(|| config.profile.as_deref().and_then(Profile::parse))
        .unwrap_or_default();
    let dark = detect_dark(
        std::env::var("CLARITY_TUI_THEME").ok().as_deref(),
        std::env::var("CLARITY_TUI_DARKBG").ok().as_deref(),
        std::env::var("COLORFGBG").ok().as_deref(),
        config.theme.as_deref(),
    );
    Theme::build(profile, dark)
}

/// Background assumption: explicit theme, then boolean override, then
/// the COLORFGBG heuristic, then dark.
fn detect_dark(
    theme: Option<&str>,
    darkbg: Option<&str>,
    colorfgbg: Option<&str>,
    config_theme: Option<&str>,
) -> bool {
    for forced in [theme, config_theme] {
        match forced {
            Some("dark") => return true,
            Some("light") => return false,
            // "auto" and unknown values fall through
            _ => {}
        }
    }
    if let Some(value) = darkbg {
        match value {
            "1" | "true" | "yes" => return true,
            "0" | "false" | "no" => return false,
            _ => {}
        }
    }
    if let Some(value) = colorfgbg {
        // Last semicolon-separated integer is the background color
        if let Some(bg) = value.rsplit(';').next().and_then(|s| s.parse::<u8>().ok()) {
            return bg < 7;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_parse_ignores_unknown() {
        assert_eq!(Profile::parse("neon"), Some(Profile::Neon));
        assert_eq!(Profile::parse("sparkle"), None);
    }

    #[test]
    fn explicit_theme_wins() {
        assert!(detect_dark(Some("dark"), Some("0"), Some("15;7"), None));
        assert!(!detect_dark(Some("light"), Some("1"), Some("15;0"), None));
        assert!(detect_dark(Some("auto"), None, Some("15;0"), None));
    }

    #[test]
    fn colorfgbg_heuristic_reads_last_field() {
        assert!(detect_dark(None, None, Some("15;default;0"), None));
        assert!(!detect_dark(None, None, Some("0;15"), None));
        // Unparseable values fall through to dark
        assert!(detect_dark(None, None, Some("foo;bar"), None));
    }

    #[test]
    fn config_sits_below_env() {
        assert!(!detect_dark(None, None, None, Some("light")));
        assert!(detect_dark(Some("dark"), None, None, Some("light")));
    }
}
