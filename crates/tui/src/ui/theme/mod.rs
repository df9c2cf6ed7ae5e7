//! Theme styling module for the TUI layer.
//!
//! Defines the default truecolor palette, an ANSI 256-color fallback,
//! semantic theme roles, and helper builders for Ratatui widgets and styles.
//! Prefer these helpers over hard-coding colors to keep the UI consistent.

use std::env;

use tracing::debug;

pub mod ansi256;
pub mod ink;
pub mod roles;
pub mod theme_helpers;

pub use ansi256::Ansi256Theme;
pub use ink::InkTheme;
pub use roles::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColorCapability {
    Truecolor,
    Ansi256,
}

/// Selects a theme based on the terminal's detected color capability.
pub fn load() -> Box<dyn Theme> {
    match detect_color_capability() {
        ColorCapability::Truecolor => Box::new(InkTheme::new()),
        ColorCapability::Ansi256 => {
            debug!("ANSI-only terminal detected; using the indexed fallback palette");
            Box::new(Ansi256Theme::new())
        }
    }
}

fn detect_color_capability() -> ColorCapability {
    if let Some(mode) = env::var("TOME_COLOR_MODE").ok().and_then(|value| parse_color_mode(value.trim())) {
        return mode;
    }

    let color_term = env::var("COLORTERM").unwrap_or_default().to_ascii_lowercase();
    if color_term.contains("truecolor") || color_term.contains("24bit") {
        return ColorCapability::Truecolor;
    }

    let term = env::var("TERM").unwrap_or_default().to_ascii_lowercase();
    if term.contains("truecolor") {
        return ColorCapability::Truecolor;
    }

    ColorCapability::Ansi256
}

fn parse_color_mode(value: &str) -> Option<ColorCapability> {
    match value.to_ascii_lowercase().as_str() {
        "truecolor" | "24bit" => Some(ColorCapability::Truecolor),
        "ansi256" | "256" | "8bit" => Some(ColorCapability::Ansi256),
        _ => None,
    }
}
