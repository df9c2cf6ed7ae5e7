//! ANSI 256-color fallback theme for terminals without truecolor support.
//!
//! Approximates the default palette with indexed colors so the UI stays
//! legible inside macOS Terminal and other 8-bit color terminals.

use ratatui::style::Color;

use super::roles::{Theme, ThemeRoles};

#[derive(Debug, Clone)]
pub struct Ansi256Theme {
    roles: ThemeRoles,
}

impl Ansi256Theme {
    pub fn new() -> Self {
        Self {
            roles: ThemeRoles {
                background: Color::Indexed(233),
                surface: Color::Indexed(234),
                surface_muted: Color::Indexed(236),
                border: Color::Indexed(239),

                text: Color::Indexed(255),
                text_secondary: Color::Indexed(250),
                text_muted: Color::Indexed(244),

                accent_primary: Color::Indexed(179),
                accent_secondary: Color::Indexed(110),

                selection_bg: Color::Indexed(238),
                selection_fg: Color::Indexed(255),
                focus: Color::Indexed(179),

                scrollbar_track: Color::Indexed(236),
                scrollbar_thumb: Color::Indexed(241),
            },
        }
    }
}

impl Default for Ansi256Theme {
    fn default() -> Self {
        Self::new()
    }
}

impl Theme for Ansi256Theme {
    fn roles(&self) -> &ThemeRoles {
        &self.roles
    }
}
