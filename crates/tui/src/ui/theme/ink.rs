//! Default truecolor palette: warm dark tones tuned for long reading
//! sessions, with an amber accent for the active chapter.

use ratatui::style::Color;

use super::roles::{Theme, ThemeRoles};

#[derive(Debug, Clone)]
pub struct InkTheme {
    roles: ThemeRoles,
}

impl InkTheme {
    pub fn new() -> Self {
        Self {
            roles: ThemeRoles {
                background: Color::Rgb(0x14, 0x12, 0x0f),
                surface: Color::Rgb(0x1c, 0x19, 0x16),
                surface_muted: Color::Rgb(0x26, 0x22, 0x1c),
                border: Color::Rgb(0x3a, 0x35, 0x2c),

                text: Color::Rgb(0xe8, 0xe2, 0xd4),
                text_secondary: Color::Rgb(0xc9, 0xbf, 0xa8),
                text_muted: Color::Rgb(0x8a, 0x81, 0x70),

                accent_primary: Color::Rgb(0xd9, 0xa4, 0x41),
                accent_secondary: Color::Rgb(0x7f, 0xa8, 0xc9),

                selection_bg: Color::Rgb(0x40, 0x3a, 0x2c),
                selection_fg: Color::Rgb(0xf2, 0xed, 0xe0),
                focus: Color::Rgb(0xd9, 0xa4, 0x41),

                scrollbar_track: Color::Rgb(0x26, 0x22, 0x1c),
                scrollbar_thumb: Color::Rgb(0x5a, 0x52, 0x40),
            },
        }
    }
}

impl Default for InkTheme {
    fn default() -> Self {
        Self::new()
    }
}

impl Theme for InkTheme {
    fn roles(&self) -> &ThemeRoles {
        &self.roles
    }
}
