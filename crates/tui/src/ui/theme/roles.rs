use std::fmt::Debug;

use ratatui::style::{Color, Modifier, Style};

/// Semantic color roles the reader panes draw from.
#[derive(Debug, Clone)]
pub struct ThemeRoles {
    pub background: Color,
    pub surface: Color,
    pub surface_muted: Color,
    pub border: Color,

    pub text: Color,
    pub text_secondary: Color,
    pub text_muted: Color,

    pub accent_primary: Color,
    pub accent_secondary: Color,

    pub selection_bg: Color,
    pub selection_fg: Color,
    pub focus: Color,

    pub scrollbar_track: Color,
    pub scrollbar_thumb: Color,
}

/// Theme trait exposes semantic roles and common style builders.
pub trait Theme: Send + Sync + Debug {
    fn roles(&self) -> &ThemeRoles;

    // Text styles
    fn text_primary_style(&self) -> Style {
        Style::default().fg(self.roles().text)
    }
    fn text_secondary_style(&self) -> Style {
        Style::default().fg(self.roles().text_secondary)
    }
    fn text_muted_style(&self) -> Style {
        // Use the muted color directly without DIM to improve readability.
        Style::default().fg(self.roles().text_muted)
    }

    // Borders and focus
    fn border_style(&self, focused: bool) -> Style {
        let color = if focused { self.roles().focus } else { self.roles().border };
        Style::default().fg(color)
    }

    // Selection
    fn selection_style(&self) -> Style {
        Style::default().fg(self.roles().selection_fg).bg(self.roles().selection_bg)
    }

    // Accents
    fn accent_primary_style(&self) -> Style {
        Style::default().fg(self.roles().accent_primary)
    }
    fn accent_emphasis_style(&self) -> Style {
        Style::default().fg(self.roles().accent_primary).add_modifier(Modifier::BOLD)
    }

    // Navigation rows
    /// Style for the entry whose page is currently open.
    fn active_entry_style(&self) -> Style {
        self.accent_emphasis_style()
    }
    /// Style for part headings, which are labels rather than links.
    fn part_title_style(&self) -> Style {
        self.text_muted_style().add_modifier(Modifier::BOLD)
    }
}
