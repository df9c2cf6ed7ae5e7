//! Main view composition: the navigation sidebar and the page reader side
//! by side over a one-line hint bar.
//!
//! Global chrome keys (quit, sidebar visibility, chapter paging) are
//! handled here; everything else is routed to whichever pane holds the
//! focus. Mouse events go to every pane, which decide relevance from the
//! areas they captured during the last render.

use crossterm::event::{KeyCode, KeyEvent, MouseEvent};
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;
use tome_types::{Effect, Msg};

use crate::app::App;
use crate::ui::components::component::Component;
use crate::ui::components::reader::ReaderComponent;
use crate::ui::components::sidebar::SidebarComponent;
use crate::ui::theme::theme_helpers as th;

/// Sidebar pane width in columns, halved when the terminal is narrower.
const SIDEBAR_WIDTH: u16 = 34;

/// Composes the panes and owns event routing between them.
#[derive(Debug, Default)]
pub struct MainView {
    sidebar_view: SidebarComponent,
    reader_view: ReaderComponent,
}

impl MainView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Focuses the first pane after a rebuild left nothing focused.
    pub fn restore_focus(&mut self, app: &mut App) {
        app.focus.first();
    }

    fn toggle_sidebar(&mut self, app: &mut App) {
        app.sidebar.visible = !app.sidebar.visible;
        // A hidden pane must not keep the focus.
        if !app.sidebar.visible && app.sidebar.container_focus.get() {
            app.focus.focus(&app.reader.container_focus);
        }
    }
}

impl Component for MainView {
    fn handle_message(&mut self, app: &mut App, msg: Msg) -> Vec<Effect> {
        app.update(&msg)
    }

    fn handle_key_events(&mut self, app: &mut App, key: KeyEvent) -> Vec<Effect> {
        match key.code {
            KeyCode::Char('q') => return vec![Effect::Quit],
            KeyCode::Char('b') => {
                self.toggle_sidebar(app);
                return Vec::new();
            }
            // Chapter paging bypasses the sidebar on purpose: no scroll
            // offset is captured, so the next page open auto-reveals.
            KeyCode::Char('[') => return vec![Effect::OpenPrevious],
            KeyCode::Char(']') => return vec![Effect::OpenNext],
            _ => {}
        }
        if app.sidebar.visible && app.sidebar.container_focus.get() {
            return self.sidebar_view.handle_key_events(app, key);
        }
        self.reader_view.handle_key_events(app, key)
    }

    fn handle_mouse_events(&mut self, app: &mut App, mouse: MouseEvent) -> Vec<Effect> {
        let mut effects = self.sidebar_view.handle_mouse_events(app, mouse);
        effects.extend(self.reader_view.handle_mouse_events(app, mouse));
        effects
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, app: &mut App) {
        let background = Paragraph::new("").style(Style::default().bg(app.ctx.theme.roles().background));
        frame.render_widget(background, area);

        let layout = self.get_preferred_layout(app, area);
        if app.sidebar.visible {
            self.sidebar_view.render(frame, layout[0], app);
        }
        self.reader_view.render(frame, layout[1], app);

        let hints = Paragraph::new(Line::from(self.get_hint_spans(app)));
        frame.render_widget(hints, layout[2]);
    }

    fn get_hint_spans(&self, app: &App) -> Vec<Span<'_>> {
        let mut hint_spans = vec![Span::styled("Hints: ", app.ctx.theme.text_muted_style())];
        if app.sidebar.visible && app.sidebar.container_focus.get() {
            hint_spans.extend(self.sidebar_view.get_hint_spans(app));
        } else {
            hint_spans.extend(self.reader_view.get_hint_spans(app));
        }
        hint_spans.extend(th::build_hint_spans(
            &*app.ctx.theme,
            &[("Tab", " Panes  "), ("b", " Sidebar  "), ("[/]", " Chapters  "), ("q", " Quit")],
        ));
        hint_spans
    }

    fn get_preferred_layout(&self, app: &App, area: Rect) -> Vec<Rect> {
        let rows = Layout::vertical([
            Constraint::Min(1),    // Panes
            Constraint::Length(1), // Hint bar
        ])
        .split(area);
        let sidebar_width = if app.sidebar.visible {
            SIDEBAR_WIDTH.min(rows[0].width / 2)
        } else {
            0
        };
        let columns = Layout::horizontal([Constraint::Length(sidebar_width), Constraint::Min(1)]).split(rows[0]);
        vec![columns[0], columns[1], rows[1]]
    }
}
