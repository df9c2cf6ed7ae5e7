//! Page reader component.
//!
//! Renders the open page as wrapped plain text with the chapter heading in
//! the pane border. Horizontal arrows page through chapters in document
//! order; those navigations bypass the sidebar, so the sidebar auto-reveals
//! its active entry instead of restoring a saved offset.

use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::prelude::Position;
use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
};
use tome_types::Effect;

use crate::app::App;
use crate::ui::components::component::Component;
use crate::ui::theme::theme_helpers as th;

/// Component for the page reader pane.
#[derive(Debug, Default)]
pub struct ReaderComponent {
    page_area: Rect,
}

impl Component for ReaderComponent {
    fn handle_key_events(&mut self, app: &mut App, key: KeyEvent) -> Vec<Effect> {
        match key.code {
            KeyCode::BackTab => {
                app.focus.prev();
            }
            KeyCode::Tab => {
                app.focus.next();
            }
            KeyCode::Up => app.reader.scroll.scroll_lines(-1),
            KeyCode::Down => app.reader.scroll.scroll_lines(1),
            KeyCode::PageUp => app.reader.scroll.scroll_pages(-1),
            KeyCode::PageDown => app.reader.scroll.scroll_pages(1),
            KeyCode::Home => app.reader.scroll.scroll_to_top(),
            KeyCode::End => app.reader.scroll.scroll_to_bottom(),
            KeyCode::Left => return vec![Effect::OpenPrevious],
            KeyCode::Right => return vec![Effect::OpenNext],
            _ => {}
        }
        Vec::new()
    }

    fn handle_mouse_events(&mut self, app: &mut App, mouse: MouseEvent) -> Vec<Effect> {
        let pos = Position::new(mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) if self.page_area.contains(pos) => {
                app.focus.focus(&app.reader.container_focus);
            }
            MouseEventKind::ScrollDown if self.page_area.contains(pos) => {
                app.reader.scroll.scroll_lines(3);
            }
            MouseEventKind::ScrollUp if self.page_area.contains(pos) => {
                app.reader.scroll.scroll_lines(-3);
            }
            _ => {}
        }
        Vec::new()
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, app: &mut App) {
        let focused = app.reader.container_focus.get();
        let title = app.reader.heading().to_string();
        let block = th::block(&*app.ctx.theme, Some(&title), focused);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        app.reader.reflow(inner.width);
        app.reader.update_layout(inner);
        self.page_area = inner;

        let theme = &*app.ctx.theme;
        let top = app.reader.scroll.offset() as usize;
        let bottom = (top + inner.height as usize).min(app.reader.lines().len());
        let lines: Vec<Line> = app.reader.lines()[top.min(bottom)..bottom].iter().map(|line| Line::from(line.as_str())).collect();

        let page = Paragraph::new(lines).style(th::panel_style(theme));
        frame.render_widget(page, inner);

        if focused && app.reader.scroll.is_scrollable() {
            let mut sb_state = ScrollbarState::new(app.reader.scroll.max_offset() as usize)
                .position(app.reader.scroll.offset() as usize)
                .viewport_content_length(app.reader.scroll.viewport_height() as usize);
            let sb = Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .thumb_style(Style::default().fg(theme.roles().scrollbar_thumb))
                .track_style(Style::default().fg(theme.roles().scrollbar_track));
            frame.render_stateful_widget(sb, inner, &mut sb_state);
        }
    }

    fn get_hint_spans(&self, app: &App) -> Vec<Span<'_>> {
        if !app.reader.container_focus.get() {
            return vec![];
        }
        th::build_hint_spans(
            &*app.ctx.theme,
            &[
                ("\u{2191}/\u{2193}", " Scroll  "),
                ("PgUp/PgDn", " Page  "),
                ("\u{2190}/\u{2192}", " Prev/Next chapter  "),
                ("Home/End", " Jump  "),
            ],
        )
    }
}
