//! Navigation sidebar component.
//!
//! Renders the materialized navigation tree as an indented row list with
//! fold markers, the active entry highlighted, and a scrollbar when the
//! tree outgrows the pane. Link activation captures the scroll offset for
//! the next page open before the navigation effect is emitted; fold
//! toggles deliberately do not.

use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::prelude::Position;
use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
};
use tome_engine::{EntryId, save_scroll_offset};
use tome_types::Effect;
use tome_util::truncate_with_ellipsis;

use crate::app::App;
use crate::ui::components::component::Component;
use crate::ui::theme::theme_helpers as th;

/// Component for the navigation sidebar.
#[derive(Debug, Default)]
pub struct SidebarComponent {
    list_area: Rect,
}

impl SidebarComponent {
    /// Activates the entry: links capture the scroll offset and emit a
    /// navigation effect, groups without a page of their own fold instead.
    fn activate_entry(&self, app: &mut App, id: EntryId) -> Vec<Effect> {
        let node = app.sidebar.tree().node(id);
        if let Some(href) = node.href.clone() {
            save_scroll_offset(&*app.ctx.session, app.sidebar.scroll.offset());
            return vec![Effect::FollowLink(href)];
        }
        if node.is_group() {
            app.sidebar.toggle(id);
        }
        Vec::new()
    }
}

impl Component for SidebarComponent {
    fn handle_key_events(&mut self, app: &mut App, key: KeyEvent) -> Vec<Effect> {
        match key.code {
            KeyCode::BackTab => {
                app.focus.prev();
            }
            KeyCode::Tab => {
                app.focus.next();
            }
            KeyCode::Up => app.sidebar.move_cursor(-1),
            KeyCode::Down => app.sidebar.move_cursor(1),
            KeyCode::PageUp => {
                let page = app.sidebar.scroll.viewport_height().max(1) as isize;
                app.sidebar.move_cursor(-page);
            }
            KeyCode::PageDown => {
                let page = app.sidebar.scroll.viewport_height().max(1) as isize;
                app.sidebar.move_cursor(page);
            }
            KeyCode::Home => app.sidebar.cursor_to_first(),
            KeyCode::End => app.sidebar.cursor_to_last(),
            KeyCode::Left => app.sidebar.collapse_or_parent(),
            KeyCode::Right => app.sidebar.expand_or_child(),
            KeyCode::Char(' ') => app.sidebar.toggle_at_cursor(),
            KeyCode::Enter => {
                if let Some(id) = app.sidebar.cursor_entry() {
                    return self.activate_entry(app, id);
                }
            }
            _ => {}
        }
        Vec::new()
    }

    fn handle_mouse_events(&mut self, app: &mut App, mouse: MouseEvent) -> Vec<Effect> {
        if !app.sidebar.visible {
            return Vec::new();
        }
        let pos = Position::new(mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let offset = app.sidebar.scroll.offset() as usize;
                if let Some(row) = row_at_position(self.list_area, pos, offset, app.sidebar.rows().len()) {
                    app.focus.focus(&app.sidebar.container_focus);
                    let id = app.sidebar.rows()[row];
                    let node = app.sidebar.tree().node(id);
                    if node.part_title {
                        return Vec::new();
                    }
                    let is_group = node.is_group();
                    let has_href = node.href.is_some();
                    let marker_columns = node.depth * 2 + 2;
                    app.sidebar.set_cursor(row);
                    let relative_column = pos.x.saturating_sub(self.list_area.x) as usize;
                    if is_group && relative_column < marker_columns {
                        app.sidebar.toggle(id);
                    } else if has_href {
                        return self.activate_entry(app, id);
                    } else if is_group {
                        app.sidebar.toggle(id);
                    }
                }
            }
            MouseEventKind::ScrollDown if self.list_area.contains(pos) => {
                app.sidebar.scroll.scroll_lines(1);
            }
            MouseEventKind::ScrollUp if self.list_area.contains(pos) => {
                app.sidebar.scroll.scroll_lines(-1);
            }
            _ => {}
        }
        Vec::new()
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, app: &mut App) {
        let focused = app.sidebar.container_focus.get();
        let title = app.sidebar.tree().title().unwrap_or("Contents").to_string();
        let block = th::block(&*app.ctx.theme, Some(&title), focused);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        app.sidebar.update_layout(inner);
        self.list_area = inner;

        let theme = &*app.ctx.theme;
        let active = app.sidebar.tree().active();
        let top = app.sidebar.scroll.offset() as usize;
        let bottom = (top + inner.height as usize).min(app.sidebar.rows().len());
        let mut lines: Vec<Line> = Vec::with_capacity(bottom.saturating_sub(top));
        for (row, &id) in app.sidebar.rows().iter().enumerate().take(bottom).skip(top) {
            let node = app.sidebar.tree().node(id);
            let indent = "  ".repeat(node.depth);

            if node.part_title {
                let heading = truncate_with_ellipsis(&node.label, inner.width.saturating_sub(indent.len() as u16) as usize);
                let mut line = Line::from(vec![Span::raw(indent), Span::styled(heading, theme.part_title_style())]);
                if focused && row == app.sidebar.cursor() {
                    line = line.style(theme.selection_style());
                }
                lines.push(line);
                continue;
            }

            let marker = if node.is_group() {
                if node.expanded { "\u{25be} " } else { "\u{25b8} " }
            } else {
                "  "
            };
            let number = node.number.as_deref().map(|number| format!("{number} ")).unwrap_or_default();
            let used = indent.len() + 2 + number.len();
            let label = truncate_with_ellipsis(&node.label, (inner.width as usize).saturating_sub(used));

            let label_style = if active == Some(id) {
                theme.active_entry_style()
            } else if node.href.is_some() {
                theme.text_primary_style()
            } else if node.is_group() {
                theme.text_secondary_style()
            } else {
                // Draft chapter: listed, but there is no page to open.
                theme.text_muted_style()
            };

            let mut line = Line::from(vec![
                Span::styled(format!("{indent}{marker}"), theme.text_muted_style()),
                Span::styled(number, theme.accent_primary_style()),
                Span::styled(label, label_style),
            ]);
            if focused && row == app.sidebar.cursor() {
                line = line.style(theme.selection_style());
            }
            lines.push(line);
        }

        let list = Paragraph::new(lines).style(th::panel_style(theme));
        frame.render_widget(list, inner);

        if focused && app.sidebar.scroll.is_scrollable() {
            let mut sb_state = ScrollbarState::new(app.sidebar.scroll.max_offset() as usize)
                .position(app.sidebar.scroll.offset() as usize)
                .viewport_content_length(app.sidebar.scroll.viewport_height() as usize);
            let sb = Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .thumb_style(Style::default().fg(theme.roles().scrollbar_thumb))
                .track_style(Style::default().fg(theme.roles().scrollbar_track));
            frame.render_stateful_widget(sb, inner, &mut sb_state);
        }
    }

    fn get_hint_spans(&self, app: &App) -> Vec<Span<'_>> {
        if !app.sidebar.container_focus.get() {
            return vec![];
        }
        th::build_hint_spans(
            &*app.ctx.theme,
            &[
                ("\u{2191}/\u{2193}", " Move  "),
                ("Enter", " Open  "),
                ("Space", " Fold  "),
                ("\u{2190}/\u{2192}", " Collapse/Expand  "),
                ("Home/End", " Jump  "),
            ],
        )
    }
}

fn row_at_position(list_area: Rect, position: Position, offset: usize, row_count: usize) -> Option<usize> {
    if !list_area.contains(position) {
        return None;
    }
    let relative_row = position.y.saturating_sub(list_area.y) as usize;
    let index = relative_row + offset;
    if index < row_count { Some(index) } else { None }
}

#[cfg(test)]
mod tests {
    use super::row_at_position;
    use ratatui::layout::Rect;
    use ratatui::prelude::Position;

    #[test]
    fn row_lookup_returns_none_outside_list_area() {
        let area = Rect::new(0, 1, 30, 8);
        assert_eq!(row_at_position(area, Position::new(40, 4), 0, 20), None);
        assert_eq!(row_at_position(area, Position::new(5, 0), 0, 20), None);
    }

    #[test]
    fn row_lookup_accounts_for_scroll_offset() {
        let area = Rect::new(0, 1, 30, 8);
        assert_eq!(row_at_position(area, Position::new(5, 4), 6, 20), Some(9));
    }

    #[test]
    fn row_lookup_bounds_checks_rows() {
        let area = Rect::new(0, 1, 30, 8);
        assert_eq!(row_at_position(area, Position::new(5, 8), 5, 10), None);
    }
}
