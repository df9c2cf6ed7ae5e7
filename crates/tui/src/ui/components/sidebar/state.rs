use rat_focus::{FocusBuilder, FocusFlag, HasFocus};
use ratatui::layout::Rect;
use tome_engine::{EntryId, NavTree, ScrollMetrics, ScrollPlan, plan_scroll, resolve_active_path};
use tome_types::Toc;
use tome_util::{SessionStore, links};
use url::Url;

/// State for the navigation sidebar.
///
/// The tree is rebuilt on every page open; between opens only the cursor,
/// the scroll offset, and user-driven expansion changes move. Part headings
/// occupy rows but are never selectable.
#[derive(Debug)]
pub struct SidebarState {
    tree: NavTree,
    /// Visible rows in document order, refreshed after every tree change.
    rows: Vec<EntryId>,
    cursor: usize,
    pub scroll: ScrollMetrics,
    pub container_focus: FocusFlag,
    /// Toggled by the sidebar control; a hidden sidebar keeps its state.
    pub visible: bool,
    /// Entry to center once the viewport height is known.
    pending_center: Option<EntryId>,
}

impl Default for SidebarState {
    fn default() -> Self {
        Self {
            tree: NavTree::materialize(&Toc::default(), ""),
            rows: Vec::new(),
            cursor: 0,
            scroll: ScrollMetrics::default(),
            container_focus: FocusFlag::named("sidebar"),
            visible: true,
            pending_center: None,
        }
    }
}

impl SidebarState {
    /// Rebuilds the sidebar for a newly opened page: materializes the tree
    /// with the page's path to the book root, resolves and applies the
    /// active path, then decides the scroll entry state. A saved offset is
    /// restored immediately; auto-centering waits for the next render, when
    /// the viewport height is known.
    pub fn attach(&mut self, toc: &Toc, location: &Url, page_rel_path: &str, store: &dyn SessionStore) {
        let prefix = links::path_to_root(page_rel_path);
        let mut tree = NavTree::materialize(toc, &prefix);
        let resolution = resolve_active_path(&tree, location, &prefix);
        tree.apply(&resolution);
        self.tree = tree;
        self.rebuild_rows();
        self.cursor = resolution
            .active
            .and_then(|id| self.row_of(id))
            .or_else(|| self.first_selectable_row())
            .unwrap_or(0);
        self.pending_center = None;
        match plan_scroll(store, resolution.active) {
            ScrollPlan::Restore(offset) => self.scroll.set_offset(offset),
            ScrollPlan::Reveal(id) => self.pending_center = Some(id),
            ScrollPlan::Top => self.scroll.scroll_to_top(),
        }
    }

    pub fn tree(&self) -> &NavTree {
        &self.tree
    }

    pub fn rows(&self) -> &[EntryId] {
        &self.rows
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The entry under the cursor, if any rows exist.
    pub fn cursor_entry(&self) -> Option<EntryId> {
        self.rows.get(self.cursor).copied()
    }

    pub fn set_cursor(&mut self, row: usize) {
        if row < self.rows.len() {
            self.cursor = row;
        }
    }

    /// Moves the cursor by `delta` selectable rows, skipping part headings.
    /// Hitting an edge mid-move lands on the last selectable row passed.
    pub fn move_cursor(&mut self, delta: isize) {
        if self.rows.is_empty() || delta == 0 {
            return;
        }
        let step = delta.signum();
        let mut row = self.cursor as isize;
        let mut remaining = delta.abs();
        let mut landed = None;
        while remaining > 0 {
            row += step;
            if row < 0 || row as usize >= self.rows.len() {
                break;
            }
            if !self.tree.node(self.rows[row as usize]).part_title {
                landed = Some(row as usize);
                remaining -= 1;
            }
        }
        if let Some(next) = landed {
            self.cursor = next;
            self.scroll_cursor_into_view();
        }
    }

    pub fn cursor_to_first(&mut self) {
        if let Some(row) = self.first_selectable_row() {
            self.cursor = row;
            self.scroll_cursor_into_view();
        }
    }

    pub fn cursor_to_last(&mut self) {
        if let Some(row) = self.rows.iter().rposition(|&id| !self.tree.node(id).part_title) {
            self.cursor = row;
            self.scroll_cursor_into_view();
        }
    }

    /// Flips a group's expansion and keeps the cursor on it.
    pub fn toggle(&mut self, id: EntryId) {
        if !self.tree.node(id).is_group() {
            return;
        }
        self.tree.toggle(id);
        self.rebuild_rows();
        if let Some(row) = self.row_of(id) {
            self.cursor = row;
            self.scroll_cursor_into_view();
        }
    }

    pub fn toggle_at_cursor(&mut self) {
        if let Some(id) = self.cursor_entry() {
            self.toggle(id);
        }
    }

    /// Left key: collapse an open group under the cursor, otherwise move to
    /// its parent.
    pub fn collapse_or_parent(&mut self) {
        let Some(id) = self.cursor_entry() else { return };
        let node = self.tree.node(id);
        let open_group = node.is_group() && node.expanded;
        let parent = node.parent;
        if open_group {
            self.toggle(id);
        } else if let Some(row) = parent.and_then(|parent| self.row_of(parent)) {
            self.cursor = row;
            self.scroll_cursor_into_view();
        }
    }

    /// Right key: expand a closed group under the cursor, otherwise descend
    /// to its first child.
    pub fn expand_or_child(&mut self) {
        let Some(id) = self.cursor_entry() else { return };
        let node = self.tree.node(id);
        if !node.is_group() {
            return;
        }
        let expanded = node.expanded;
        let first_child = node.children.first().copied();
        if !expanded {
            self.toggle(id);
        } else if let Some(row) = first_child.and_then(|child| self.row_of(child)) {
            self.cursor = row;
            self.scroll_cursor_into_view();
        }
    }

    /// Captures the list viewport measured at render time and applies any
    /// pending centering now that the geometry is known.
    pub fn update_layout(&mut self, list_area: Rect) {
        self.scroll.update_viewport_height(list_area.height);
        if let Some(id) = self.pending_center.take()
            && let Some(row) = self.row_of(id)
        {
            self.scroll.center_on(row as u16);
        }
    }

    fn rebuild_rows(&mut self) {
        self.rows = self.tree.visible();
        self.scroll.update_content_height(self.rows.len() as u16);
        self.cursor = self.cursor.min(self.rows.len().saturating_sub(1));
    }

    fn row_of(&self, id: EntryId) -> Option<usize> {
        self.rows.iter().position(|&row| row == id)
    }

    fn first_selectable_row(&self) -> Option<usize> {
        self.rows.iter().position(|&id| !self.tree.node(id).part_title)
    }

    fn scroll_cursor_into_view(&mut self) {
        let row = self.cursor as u16;
        let top = self.scroll.offset();
        let viewport = self.scroll.viewport_height();
        if viewport == 0 {
            return;
        }
        if row < top {
            self.scroll.set_offset(row);
        } else if row >= top.saturating_add(viewport) {
            self.scroll.set_offset(row.saturating_add(1).saturating_sub(viewport));
        }
    }
}

impl HasFocus for SidebarState {
    fn build(&self, builder: &mut FocusBuilder) {
        builder.leaf_widget(self);
    }

    fn focus(&self) -> FocusFlag {
        self.container_focus.clone()
    }

    fn area(&self) -> Rect {
        Rect::default()
    }
}
