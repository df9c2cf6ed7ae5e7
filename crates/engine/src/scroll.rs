//! Sidebar scroll state: metrics and the capture/consume protocol.
//!
//! The sidebar's scroll offset survives exactly one page navigation. On
//! link activation the current offset is written to the session store under
//! a fixed key; the next page open reads the key and deletes it in the same
//! step, so a saved offset is consumed exactly once. Page opens that find
//! no saved offset center the active entry instead.

use tome_util::SessionStore;
use tracing::{debug, warn};

use crate::tree::EntryId;

/// Fixed session-store key for the sidebar scroll offset.
pub const SIDEBAR_SCROLL_KEY: &str = "sidebar-scroll";

/// Shared metrics for vertical scrolling.
///
/// The metrics use terminal row units (`u16`) so they can be applied
/// directly to ratatui list rendering and scrollbar calculations.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScrollMetrics {
    offset: u16,
    content_height: u16,
    viewport_height: u16,
}

impl ScrollMetrics {
    /// Returns current vertical scroll offset.
    pub const fn offset(&self) -> u16 {
        self.offset
    }

    /// Returns measured content height.
    pub const fn content_height(&self) -> u16 {
        self.content_height
    }

    /// Returns measured viewport height.
    pub const fn viewport_height(&self) -> u16 {
        self.viewport_height
    }

    /// Returns the maximum valid scroll offset.
    pub fn max_offset(&self) -> u16 {
        self.content_height.saturating_sub(self.viewport_height)
    }

    /// Returns whether content exceeds the current viewport.
    pub fn is_scrollable(&self) -> bool {
        self.content_height > self.viewport_height && self.viewport_height > 0
    }

    /// Updates viewport height and clamps current offset.
    pub fn update_viewport_height(&mut self, viewport_height: u16) {
        self.viewport_height = viewport_height;
        self.clamp_offset();
    }

    /// Updates content height and clamps current offset.
    pub fn update_content_height(&mut self, content_height: u16) {
        self.content_height = content_height;
        self.clamp_offset();
    }

    /// Sets an absolute offset, clamped to the valid range.
    pub fn set_offset(&mut self, offset: u16) {
        self.offset = offset.min(self.max_offset());
    }

    /// Scrolls so the given content row sits at the viewport center, as far
    /// as the bounds allow.
    pub fn center_on(&mut self, row: u16) {
        let half = self.viewport_height / 2;
        self.offset = row.saturating_sub(half).min(self.max_offset());
    }

    /// Scrolls by relative line count (`+` down, `-` up).
    pub fn scroll_lines(&mut self, delta: i16) {
        if delta == 0 || !self.is_scrollable() {
            return;
        }
        let current = i32::from(self.offset);
        let max = i32::from(self.max_offset());
        let next = (current + i32::from(delta)).clamp(0, max);
        self.offset = next as u16;
    }

    /// Scrolls by viewport page increments.
    pub fn scroll_pages(&mut self, delta_pages: i16) {
        if delta_pages == 0 || self.viewport_height == 0 {
            return;
        }
        let delta = i32::from(self.viewport_height).saturating_mul(i32::from(delta_pages));
        self.scroll_lines(delta as i16);
    }

    /// Moves scroll position to the first row.
    pub fn scroll_to_top(&mut self) {
        self.offset = 0;
    }

    /// Moves scroll position to the last visible window.
    pub fn scroll_to_bottom(&mut self) {
        self.offset = self.max_offset();
    }

    fn clamp_offset(&mut self) {
        self.offset = self.offset.min(self.max_offset());
    }
}

/// How the sidebar positions itself on a page open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollPlan {
    /// A saved offset was consumed from the session store; apply it.
    Restore(u16),
    /// No saved offset: center the active entry in the viewport.
    Reveal(EntryId),
    /// No saved offset and no active entry: stay at the top.
    Top,
}

/// Decides the scroll entry state for a page open. Consuming the saved
/// offset takes priority over revealing the active entry: a sidebar-driven
/// navigation keeps its scroll position, while navigations that bypass the
/// sidebar (previous/next chapter keys) leave no saved offset behind and
/// fall through to auto-reveal.
pub fn plan_scroll(store: &dyn SessionStore, active: Option<EntryId>) -> ScrollPlan {
    if let Some(offset) = take_scroll_offset(store) {
        debug!("restoring sidebar scroll offset {offset}");
        return ScrollPlan::Restore(offset);
    }
    match active {
        Some(id) => ScrollPlan::Reveal(id),
        None => ScrollPlan::Top,
    }
}

/// Captures the sidebar scroll offset for the next page open. Runs inside
/// the activation handler, before the navigation effect is emitted; store
/// failures degrade to a warning because activation must not fail.
pub fn save_scroll_offset(store: &dyn SessionStore, offset: u16) {
    if let Err(error) = store.set(SIDEBAR_SCROLL_KEY, offset.to_string()) {
        warn!("Failed to save sidebar scroll offset: {error}");
    }
}

/// Consumes the saved scroll offset: the key is read and then removed, in
/// that order, whether or not a value was present. No later code re-reads
/// the key in the same page open.
pub fn take_scroll_offset(store: &dyn SessionStore) -> Option<u16> {
    let raw = match store.get(SIDEBAR_SCROLL_KEY) {
        Ok(value) => value,
        Err(error) => {
            warn!("Failed to read saved sidebar scroll offset: {error}");
            None
        }
    };
    if let Err(error) = store.remove(SIDEBAR_SCROLL_KEY) {
        warn!("Failed to clear saved sidebar scroll offset: {error}");
    }

    let raw = raw?;
    match raw.parse::<u16>() {
        Ok(offset) => Some(offset),
        Err(_) => {
            warn!("Discarding unparseable sidebar scroll offset {raw:?}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::NavTree;
    use tome_types::Toc;
    use tome_util::InMemorySessionStore;

    fn some_entry() -> EntryId {
        let toc: Toc = serde_json::from_str(r#"{ "entries": [ { "label": "Introduction", "href": "introduction.html" } ] }"#)
            .expect("toc");
        NavTree::materialize(&toc, "").links().next().map(|node| node.id).expect("entry id")
    }

    #[test]
    fn scrolling_clamps_to_bounds() {
        let mut metrics = ScrollMetrics::default();
        metrics.update_viewport_height(5);
        metrics.update_content_height(20);

        metrics.scroll_lines(3);
        assert_eq!(metrics.offset(), 3);

        metrics.scroll_lines(-10);
        assert_eq!(metrics.offset(), 0);

        metrics.scroll_to_bottom();
        assert_eq!(metrics.offset(), 15);

        metrics.set_offset(99);
        assert_eq!(metrics.offset(), 15);
    }

    #[test]
    fn center_on_respects_both_edges() {
        let mut metrics = ScrollMetrics::default();
        metrics.update_viewport_height(10);
        metrics.update_content_height(50);

        // A row near the top cannot be centered further up than offset 0.
        metrics.center_on(2);
        assert_eq!(metrics.offset(), 0);

        metrics.center_on(25);
        assert_eq!(metrics.offset(), 20);

        // A row near the bottom clamps to the max offset.
        metrics.center_on(49);
        assert_eq!(metrics.offset(), 40);
    }

    #[test]
    fn saved_offset_is_consumed_exactly_once() {
        let store = InMemorySessionStore::new();
        save_scroll_offset(&store, 17);

        assert_eq!(take_scroll_offset(&store), Some(17));
        assert!(store.get(SIDEBAR_SCROLL_KEY).unwrap().is_none());
        assert_eq!(take_scroll_offset(&store), None);
    }

    #[test]
    fn zero_offset_round_trips() {
        let store = InMemorySessionStore::new();
        save_scroll_offset(&store, 0);
        assert_eq!(take_scroll_offset(&store), Some(0));
    }

    #[test]
    fn unparseable_offset_is_discarded_and_still_consumed() {
        let store = InMemorySessionStore::new();
        store.set(SIDEBAR_SCROLL_KEY, "not-a-number".to_string()).unwrap();

        assert_eq!(take_scroll_offset(&store), None);
        assert!(store.get(SIDEBAR_SCROLL_KEY).unwrap().is_none());
    }

    #[test]
    fn plan_prefers_restore_over_reveal() {
        let store = InMemorySessionStore::new();
        save_scroll_offset(&store, 9);

        let entry = some_entry();
        assert_eq!(plan_scroll(&store, Some(entry)), ScrollPlan::Restore(9));

        // The offset was consumed: the same page open never restores twice,
        // and the next open falls through to reveal.
        assert_eq!(plan_scroll(&store, Some(entry)), ScrollPlan::Reveal(entry));
        assert_eq!(plan_scroll(&store, None), ScrollPlan::Top);
    }
}
