//! Application state for the reader.
//!
//! [`App`] owns everything a page open touches: the loaded book, the active
//! theme, the injected session store, and the per-pane states. Opening a
//! page tears the sidebar down and reattaches it against a freshly
//! materialized tree, which makes every navigation behave like a full page
//! load. Only the session store outlives a page open.

use std::rc::Rc;
use std::sync::Arc;

use rat_focus::{Focus, FocusBuilder, FocusFlag, HasFocus};
use ratatui::layout::Rect;
use tome_engine::{Book, BookError};
use tome_types::{Effect, Msg};
use tome_util::{SessionStore, links};
use tracing::{debug, warn};

use crate::ui::components::reader::ReaderState;
use crate::ui::components::sidebar::SidebarState;
use crate::ui::theme::Theme;

/// Shared, cross-cutting context owned by the application: the loaded book,
/// the theme, and the session store port that carries the sidebar scroll
/// offset between page opens.
pub struct SharedCtx {
    pub book: Book,
    pub theme: Box<dyn Theme>,
    pub session: Arc<dyn SessionStore>,
}

/// The main application state.
pub struct App {
    /// Shared, cross-cutting context
    pub ctx: SharedCtx,
    /// Focus ring over the panes, rebuilt before every render
    pub focus: Rc<Focus>,
    /// Navigation sidebar state, reconstructed on every page open
    pub sidebar: SidebarState,
    /// Page display state
    pub reader: ReaderState,
    /// Container flag for the window itself
    window_focus: FocusFlag,
    /// Book-relative href of the open page, in canonical form
    current_href: String,
}

impl App {
    /// Creates the application with the initial page open and the first
    /// pane focused.
    pub fn new(
        book: Book,
        theme: Box<dyn Theme>,
        session: Arc<dyn SessionStore>,
        initial_page: &str,
    ) -> Result<Self, BookError> {
        let mut app = Self {
            ctx: SharedCtx { book, theme, session },
            focus: Rc::new(FocusBuilder::new(None).build()),
            sidebar: SidebarState::default(),
            reader: ReaderState::default(),
            window_focus: FocusFlag::named("window"),
            current_href: String::new(),
        };
        app.open_page(initial_page)?;
        app.focus = Rc::new(FocusBuilder::build_for(&app));
        app.focus.first();
        Ok(app)
    }

    /// Book-relative href of the page currently open.
    pub fn current_page(&self) -> &str {
        &self.current_href
    }

    /// Opens a book-relative page: reads it from disk, then rebuilds the
    /// sidebar and the reader the way a fresh page load would. Fails without
    /// touching the current view when the page cannot be read.
    pub fn open_page(&mut self, href: &str) -> Result<(), BookError> {
        let page = links::normalize_rel_href(href);
        let source = self.ctx.book.read_page(&page)?;
        let location = self.ctx.book.location_for(&page)?;

        self.sidebar.attach(self.ctx.book.toc(), &location, &page, &*self.ctx.session);
        let heading = self.chapter_heading(&page);
        self.reader.show(heading, &source);
        self.current_href = page;
        debug!("opened page {}", self.current_href);
        Ok(())
    }

    /// Reloads the book from disk and reopens the current page, falling
    /// back to the first chapter when the page did not survive the rebuild.
    pub fn reload_book(&mut self) -> Result<(), BookError> {
        let book = Book::load(self.ctx.book.root())?;
        self.ctx.book = book;

        let current = self.current_href.clone();
        match self.open_page(&current) {
            Ok(()) => Ok(()),
            Err(error) => {
                let Some(first) = self.ctx.book.first_chapter().map(str::to_string) else {
                    return Err(error);
                };
                warn!("page {current} is gone after reload ({error}), falling back to {first}");
                self.open_page(&first)
            }
        }
    }

    /// Reduces an application message to the effects it triggers.
    pub fn update(&mut self, msg: &Msg) -> Vec<Effect> {
        match msg {
            // Pane geometry is re-measured at render time.
            Msg::Tick | Msg::Resize(_, _) => Vec::new(),
            Msg::BookChanged => vec![Effect::ReloadBook],
        }
    }

    /// Follows an activated sidebar link. The href was rewritten against the
    /// current page's path to the book root, so resolving it against the
    /// current location yields the target page, exactly like a link click in
    /// a browser. Fragment targets stay on the open page; external targets
    /// and targets outside the book are ignored.
    pub fn follow_link(&mut self, href: &str) {
        if links::is_fragment(href) {
            return;
        }
        if links::is_external(href) {
            debug!("not following external link {href}");
            return;
        }
        let Ok(location) = self.ctx.book.location_for(&self.current_href) else {
            return;
        };
        let Ok(target) = location.join(href) else {
            warn!("unresolvable link target {href}");
            return;
        };
        match self.ctx.book.href_for_location(&target) {
            Some(page) => {
                if let Err(error) = self.open_page(&page) {
                    warn!("Failed to open {page}: {error}");
                }
            }
            None => debug!("link {href} points outside the book"),
        }
    }

    /// Opens the previous or next chapter in document order. These
    /// navigations bypass the sidebar and capture no scroll offset, so the
    /// next attach auto-reveals the active entry instead of restoring.
    pub fn open_neighbor(&mut self, forward: bool) {
        let (previous, next) = self.ctx.book.neighbors(&self.current_href);
        let target = if forward { next } else { previous };
        if let Some(page) = target.map(str::to_string)
            && let Err(error) = self.open_page(&page)
        {
            warn!("Failed to open {page}: {error}");
        }
    }

    /// Reader pane heading: the numbered toc label of the active entry when
    /// resolution found one, the bare href otherwise.
    fn chapter_heading(&self, page: &str) -> String {
        let Some(active) = self.sidebar.tree().active() else {
            return page.to_string();
        };
        let node = self.sidebar.tree().node(active);
        match &node.number {
            Some(number) => format!("{number} {}", node.label),
            None => node.label.clone(),
        }
    }
}

impl HasFocus for App {
    fn build(&self, builder: &mut FocusBuilder) {
        if self.sidebar.visible {
            builder.widget(&self.sidebar);
        }
        builder.widget(&self.reader);
    }

    fn focus(&self) -> FocusFlag {
        self.window_focus.clone()
    }

    fn area(&self) -> Rect {
        Rect::default()
    }
}
