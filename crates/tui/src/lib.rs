//! # Tome TUI Library
//!
//! This library provides the terminal user interface for the tome book
//! reader. It renders a generated multi-page book as a navigation sidebar
//! next to a page pane, using the Ratatui framework.
//!
//! ## Key Features
//!
//! - Navigation sidebar materialized fresh on every page open
//! - Active-entry resolution with the ancestor chain expanded
//! - Scroll position carried across page opens through a session store
//! - Chapter paging in document order and collapsible toc groups
//! - Live reload when the book is regenerated on disk
//!
//! ## Architecture
//!
//! The TUI follows a component-based architecture where each pane (sidebar,
//! reader) is implemented as a separate component that handles events and
//! renders itself. Components report `Effect`s back to the runtime, which
//! executes them; navigation effects re-open pages through the application
//! so every navigation behaves like a full page load.

mod app;
mod ui;

use std::sync::Arc;

use anyhow::Result;
use tome_engine::Book;
use tome_util::SessionStore;

/// Runs the main reader application loop.
///
/// This function initializes the terminal interface, sets up the UI
/// components, and runs the main event loop that handles user input, page
/// navigation, and rendering.
///
/// # Arguments
///
/// * `book` - The loaded book to display
/// * `session` - Session store carrying the sidebar scroll offset between
///   page opens; its scope decides how long that state lives
/// * `initial_page` - Book-relative href to open first; defaults to the
///   first chapter
///
/// # Errors
///
/// This function can return errors for:
/// - Books with no readable chapters and no explicit initial page
/// - Terminal setup failures (raw mode, alternate screen)
/// - Event loop runtime errors
pub async fn run(book: Book, session: Arc<dyn SessionStore>, initial_page: Option<String>) -> Result<()> {
    ui::runtime::run_app(book, session, initial_page).await
}
