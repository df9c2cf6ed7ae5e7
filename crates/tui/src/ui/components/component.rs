//! Component system for the reader interface.
//!
//! This module defines the Component trait that enables modular UI
//! development. Components are self-contained UI elements that handle their
//! own events and rendering while sharing application state through
//! [`App`](crate::app::App). They report side effects back to the runtime as
//! [`Effect`]s instead of mutating global state directly, which keeps event
//! routing and effect execution in one place.

use crossterm::event::{KeyEvent, MouseEvent};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::Span;
use tome_types::{Effect, Msg};

use crate::app::App;

/// A trait representing a UI component with its own state and behavior.
///
/// Handlers receive the shared [`App`] so components can read and update the
/// state slices they own. All handlers return the effects the runtime should
/// process; an empty vector means the event was either consumed locally or
/// ignored.
pub(crate) trait Component {
    /// Handle an application-level message the component cares about.
    fn handle_message(&mut self, _app: &mut App, _msg: Msg) -> Vec<Effect> {
        Vec::new()
    }

    /// Handle key events when this component has focus.
    fn handle_key_events(&mut self, _app: &mut App, _key: KeyEvent) -> Vec<Effect> {
        Vec::new()
    }

    /// Handle mouse events.
    ///
    /// Components decide relevance from the areas they captured during the
    /// last render, so mouse events are delivered regardless of focus.
    fn handle_mouse_events(&mut self, _app: &mut App, _mouse: MouseEvent) -> Vec<Effect> {
        Vec::new()
    }

    /// Render the component into the given area.
    fn render(&mut self, frame: &mut Frame, area: Rect, app: &mut App);

    /// Key hints to show in the hint bar while this component has focus.
    fn get_hint_spans(&self, _app: &App) -> Vec<Span<'_>> {
        Vec::new()
    }

    /// Computes the layout areas the component distributes its content into.
    fn get_preferred_layout(&self, _app: &App, area: Rect) -> Vec<Rect> {
        vec![area]
    }
}
