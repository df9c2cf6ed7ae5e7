//! UI components for the reader interface.
//!
//! Each pane is a [`component::Component`]: the navigation sidebar and the
//! page reader. The main view composes them and routes events by focus.

pub mod component;
pub mod reader;
pub mod sidebar;
