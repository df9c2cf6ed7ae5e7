//! UI rendering module for the reader.
//!
//! This module provides all the user interface functionality: the pane
//! components, the main layout composition, the theme system, and the
//! runtime event loop.

pub mod components;
pub mod main_component;
pub mod runtime;
pub mod theme;
