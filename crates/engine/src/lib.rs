//! # Tome Engine
//!
//! The engine owns everything about a book that is independent of the
//! terminal: loading the book directory, materializing the navigation tree,
//! resolving which entry corresponds to the page being viewed, and the
//! scroll-offset persistence protocol that carries the sidebar position
//! across page opens.
//!
//! ## Architecture
//!
//! - **`book`**: the on-disk book (`toc.json` plus page files), page reads,
//!   locations as file URLs, and document-order chapter neighbors
//! - **`tree`**: the explicit navigation arena built once per page open,
//!   with non-owning parent back-references and visible-row flattening
//! - **`resolve`**: location normalization and active-path resolution as a
//!   pure function over the tree
//! - **`scroll`**: scroll metrics plus the capture/consume protocol over the
//!   session store
//!
//! The sidebar component in the TUI layer is a thin adapter over these
//! modules: every page open runs materialize, resolve, apply, and a scroll
//! plan, in that order, against a freshly built tree.

pub mod book;
pub mod resolve;
pub mod scroll;
pub mod tree;

// Re-export commonly used types for convenience
pub use book::{Book, BookError, TOC_FILE_NAME};
pub use resolve::{INDEX_FILE, Resolution, normalize_location, resolve_active_path};
pub use scroll::{SIDEBAR_SCROLL_KEY, ScrollMetrics, ScrollPlan, plan_scroll, save_scroll_offset, take_scroll_offset};
pub use tree::{EntryId, NavNode, NavTree};
