//! Active-path resolution.
//!
//! Given the materialized tree and the location of the page being viewed,
//! decide which entry (if any) is the current page and which groups must be
//! expanded so that entry is visible. This is a pure function: callers apply
//! the returned [`Resolution`] to the tree afterwards.
//!
//! Matching mirrors what a browser address bar would do: the location is
//! normalized (query and fragment stripped, directory locations gain the
//! index filename), each link's rewritten href is resolved against it per
//! RFC 3986, and the first link in document order whose resolved target
//! equals the normalized location wins. Absence of a match is a normal
//! state, not an error: nothing gets highlighted.

use std::collections::BTreeSet;

use tracing::debug;
use url::Url;

use crate::tree::{EntryId, NavTree};

/// Fixed filename a directory location is aliased to.
pub const INDEX_FILE: &str = "index.html";

/// Outcome of active-path resolution.
///
/// `expanded` holds the active entry itself when it is a group, plus every
/// ancestor group up the parent chain. [`NavTree::apply`] raises these flags
/// monotonically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    pub active: Option<EntryId>,
    pub expanded: BTreeSet<EntryId>,
}

/// Normalizes the current location for matching: query and fragment are
/// dropped, and a location ending in `/` gains [`INDEX_FILE`].
pub fn normalize_location(location: &Url) -> Url {
    let mut normalized = location.clone();
    normalized.set_query(None);
    normalized.set_fragment(None);
    if normalized.path().ends_with('/') {
        let path = format!("{}{INDEX_FILE}", normalized.path());
        normalized.set_path(&path);
    }
    normalized
}

/// Resolves the active entry and its expansion set for one page open.
///
/// `path_to_root` must be the same prefix the tree was materialized with;
/// it gates the index-aliasing rule: at the book root, a location ending in
/// `/index.html` activates the first link even when no href matches
/// literally, because the root index aliases the first chapter.
pub fn resolve_active_path(tree: &NavTree, location: &Url, path_to_root: &str) -> Resolution {
    let current_page = normalize_location(location);
    let aliases_first_chapter = path_to_root.is_empty() && current_page.path().ends_with("/index.html");

    let mut active = None;
    for (link_index, node) in tree.links().enumerate() {
        let href = node.href.as_deref().unwrap_or_default();
        let matches = match current_page.join(href) {
            Ok(resolved) => resolved == current_page,
            // Unjoinable targets simply never match.
            Err(_) => false,
        };
        if matches || (link_index == 0 && aliases_first_chapter) {
            active = Some(node.id);
            break;
        }
    }

    let mut expanded = BTreeSet::new();
    if let Some(active_id) = active {
        if tree.node(active_id).is_group() {
            expanded.insert(active_id);
        }
        expanded.extend(tree.ancestors(active_id));
        debug!(
            "resolved active entry {:?} with {} expanded group(s)",
            tree.node(active_id).label,
            expanded.len()
        );
    }

    Resolution { active, expanded }
}
