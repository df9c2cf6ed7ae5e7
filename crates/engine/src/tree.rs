//! Explicit navigation-tree arena.
//!
//! The sidebar never walks the literal `Toc` directly. Each page open
//! materializes it into a flat arena of nodes in document order, with
//! non-owning parent back-references, so ancestor expansion and row
//! flattening are structural walks over indices instead of pointer chasing.

use tome_types::{Toc, TocEntry};
use tome_util::links;

use crate::resolve::Resolution;

/// Index of a node in the [`NavTree`] arena.
///
/// Ids are minted by materialization and are only meaningful for the tree
/// that produced them. Ordering follows document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryId(usize);

impl EntryId {
    /// Position of the node in document order.
    pub fn index(self) -> usize {
        self.0
    }
}

/// One materialized navigation entry.
#[derive(Debug, Clone)]
pub struct NavNode {
    pub id: EntryId,
    /// Non-owning back-reference; `None` for top-level entries.
    pub parent: Option<EntryId>,
    /// Child ids in document order.
    pub children: Vec<EntryId>,
    /// Nesting depth; top-level entries sit at 0.
    pub depth: usize,
    pub label: String,
    /// Literal section number ("4.1.") rendered before the label.
    pub number: Option<String>,
    /// Part headings are not links and can never be active.
    pub part_title: bool,
    /// Link target after path-to-root rewriting; `None` for part titles
    /// and drafts.
    pub href: Option<String>,
    /// Whether the node's children are shown. Seeded from the toc's
    /// default-expanded annotation, raised by resolution, flipped by the
    /// toggle control.
    pub expanded: bool,
    /// Set for at most one node per page open.
    pub active: bool,
}

impl NavNode {
    /// A group carries children and owns an expanded/collapsed state.
    pub fn is_group(&self) -> bool {
        !self.children.is_empty()
    }
}

/// The materialized navigation tree for one page open.
///
/// Construction fixes the structure; afterwards only the `active` flag (set
/// at most once, by [`NavTree::apply`]) and `expanded` flags change.
#[derive(Debug, Clone)]
pub struct NavTree {
    title: Option<String>,
    nodes: Vec<NavNode>,
    roots: Vec<EntryId>,
}

impl NavTree {
    /// Builds the arena from the literal toc data in document order,
    /// rewriting each relative href with the current page's path to the
    /// book root. The data is trusted: there are no error conditions.
    pub fn materialize(toc: &Toc, path_to_root: &str) -> Self {
        let mut nodes = Vec::with_capacity(toc.len());
        let mut roots = Vec::with_capacity(toc.entries.len());
        for entry in &toc.entries {
            roots.push(push_entry(&mut nodes, entry, None, 0, path_to_root));
        }
        Self {
            title: toc.title.clone(),
            nodes,
            roots,
        }
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: EntryId) -> &NavNode {
        &self.nodes[id.0]
    }

    /// All nodes in document order.
    pub fn nodes(&self) -> impl Iterator<Item = &NavNode> {
        self.nodes.iter()
    }

    /// Link nodes (entries with an href) in document order. This is the
    /// iteration order active-path resolution and neighbor computation
    /// share.
    pub fn links(&self) -> impl Iterator<Item = &NavNode> {
        self.nodes.iter().filter(|node| node.href.is_some())
    }

    /// The node marked active by resolution, if any.
    pub fn active(&self) -> Option<EntryId> {
        self.nodes.iter().find(|node| node.active).map(|node| node.id)
    }

    /// Walks parent back-references from `id` to the root, excluding `id`.
    pub fn ancestors(&self, id: EntryId) -> impl Iterator<Item = EntryId> + '_ {
        std::iter::successors(self.nodes[id.0].parent, |&parent| self.nodes[parent.0].parent)
    }

    /// Applies a resolution to the arena. Expansion is monotonic here:
    /// flags are only ever raised, so re-applying the same resolution is
    /// idempotent and never collapses a group the user opened.
    pub fn apply(&mut self, resolution: &Resolution) {
        if let Some(active) = resolution.active {
            self.nodes[active.0].active = true;
        }
        for &id in &resolution.expanded {
            self.nodes[id.0].expanded = true;
        }
    }

    /// Flips a group's expanded state. The toggle affordance is the only
    /// path that can collapse a group; its changes die with the page view.
    pub fn toggle(&mut self, id: EntryId) {
        let node = &mut self.nodes[id.0];
        node.expanded = !node.expanded;
    }

    /// Flattens the tree into the rows currently visible: top-level nodes
    /// always, children only under expanded ancestors. Row order is
    /// document order.
    pub fn visible(&self) -> Vec<EntryId> {
        let mut rows = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<EntryId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            rows.push(id);
            let node = &self.nodes[id.0];
            if node.expanded {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        rows
    }
}

fn push_entry(nodes: &mut Vec<NavNode>, entry: &TocEntry, parent: Option<EntryId>, depth: usize, path_to_root: &str) -> EntryId {
    let id = EntryId(nodes.len());
    nodes.push(NavNode {
        id,
        parent,
        children: Vec::with_capacity(entry.children.len()),
        depth,
        label: entry.label.clone(),
        number: entry.number.clone(),
        part_title: entry.part_title,
        href: entry.href.as_deref().map(|href| links::rewrite_href(href, path_to_root)),
        expanded: entry.expanded,
        active: false,
    });
    for child in &entry.children {
        let child_id = push_entry(nodes, child, Some(id), depth + 1, path_to_root);
        nodes[id.0].children.push(child_id);
    }
    id
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_toc() -> Toc {
        serde_json::from_str(
            r#"{
                "title": "The Guide",
                "entries": [
                    { "label": "Basics", "part_title": true },
                    { "label": "Introduction", "href": "introduction.html" },
                    {
                        "label": "Arrays",
                        "href": "arrays.html",
                        "number": "4.",
                        "children": [
                            { "label": "Initialisation", "href": "arrays/array_init.html", "number": "4.1." },
                            { "label": "Reading", "href": "arrays/array_read.html", "number": "4.2." }
                        ]
                    },
                    { "label": "External", "href": "https://example.com" }
                ]
            }"#,
        )
        .expect("sample toc")
    }

    #[test]
    fn materialize_preserves_document_order_and_parents() {
        let tree = NavTree::materialize(&sample_toc(), "");
        assert_eq!(tree.len(), 6);
        assert_eq!(tree.title(), Some("The Guide"));

        let labels: Vec<&str> = tree.nodes().map(|node| node.label.as_str()).collect();
        assert_eq!(
            labels,
            ["Basics", "Introduction", "Arrays", "Initialisation", "Reading", "External"]
        );

        let arrays = tree.nodes().find(|node| node.label == "Arrays").expect("arrays node");
        assert!(arrays.parent.is_none());
        assert_eq!(arrays.children.len(), 2);
        for &child in &arrays.children {
            assert_eq!(tree.node(child).parent, Some(arrays.id));
            assert_eq!(tree.node(child).depth, 1);
        }
    }

    #[test]
    fn materialize_rewrites_relative_hrefs_only() {
        let tree = NavTree::materialize(&sample_toc(), "../");
        let hrefs: Vec<Option<&str>> = tree.nodes().map(|node| node.href.as_deref()).collect();
        assert_eq!(hrefs[0], None);
        assert_eq!(hrefs[1], Some("../introduction.html"));
        assert_eq!(hrefs[3], Some("../arrays/array_init.html"));
        assert_eq!(hrefs[5], Some("https://example.com"));
    }

    #[test]
    fn links_skip_part_titles_and_drafts() {
        let tree = NavTree::materialize(&sample_toc(), "");
        let labels: Vec<&str> = tree.links().map(|node| node.label.as_str()).collect();
        assert_eq!(labels, ["Introduction", "Arrays", "Initialisation", "Reading", "External"]);
    }

    #[test]
    fn ancestors_walk_parent_references() {
        let tree = NavTree::materialize(&sample_toc(), "");
        let reading = tree.nodes().find(|node| node.label == "Reading").expect("reading node");
        let chain: Vec<&str> = tree.ancestors(reading.id).map(|id| tree.node(id).label.as_str()).collect();
        assert_eq!(chain, ["Arrays"]);

        let top = tree.nodes().find(|node| node.label == "Introduction").expect("intro node");
        assert_eq!(tree.ancestors(top.id).count(), 0);
    }

    #[test]
    fn visible_respects_expansion() {
        let mut tree = NavTree::materialize(&sample_toc(), "");
        let arrays = tree.nodes().find(|node| node.label == "Arrays").map(|node| node.id).expect("arrays id");

        // Collapsed by default: children hidden, top level shown.
        let rows: Vec<&str> = tree.visible().iter().map(|&id| tree.node(id).label.as_str()).collect();
        assert_eq!(rows, ["Basics", "Introduction", "Arrays", "External"]);

        tree.toggle(arrays);
        let rows: Vec<&str> = tree.visible().iter().map(|&id| tree.node(id).label.as_str()).collect();
        assert_eq!(
            rows,
            ["Basics", "Introduction", "Arrays", "Initialisation", "Reading", "External"]
        );

        tree.toggle(arrays);
        assert_eq!(tree.visible().len(), 4);
    }

    #[test]
    fn default_expanded_entries_start_open() {
        let toc: Toc = serde_json::from_str(
            r#"{
                "entries": [
                    {
                        "label": "Open",
                        "href": "open.html",
                        "expanded": true,
                        "children": [ { "label": "Child", "href": "open/child.html" } ]
                    }
                ]
            }"#,
        )
        .expect("toc");
        let tree = NavTree::materialize(&toc, "");
        assert_eq!(tree.visible().len(), 2);
    }
}
