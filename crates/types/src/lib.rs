use serde::{Deserialize, Serialize};

/// The literal navigation data for one book, parsed from `toc.json` in the
/// book root. The tree is fixed for the lifetime of the book: the reader
/// never inserts or removes entries after loading.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Toc {
    /// Book title shown above the sidebar (e.g., "The Guide")
    #[serde(default)]
    pub title: Option<String>,
    /// Top-level entries in document order
    #[serde(default)]
    pub entries: Vec<TocEntry>,
}

impl Toc {
    /// Total number of entries, counting nested children.
    pub fn len(&self) -> usize {
        fn count(entries: &[TocEntry]) -> usize {
            entries.iter().map(|e| 1 + count(&e.children)).sum()
        }
        count(&self.entries)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One entry in the navigation tree.
///
/// Entries with an `href` are page links; entries without one are either
/// part titles (rendered as headings) or drafts (rendered as disabled
/// labels). Either kind may carry children.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TocEntry {
    /// Display label (e.g., "Working with Arrays")
    pub label: String,
    /// Book-relative link target (e.g., "ch02/arrays.html"); `None` for
    /// part titles and drafts
    #[serde(default)]
    pub href: Option<String>,
    /// Literal section number rendered before the label (e.g., "4.1.")
    #[serde(default)]
    pub number: Option<String>,
    /// Render as a non-navigable part heading instead of a chapter row
    #[serde(default)]
    pub part_title: bool,
    /// Start expanded even when the entry is not on the active path
    #[serde(default)]
    pub expanded: bool,
    /// Nested entries in document order
    #[serde(default)]
    pub children: Vec<TocEntry>,
}

/// Messages that drive the application event loop.
///
/// These are raised by the runtime (ticker, terminal, watcher) and reduced
/// by the application state and components.
#[derive(Debug, Clone)]
pub enum Msg {
    /// Periodic UI tick
    Tick,
    /// Terminal resized
    Resize(u16, u16),
    /// The book directory changed on disk
    BookChanged,
}

/// Side effects reported by components for the runtime to perform.
///
/// Components never switch pages themselves; they emit an effect and the
/// runtime performs the navigation against the book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Open the page a sidebar link points at. Carries the link's rewritten
    /// href, to be resolved against the current page location.
    FollowLink(String),
    /// Open the previous chapter in document order
    OpenPrevious,
    /// Open the next chapter in document order
    OpenNext,
    /// Reload `toc.json` and the current page from disk
    ReloadBook,
    /// Shut down the application
    Quit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toc_entry_defaults() {
        let json = r#"{ "label": "Introduction" }"#;
        let entry: TocEntry = serde_json::from_str(json).expect("deserialize TocEntry");
        assert_eq!(entry.label, "Introduction");
        assert!(entry.href.is_none());
        assert!(entry.number.is_none());
        assert!(!entry.part_title);
        assert!(!entry.expanded);
        assert!(entry.children.is_empty());
    }

    #[test]
    fn toc_parses_nested_entries() {
        let json = r#"{
            "title": "The Guide",
            "entries": [
                { "label": "Basics", "part_title": true },
                {
                    "label": "Collections",
                    "href": "collections.html",
                    "number": "1.",
                    "children": [
                        { "label": "Arrays", "href": "arrays.html", "number": "1.1." }
                    ]
                }
            ]
        }"#;

        let toc: Toc = serde_json::from_str(json).expect("deserialize Toc");
        assert_eq!(toc.title.as_deref(), Some("The Guide"));
        assert_eq!(toc.entries.len(), 2);
        assert_eq!(toc.len(), 3);
        assert!(toc.entries[0].part_title);
        assert_eq!(toc.entries[1].children[0].label, "Arrays");
        assert_eq!(toc.entries[1].children[0].number.as_deref(), Some("1.1."));

        let back = serde_json::to_string(&toc).expect("serialize Toc");
        let toc2: Toc = serde_json::from_str(&back).expect("round-trip deserialize");
        assert_eq!(toc2.len(), toc.len());
        assert_eq!(toc2.entries[1].href, toc.entries[1].href);
    }
}
