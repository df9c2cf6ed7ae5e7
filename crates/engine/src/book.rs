//! On-disk book model.
//!
//! A book is a directory holding `toc.json` (the literal navigation data)
//! and one file per page. The book knows nothing about the sidebar: it
//! loads the toc, reads pages, expresses page locations as file URLs, and
//! answers document-order neighbor queries for the previous/next chapter
//! controls.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tome_types::{Toc, TocEntry};
use tome_util::links::{href_to_rel_path, is_external, is_fragment};
use tracing::debug;
use url::Url;

/// Navigation data filename inside the book root.
pub const TOC_FILE_NAME: &str = "toc.json";

/// Errors surfaced while loading or reading a book.
#[derive(Debug, Error)]
pub enum BookError {
    /// I/O failure while reading the book directory.
    #[error("book I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// `toc.json` is present but not valid navigation data.
    #[error("failed to parse toc.json: {0}")]
    Toc(#[from] serde_json::Error),
    /// The provided book root does not exist or is not a directory.
    #[error("book root is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
    /// The book root cannot be expressed as a file URL.
    #[error("book root cannot be expressed as a URL: {}", .0.display())]
    RootUrl(PathBuf),
    /// A page href does not form a valid location against the book root.
    #[error("invalid page href {href:?}: {source}")]
    Href {
        href: String,
        source: url::ParseError,
    },
}

/// A loaded book: canonicalized root plus parsed navigation data.
#[derive(Debug, Clone)]
pub struct Book {
    root: PathBuf,
    toc: Toc,
}

impl Book {
    /// Loads a book from its root directory. `toc.json` must parse; a book
    /// without navigation data is not readable.
    pub fn load(root: impl AsRef<Path>) -> Result<Self, BookError> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(BookError::NotADirectory(root.to_path_buf()));
        }
        let root = root.canonicalize()?;
        let content = fs::read_to_string(root.join(TOC_FILE_NAME))?;
        let toc: Toc = serde_json::from_str(&content)?;
        debug!("loaded book at {} with {} toc entries", root.display(), toc.len());
        Ok(Self { root, toc })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn toc(&self) -> &Toc {
        &self.toc
    }

    pub fn title(&self) -> Option<&str> {
        self.toc.title.as_deref()
    }

    /// Book-relative hrefs of all readable chapters in document order.
    /// External and fragment targets are not chapters.
    pub fn chapters(&self) -> Vec<&str> {
        let mut hrefs = Vec::new();
        collect_chapters(&self.toc.entries, &mut hrefs);
        hrefs
    }

    /// The chapter an empty `--page` argument opens. Also the entry the
    /// root index page aliases.
    pub fn first_chapter(&self) -> Option<&str> {
        self.chapters().first().copied()
    }

    /// Previous and next chapter of `current_href` in document order.
    /// Hrefs are compared as decoded paths, so `./intro.html` and
    /// `intro.html` name the same chapter.
    pub fn neighbors(&self, current_href: &str) -> (Option<&str>, Option<&str>) {
        let chapters = self.chapters();
        let current = href_to_rel_path(current_href);
        match chapters.iter().position(|href| href_to_rel_path(href) == current) {
            Some(index) => {
                let previous = index.checked_sub(1).and_then(|i| chapters.get(i).copied());
                let next = chapters.get(index + 1).copied();
                (previous, next)
            }
            None => (None, None),
        }
    }

    /// Filesystem path of a page, relative hrefs decoded onto the root.
    pub fn page_path(&self, href: &str) -> PathBuf {
        self.root.join(href_to_rel_path(href))
    }

    /// Reads a page's raw contents.
    pub fn read_page(&self, href: &str) -> Result<String, BookError> {
        Ok(fs::read_to_string(self.page_path(href))?)
    }

    /// The absolute location of a book-relative page href, as a file URL.
    /// This is the location active-path resolution runs against.
    pub fn location_for(&self, href: &str) -> Result<Url, BookError> {
        let base = Url::from_directory_path(&self.root).map_err(|()| BookError::RootUrl(self.root.clone()))?;
        base.join(href).map_err(|source| BookError::Href {
            href: href.to_string(),
            source,
        })
    }

    /// Maps an absolute location back to a book-relative href. Returns
    /// `None` for locations outside the book root, which is how followed
    /// links get classified as external.
    pub fn href_for_location(&self, location: &Url) -> Option<String> {
        let base = Url::from_directory_path(&self.root).ok()?;
        let stripped = location.as_str().strip_prefix(base.as_str())?;
        let target = stripped.split(['?', '#']).next().unwrap_or_default();
        if target.is_empty() {
            return None;
        }
        Some(target.to_string())
    }
}

fn collect_chapters<'toc>(entries: &'toc [TocEntry], hrefs: &mut Vec<&'toc str>) {
    for entry in entries {
        if let Some(href) = entry.href.as_deref()
            && !href.is_empty()
            && !is_external(href)
            && !is_fragment(href)
        {
            hrefs.push(href);
        }
        collect_chapters(&entry.children, hrefs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const SAMPLE_TOC: &str = r#"{
        "title": "The Guide",
        "entries": [
            { "label": "Introduction", "href": "introduction.html" },
            {
                "label": "Arrays",
                "href": "arrays.html",
                "children": [
                    { "label": "Initialisation", "href": "arrays/array_init.html" }
                ]
            },
            { "label": "External", "href": "https://example.com/docs" },
            { "label": "Epilogue", "href": "epilogue.html" }
        ]
    }"#;

    fn write_book(dir: &Path) {
        fs::write(dir.join(TOC_FILE_NAME), SAMPLE_TOC).unwrap();
        fs::create_dir_all(dir.join("arrays")).unwrap();
        for (page, body) in [
            ("introduction.html", "<p>intro</p>"),
            ("arrays.html", "<p>arrays</p>"),
            ("arrays/array_init.html", "<p>init</p>"),
            ("epilogue.html", "<p>fin</p>"),
        ] {
            fs::write(dir.join(page), body).unwrap();
        }
    }

    #[test]
    fn load_parses_toc_and_reads_pages() {
        let dir = tempdir().unwrap();
        write_book(dir.path());

        let book = Book::load(dir.path()).unwrap();
        assert_eq!(book.title(), Some("The Guide"));
        assert_eq!(
            book.chapters(),
            ["introduction.html", "arrays.html", "arrays/array_init.html", "epilogue.html"]
        );
        assert_eq!(book.first_chapter(), Some("introduction.html"));
        assert_eq!(book.read_page("arrays/array_init.html").unwrap(), "<p>init</p>");
    }

    #[test]
    fn neighbors_follow_document_order_and_skip_externals() {
        let dir = tempdir().unwrap();
        write_book(dir.path());
        let book = Book::load(dir.path()).unwrap();

        assert_eq!(book.neighbors("introduction.html"), (None, Some("arrays.html")));
        assert_eq!(
            book.neighbors("arrays.html"),
            (Some("introduction.html"), Some("arrays/array_init.html"))
        );
        // The external entry sits between init and epilogue in the toc but
        // is not a chapter.
        assert_eq!(
            book.neighbors("arrays/array_init.html"),
            (Some("arrays.html"), Some("epilogue.html"))
        );
        assert_eq!(book.neighbors("epilogue.html"), (Some("arrays/array_init.html"), None));
        assert_eq!(book.neighbors("unknown.html"), (None, None));
    }

    #[test]
    fn neighbors_compare_decoded_paths() {
        let dir = tempdir().unwrap();
        write_book(dir.path());
        let book = Book::load(dir.path()).unwrap();

        assert_eq!(book.neighbors("./arrays.html"), (Some("introduction.html"), Some("arrays/array_init.html")));
    }

    #[test]
    fn locations_round_trip_through_the_book_root() {
        let dir = tempdir().unwrap();
        write_book(dir.path());
        let book = Book::load(dir.path()).unwrap();

        let location = book.location_for("arrays/array_init.html").unwrap();
        assert!(location.as_str().ends_with("/arrays/array_init.html"));
        assert_eq!(book.href_for_location(&location).as_deref(), Some("arrays/array_init.html"));

        let outside = Url::parse("https://example.com/docs").unwrap();
        assert_eq!(book.href_for_location(&outside), None);
    }

    #[test]
    fn missing_toc_is_an_io_error() {
        let dir = tempdir().unwrap();
        let error = Book::load(dir.path()).unwrap_err();
        assert!(matches!(error, BookError::Io(_)));
    }

    #[test]
    fn invalid_toc_is_a_parse_error() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(TOC_FILE_NAME), "not json").unwrap();
        let error = Book::load(dir.path()).unwrap_err();
        assert!(matches!(error, BookError::Toc(_)));
    }

    #[test]
    fn missing_root_is_rejected() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");
        let error = Book::load(&missing).unwrap_err();
        assert!(matches!(error, BookError::NotADirectory(_)));
    }
}
