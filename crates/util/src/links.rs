//! Link classification and rewriting for book-relative hrefs.
//!
//! Navigation data carries hrefs relative to the book root. Pages live at
//! arbitrary depths, so before a sidebar link can be followed from a page its
//! href must be prefixed with that page's path back to the root. External and
//! fragment-only targets are left untouched.

use once_cell::sync::Lazy;
use percent_encoding::percent_decode_str;
use regex::Regex;
use std::path::PathBuf;

/// Matches absolute link targets: scheme-qualified (`https://host/…`) or
/// protocol-relative (`//host/…`).
static EXTERNAL_HREF_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[a-z+]+:)?//").expect("external href regex should compile"));

/// Returns `true` for hrefs that point outside the book.
pub fn is_external(href: &str) -> bool {
    EXTERNAL_HREF_RE.is_match(href)
}

/// Returns `true` for fragment-only hrefs (`#section`).
pub fn is_fragment(href: &str) -> bool {
    href.starts_with('#')
}

/// Prefixes a book-relative href with the current page's path to the book
/// root. Empty, fragment-only and external hrefs pass through unchanged.
pub fn rewrite_href(href: &str, path_to_root: &str) -> String {
    if href.is_empty() || is_fragment(href) || is_external(href) {
        return href.to_string();
    }
    format!("{path_to_root}{href}")
}

/// Computes the relative prefix from a page back to the book root: `""` for
/// a root-level page, `"../"` one directory down, and so on.
pub fn path_to_root(page_rel_path: &str) -> String {
    page_rel_path.matches('/').map(|_| "../").collect()
}

/// Normalizes a book-relative href to its canonical string form: query and
/// fragment suffixes dropped, empty and `.` segments removed. The result is
/// the page identity used for path-to-root computation and page lookups.
pub fn normalize_rel_href(href: &str) -> String {
    let target = href.split(['?', '#']).next().unwrap_or_default();
    target
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

/// Maps a book-relative href onto a filesystem path relative to the book
/// root. Query and fragment suffixes are dropped and percent-escapes are
/// decoded, since generated filenames may contain spaces.
pub fn href_to_rel_path(href: &str) -> PathBuf {
    let target = href.split(['?', '#']).next().unwrap_or_default();
    let decoded = percent_decode_str(target).decode_utf8_lossy();
    decoded
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_relative_hrefs() {
        assert_eq!(rewrite_href("arrays.html", "../"), "../arrays.html");
        assert_eq!(rewrite_href("ch02/arrays.html", ""), "ch02/arrays.html");
        assert_eq!(rewrite_href("intro.html", "../../"), "../../intro.html");
    }

    #[test]
    fn leaves_external_and_fragment_hrefs_untouched() {
        assert_eq!(rewrite_href("https://example.com", "../"), "https://example.com");
        assert_eq!(rewrite_href("//cdn.example.com/lib.js", "../"), "//cdn.example.com/lib.js");
        assert_eq!(rewrite_href("git+ssh://host/repo", "../"), "git+ssh://host/repo");
        assert_eq!(rewrite_href("#section", "../"), "#section");
        assert_eq!(rewrite_href("", "../"), "");
    }

    #[test]
    fn scheme_without_slashes_is_treated_as_relative() {
        // Only scheme-then-`//` counts as external; book data never carries
        // bare-scheme targets, so they rewrite like any relative href.
        assert!(!is_external("mailto:someone@example.com"));
        assert_eq!(
            rewrite_href("mailto:someone@example.com", "../"),
            "../mailto:someone@example.com"
        );
    }

    #[test]
    fn path_to_root_counts_directory_levels() {
        assert_eq!(path_to_root("index.html"), "");
        assert_eq!(path_to_root("ch02/arrays.html"), "../");
        assert_eq!(path_to_root("part1/ch02/arrays.html"), "../../");
    }

    #[test]
    fn normalize_rel_href_produces_a_canonical_page_identity() {
        assert_eq!(normalize_rel_href("./intro.html"), "intro.html");
        assert_eq!(normalize_rel_href("ch02//arrays.html"), "ch02/arrays.html");
        assert_eq!(normalize_rel_href("arrays.html?highlight=vec#slices"), "arrays.html");
        assert_eq!(normalize_rel_href("ch02/arrays.html"), "ch02/arrays.html");
    }

    #[test]
    fn href_to_rel_path_decodes_and_strips_suffixes() {
        assert_eq!(href_to_rel_path("ch02/arrays.html"), PathBuf::from("ch02/arrays.html"));
        assert_eq!(href_to_rel_path("my%20page.html"), PathBuf::from("my page.html"));
        assert_eq!(href_to_rel_path("arrays.html?highlight=vec"), PathBuf::from("arrays.html"));
        assert_eq!(href_to_rel_path("arrays.html#slices"), PathBuf::from("arrays.html"));
        assert_eq!(href_to_rel_path("./intro.html"), PathBuf::from("intro.html"));
    }
}
