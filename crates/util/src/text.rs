//! Display-width helpers for terminal rendering.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Truncates a string to `max_width` terminal columns, appending an ellipsis
/// when anything was cut. Width is measured in display columns, not bytes,
/// so CJK labels truncate cleanly.
pub fn truncate_with_ellipsis(text: &str, max_width: usize) -> String {
    if max_width == 0 {
        return String::new();
    }
    if UnicodeWidthStr::width(text) <= max_width {
        return text.to_string();
    }
    let mut result = String::new();
    let mut width = 0;
    for character in text.chars() {
        let char_width = UnicodeWidthChar::width(character).unwrap_or(0);
        if width + char_width + 1 > max_width {
            result.push('\u{2026}');
            break;
        }
        result.push(character);
        width += char_width;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_strings_pass_through() {
        assert_eq!(truncate_with_ellipsis("Introduction", 20), "Introduction");
        assert_eq!(truncate_with_ellipsis("", 5), "");
    }

    #[test]
    fn long_strings_end_in_an_ellipsis() {
        assert_eq!(truncate_with_ellipsis("Advanced Lifetimes", 10), "Advanced \u{2026}");
    }

    #[test]
    fn zero_width_yields_empty() {
        assert_eq!(truncate_with_ellipsis("anything", 0), "");
    }

    #[test]
    fn wide_characters_count_as_two_columns() {
        // Each ideograph is two columns; four fit in eight, the fifth forces
        // a cut that leaves room for the ellipsis.
        assert_eq!(truncate_with_ellipsis("配列の初期化", 8), "配列の\u{2026}");
    }
}
