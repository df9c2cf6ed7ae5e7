use once_cell::sync::Lazy;
use rat_focus::{FocusBuilder, FocusFlag, HasFocus};
use ratatui::layout::Rect;
use regex::Regex;
use tome_engine::ScrollMetrics;

/// Cuts content that never renders: the document head, scripts, styles and
/// comments.
static CUT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<head\b.*?</head>|<script\b.*?</script>|<style\b.*?</style>|<!--.*?-->").expect("cut regex should compile"));

/// Line breaks inside flowing text.
static BREAK_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<br\s*/?>").expect("break tag regex should compile"));

/// Closing tags that end a block of text.
static BLOCK_END_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)</(?:p|div|h[1-6]|li|ul|ol|pre|blockquote|table|tr|section|article|header|footer)>")
        .expect("block end regex should compile"));

/// Any remaining markup tag.
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]*>").expect("tag regex should compile"));

/// Three or more consecutive newlines.
static BLANK_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").expect("blank run regex should compile"));

/// Reduces a generated page to plain text. This is deliberately naive: the
/// pages come out of a book generator, not the open web, so dropping the
/// head, cutting tags and decoding the handful of entities the generator
/// emits is enough for terminal display.
pub(crate) fn strip_page_text(source: &str) -> String {
    let cut = CUT_RE.replace_all(source, "");
    let broken = BREAK_TAG_RE.replace_all(&cut, "\n");
    let blocked = BLOCK_END_RE.replace_all(&broken, "\n\n");
    let stripped = TAG_RE.replace_all(&blocked, "");
    let decoded = decode_entities(&stripped);
    let trimmed = decoded.lines().map(str::trim_end).collect::<Vec<_>>().join("\n");
    BLANK_RUN_RE.replace_all(&trimmed, "\n\n").trim_matches('\n').to_string()
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        // Last, so freshly decoded entities are not decoded twice.
        .replace("&amp;", "&")
}

/// State for the page reader pane.
///
/// Holds the open page as stripped plain text plus the wrapped lines for the
/// last rendered width. Wrapping is redone lazily: only when the pane width
/// changes or a new page is shown.
#[derive(Debug)]
pub struct ReaderState {
    heading: String,
    text: String,
    lines: Vec<String>,
    wrap_width: u16,
    pub scroll: ScrollMetrics,
    pub container_focus: FocusFlag,
}

impl Default for ReaderState {
    fn default() -> Self {
        Self {
            heading: String::new(),
            text: String::new(),
            lines: Vec::new(),
            wrap_width: 0,
            scroll: ScrollMetrics::default(),
            container_focus: FocusFlag::named("reader"),
        }
    }
}

impl ReaderState {
    /// Displays a freshly opened page: strips it to plain text, drops the
    /// cached wrap, and returns the view to the top.
    pub fn show(&mut self, heading: String, page_source: &str) {
        self.heading = heading;
        self.text = strip_page_text(page_source);
        self.lines.clear();
        self.wrap_width = 0;
        self.scroll.scroll_to_top();
    }

    pub fn heading(&self) -> &str {
        &self.heading
    }

    /// Wrapped display lines for the last reflowed width.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Re-wraps the page text when the pane width changed. A zero width is
    /// ignored so a collapsed pane keeps the previous wrap.
    pub fn reflow(&mut self, width: u16) {
        if width == 0 || width == self.wrap_width {
            return;
        }
        self.wrap_width = width;
        let width = width as usize;
        self.lines = self
            .text
            .lines()
            .flat_map(|line| {
                if line.trim().is_empty() {
                    vec![String::new()]
                } else {
                    textwrap::wrap(line, width).into_iter().map(|piece| piece.into_owned()).collect()
                }
            })
            .collect();
    }

    /// Captures the pane viewport measured at render time.
    pub fn update_layout(&mut self, page_area: Rect) {
        self.scroll.update_content_height(self.lines.len() as u16);
        self.scroll.update_viewport_height(page_area.height);
    }
}

impl HasFocus for ReaderState {
    fn build(&self, builder: &mut FocusBuilder) {
        builder.leaf_widget(self);
    }

    fn focus(&self) -> FocusFlag {
        self.container_focus.clone()
    }

    fn area(&self) -> Rect {
        Rect::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = concat!(
        "<html><head><title>The Guide</title><style>p { color: red; }</style></head>\n",
        "<body>\n",
        "<h1>Arrays</h1>\n",
        "<p>Fixed-size &amp; stack-allocated.</p>\n",
        "<p>Use <code>[T; N]</code> for a length known at compile time.</p>\n",
        "<script>window.x = 1 < 2;</script>\n",
        "<!-- build marker -->\n",
        "</body></html>\n"
    );

    #[test]
    fn strip_removes_markup_and_decodes_entities() {
        let text = strip_page_text(PAGE);
        assert!(text.contains("Arrays"));
        assert!(text.contains("Fixed-size & stack-allocated."));
        assert!(text.contains("Use [T; N] for a length known at compile time."));
        // Head, scripts and comments never reach the terminal.
        assert!(!text.contains("The Guide"));
        assert!(!text.contains("color: red"));
        assert!(!text.contains("window.x"));
        assert!(!text.contains("build marker"));
        assert!(!text.contains('<'));
    }

    #[test]
    fn strip_separates_blocks_and_collapses_blank_runs() {
        let text = strip_page_text("<p>one</p><p>two</p>\n\n\n\n<p>three</p>");
        assert_eq!(text, "one\n\ntwo\n\nthree");
    }

    #[test]
    fn strip_keeps_plain_text_pages_intact() {
        let text = strip_page_text("just prose\nwith two lines");
        assert_eq!(text, "just prose\nwith two lines");
    }

    #[test]
    fn reflow_wraps_to_width_and_caches() {
        let mut state = ReaderState::default();
        state.show("Arrays".to_string(), "<p>one two three four five six seven eight</p>");

        state.reflow(10);
        assert!(state.lines().len() > 1);
        assert!(state.lines().iter().all(|line| line.len() <= 10));

        // Same width: the wrap is reused, not recomputed into a new shape.
        let before = state.lines().to_vec();
        state.reflow(10);
        assert_eq!(state.lines(), before.as_slice());

        state.reflow(80);
        assert_eq!(state.lines().len(), 1);
    }

    #[test]
    fn show_resets_scroll_and_forces_rewrap() {
        let mut state = ReaderState::default();
        state.show("A".to_string(), "<p>alpha beta gamma delta epsilon zeta</p>");
        state.reflow(12);
        state.update_layout(Rect::new(0, 0, 12, 2));
        state.scroll.scroll_to_bottom();
        assert!(state.scroll.offset() > 0);

        state.show("B".to_string(), "<p>short</p>");
        assert_eq!(state.scroll.offset(), 0);
        assert!(state.lines().is_empty());
        state.reflow(12);
        assert_eq!(state.lines(), ["short"]);
    }

    #[test]
    fn blank_lines_survive_wrapping() {
        let mut state = ReaderState::default();
        state.show("A".to_string(), "<p>first</p><p>second</p>");
        state.reflow(40);
        assert_eq!(state.lines(), ["first", "", "second"]);
    }
}
