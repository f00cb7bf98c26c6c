use std::borrow::Cow;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const ELLIPSIS: char = '…';

/// Approximate monospace metrics for the diagram's text.
#[derive(Debug, Clone)]
pub struct TextMetrics {
    /// Width of one character cell at 12px
    pub char_width: f64,
    /// Width of one character cell for the bold 14px table name
    pub title_char_width: f64,
}

impl Default for TextMetrics {
    fn default() -> Self {
        Self {
            char_width: 7.0,
            title_char_width: 8.5,
        }
    }
}

impl TextMetrics {
    pub fn text_width(&self, text: &str) -> f64 {
        UnicodeWidthStr::width(text) as f64 * self.char_width
    }

    pub fn title_width(&self, text: &str) -> f64 {
        UnicodeWidthStr::width(text) as f64 * self.title_char_width
    }

    /// Shorten `text` with a trailing ellipsis so it fits in `max_width`.
    pub fn fit<'a>(&self, text: &'a str, max_width: f64) -> Cow<'a, str> {
        fit_cells(text, (max_width / self.char_width).floor())
    }

    pub fn fit_title<'a>(&self, text: &'a str, max_width: f64) -> Cow<'a, str> {
        fit_cells(text, (max_width / self.title_char_width).floor())
    }
}

fn fit_cells(text: &str, cells: f64) -> Cow<'_, str> {
    if cells <= 0.0 {
        return Cow::Borrowed("");
    }
    let cells = cells as usize;
    if UnicodeWidthStr::width(text) <= cells {
        return Cow::Borrowed(text);
    }

    // Reserve one cell for the ellipsis
    let budget = cells.saturating_sub(1);
    let mut used = 0;
    let mut out = String::new();
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push(ELLIPSIS);
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_width() {
        let m = TextMetrics::default();
        assert_eq!(m.text_width("User"), 4.0 * 7.0);
    }

    #[test]
    fn test_unicode_width() {
        let m = TextMetrics::default();
        // 全角文字は幅2
        assert_eq!(m.text_width("ユーザー"), 8.0 * 7.0);
    }

    #[test]
    fn test_fit_short_text_untouched() {
        let m = TextMetrics::default();
        assert!(matches!(m.fit("id", 100.0), Cow::Borrowed("id")));
    }

    #[test]
    fn test_fit_truncates() {
        let m = TextMetrics::default();
        // 5 cells: 4 characters plus the ellipsis
        assert_eq!(m.fit("created_at", 35.0), "crea…");
    }

    #[test]
    fn test_fit_wide_chars() {
        let m = TextMetrics::default();
        // 4 cells: one wide glyph (2) fits the 3-cell budget, the next would not
        assert_eq!(m.fit("ユーザー", 28.0), "ユ…");
    }

    #[test]
    fn test_fit_no_room() {
        let m = TextMetrics::default();
        assert_eq!(m.fit("name", 3.0), "");
    }
}
